//! Error types for the rule-set wire codec.

use crate::schema::{Role, ShapeId};

/// Errors raised while decoding or encoding a rule set.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON parse or structural error in the rule-set envelope.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// YAML parse or render error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A definition entry has no string `id`.
    #[error("{role} definition #{index} has no string `id`")]
    MissingId { role: Role, index: usize },

    /// The entry's `id` is not registered for its role.
    #[error("No {role} definition matches: {id}")]
    UnknownDefinition { id: String, role: Role },

    /// The entry's fields do not fit the registered shape.
    #[error("invalid {role} definition '{id}': {source}")]
    InvalidDefinition {
        id: String,
        role: Role,
        #[source]
        source: serde_json::Error,
    },

    /// The definition's shape has no id for the role.
    #[error("{role} shape {shape} is not registered")]
    UnregisteredShape { shape: ShapeId, role: Role },
}

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

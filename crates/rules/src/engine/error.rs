//! Error types for rule-set evaluation.

use crate::plugin::DispatchError;
use crate::schema::{Role, ShapeId};

/// Configuration or dispatch defects surfaced by the engine.
///
/// A violated rule is not an error: it is reported as
/// [`Verdict::Rejected`](super::Verdict::Rejected).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A rule set references a shape that no plugin handles for the role.
    #[error("no {role} plugin registered for shape {shape}")]
    NoPluginForShape { role: Role, shape: ShapeId },

    #[error("no rule set named '{0}'")]
    MissingRuleSet(String),
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

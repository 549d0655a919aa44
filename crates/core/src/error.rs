use thiserror::Error;

/// Errors raised while parsing a path expression.
///
/// Resolving a well-formed path never fails; absence is reported as `null`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path expression is empty")]
    Empty,

    #[error("path '{path}' must start with '$'")]
    MissingRoot { path: String },

    #[error("path '{path}': unexpected '{found}' at position {position}")]
    Unexpected {
        path: String,
        position: usize,
        found: char,
    },

    #[error("path '{path}': expected a member name at position {position}")]
    MissingName { path: String, position: usize },

    #[error("path '{path}': unterminated bracket starting at position {position}")]
    UnterminatedBracket { path: String, position: usize },

    #[error("path '{path}': invalid array index '{index}'")]
    InvalidIndex { path: String, index: String },
}

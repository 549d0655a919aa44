//! Component role: the namespace a definition id lives in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a component plays in a rule set.
///
/// Matcher ids and rule ids are independent namespaces: the same id may name
/// a different shape in each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Decides whether a rule set applies to a document.
    Matcher,
    /// Checks a document once the rule set applies.
    Rule,
}

impl Role {
    /// Key of the definition list for this role in the wire format.
    pub fn wire_key(&self) -> &'static str {
        match self {
            Role::Matcher => "matchers",
            Role::Rule => "rules",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Matcher => write!(f, "matcher"),
            Role::Rule => write!(f, "rule"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "matcher" | "matchers" => Ok(Role::Matcher),
            "rule" | "rules" => Ok(Role::Rule),
            other => Err(format!("unknown component role: '{}'", other)),
        }
    }
}

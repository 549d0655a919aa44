//! Rule-set envelope for first-pass deserialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::role::Role;

/// Wire form of a rule set with its definitions left untyped.
///
/// Used during two-pass decoding: first read the header and the raw entries,
/// then resolve each entry's `id` through the registry to its concrete shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSetEnvelope {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub matchers: Vec<Map<String, Value>>,
    #[serde(default)]
    pub rules: Vec<Map<String, Value>>,
}

impl RuleSetEnvelope {
    /// Raw entries for the given role.
    pub fn entries(&self, role: Role) -> &[Map<String, Value>] {
        match role {
            Role::Matcher => &self.matchers,
            Role::Rule => &self.rules,
        }
    }
}

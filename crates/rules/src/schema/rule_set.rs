//! In-memory rule-set model.

use super::definition::{Definition, DefinitionShape};
use super::role::Role;

/// A named bundle of matcher definitions and validator definitions.
///
/// Matchers decide whether the rule set applies to a document; rules are
/// checked, in order, once it does. An empty matcher list applies to every
/// document.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub name: String,
    pub description: String,
    pub matchers: Vec<Definition>,
    pub rules: Vec<Definition>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            matchers: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Append a matcher definition.
    pub fn matches<D: DefinitionShape>(mut self, definition: D) -> Self {
        self.matchers.push(Definition::new(definition));
        self
    }

    /// Append a validator definition.
    pub fn validates<D: DefinitionShape>(mut self, definition: D) -> Self {
        self.rules.push(Definition::new(definition));
        self
    }

    /// Definitions for the given role.
    pub fn definitions(&self, role: Role) -> &[Definition] {
        match role {
            Role::Matcher => &self.matchers,
            Role::Rule => &self.rules,
        }
    }
}

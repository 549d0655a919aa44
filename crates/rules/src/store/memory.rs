use std::collections::HashMap;
use std::sync::RwLock;

use super::error::{check_name, Result};
use super::RuleSetStore;
use crate::schema::RuleSet;

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryRuleSetStore {
    rule_sets: RwLock<HashMap<String, RuleSet>>,
}

impl InMemoryRuleSetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuleSetStore for InMemoryRuleSetStore {
    fn persist(&self, rule_set: RuleSet) -> Result<RuleSet> {
        check_name(&rule_set.name)?;
        self.rule_sets
            .write()
            .expect("rule_sets lock poisoned")
            .insert(rule_set.name.clone(), rule_set.clone());
        Ok(rule_set)
    }

    fn get_all(&self) -> Result<Vec<RuleSet>> {
        let mut all: Vec<_> = self
            .rule_sets
            .read()
            .expect("rule_sets lock poisoned")
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    fn get_by_name(&self, name: &str) -> Result<Option<RuleSet>> {
        Ok(self
            .rule_sets
            .read()
            .expect("rule_sets lock poisoned")
            .get(name)
            .cloned())
    }

    fn delete_by_name(&self, name: &str) -> Result<()> {
        self.rule_sets
            .write()
            .expect("rule_sets lock poisoned")
            .remove(name);
        Ok(())
    }
}

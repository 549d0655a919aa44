//! Rule-set persistence.
//!
//! A [`RuleSetStore`] keeps rule sets keyed by name. Two backends are provided:
//! [`InMemoryRuleSetStore`] and the directory-backed [`FileRuleSetStore`].

mod error;
mod file;
mod memory;

pub use error::{LoadResult, LoadStatus, Result, StoreError};
pub use file::FileRuleSetStore;
pub use memory::InMemoryRuleSetStore;

use crate::schema::RuleSet;

/// Name-keyed rule-set storage.
pub trait RuleSetStore: Send + Sync {
    /// Store a rule set, replacing any rule set with the same name.
    fn persist(&self, rule_set: RuleSet) -> Result<RuleSet>;

    fn get_all(&self) -> Result<Vec<RuleSet>>;

    fn get_by_name(&self, name: &str) -> Result<Option<RuleSet>>;

    fn delete(&self, rule_set: &RuleSet) -> Result<()> {
        self.delete_by_name(&rule_set.name)
    }

    /// Delete by name. Deleting an absent name is not an error.
    fn delete_by_name(&self, name: &str) -> Result<()>;
}

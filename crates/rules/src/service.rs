//! Keeps a rule-set store and the live engine in sync.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::engine::{EngineError, RuleSetEngine};
use crate::schema::RuleSet;
use crate::store::{RuleSetStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("no rule set named '{0}'")]
    MissingRuleSet(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Rule-set management: every change goes to the store first, then the engine.
///
/// Changes are serialized so the engine always ends up holding what the store holds.
#[derive(Clone)]
pub struct RuleSetService {
    store: Arc<dyn RuleSetStore>,
    engine: Arc<RuleSetEngine>,
    writes: Arc<Mutex<()>>,
}

impl RuleSetService {
    pub fn new(store: Arc<dyn RuleSetStore>, engine: Arc<RuleSetEngine>) -> Self {
        Self {
            store,
            engine,
            writes: Arc::new(Mutex::new(())),
        }
    }

    pub fn engine(&self) -> &Arc<RuleSetEngine> {
        &self.engine
    }

    /// Persist a rule set and make it active, replacing a same-named one.
    pub fn create(&self, rule_set: RuleSet) -> Result<RuleSet> {
        let _writes = self.writes.lock().expect("writes lock poisoned");
        let stored = self.store.persist(rule_set)?;
        self.engine.replace_rule_set(stored.clone());
        Ok(stored)
    }

    pub fn get_all(&self) -> Result<Vec<RuleSet>> {
        Ok(self.store.get_all()?)
    }

    pub fn get(&self, name: &str) -> Result<RuleSet> {
        self.store
            .get_by_name(name)?
            .ok_or_else(|| ServiceError::MissingRuleSet(name.to_string()))
    }

    /// Delete a stored rule set and deactivate it.
    pub fn remove(&self, name: &str) -> Result<RuleSet> {
        let _writes = self.writes.lock().expect("writes lock poisoned");
        let rule_set = self.get(name)?;
        self.store.delete(&rule_set)?;
        match self.engine.remove_rule_set(name) {
            Ok(()) | Err(EngineError::MissingRuleSet(_)) => {}
            Err(e) => return Err(e.into()),
        }
        info!(rule_set = %name, "removed rule set");
        Ok(rule_set)
    }

    /// Activate every stored rule set. Returns how many were loaded.
    pub fn restore(&self) -> Result<usize> {
        let _writes = self.writes.lock().expect("writes lock poisoned");
        let all = self.store.get_all()?;
        let count = all.len();
        for rule_set in all {
            self.engine.replace_rule_set(rule_set);
        }
        if count == 0 {
            warn!("no stored rule sets to restore");
        } else {
            info!(count, "restored rule sets");
        }
        Ok(count)
    }
}

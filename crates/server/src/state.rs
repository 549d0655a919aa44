//! Shared application state.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use jsonguard_core::config::{StoreBackend, ValidationConfig};
use jsonguard_core::Config;
use jsonguard_rules::store::LoadStatus;
use jsonguard_rules::{
    ComponentRegistry, FileRuleSetStore, InMemoryRuleSetStore, RuleSetCodec, RuleSetEngine,
    RuleSetService, RuleSetStore, SchemaGenerator,
};

use crate::guard::JsonGuard;

pub struct AppState {
    pub validation: ValidationConfig,
    pub cors_origin: String,
    pub codec: RuleSetCodec,
    pub schema: SchemaGenerator,
    pub service: RuleSetService,
}

impl AppState {
    /// Wire up registry, store, engine and service from configuration,
    /// then activate every stored rule set.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let registry = Arc::new(ComponentRegistry::builtin());
        let codec = RuleSetCodec::new(Arc::clone(&registry));

        let store: Arc<dyn RuleSetStore> = match config.validation.store {
            StoreBackend::Memory => Arc::new(InMemoryRuleSetStore::new()),
            StoreBackend::File => {
                let dir = &config.validation.rules_dir;
                let (store, results) = FileRuleSetStore::open(dir, codec.clone())
                    .with_context(|| format!("failed to open rule set store at {}", dir.display()))?;
                let failed = results
                    .iter()
                    .filter(|r| matches!(r.status, LoadStatus::Failed { .. }))
                    .count();
                if failed > 0 {
                    warn!(failed, path = %dir.display(), "some rule set files failed to load");
                }
                Arc::new(store)
            }
        };

        let state = Self::new(
            config.validation.clone(),
            config.server.cors_origin.clone(),
            registry,
            store,
        )?;
        let restored = state.service.restore()?;
        info!(restored, store = %config.validation.store, "rule set engine ready");
        Ok(state)
    }

    pub fn new(
        validation: ValidationConfig,
        cors_origin: String,
        registry: Arc<ComponentRegistry>,
        store: Arc<dyn RuleSetStore>,
    ) -> anyhow::Result<Self> {
        let schema = SchemaGenerator::new(Arc::clone(&registry))?;
        let engine = Arc::new(RuleSetEngine::builtin());
        Ok(Self {
            validation,
            cors_origin,
            codec: RuleSetCodec::new(registry),
            schema,
            service: RuleSetService::new(store, engine),
        })
    }

    pub fn engine(&self) -> &Arc<RuleSetEngine> {
        self.service.engine()
    }

    /// Guard middleware state bound to this application's engine.
    pub fn guard(&self) -> JsonGuard {
        JsonGuard::new(Arc::clone(self.engine()), self.validation.max_body_bytes)
    }
}

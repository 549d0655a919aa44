//! Pluggable JSON rule-set engine.
//!
//! This crate provides:
//! - A component registry mapping wire ids to typed definition shapes
//! - A JSON / YAML codec for rule sets
//! - Matcher and validator plugins, with built-in field components
//! - The evaluation engine, rule-set stores and a service keeping them in sync
//! - JSON Schema generation for rule-set authors

pub mod codec;
pub mod components;
pub mod engine;
pub mod json_schema;
pub mod plugin;
pub mod registry;
pub mod schema;
pub mod service;
pub mod store;

pub use codec::{CodecError, RuleSetCodec};
pub use engine::{EngineBuilder, EngineError, RuleSetEngine, Verdict, Violation};
pub use json_schema::{SchemaError, SchemaGenerator};
pub use registry::{ComponentRegistry, RegistryBuilder, RegistryError};
pub use schema::{Definition, DefinitionShape, Role, RuleSet};
pub use service::{RuleSetService, ServiceError};
pub use store::{FileRuleSetStore, InMemoryRuleSetStore, RuleSetStore, StoreError};

//! Rule-set model types.
//!
//! - `Role`: matcher or rule, each its own id namespace
//! - `DefinitionShape` / `Definition`: typed definition records and their erased form
//! - `RuleSet`: a named bundle of matcher and rule definitions
//! - `RuleSetEnvelope`: untyped first-pass wire form

mod definition;
mod envelope;
mod role;
mod rule_set;

pub use definition::*;
pub use envelope::*;
pub use role::*;
pub use rule_set::*;

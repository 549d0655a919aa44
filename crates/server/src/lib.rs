//! HTTP layer for the JSON rule-set engine.
//!
//! - Rule-set management and schema endpoints under a configurable base path
//! - [`guard::json_guard`]: middleware rejecting JSON bodies that violate an active rule set

pub mod error;
pub mod guard;
pub mod handlers;
pub mod router;
pub mod state;

pub use guard::{json_guard, JsonGuard};
pub use router::build_router;
pub use state::AppState;

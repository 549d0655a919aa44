//! Built-in field components.
//!
//! Each component is a [`NativeComponent`](crate::plugin::NativeComponent)
//! registered under a `-matcher` id and a `-rule` id.

mod field_equals;
mod field_not_empty;
mod field_not_equals;

pub use field_equals::{FieldEquals, FieldEqualsComponent};
pub use field_not_empty::{FieldNotEmpty, FieldNotEmptyComponent};
pub use field_not_equals::{FieldNotEquals, FieldNotEqualsComponent};

use crate::engine::EngineBuilder;
use crate::registry::{ComponentKind, RegistryBuilder};
use serde_json::Value;

/// Render a value for a failure message: strings bare, everything else as compact JSON.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Registry entries for every built-in component.
pub(crate) fn builtin_kinds() -> Vec<ComponentKind> {
    RegistryBuilder::default()
        .matcher::<FieldEquals>(
            "field-equals-matcher",
            "Matches if a JSON path has a specific value",
        )
        .rule::<FieldEquals>(
            "field-equals-rule",
            "Validates that a specific value is present at a JSON path",
        )
        .matcher::<FieldNotEquals>(
            "field-not-equals-matcher",
            "Matches if a specific value is not present at a JSON path",
        )
        .rule::<FieldNotEquals>(
            "field-not-equals-rule",
            "Validates that a specific value is not present at a JSON path",
        )
        .matcher::<FieldNotEmpty>(
            "field-not-empty-matcher",
            "Matches if a JSON path is non-empty",
        )
        .rule::<FieldNotEmpty>(
            "field-not-empty-rule",
            "Validates that a JSON path is non-empty",
        )
        .into_kinds()
}

/// Register the matcher and validator halves of every built-in component.
pub fn register_builtins(builder: EngineBuilder) -> EngineBuilder {
    builder
        .native(FieldEqualsComponent)
        .native(FieldNotEqualsComponent)
        .native(FieldNotEmptyComponent)
}

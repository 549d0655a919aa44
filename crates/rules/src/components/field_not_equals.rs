use jsonguard_core::{JsonPath, JsonView};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::display_value;
use crate::plugin::NativeComponent;
use crate::schema::{DefinitionShape, FieldKind, FieldSpec};

/// Requires the value at `jsonPath` to be present and differ from `value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldNotEquals {
    pub json_path: JsonPath,
    pub value: Value,
}

impl FieldNotEquals {
    pub fn new(json_path: JsonPath, value: impl Into<Value>) -> Self {
        Self {
            json_path,
            value: value.into(),
        }
    }
}

impl DefinitionShape for FieldNotEquals {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec {
            name: "jsonPath",
            kind: FieldKind::String,
            description: "JSON Path of the property that should not hold the value of `value`",
        },
        FieldSpec {
            name: "value",
            kind: FieldKind::Any,
            description: "Value that should not be present in `jsonPath`",
        },
    ];
}

pub struct FieldNotEqualsComponent;

impl NativeComponent for FieldNotEqualsComponent {
    type Definition = FieldNotEquals;

    fn name(&self) -> &str {
        "field-not-equals"
    }

    fn matches(&self, definition: &FieldNotEquals, doc: &JsonView) -> bool {
        let actual = definition.json_path.read(doc);
        !actual.is_null() && actual != definition.value
    }

    fn failure_message(&self, definition: &FieldNotEquals, _doc: &JsonView) -> String {
        format!(
            "Value of {} must not be `{}`",
            definition.json_path,
            display_value(&definition.value)
        )
    }
}

use jsonguard_core::{JsonPath, JsonView};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::display_value;
use crate::plugin::NativeComponent;
use crate::schema::{DefinitionShape, FieldKind, FieldSpec};

/// Requires the value at `jsonPath` to equal `value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldEquals {
    pub json_path: JsonPath,
    pub value: Value,
}

impl FieldEquals {
    pub fn new(json_path: JsonPath, value: impl Into<Value>) -> Self {
        Self {
            json_path,
            value: value.into(),
        }
    }
}

impl DefinitionShape for FieldEquals {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec {
            name: "jsonPath",
            kind: FieldKind::String,
            description: "JSON Path of the property that shall hold the value of `value`",
        },
        FieldSpec {
            name: "value",
            kind: FieldKind::Any,
            description: "Value that shall be present in `jsonPath`",
        },
    ];
}

pub struct FieldEqualsComponent;

impl NativeComponent for FieldEqualsComponent {
    type Definition = FieldEquals;

    fn name(&self) -> &str {
        "field-equals"
    }

    fn matches(&self, definition: &FieldEquals, doc: &JsonView) -> bool {
        let actual = definition.json_path.read(doc);
        !actual.is_null() && actual == definition.value
    }

    fn failure_message(&self, definition: &FieldEquals, doc: &JsonView) -> String {
        format!(
            "Value of {} must be `{}`, but is `{}`",
            definition.json_path,
            display_value(&definition.value),
            display_value(&definition.json_path.read(doc))
        )
    }
}

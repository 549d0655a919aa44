use jsonguard_core::{JsonPath, JsonView};
use serde::{Deserialize, Serialize};

use crate::plugin::NativeComponent;
use crate::schema::{DefinitionShape, FieldKind, FieldSpec};

/// Requires any non-null value at `jsonPath`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldNotEmpty {
    pub json_path: JsonPath,
}

impl FieldNotEmpty {
    pub fn new(json_path: JsonPath) -> Self {
        Self { json_path }
    }
}

impl DefinitionShape for FieldNotEmpty {
    const FIELDS: &'static [FieldSpec] = &[FieldSpec {
        name: "jsonPath",
        kind: FieldKind::String,
        description: "JSON Path of the property that shall hold any value other than null",
    }];
}

pub struct FieldNotEmptyComponent;

impl NativeComponent for FieldNotEmptyComponent {
    type Definition = FieldNotEmpty;

    fn name(&self) -> &str {
        "field-not-empty"
    }

    fn matches(&self, definition: &FieldNotEmpty, doc: &JsonView) -> bool {
        !definition.json_path.read(doc).is_null()
    }

    fn failure_message(&self, definition: &FieldNotEmpty, _doc: &JsonView) -> String {
        format!("Field must not be empty: {}", definition.json_path)
    }
}

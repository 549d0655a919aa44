//! JSON Schema (draft-07) generation for the rule-set wire format.
//!
//! Schemas are derived from the [`ComponentRegistry`]: one definition per
//! registered id, built from the shape's [`FieldSpec`](crate::schema::FieldSpec)s.

use std::sync::Arc;

use jsonschema::{Draft, Validator};
use serde_json::{json, Map, Value};

use crate::registry::{ComponentKind, ComponentRegistry};
use crate::schema::Role;

const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The generated schema itself failed to compile.
    #[error("generated schema does not compile: {0}")]
    Compile(String),

    /// The document does not satisfy the rule-set schema.
    #[error("rule set does not satisfy schema: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Generates and applies the rule-set schemas for one registry.
pub struct SchemaGenerator {
    registry: Arc<ComponentRegistry>,
    validator: Validator,
}

impl SchemaGenerator {
    /// Build the generator and compile the merged schema used by [`check`](Self::check).
    pub fn new(registry: Arc<ComponentRegistry>) -> Result<Self, SchemaError> {
        let merged = merged_schema(&registry);
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(&merged)
            .map_err(|e| SchemaError::Compile(e.to_string()))?;
        Ok(Self { registry, validator })
    }

    /// Schema of every registered matcher definition.
    pub fn matchers_schema(&self) -> Value {
        group_schema(&self.registry, Role::Matcher)
    }

    /// Schema of every registered rule definition.
    pub fn rules_schema(&self) -> Value {
        group_schema(&self.registry, Role::Rule)
    }

    /// Rule-set document schema linking to the group schemas served under `base_url`.
    pub fn root_schema(&self, base_url: &str) -> Value {
        let base = base_url.trim_end_matches('/');
        root_schema(
            &format!("{}/matchers#/definitions/matchers", base),
            &format!("{}/rules#/definitions/rules", base),
            None,
        )
    }

    /// Self-contained rule-set schema with every definition inlined.
    pub fn merged_schema(&self) -> Value {
        merged_schema(&self.registry)
    }

    /// Every schema violation in a wire-form rule set.
    pub fn validate(&self, wire: &Value) -> Vec<String> {
        self.validator
            .iter_errors(wire)
            .map(|err| format!("{}: {}", err.instance_path, err))
            .collect()
    }

    pub fn check(&self, wire: &Value) -> Result<(), SchemaError> {
        let issues = self.validate(wire);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Invalid(issues))
        }
    }
}

fn title(role: Role) -> &'static str {
    match role {
        Role::Matcher => "JSON validation matchers schema",
        Role::Rule => "JSON validation rules schema",
    }
}

fn definition_schema(kind: &ComponentKind) -> Value {
    let mut required = vec![Value::String("id".to_string())];
    let mut properties = Map::new();
    properties.insert("id".to_string(), json!({ "type": "string", "const": kind.id }));

    for field in kind.fields {
        required.push(Value::String(field.name.to_string()));
        let mut property = Map::new();
        property.insert("description".to_string(), json!(field.description));
        if let Some(ty) = field.kind.json_type() {
            property.insert("type".to_string(), json!(ty));
        }
        properties.insert(field.name.to_string(), Value::Object(property));
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    if !kind.description.is_empty() {
        schema.insert("description".to_string(), json!(kind.description));
    }
    schema.insert("required".to_string(), Value::Array(required));
    schema.insert("properties".to_string(), Value::Object(properties));
    Value::Object(schema)
}

/// Definitions for one role, keyed by `key(id)`, plus the `oneOf` group alias.
fn definitions(registry: &ComponentRegistry, role: Role, key: impl Fn(&str) -> String) -> Map<String, Value> {
    let kinds = registry.kinds(role);
    let mut definitions = Map::new();
    let mut one_of = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let key = key(&kind.id);
        one_of.push(json!({ "$ref": format!("#/definitions/{}", key) }));
        definitions.insert(key, definition_schema(kind));
    }
    definitions.insert(
        role.wire_key().to_string(),
        json!({ "type": "object", "oneOf": one_of }),
    );
    definitions
}

fn group_schema(registry: &ComponentRegistry, role: Role) -> Value {
    json!({
        "$schema": DRAFT_07,
        "title": title(role),
        "definitions": definitions(registry, role, str::to_string),
    })
}

fn root_schema(matchers_ref: &str, rules_ref: &str, definitions: Option<Map<String, Value>>) -> Value {
    let mut schema = json!({
        "$schema": DRAFT_07,
        "title": "JSON validation rule set schema",
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": { "type": "string", "minLength": 1, "description": "Unique name of the rule set" },
            "description": { "type": "string", "description": "Human-readable purpose of the rule set" },
            "matchers": {
                "type": "array",
                "description": "Conditions that must all hold for the rules to apply",
                "items": { "$ref": matchers_ref }
            },
            "rules": {
                "type": "array",
                "description": "Checks applied in order once the rule set applies",
                "items": { "$ref": rules_ref }
            }
        }
    });
    if let (Some(definitions), Some(root)) = (definitions, schema.as_object_mut()) {
        root.insert("definitions".to_string(), Value::Object(definitions));
    }
    schema
}

/// Matcher and rule ids are separate namespaces, so inlined definitions are
/// qualified by their group to keep them apart.
fn merged_schema(registry: &ComponentRegistry) -> Value {
    let mut all = definitions(registry, Role::Matcher, |id| format!("matchers.{}", id));
    all.extend(definitions(registry, Role::Rule, |id| format!("rules.{}", id)));
    root_schema("#/definitions/matchers", "#/definitions/rules", Some(all))
}

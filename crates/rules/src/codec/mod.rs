//! Wire codec: rule sets to and from their JSON / YAML form.
//!
//! The wire form of a rule set is
//!
//! ```json
//! { "name": "...", "description": "...",
//!   "matchers": [ { "id": "<matcher id>", ...fields } ],
//!   "rules":    [ { "id": "<rule id>", ...fields } ] }
//! ```
//!
//! Decoding is two-pass: the envelope is read first with its entries untyped,
//! then each entry's `id` is resolved through the [`ComponentRegistry`] and the
//! remaining fields are converted into the registered shape.

mod error;


pub use error::{CodecError, Result};

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::registry::ComponentRegistry;
use crate::schema::{Definition, Role, RuleSet, RuleSetEnvelope};

/// Converts rule sets between the in-memory model and the wire format.
#[derive(Debug, Clone)]
pub struct RuleSetCodec {
    registry: Arc<ComponentRegistry>,
}

impl RuleSetCodec {
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Decode a wire-form JSON value.
    ///
    /// Any unresolvable or malformed entry aborts the whole decode.
    pub fn decode(&self, wire: Value) -> Result<RuleSet> {
        let envelope: RuleSetEnvelope = serde_json::from_value(wire)?;
        self.decode_envelope(envelope)
    }

    pub fn decode_str(&self, text: &str) -> Result<RuleSet> {
        let envelope: RuleSetEnvelope = serde_json::from_str(text)?;
        self.decode_envelope(envelope)
    }

    pub fn decode_yaml(&self, text: &str) -> Result<RuleSet> {
        let envelope: RuleSetEnvelope = serde_yaml::from_str(text)?;
        self.decode_envelope(envelope)
    }

    /// Second pass: resolve every entry of an already-read envelope.
    pub fn decode_envelope(&self, envelope: RuleSetEnvelope) -> Result<RuleSet> {
        let matchers = self.decode_entries(Role::Matcher, envelope.matchers)?;
        let rules = self.decode_entries(Role::Rule, envelope.rules)?;
        Ok(RuleSet {
            name: envelope.name,
            description: envelope.description,
            matchers,
            rules,
        })
    }

    fn decode_entries(&self, role: Role, entries: Vec<Map<String, Value>>) -> Result<Vec<Definition>> {
        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| self.decode_entry(role, index, entry))
            .collect()
    }

    fn decode_entry(&self, role: Role, index: usize, mut entry: Map<String, Value>) -> Result<Definition> {
        let id = match entry.remove("id") {
            Some(Value::String(id)) => id,
            _ => return Err(CodecError::MissingId { role, index }),
        };
        let kind = self
            .registry
            .resolve(role, &id)
            .map_err(|_| CodecError::UnknownDefinition {
                id: id.clone(),
                role,
            })?;
        kind.decode(Value::Object(entry))
            .map_err(|source| CodecError::InvalidDefinition { id, role, source })
    }

    /// Encode into the wire-form JSON value.
    pub fn encode(&self, rule_set: &RuleSet) -> Result<Value> {
        let mut wire = Map::new();
        wire.insert("name".to_string(), Value::String(rule_set.name.clone()));
        wire.insert(
            "description".to_string(),
            Value::String(rule_set.description.clone()),
        );
        for role in [Role::Matcher, Role::Rule] {
            let entries = rule_set
                .definitions(role)
                .iter()
                .map(|definition| self.encode_definition(role, definition))
                .collect::<Result<Vec<_>>>()?;
            wire.insert(role.wire_key().to_string(), Value::Array(entries));
        }
        Ok(Value::Object(wire))
    }

    pub fn encode_string(&self, rule_set: &RuleSet) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.encode(rule_set)?)?)
    }

    pub fn encode_yaml(&self, rule_set: &RuleSet) -> Result<String> {
        Ok(serde_yaml::to_string(&self.encode(rule_set)?)?)
    }

    fn encode_definition(&self, role: Role, definition: &Definition) -> Result<Value> {
        let shape = definition.shape();
        let id = self
            .registry
            .id_of(role, shape)
            .ok_or(CodecError::UnregisteredShape { shape, role })?;

        let mut entry = Map::new();
        entry.insert("id".to_string(), Value::String(id.to_string()));
        for (key, value) in definition.to_fields()? {
            if key != "id" {
                entry.insert(key, value);
            }
        }
        Ok(Value::Object(entry))
    }
}

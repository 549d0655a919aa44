//! Component registry: the string ids rule-set authors may reference.
//!
//! Every matcher and rule definition on the wire carries an `id`. The registry
//! maps that id, per [`Role`], to the concrete [`DefinitionShape`] it decodes
//! into, and back again for encoding. It is built once and read-only afterwards.

use std::collections::HashMap;

use serde_json::Value;

use crate::schema::{Definition, DefinitionShape, FieldSpec, Role, ShapeId};

/// Errors raised while building or querying the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No shape is registered under this id for the role.
    #[error("No {role} definition matches: {id}")]
    UnknownDefinition { id: String, role: Role },

    /// The same id was registered twice within one role.
    #[error("duplicate {role} id '{id}'")]
    DuplicateId { id: String, role: Role },

    /// The same shape was registered twice within one role.
    #[error("{role} shape {shape} is already registered as '{existing}'")]
    DuplicateShape {
        shape: ShapeId,
        role: Role,
        existing: String,
    },
}

type DecodeFn = fn(Value) -> serde_json::Result<Definition>;

/// A registered component kind: one id bound to one definition shape.
#[derive(Debug, Clone)]
pub struct ComponentKind {
    pub id: String,
    pub role: Role,
    pub shape: ShapeId,
    pub description: String,
    pub fields: &'static [FieldSpec],
    decode: DecodeFn,
}

impl ComponentKind {
    fn of<D: DefinitionShape>(role: Role, id: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            role,
            shape: ShapeId::of::<D>(),
            description: description.to_string(),
            fields: D::FIELDS,
            decode: decode_shape::<D>,
        }
    }

    /// Convert raw wire fields (without `id`) into this kind's shape.
    pub fn decode(&self, fields: Value) -> serde_json::Result<Definition> {
        (self.decode)(fields)
    }
}

fn decode_shape<D: DefinitionShape>(fields: Value) -> serde_json::Result<Definition> {
    serde_json::from_value::<D>(fields).map(Definition::new)
}

#[derive(Debug, Default)]
struct RoleTable {
    by_id: HashMap<String, ComponentKind>,
    by_shape: HashMap<ShapeId, String>,
}

impl RoleTable {
    fn insert(&mut self, kind: ComponentKind) -> Result<(), RegistryError> {
        if self.by_id.contains_key(&kind.id) {
            return Err(RegistryError::DuplicateId {
                id: kind.id,
                role: kind.role,
            });
        }
        if let Some(existing) = self.by_shape.get(&kind.shape) {
            return Err(RegistryError::DuplicateShape {
                shape: kind.shape,
                role: kind.role,
                existing: existing.clone(),
            });
        }
        self.by_shape.insert(kind.shape, kind.id.clone());
        self.by_id.insert(kind.id.clone(), kind);
        Ok(())
    }
}

/// Immutable id ↔ shape tables for matchers and rules.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    matchers: RoleTable,
    rules: RoleTable,
}

impl ComponentRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry holding only the built-in components.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for kind in crate::components::builtin_kinds() {
            // Built-in ids and shapes are distinct per role.
            let _ = registry.table_mut(kind.role).insert(kind);
        }
        registry
    }

    fn table(&self, role: Role) -> &RoleTable {
        match role {
            Role::Matcher => &self.matchers,
            Role::Rule => &self.rules,
        }
    }

    fn table_mut(&mut self, role: Role) -> &mut RoleTable {
        match role {
            Role::Matcher => &mut self.matchers,
            Role::Rule => &mut self.rules,
        }
    }

    /// Look up the kind registered under `id` for `role`.
    pub fn resolve(&self, role: Role, id: &str) -> Result<&ComponentKind, RegistryError> {
        self.table(role)
            .by_id
            .get(id)
            .ok_or_else(|| RegistryError::UnknownDefinition {
                id: id.to_string(),
                role,
            })
    }

    /// Reverse lookup: the id a shape is registered under for `role`.
    pub fn id_of(&self, role: Role, shape: ShapeId) -> Option<&str> {
        self.table(role).by_shape.get(&shape).map(String::as_str)
    }

    /// All kinds registered for `role`, sorted by id.
    pub fn kinds(&self, role: Role) -> Vec<&ComponentKind> {
        let mut kinds: Vec<_> = self.table(role).by_id.values().collect();
        kinds.sort_by(|a, b| a.id.cmp(&b.id));
        kinds
    }

    pub fn len(&self, role: Role) -> usize {
        self.table(role).by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.by_id.is_empty() && self.rules.by_id.is_empty()
    }
}

/// Explicit build step for a [`ComponentRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    kinds: Vec<ComponentKind>,
}

impl RegistryBuilder {
    /// Register `D` as a matcher definition under `id`.
    pub fn matcher<D: DefinitionShape>(mut self, id: &str, description: &str) -> Self {
        self.kinds.push(ComponentKind::of::<D>(Role::Matcher, id, description));
        self
    }

    /// Register `D` as a rule definition under `id`.
    pub fn rule<D: DefinitionShape>(mut self, id: &str, description: &str) -> Self {
        self.kinds.push(ComponentKind::of::<D>(Role::Rule, id, description));
        self
    }

    /// Add every built-in component in both roles.
    pub fn with_builtins(mut self) -> Self {
        self.kinds.extend(crate::components::builtin_kinds());
        self
    }

    pub(crate) fn into_kinds(self) -> Vec<ComponentKind> {
        self.kinds
    }

    pub fn build(self) -> Result<ComponentRegistry, RegistryError> {
        let mut registry = ComponentRegistry::default();
        for kind in self.kinds {
            registry.table_mut(kind.role).insert(kind)?;
        }
        Ok(registry)
    }
}

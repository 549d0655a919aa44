//! Typed definitions and their type-erased container.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::Serialize;
use serde_json::{Map, Value};

/// JSON type of a definition field, as advertised in generated schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Integer,
    Number,
    Array,
    Object,
    /// Any JSON value; no `type` constraint is emitted.
    Any,
}

impl FieldKind {
    pub fn json_type(&self) -> Option<&'static str> {
        match self {
            FieldKind::String => Some("string"),
            FieldKind::Boolean => Some("boolean"),
            FieldKind::Integer => Some("integer"),
            FieldKind::Number => Some("number"),
            FieldKind::Array => Some("array"),
            FieldKind::Object => Some("object"),
            FieldKind::Any => None,
        }
    }
}

/// Wire-level description of one definition field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name as it appears on the wire.
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

/// A definition shape: the parameters of one kind of matcher or rule.
///
/// Shapes are plain serde structs. Decoding is field-name driven, so shapes
/// usually carry `#[serde(default)]` to give missing fields their defaults.
pub trait DefinitionShape:
    Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// Fields advertised to rule-set authors through the generated JSON schema.
    const FIELDS: &'static [FieldSpec];
}

/// Runtime identity of a definition shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId {
    type_id: TypeId,
    type_name: &'static str,
}

impl ShapeId {
    pub fn of<D: DefinitionShape>() -> Self {
        Self {
            type_id: TypeId::of::<D>(),
            type_name: std::any::type_name::<D>(),
        }
    }

    /// Rust type name of the shape, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Object-safe view of a [`DefinitionShape`].
pub trait ErasedDefinition: Any + fmt::Debug + Send + Sync {
    fn shape(&self) -> ShapeId;
    fn as_any(&self) -> &dyn Any;
    /// Flatten the definition into its wire fields (without `id`).
    fn to_fields(&self) -> serde_json::Result<Map<String, Value>>;
    fn eq_erased(&self, other: &dyn ErasedDefinition) -> bool;
}

impl<D: DefinitionShape> ErasedDefinition for D {
    fn shape(&self) -> ShapeId {
        ShapeId::of::<D>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_fields(&self) -> serde_json::Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(serde_json::Error::custom(format!(
                "definition {} must serialize to an object, got {}",
                std::any::type_name::<D>(),
                other
            ))),
        }
    }

    fn eq_erased(&self, other: &dyn ErasedDefinition) -> bool {
        other
            .as_any()
            .downcast_ref::<D>()
            .is_some_and(|other| self == other)
    }
}

/// An immutable, shareable definition of any registered shape.
#[derive(Clone)]
pub struct Definition(Arc<dyn ErasedDefinition>);

impl Definition {
    pub fn new<D: DefinitionShape>(definition: D) -> Self {
        Self(Arc::new(definition))
    }

    pub fn shape(&self) -> ShapeId {
        self.0.shape()
    }

    /// True when the definition's concrete shape is `D`.
    pub fn is<D: DefinitionShape>(&self) -> bool {
        self.shape() == ShapeId::of::<D>()
    }

    /// Borrow the definition as its concrete shape.
    pub fn downcast_ref<D: DefinitionShape>(&self) -> Option<&D> {
        self.0.as_ref().as_any().downcast_ref::<D>()
    }

    pub fn to_fields(&self) -> serde_json::Result<Map<String, Value>> {
        self.0.to_fields()
    }
}

impl PartialEq for Definition {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_erased(other.0.as_ref())
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0.as_ref(), f)
    }
}

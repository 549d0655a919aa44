//! Matcher and validator plugin contracts.
//!
//! Plugins are bound to exactly one definition shape. The engine talks to them
//! through the object-safe [`Matcher`] and [`Validator`] traits; plugin authors
//! usually implement the typed [`TypedMatcher`] / [`TypedValidator`] instead,
//! or a single [`NativeComponent`] that provides both.

mod native;

pub use native::{NativeComponent, NativeMatcher, NativeValidator};

use jsonguard_core::JsonView;

use crate::schema::{Definition, DefinitionShape, ShapeId};

/// A check that did not hold, as reported by a validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    pub message: String,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of applying one validator definition.
pub type CheckResult = Result<(), Failure>;

/// A plugin was handed a definition of a shape it is not bound to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("plugin '{plugin}' expects {expected} definitions, got {found}")]
    UnsupportedDefinitionType {
        plugin: String,
        expected: ShapeId,
        found: ShapeId,
    },
}

impl DispatchError {
    fn unsupported(plugin: &str, expected: ShapeId, found: ShapeId) -> Self {
        DispatchError::UnsupportedDefinitionType {
            plugin: plugin.to_string(),
            expected,
            found,
        }
    }
}

/// Decides whether a rule set applies to a document.
pub trait Matcher: Send + Sync {
    /// Shape this matcher is bound to.
    fn shape(&self) -> ShapeId;

    fn name(&self) -> &str;

    fn accepts(&self, definition: &Definition) -> bool {
        definition.shape() == self.shape()
    }

    fn matches_definition(&self, definition: &Definition, doc: &JsonView) -> Result<bool, DispatchError>;
}

/// Checks a document against one definition.
pub trait Validator: Send + Sync {
    /// Shape this validator is bound to.
    fn shape(&self) -> ShapeId;

    fn name(&self) -> &str;

    fn accepts(&self, definition: &Definition) -> bool {
        definition.shape() == self.shape()
    }

    fn apply_definition(&self, definition: &Definition, doc: &JsonView) -> Result<CheckResult, DispatchError>;
}

/// Typed matcher over one definition shape.
pub trait TypedMatcher: Send + Sync {
    type Definition: DefinitionShape;

    fn name(&self) -> &str;

    fn matches(&self, definition: &Self::Definition, doc: &JsonView) -> bool;
}

/// Typed validator over one definition shape.
pub trait TypedValidator: Send + Sync {
    type Definition: DefinitionShape;

    fn name(&self) -> &str;

    fn apply(&self, definition: &Self::Definition, doc: &JsonView) -> CheckResult;
}

impl<T: TypedMatcher> Matcher for T {
    fn shape(&self) -> ShapeId {
        ShapeId::of::<T::Definition>()
    }

    fn name(&self) -> &str {
        TypedMatcher::name(self)
    }

    fn matches_definition(&self, definition: &Definition, doc: &JsonView) -> Result<bool, DispatchError> {
        let typed = definition
            .downcast_ref::<T::Definition>()
            .ok_or_else(|| {
                DispatchError::unsupported(TypedMatcher::name(self), Matcher::shape(self), definition.shape())
            })?;
        Ok(self.matches(typed, doc))
    }
}

impl<T: TypedValidator> Validator for T {
    fn shape(&self) -> ShapeId {
        ShapeId::of::<T::Definition>()
    }

    fn name(&self) -> &str {
        TypedValidator::name(self)
    }

    fn apply_definition(&self, definition: &Definition, doc: &JsonView) -> Result<CheckResult, DispatchError> {
        let typed = definition
            .downcast_ref::<T::Definition>()
            .ok_or_else(|| {
                DispatchError::unsupported(TypedValidator::name(self), Validator::shape(self), definition.shape())
            })?;
        Ok(self.apply(typed, doc))
    }
}

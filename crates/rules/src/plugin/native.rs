//! Native components: one predicate serving as both matcher and validator.

use std::sync::Arc;

use jsonguard_core::JsonView;

use super::{CheckResult, Failure, TypedMatcher, TypedValidator};
use crate::schema::DefinitionShape;

/// A predicate plus a failure message over one definition shape.
///
/// As a matcher, the rule set applies when the predicate holds. As a
/// validator, the check fails with [`failure_message`](Self::failure_message)
/// when it does not.
pub trait NativeComponent: Send + Sync + 'static {
    type Definition: DefinitionShape;

    fn name(&self) -> &str;

    fn matches(&self, definition: &Self::Definition, doc: &JsonView) -> bool;

    fn failure_message(&self, definition: &Self::Definition, doc: &JsonView) -> String;

    fn apply(&self, definition: &Self::Definition, doc: &JsonView) -> CheckResult {
        if self.matches(definition, doc) {
            Ok(())
        } else {
            Err(Failure::new(self.failure_message(definition, doc)))
        }
    }

    /// Split into an independently registrable matcher and validator.
    fn split(self) -> (NativeMatcher<Self>, NativeValidator<Self>)
    where
        Self: Sized,
    {
        let shared = Arc::new(self);
        (NativeMatcher(Arc::clone(&shared)), NativeValidator(shared))
    }
}

/// Matcher half of a [`NativeComponent`].
pub struct NativeMatcher<C>(Arc<C>);

/// Validator half of a [`NativeComponent`].
pub struct NativeValidator<C>(Arc<C>);

impl<C: NativeComponent> TypedMatcher for NativeMatcher<C> {
    type Definition = C::Definition;

    fn name(&self) -> &str {
        self.0.name()
    }

    fn matches(&self, definition: &C::Definition, doc: &JsonView) -> bool {
        self.0.matches(definition, doc)
    }
}

impl<C: NativeComponent> TypedValidator for NativeValidator<C> {
    type Definition = C::Definition;

    fn name(&self) -> &str {
        self.0.name()
    }

    fn apply(&self, definition: &C::Definition, doc: &JsonView) -> CheckResult {
        self.0.apply(definition, doc)
    }
}

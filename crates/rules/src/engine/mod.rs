//! Rule-set engine: evaluates documents against every active rule set.
//!
//! For each rule set, in insertion order:
//! 1. every matcher definition must be accepted by every matcher plugin bound
//!    to its shape (no matchers means the set applies);
//! 2. every rule definition is applied by every validator plugin bound to its
//!    shape, in registration order, and the first failure ends the set.
//!
//! Plugin tables are built once by [`EngineBuilder`]. The active rule sets are a
//! copy-on-write snapshot, so an evaluation sees either the state before or
//! after a concurrent mutation, never a mix.

mod error;


pub use error::{EngineError, Result};

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use jsonguard_core::JsonView;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::plugin::{Matcher, NativeComponent, Validator};
use crate::schema::{Definition, Role, RuleSet, ShapeId};

/// A failed check, attributed to the rule set it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub message: String,
    pub rule_set: Arc<RuleSet>,
}

/// Outcome of evaluating one document.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Passed,
    Rejected(Violation),
}

impl Verdict {
    pub fn is_passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }

    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Verdict::Passed => None,
            Verdict::Rejected(violation) => Some(violation),
        }
    }
}

type Snapshot = Arc<Vec<Arc<RuleSet>>>;

/// Holds the registered plugins and the active rule sets.
pub struct RuleSetEngine {
    matchers: HashMap<ShapeId, Vec<Arc<dyn Matcher>>>,
    validators: HashMap<ShapeId, Vec<Arc<dyn Validator>>>,
    rule_sets: RwLock<Snapshot>,
}

impl RuleSetEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Engine with the built-in components registered and no rule sets.
    pub fn builtin() -> Self {
        crate::components::register_builtins(Self::builder()).build()
    }

    /// Evaluate a document, stopping at the first violation.
    pub fn evaluate(&self, doc: &JsonView) -> Result<Verdict> {
        match self.violations(doc).next() {
            None => Ok(Verdict::Passed),
            Some(Ok(violation)) => Ok(Verdict::Rejected(violation)),
            Some(Err(e)) => Err(e),
        }
    }

    /// Evaluate a raw JSON tree.
    pub fn evaluate_value(&self, value: Value) -> Result<Verdict> {
        self.evaluate(&JsonView::from_tree(value))
    }

    /// Lazily yield the first violation of every applicable rule set.
    ///
    /// The snapshot of active rule sets is taken when this is called.
    pub fn violations<'a>(&'a self, doc: &'a JsonView) -> impl Iterator<Item = Result<Violation>> + 'a {
        self.rule_sets()
            .into_iter()
            .filter_map(move |rule_set| self.check(&rule_set, doc).transpose())
    }

    fn check(&self, rule_set: &Arc<RuleSet>, doc: &JsonView) -> Result<Option<Violation>> {
        if !self.applies(rule_set, doc)? {
            debug!(rule_set = %rule_set.name, "rule set does not apply");
            return Ok(None);
        }

        for definition in &rule_set.rules {
            for validator in plugins_for(&self.validators, Role::Rule, definition)? {
                let outcome = validator
                    .apply_definition(definition, doc)
                    .inspect_err(|e| error!(rule_set = %rule_set.name, error = %e, "validator dispatch failed"))?;
                if let Err(failure) = outcome {
                    debug!(rule_set = %rule_set.name, validator = validator.name(), message = %failure.message, "violation");
                    return Ok(Some(Violation {
                        message: failure.message,
                        rule_set: Arc::clone(rule_set),
                    }));
                }
            }
        }
        Ok(None)
    }

    fn applies(&self, rule_set: &RuleSet, doc: &JsonView) -> Result<bool> {
        for definition in &rule_set.matchers {
            for matcher in plugins_for(&self.matchers, Role::Matcher, definition)? {
                let matched = matcher
                    .matches_definition(definition, doc)
                    .inspect_err(|e| error!(rule_set = %rule_set.name, error = %e, "matcher dispatch failed"))?;
                if !matched {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.rule_sets.read().expect("rule_sets lock poisoned"))
    }

    /// Currently active rule sets, in evaluation order.
    pub fn rule_sets(&self) -> Vec<Arc<RuleSet>> {
        self.snapshot().as_ref().clone()
    }

    pub fn get_rule_set(&self, name: &str) -> Option<Arc<RuleSet>> {
        self.snapshot().iter().find(|rs| rs.name == name).cloned()
    }

    /// Append a rule set to the end of the evaluation order.
    pub fn add_rule_set(&self, rule_set: RuleSet) {
        let mut guard = self.rule_sets.write().expect("rule_sets lock poisoned");
        let mut next = guard.as_ref().clone();
        info!(rule_set = %rule_set.name, matchers = rule_set.matchers.len(), rules = rule_set.rules.len(), "added rule set");
        next.push(Arc::new(rule_set));
        *guard = Arc::new(next);
    }

    /// Remove every rule set with the given name.
    pub fn remove_rule_set(&self, name: &str) -> Result<()> {
        let mut guard = self.rule_sets.write().expect("rule_sets lock poisoned");
        if !guard.iter().any(|rs| rs.name == name) {
            return Err(EngineError::MissingRuleSet(name.to_string()));
        }
        let next: Vec<_> = guard.iter().filter(|rs| rs.name != name).cloned().collect();
        *guard = Arc::new(next);
        info!(rule_set = %name, "removed rule set");
        Ok(())
    }

    /// Remove any same-named rule set and append this one, as one step.
    pub fn replace_rule_set(&self, rule_set: RuleSet) {
        let mut guard = self.rule_sets.write().expect("rule_sets lock poisoned");
        let mut next: Vec<_> = guard
            .iter()
            .filter(|rs| rs.name != rule_set.name)
            .cloned()
            .collect();
        let replaced = next.len() != guard.len();
        info!(rule_set = %rule_set.name, replaced, "replaced rule set");
        next.push(Arc::new(rule_set));
        *guard = Arc::new(next);
    }

    /// Drop every active rule set.
    pub fn clear(&self) {
        *self.rule_sets.write().expect("rule_sets lock poisoned") = Arc::new(Vec::new());
    }
}

fn plugins_for<'a, P: ?Sized>(
    table: &'a HashMap<ShapeId, Vec<Arc<P>>>,
    role: Role,
    definition: &Definition,
) -> Result<&'a [Arc<P>]> {
    let shape = definition.shape();
    match table.get(&shape) {
        Some(plugins) if !plugins.is_empty() => Ok(plugins),
        _ => {
            error!(%role, %shape, "no plugin registered for shape");
            Err(EngineError::NoPluginForShape { role, shape })
        }
    }
}

/// Collects plugins and builds the immutable dispatch tables.
#[derive(Default)]
pub struct EngineBuilder {
    matchers: Vec<Arc<dyn Matcher>>,
    validators: Vec<Arc<dyn Validator>>,
    rule_sets: Vec<RuleSet>,
}

impl EngineBuilder {
    pub fn matcher(mut self, matcher: impl Matcher + 'static) -> Self {
        self.matchers.push(Arc::new(matcher));
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Register both halves of a native component.
    pub fn native<C: NativeComponent>(self, component: C) -> Self {
        let (matcher, validator) = component.split();
        self.matcher(matcher).validator(validator)
    }

    /// Rule sets active from the start, in evaluation order.
    pub fn rule_set(mut self, rule_set: RuleSet) -> Self {
        self.rule_sets.push(rule_set);
        self
    }

    pub fn build(self) -> RuleSetEngine {
        let mut matchers: HashMap<ShapeId, Vec<Arc<dyn Matcher>>> = HashMap::new();
        for matcher in self.matchers {
            matchers.entry(matcher.shape()).or_default().push(matcher);
        }
        let mut validators: HashMap<ShapeId, Vec<Arc<dyn Validator>>> = HashMap::new();
        for validator in self.validators {
            validators.entry(validator.shape()).or_default().push(validator);
        }
        let rule_sets = self.rule_sets.into_iter().map(Arc::new).collect();

        RuleSetEngine {
            matchers,
            validators,
            rule_sets: RwLock::new(Arc::new(rule_sets)),
        }
    }
}

//! Lazily converted, memoizing view over one JSON document.

use std::cell::OnceCell;

use serde_json::{Map, Value};

/// One logical JSON document exposed as tree, mapping and text.
///
/// A view is built from either the tree form or the mapping form. The other
/// representations are derived on first use and cached, so evaluating the same
/// document against many rule sets converts it at most once per form.
///
/// Caches are per instance and not thread-safe; build one view per document.
#[derive(Debug, Clone)]
pub struct JsonView {
    tree: OnceCell<Value>,
    map: OnceCell<Option<Map<String, Value>>>,
    text: OnceCell<String>,
}

impl JsonView {
    /// Wrap a parsed JSON tree.
    pub fn from_tree(tree: Value) -> Self {
        Self {
            tree: OnceCell::from(tree),
            map: OnceCell::new(),
            text: OnceCell::new(),
        }
    }

    /// Wrap a key-value mapping (a JSON object).
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self {
            tree: OnceCell::new(),
            map: OnceCell::from(Some(map)),
            text: OnceCell::new(),
        }
    }

    /// Parse JSON text into a tree-backed view.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text).map(Self::from_tree)
    }

    /// Parse JSON bytes into a tree-backed view.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes).map(Self::from_tree)
    }

    /// The tree form, derived from the mapping form on first call.
    pub fn as_tree(&self) -> &Value {
        self.tree.get_or_init(|| {
            let map = self.map.get().and_then(Option::clone).unwrap_or_default();
            Value::Object(map)
        })
    }

    /// The mapping form, or `None` when the root is not an object.
    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        self.map
            .get_or_init(|| match self.tree.get() {
                Some(Value::Object(map)) => Some(map.clone()),
                _ => None,
            })
            .as_ref()
    }

    /// Compact JSON text, rendered once from whichever form the view was built from.
    pub fn as_text(&self) -> &str {
        self.text.get_or_init(|| match (self.tree.get(), self.map.get()) {
            (Some(tree), _) => tree.to_string(),
            // A map of JSON values always serializes.
            (None, Some(Some(map))) => serde_json::to_string(map).unwrap_or_default(),
            (None, _) => Value::Null.to_string(),
        })
    }

    /// Consume the view, returning the tree form.
    pub fn into_tree(self) -> Value {
        let JsonView { tree, map, .. } = self;
        match tree.into_inner() {
            Some(tree) => tree,
            None => Value::Object(map.into_inner().flatten().unwrap_or_default()),
        }
    }
}

impl From<Value> for JsonView {
    fn from(tree: Value) -> Self {
        Self::from_tree(tree)
    }
}

impl From<Map<String, Value>> for JsonView {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_map(map)
    }
}

//! Integration tests that load every example rule set in
//! `data/rulesets/examples/` and evaluate documents against them.

use std::sync::Arc;

use jsonguard_core::JsonPath;
use jsonguard_rules::components::{FieldEquals, FieldNotEmpty, FieldNotEquals};
use jsonguard_rules::store::LoadStatus;
use jsonguard_rules::{
    ComponentRegistry, FileRuleSetStore, RuleSet, RuleSetCodec, RuleSetEngine, RuleSetStore,
    SchemaGenerator,
};
use serde_json::json;

/// Resolve the examples directory relative to the workspace root.
/// Integration tests run from the crate directory, so we go up two levels.
fn examples_dir() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/rulesets/examples")
}

fn codec() -> RuleSetCodec {
    RuleSetCodec::new(Arc::new(ComponentRegistry::builtin()))
}

fn load(filename: &str) -> RuleSet {
    let path = examples_dir().join(filename);
    let yaml = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    codec()
        .decode_yaml(&yaml)
        .unwrap_or_else(|e| panic!("Failed to decode {}: {}", path.display(), e))
}

fn path(raw: &str) -> JsonPath {
    JsonPath::parse(raw).unwrap()
}

fn engine() -> RuleSetEngine {
    let codec = codec();
    // Copy through a temp dir so the store never writes into the repo.
    let tmp = tempfile::TempDir::new().unwrap();
    for entry in std::fs::read_dir(examples_dir()).unwrap() {
        let entry = entry.unwrap();
        std::fs::copy(entry.path(), tmp.path().join(entry.file_name())).unwrap();
    }
    let (store, results) = FileRuleSetStore::open(tmp.path(), codec).unwrap();
    assert!(results
        .iter()
        .all(|r| matches!(r.status, LoadStatus::Loaded { .. })));

    let engine = RuleSetEngine::builtin();
    for rule_set in store.get_all().unwrap() {
        engine.add_rule_set(rule_set);
    }
    engine
}

// ── active-accounts.yml ─────────────────────────────────────

#[test]
fn parse_active_accounts_example() {
    let rs = load("active-accounts.yml");
    assert_eq!(rs.name, "active-accounts");
    assert_eq!(
        rs.matchers[0].downcast_ref::<FieldEquals>(),
        Some(&FieldEquals::new(path("$.type"), "account"))
    );
    assert_eq!(
        rs.rules[0].downcast_ref::<FieldEquals>(),
        Some(&FieldEquals::new(path("$.status"), "active"))
    );
}

// ── order-intake.yml ────────────────────────────────────────

#[test]
fn parse_order_intake_example() {
    let rs = load("order-intake.yml");
    assert_eq!(rs.matchers.len(), 2);
    assert_eq!(rs.rules.len(), 3);
    assert_eq!(
        rs.matchers[1].downcast_ref::<FieldNotEmpty>(),
        Some(&FieldNotEmpty::new(path("$.customer.id")))
    );
    assert_eq!(
        rs.rules[1].downcast_ref::<FieldNotEquals>(),
        Some(&FieldNotEquals::new(path("$.status"), "cancelled"))
    );
    assert!(rs.rules[2].is::<FieldNotEmpty>());
}

// ── named-payloads.yml ──────────────────────────────────────

#[test]
fn parse_named_payloads_example() {
    let rs = load("named-payloads.yml");
    assert!(rs.matchers.is_empty());
    assert_eq!(rs.rules.len(), 1);
}

// ── all examples ────────────────────────────────────────────

#[test]
fn every_example_satisfies_the_schema() {
    let generator = SchemaGenerator::new(Arc::new(ComponentRegistry::builtin())).unwrap();
    for entry in std::fs::read_dir(examples_dir()).unwrap() {
        let path = entry.unwrap().path();
        let text = std::fs::read_to_string(&path).unwrap();
        let wire: serde_json::Value = serde_yaml::from_str(&text).unwrap();
        let issues = generator.validate(&wire);
        assert!(issues.is_empty(), "{}: {:?}", path.display(), issues);
    }
}

#[test]
fn examples_round_trip_through_the_codec() {
    let codec = codec();
    for file in ["active-accounts.yml", "order-intake.yml", "named-payloads.yml"] {
        let rs = load(file);
        let yaml = codec.encode_yaml(&rs).unwrap();
        assert_eq!(codec.decode_yaml(&yaml).unwrap(), rs, "{}", file);
    }
}

#[test]
fn complete_order_passes() {
    let verdict = engine()
        .evaluate_value(json!({
            "type": "order",
            "name": "order-1",
            "customer": { "id": "c-7" },
            "items": [ { "sku": "x1", "qty": 2 } ],
            "status": "new",
            "total": 12.5
        }))
        .unwrap();
    assert!(verdict.is_passed());
}

#[test]
fn cancelled_order_is_rejected_by_order_intake() {
    let verdict = engine()
        .evaluate_value(json!({
            "type": "order",
            "name": "order-2",
            "customer": { "id": "c-7" },
            "items": [ { "sku": "x1" } ],
            "status": "cancelled",
            "total": 1
        }))
        .unwrap();
    let violation = verdict.violation().unwrap();
    assert_eq!(violation.rule_set.name, "order-intake");
    assert_eq!(violation.message, "Value of $.status must not be `cancelled`");
}

#[test]
fn unnamed_inactive_account_reports_both_rule_sets() {
    let engine = engine();
    let doc = jsonguard_core::JsonView::from_tree(json!({ "type": "account", "status": "closed" }));

    let names: Vec<String> = engine
        .violations(&doc)
        .map(|v| v.unwrap().rule_set.name.clone())
        .collect();
    assert_eq!(names, vec!["active-accounts", "named-payloads"]);
}

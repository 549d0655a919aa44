//! HTTP contract tests driven through the router with `oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::routing::post;
use axum::Router;
use http_body_util::BodyExt as _;
use serde_json::{json, Value};
use tower::ServiceExt; // for Router::oneshot

use jsonguard_core::config::{StoreBackend, ValidationConfig};
use jsonguard_core::Config;
use jsonguard_rules::{ComponentRegistry, InMemoryRuleSetStore};
use jsonguard_server::{build_router, json_guard, AppState, JsonGuard};

fn state() -> Arc<AppState> {
    Arc::new(
        AppState::new(
            ValidationConfig::default(),
            "*".to_string(),
            Arc::new(ComponentRegistry::builtin()),
            Arc::new(InMemoryRuleSetStore::new()),
        )
        .unwrap(),
    )
}

fn app() -> (Router, Arc<AppState>) {
    let state = state();
    (build_router(Arc::clone(&state)), state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn active_only() -> Value {
    json!({
        "name": "active-only",
        "description": "Only active accounts",
        "matchers": [ { "id": "field-equals-matcher", "jsonPath": "$.type", "value": "account" } ],
        "rules": [ { "id": "field-equals-rule", "jsonPath": "$.status", "value": "active" } ]
    })
}

// ── Rule-set management ─────────────────────────────────────────────

#[tokio::test]
async fn create_list_get_delete_round_trip() {
    let (app, _) = app();

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/jsonvalidation", active_only()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let all = body_json(resp).await;
    assert_eq!(all.as_array().map(Vec::len), Some(1));
    assert_eq!(all[0]["rules"][0]["id"], json!("field-equals-rule"));

    let resp = app.clone().oneshot(get("/jsonvalidation")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await[0]["name"], json!("active-only"));

    let resp = app.clone().oneshot(get("/jsonvalidation/active-only")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["description"], json!("Only active accounts"));

    let req = Request::builder()
        .method("DELETE")
        .uri("/jsonvalidation/active-only")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.clone().oneshot(get("/jsonvalidation/active-only")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_rule_set_is_not_found() {
    let (app, _) = app();
    let req = Request::builder()
        .method("DELETE")
        .uri("/jsonvalidation/ghost")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.oneshot(req).await.unwrap().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn schema_violations_are_bad_requests() {
    let (app, _) = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/jsonvalidation",
            json!({ "name": "x", "rules": [ { "id": "does-not-exist" } ] }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(!body["details"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_path_is_a_bad_request() {
    let (app, state) = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/jsonvalidation",
            json!({ "name": "x", "rules": [ { "id": "field-not-empty-rule", "jsonPath": "$.a[" } ] }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(state.engine().rule_sets().is_empty());
}

#[tokio::test]
async fn names_shadowed_by_static_routes_are_rejected() {
    let (app, state) = app();
    for name in ["schema", "evaluate"] {
        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/jsonvalidation",
                json!({ "name": name, "rules": [ { "id": "field-not-empty-rule", "jsonPath": "$.a" } ] }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"]
            .as_str()
            .unwrap()
            .contains("reserved"));
    }
    assert!(state.engine().rule_sets().is_empty());
}

// ── Schemas ─────────────────────────────────────────────────────────

#[tokio::test]
async fn schema_endpoints_serve_generated_schemas() {
    let (app, _) = app();

    let req = Request::builder()
        .uri("/jsonvalidation/schema")
        .header("host", "guard.local")
        .header("x-forwarded-proto", "https")
        .body(Body::empty())
        .unwrap();
    let root = body_json(app.clone().oneshot(req).await.unwrap()).await;
    assert_eq!(
        root["properties"]["rules"]["items"]["$ref"],
        json!("https://guard.local/jsonvalidation/schema/rules#/definitions/rules")
    );

    let matchers = body_json(app.clone().oneshot(get("/jsonvalidation/schema/matchers")).await.unwrap()).await;
    assert_eq!(matchers["title"], json!("JSON validation matchers schema"));

    let rules = body_json(app.oneshot(get("/jsonvalidation/schema/rules")).await.unwrap()).await;
    assert!(rules["definitions"]["field-not-empty-rule"].is_object());
}

// ── Guard ───────────────────────────────────────────────────────────

#[tokio::test]
async fn guard_rejects_violating_documents_with_rule_set_context() {
    let (app, _) = app();
    app.clone()
        .oneshot(json_request("POST", "/jsonvalidation", active_only()))
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/jsonvalidation/evaluate",
            json!({ "type": "account", "status": "inactive" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = body_json(resp).await;
    assert_eq!(
        body["ruleSet"],
        json!({ "name": "active-only", "description": "Only active accounts" })
    );
    assert_eq!(
        body["message"],
        json!("Value of $.status must be `active`, but is `inactive`")
    );

    let resp = app
        .oneshot(json_request(
            "POST",
            "/jsonvalidation/evaluate",
            json!({ "type": "account", "status": "active" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "valid": true }));
}

#[tokio::test]
async fn evaluate_refuses_bodies_the_guard_cannot_check() {
    let (app, _) = app();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/jsonvalidation",
            json!({ "name": "named", "rules": [ { "id": "field-not-empty-rule", "jsonPath": "$.name" } ] }),
        ))
        .await
        .unwrap();

    let req = Request::builder()
        .method("POST")
        .uri("/jsonvalidation/evaluate")
        .header("content-type", "text/plain")
        .body(Body::from("{}"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let req = Request::builder()
        .method("POST")
        .uri("/jsonvalidation/evaluate")
        .header("content-type", "application/problem+json")
        .body(Body::from("{}"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn guard_rejects_invalid_json() {
    let (app, _) = app();
    let req = Request::builder()
        .method("POST")
        .uri("/jsonvalidation/evaluate")
        .header("content-type", "application/json; charset=utf-8")
        .body(Body::from("{not json"))
        .unwrap();
    assert_eq!(app.oneshot(req).await.unwrap().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn guard_ignores_non_json_requests() {
    let state = state();
    let guard = JsonGuard::new(Arc::clone(state.engine()), 1024);
    let app: Router = Router::new()
        .route("/orders", post(|body: String| async move { body }))
        .route_layer(from_fn_with_state(guard, json_guard));

    // Would fail "named" if it were evaluated.
    state.service.create(
        state
            .codec
            .decode(json!({ "name": "named", "rules": [ { "id": "field-not-empty-rule", "jsonPath": "$.name" } ] }))
            .unwrap(),
    )
    .unwrap();

    let req = Request::builder()
        .method("POST")
        .uri("/orders")
        .header("content-type", "text/plain")
        .body(Body::from("plain"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/orders", json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Passing bodies reach the handler intact.
    let resp = app
        .oneshot(json_request("POST", "/orders", json!({ "name": "ok" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], br#"{"name":"ok"}"#);
}

#[tokio::test]
async fn guard_enforces_body_limit() {
    let state = state();
    let app: Router = Router::new()
        .route("/orders", post(|| async { "ok" }))
        .route_layer(from_fn_with_state(
            JsonGuard::new(Arc::clone(state.engine()), 8),
            json_guard,
        ));
    let resp = app
        .oneshot(json_request("POST", "/orders", json!({ "name": "far too long" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// ── Configuration ───────────────────────────────────────────────────

#[tokio::test]
async fn endpoint_can_be_disabled_or_moved() {
    let moved = ValidationConfig {
        endpoint: "/guard".to_string(),
        ..ValidationConfig::default()
    };
    let state = Arc::new(
        AppState::new(
            moved,
            "*".to_string(),
            Arc::new(ComponentRegistry::builtin()),
            Arc::new(InMemoryRuleSetStore::new()),
        )
        .unwrap(),
    );
    let app = build_router(state);
    assert_eq!(app.clone().oneshot(get("/guard")).await.unwrap().status(), StatusCode::OK);
    assert_eq!(
        app.oneshot(get("/jsonvalidation")).await.unwrap().status(),
        StatusCode::NOT_FOUND
    );

    let disabled = ValidationConfig {
        enable_endpoint: false,
        ..ValidationConfig::default()
    };
    let state = Arc::new(
        AppState::new(
            disabled,
            "*".to_string(),
            Arc::new(ComponentRegistry::builtin()),
            Arc::new(InMemoryRuleSetStore::new()),
        )
        .unwrap(),
    );
    let app = build_router(state);
    assert_eq!(
        app.clone().oneshot(get("/jsonvalidation")).await.unwrap().status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.oneshot(get("/health")).await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn file_backed_state_restores_rule_sets() {
    let tmp = tempfile::TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("named.yml"),
        "name: named\nrules:\n  - id: field-not-empty-rule\n    jsonPath: $.name\n",
    )
    .unwrap();

    let mut config = Config::for_profile("");
    config.validation.store = StoreBackend::File;
    config.validation.rules_dir = tmp.path().to_path_buf();

    let state = Arc::new(AppState::from_config(&config).unwrap());
    assert_eq!(state.engine().rule_sets().len(), 1);

    let app = build_router(state);
    let resp = app
        .oneshot(json_request(
            "POST",
            &format!("{}/evaluate", config.validation.endpoint),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

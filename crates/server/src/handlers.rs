//! Axum handlers for rule-set management, schemas and health.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};

use jsonguard_rules::RuleSet;

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Names that collide with the static routes under the endpoint base.
const RESERVED_NAMES: &[&str] = &["schema", "evaluate"];

fn encode_all(state: &AppState, rule_sets: &[RuleSet]) -> ApiResult<Json<Vec<Value>>> {
    let wire = rule_sets
        .iter()
        .map(|rs| state.codec.encode(rs))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(wire))
}

// ── Health ──────────────────────────────────────────────────────────

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "rule_sets": state.engine().rule_sets().len(),
    }))
}

// ── Rule sets ───────────────────────────────────────────────────────

/// List every stored rule set in wire form.
pub async fn list_rule_sets(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Value>>> {
    let all = state.service.get_all()?;
    encode_all(&state, &all)
}

/// Validate, decode and store a rule set; responds with every stored rule set.
pub async fn create_rule_set(
    State(state): State<Arc<AppState>>,
    Json(wire): Json<Value>,
) -> ApiResult<(StatusCode, Json<Vec<Value>>)> {
    state.schema.check(&wire)?;
    let rule_set = state.codec.decode(wire)?;
    if RESERVED_NAMES.contains(&rule_set.name.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "rule set name '{}' is reserved",
            rule_set.name
        )));
    }
    state.service.create(rule_set)?;
    let all = state.service.get_all()?;
    Ok((StatusCode::CREATED, encode_all(&state, &all)?))
}

pub async fn get_rule_set(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    let rule_set = state.service.get(&name)?;
    Ok(Json(state.codec.encode(&rule_set)?))
}

pub async fn delete_rule_set(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    state.service.remove(&name)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Dry run: only reached when the guard let the body through. Non-JSON
/// bodies bypass the guard, so they are refused here with `415`.
pub async fn evaluate(Json(_document): Json<Value>) -> Json<Value> {
    Json(json!({ "valid": true }))
}

// ── Schemas ─────────────────────────────────────────────────────────

/// Public URL of this request's schema endpoint, honouring reverse-proxy headers.
fn schema_url(headers: &HeaderMap, base: &str) -> String {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    let proto = header_str("x-forwarded-proto").unwrap_or("http");
    let host = header_str("x-forwarded-host")
        .or_else(|| header_str(header::HOST.as_str()))
        .unwrap_or("localhost");
    let prefix = header_str("x-forwarded-prefix")
        .unwrap_or("")
        .trim_end_matches('/');
    format!("{}://{}{}{}/schema", proto, host, prefix, base)
}

pub async fn root_schema(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<Value> {
    let url = schema_url(&headers, &state.validation.endpoint);
    Json(state.schema.root_schema(&url))
}

pub async fn matchers_schema(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.schema.matchers_schema())
}

pub async fn rules_schema(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.schema.rules_schema())
}

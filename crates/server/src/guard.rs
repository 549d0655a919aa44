//! Request guard: evaluates JSON bodies against the active rule sets.
//!
//! Applies to `POST`, `PUT` and `PATCH` requests with an `application/json`
//! content type. The body is buffered, evaluated and, when it passes, handed
//! on unchanged. A violation short-circuits with `403`:
//!
//! ```json
//! { "ruleSet": { "name": "...", "description": "..." }, "message": "..." }
//! ```
//!
//! Attach it to any router with
//! `route_layer(axum::middleware::from_fn_with_state(guard, json_guard))`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http_body_util::LengthLimitError;
use serde::Serialize;
use tracing::debug;

use jsonguard_core::JsonView;
use jsonguard_rules::{RuleSetEngine, Verdict, Violation};

use crate::error::ApiError;

/// Middleware state: the engine to evaluate against and the body limit.
#[derive(Clone)]
pub struct JsonGuard {
    engine: Arc<RuleSetEngine>,
    max_body_bytes: usize,
}

impl JsonGuard {
    pub fn new(engine: Arc<RuleSetEngine>, max_body_bytes: usize) -> Self {
        Self {
            engine,
            max_body_bytes,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RejectionBody<'a> {
    rule_set: RuleSetRef<'a>,
    message: &'a str,
}

#[derive(Serialize)]
struct RuleSetRef<'a> {
    name: &'a str,
    description: &'a str,
}

fn rejection(violation: &Violation) -> Response {
    let body = RejectionBody {
        rule_set: RuleSetRef {
            name: &violation.rule_set.name,
            description: &violation.rule_set.description,
        },
        message: &violation.message,
    };
    (StatusCode::FORBIDDEN, Json(body)).into_response()
}

fn is_guarded(request: &Request) -> bool {
    let method = request.method();
    if method != Method::POST && method != Method::PUT && method != Method::PATCH {
        return false;
    }
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| is_json_mime(mime.trim()))
        .unwrap_or(false)
}

/// `application/json` or any `application/*+json` type, as axum's `Json` accepts.
fn is_json_mime(mime: &str) -> bool {
    let mime = mime.to_ascii_lowercase();
    mime == "application/json"
        || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// True when buffering failed because the body exceeded the limit.
fn exceeds_limit(error: axum::Error) -> bool {
    let inner = error.into_inner();
    let root: &(dyn std::error::Error + 'static) = &*inner;
    let mut current = Some(root);
    while let Some(err) = current {
        if err.is::<LengthLimitError>() {
            return true;
        }
        current = err.source();
    }
    false
}

pub async fn json_guard(State(guard): State<JsonGuard>, request: Request, next: Next) -> Response {
    if !is_guarded(&request) {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, guard.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let message = format!("failed to buffer request body: {}", e);
            return if exceeds_limit(e) {
                ApiError::PayloadTooLarge(message).into_response()
            } else {
                ApiError::BadRequest(message).into_response()
            };
        }
    };

    let verdict = match JsonView::from_slice(&bytes) {
        Ok(doc) => guard.engine.evaluate(&doc),
        Err(e) => return ApiError::BadRequest(format!("invalid JSON body: {}", e)).into_response(),
    };

    match verdict {
        Ok(Verdict::Passed) => next.run(Request::from_parts(parts, Body::from(bytes))).await,
        Ok(Verdict::Rejected(violation)) => {
            debug!(uri = %parts.uri, rule_set = %violation.rule_set.name, "request rejected");
            rejection(&violation)
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

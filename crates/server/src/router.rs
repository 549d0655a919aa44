//! HTTP router construction.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::guard::json_guard;
use crate::handlers;
use crate::state::AppState;

fn cors_layer(origin: &str) -> CorsLayer {
    if origin.trim() == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(e) => {
            warn!(origin, error = %e, "invalid CORS origin, allowing any");
            CorsLayer::permissive()
        }
    }
}

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut app = Router::new().route("/health", get(handlers::health));

    if state.validation.enable_endpoint {
        let base = state.validation.endpoint.as_str();
        info!(base, "mounting rule set endpoint");
        app = app
            .route(
                base,
                get(handlers::list_rule_sets).post(handlers::create_rule_set),
            )
            .route(&format!("{}/schema", base), get(handlers::root_schema))
            .route(
                &format!("{}/schema/matchers", base),
                get(handlers::matchers_schema),
            )
            .route(&format!("{}/schema/rules", base), get(handlers::rules_schema))
            .route(
                &format!("{}/evaluate", base),
                post(handlers::evaluate)
                    .route_layer(middleware::from_fn_with_state(state.guard(), json_guard)),
            )
            .route(
                &format!("{}/{{name}}", base),
                get(handlers::get_rule_set).delete(handlers::delete_rule_set),
            );
    }

    app.layer(DefaultBodyLimit::max(state.validation.max_body_bytes))
        .layer(cors_layer(&state.cors_origin))
        .with_state(state)
}

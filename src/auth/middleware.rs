//! Authentication middleware for Axum.
//!
//! Builds a fresh [`RequestContext`] per call from the request line and the
//! `who` query parameter, runs the gate, and injects the outcome into
//! request extensions for downstream handlers. Decoded request state lives
//! only in that context; nothing is cached across requests.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use super::error::AuthError;
use super::gate::AuthenticationGate;
use super::models::{RequestContext, RouteClass};

/// Path prefix of the allow-listed admin routes.
pub const ADMIN_PATH_PREFIX: &str = "/api/v1/admin";

/// Authentication state shared across requests.
#[derive(Clone)]
pub struct AuthState {
    pub gate: Arc<AuthenticationGate>,
}

/// Axum middleware for request-signature authentication.
///
/// Injects [`super::models::AuthOutcome`] into request extensions. Must be
/// applied to every route that reads the authenticated identity.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let ctx = context_from_request(&request);
    let route = route_class(&ctx.url_path);

    let outcome = state.gate.authenticate(&ctx, route).await?;
    request.extensions_mut().insert(outcome);

    Ok(next.run(request).await)
}

/// Build the per-call request descriptor.
pub fn context_from_request(request: &Request<Body>) -> RequestContext {
    let raw_who = request
        .uri()
        .query()
        .and_then(who_param)
        .unwrap_or_default();

    RequestContext {
        http_method: request.method().as_str().to_string(),
        url_path: request.uri().path().to_string(),
        raw_who,
        server_time_ms: now_ms(),
    }
}

/// Classify a request path for gate decisions.
pub fn route_class(path: &str) -> RouteClass {
    if path.starts_with(ADMIN_PATH_PREFIX) {
        RouteClass::Admin
    } else {
        RouteClass::Normal
    }
}

fn who_param(query: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == "who" && !value.is_empty()).then(|| value.to_string())
    })
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

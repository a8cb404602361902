//! Gateway request handlers.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use super::types::ApiResponse;
use crate::auth::error::AuthError;
use crate::auth::models::AuthOutcome;

/// Health check response data
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    pub timestamp_ms: u64,
}

/// Health check endpoint
///
/// Returns service health with the server timestamp. Checks the database
/// when one is configured but exposes no internal details.
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let healthy = match &state.db {
        Some(db) => db.health_check().await.is_ok(),
        None => true,
    };

    if healthy {
        (
            StatusCode::OK,
            Json(ApiResponse::success(HealthResponse { timestamp_ms: now_ms })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                code: 5001,
                msg: "unavailable".to_string(),
                data: None,
            }),
        )
    }
}

/// Identity echo response data
#[derive(Debug, Serialize)]
pub struct WhoamiResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ref: Option<String>,
}

/// Report the identity the gate resolved for this request.
pub async fn whoami(
    Extension(outcome): Extension<AuthOutcome>,
) -> Json<ApiResponse<WhoamiResponse>> {
    let user_ref = outcome.user_ref().map(|r| r.to_string());
    Json(ApiResponse::success(WhoamiResponse {
        authenticated: user_ref.is_some(),
        user_ref,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReplayOverrideRequest {
    pub user_ref: String,
}

#[derive(Debug, Serialize)]
pub struct ReplayOverrideResponse {
    pub user_ref: String,
}

/// Admin replay-override: load an identity by explicit reference.
///
/// This is the only route allowed to call the override path; the gate
/// still refuses unless the allow-list flag is set.
pub async fn replay_override(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReplayOverrideRequest>,
) -> Result<Json<ApiResponse<ReplayOverrideResponse>>, AuthError> {
    let identity = state.gate.authenticate_override(&body.user_ref).await?;
    Ok(Json(ApiResponse::success(ReplayOverrideResponse {
        user_ref: identity.user_ref,
    })))
}

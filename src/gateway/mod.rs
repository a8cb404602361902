pub mod handlers;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::auth::middleware::{AuthState, auth_middleware};
use state::AppState;

/// Build the gateway router with the authentication layer applied.
pub fn build_router(state: AppState) -> Router {
    let auth_state = AuthState {
        gate: state.gate.clone(),
    };

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .route("/api/v1/me", get(handlers::whoami))
        .route(
            "/api/v1/admin/replay-override",
            post(handlers::replay_override),
        )
        .layer(from_fn_with_state(auth_state, auth_middleware))
        .with_state(Arc::new(state))
}

/// Start the HTTP gateway server.
pub async fn run_server(host: &str, port: u16, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;

    tracing::info!("Gateway listening on {}", addr);
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Gateway server error: {}", e))?;

    Ok(())
}

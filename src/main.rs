//! Tastevin Gate - gateway entry point.
//!
//! Loads the environment configuration, wires the authentication gate to
//! PostgreSQL-backed stores (or memory stores when no database is
//! configured), and serves the API.

use std::sync::Arc;

use tastevin_gate::auth::alert::TracingAlertSink;
use tastevin_gate::auth::gate::AuthenticationGate;
use tastevin_gate::auth::history::{HistoryStore, MemoryHistoryStore};
use tastevin_gate::auth::identity::{Identity, IdentityStore, MemoryIdentityStore};
use tastevin_gate::auth::repository::{PgHistoryStore, PgIdentityStore, ensure_schema};
use tastevin_gate::config::AppConfig;
use tastevin_gate::db::Database;
use tastevin_gate::gateway::{run_server, state::AppState};
use tastevin_gate::logging::init_logging;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _log_guard = init_logging(&config);

    tracing::info!(
        "Starting tastevin-gate (env: {}, build: {})",
        env,
        env!("GIT_HASH")
    );

    let db = match &config.postgres_url {
        Some(url) => {
            let db = Arc::new(Database::connect(url).await?);
            ensure_schema(&db).await?;
            Some(db)
        }
        None => {
            tracing::warn!("No postgres_url configured; using in-memory stores");
            None
        }
    };

    let (identities, history): (Arc<dyn IdentityStore>, Arc<dyn HistoryStore>) = match &db {
        Some(db) => (
            Arc::new(PgIdentityStore::new(db.clone())),
            Arc::new(PgHistoryStore::new(db.clone())),
        ),
        None => {
            let identities = MemoryIdentityStore::new();
            // Seed dev identities so the bypass works without a user store
            for dev_ref in &config.auth.dev_refs {
                identities.insert(Identity {
                    user_ref: dev_ref.clone(),
                    secret: dev_ref.as_bytes().to_vec(),
                });
                tracing::info!("Seeded dev identity '{}'", dev_ref);
            }
            (Arc::new(identities), Arc::new(MemoryHistoryStore::new()))
        }
    };

    let gate = Arc::new(AuthenticationGate::new(
        config.auth.clone(),
        identities,
        history,
        Arc::new(TracingAlertSink),
    ));

    let state = AppState::new(gate, db);
    run_server(&config.gateway.host, config.gateway.port, state).await
}

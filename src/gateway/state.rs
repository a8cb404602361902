use std::sync::Arc;

use crate::auth::gate::AuthenticationGate;
use crate::db::Database;

/// Gateway application state (shared).
#[derive(Clone)]
pub struct AppState {
    /// Authentication gate, one instance for every request
    pub gate: Arc<AuthenticationGate>,
    /// PostgreSQL database (absent when running on memory stores)
    pub db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(gate: Arc<AuthenticationGate>, db: Option<Arc<Database>>) -> Self {
        Self { gate, db }
    }
}

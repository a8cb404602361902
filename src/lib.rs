//! Tastevin Gate - Request-Signature Authentication
//!
//! The authentication core of the Tastevin tasting-notes API. Every inbound
//! call carries a compact base32 `who` token; this crate decodes it, verifies
//! the keyed digest binding it to the request, enforces a freshness window,
//! and records accepted requests for replay and throttle accounting.
//!
//! # Modules
//!
//! - [`auth`] - token codec, digest verification, freshness, replay,
//!   throttle, and the authentication gate that orchestrates them
//! - [`gateway`] - axum router, shared state, and request handlers
//! - [`config`] - YAML configuration per environment
//! - [`logging`] - tracing subscriber setup
//! - [`db`] - PostgreSQL connection pool

pub mod auth;
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use auth::digest::{expected_digest, signing_message, verify};
pub use auth::error::{AuthError, AuthErrorCode};
pub use auth::freshness::is_fresh;
pub use auth::gate::AuthenticationGate;
pub use auth::history::{HistoryStore, InsertOutcome, MemoryHistoryStore, RequestHistoryRecord};
pub use auth::identity::{Identity, IdentityStore, MemoryIdentityStore};
pub use auth::models::{AuthOutcome, RequestContext, RouteClass, SignatureToken};
pub use auth::replay::{ReplayGuard, ReplayOutcome};
pub use auth::throttle::{MaxPerInterval, ThrottleGuard, ThrottlePolicy, Unlimited};
pub use auth::token::{decode, encode};
pub use config::{AppConfig, AuthConfig};
pub use db::Database;

//! Request-signature authentication for API security.
//!
//! Every authenticated call carries a compact base32 `who` token holding a
//! user reference, a client timestamp, and a keyed digest. This module
//! decodes the token, recomputes the digest, checks freshness, and records
//! accepted requests for replay and throttle accounting.
//!
//! ## Components
//! - `token`: `who` token codec (base32, colon-separated fields)
//! - `digest`: HMAC-SHA256 -> SHAKE256 digest computation and verification
//! - `freshness`: client-timestamp window validation
//! - `history`: request history store (replay + throttle backing state)
//! - `replay`: insert-if-absent replay guard
//! - `throttle`: trailing-window request counting
//! - `identity`: identity lookup against the external user store
//! - `gate`: the authentication state machine
//! - `error`: authentication error types (4101-4109)
//! - `alert`: stale-timestamp alerting collaborator
//! - `middleware`: axum authentication middleware
//! - `repository`: PostgreSQL-backed stores and schema

pub mod alert;
pub mod digest;
pub mod error;
pub mod freshness;
pub mod gate;
pub mod history;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod replay;
pub mod repository;
pub mod throttle;
pub mod token;

// Re-export for convenience
pub use alert::{AlertSink, TracingAlertSink};
pub use error::{AuthError, AuthErrorCode};
pub use gate::AuthenticationGate;
pub use history::{HistoryStore, InsertOutcome, MemoryHistoryStore, RequestHistoryRecord};
pub use identity::{Identity, IdentityStore, MemoryIdentityStore};
pub use middleware::{AuthState, auth_middleware};
pub use models::{AuthOutcome, RequestContext, RouteClass, SignatureToken};
pub use replay::{ReplayGuard, ReplayOutcome};
pub use repository::{PgHistoryStore, PgIdentityStore, ensure_schema};
pub use throttle::{MaxPerInterval, ThrottleGuard, ThrottlePolicy, Unlimited};

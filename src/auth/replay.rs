//! Replay protection via insert-if-absent request recording.

use std::sync::Arc;

use super::history::{HistoryStore, HistoryStoreError, InsertOutcome, RequestHistoryRecord};

/// Outcome of recording a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOutcome {
    Accepted,
    /// The `who` token was seen before; the request must be rejected
    Replayed,
}

/// Records accepted requests and flags re-submissions.
///
/// A conflict on the store's uniqueness key is the replay signal, surfaced
/// as a first-class outcome rather than a caught exception. Admin-route
/// callers bypass this guard entirely.
pub struct ReplayGuard {
    store: Arc<dyn HistoryStore>,
}

impl ReplayGuard {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Persist the request if its `who` token is new.
    pub async fn record_if_new(
        &self,
        who: &str,
        user_ref: &str,
        client_time_ms: i64,
    ) -> Result<ReplayOutcome, HistoryStoreError> {
        let record = RequestHistoryRecord::new(who, user_ref, client_time_ms)?;
        match self.store.insert_if_absent(record).await? {
            InsertOutcome::Inserted => Ok(ReplayOutcome::Accepted),
            InsertOutcome::AlreadyPresent => Ok(ReplayOutcome::Replayed),
        }
    }
}

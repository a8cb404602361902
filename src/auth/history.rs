//! Request history store backing replay and throttle decisions.
//!
//! Accepted requests are persisted append-only, keyed by the full `who`
//! token. Replay protection depends on the store enforcing atomic
//! insert-or-conflict semantics; both implementations do, so two concurrent
//! identical requests can never both be accepted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;

/// Append-only record of an accepted request. Never updated.
#[derive(Debug, Clone)]
pub struct RequestHistoryRecord {
    /// Full `who` token; the replay uniqueness key
    pub who: String,
    pub user_ref: String,
    /// Client-reported request time
    pub client_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RequestHistoryRecord {
    /// Build a record from the decoded token fields.
    pub fn new(who: &str, user_ref: &str, client_time_ms: i64) -> Result<Self, HistoryStoreError> {
        let client_time = DateTime::from_timestamp_millis(client_time_ms)
            .ok_or(HistoryStoreError::InvalidTimestamp(client_time_ms))?;
        Ok(Self {
            who: who.to_string(),
            user_ref: user_ref.to_string(),
            client_time,
            created_at: Utc::now(),
        })
    }
}

#[derive(Debug, Error)]
pub enum HistoryStoreError {
    #[error("timestamp out of range: {0}")]
    InvalidTimestamp(i64),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Outcome of an insert-if-absent attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The uniqueness key already exists; interpreted as a replay
    AlreadyPresent,
}

/// Storage contract for request history.
///
/// `insert_if_absent` must be atomic: under concurrent identical inserts
/// exactly one caller observes `Inserted`.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn insert_if_absent(
        &self,
        record: RequestHistoryRecord,
    ) -> Result<InsertOutcome, HistoryStoreError>;

    /// Count records for `user_ref` with `client_time` in `[since, until]`.
    async fn count_between(
        &self,
        user_ref: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<u64, HistoryStoreError>;
}

/// Thread-safe in-memory history store.
///
/// Used by tests and by dev deployments without PostgreSQL. The DashMap
/// entry API gives the same insert-or-conflict atomicity the database
/// unique constraint provides.
pub struct MemoryHistoryStore {
    records: DashMap<String, RequestHistoryRecord>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn insert_if_absent(
        &self,
        record: RequestHistoryRecord,
    ) -> Result<InsertOutcome, HistoryStoreError> {
        use dashmap::mapref::entry::Entry;
        match self.records.entry(record.who.clone()) {
            Entry::Occupied(_) => Ok(InsertOutcome::AlreadyPresent),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    async fn count_between(
        &self,
        user_ref: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<u64, HistoryStoreError> {
        // Full scan; acceptable for the dev/test store
        let count = self
            .records
            .iter()
            .filter(|entry| {
                let r = entry.value();
                r.user_ref == user_ref && r.client_time >= since && r.client_time <= until
            })
            .count();
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn record(who: &str, user_ref: &str, client_time_ms: i64) -> RequestHistoryRecord {
        RequestHistoryRecord::new(who, user_ref, client_time_ms).expect("valid timestamp")
    }

    #[tokio::test]
    async fn test_first_insert_succeeds() {
        let store = MemoryHistoryStore::new();
        let outcome = store
            .insert_if_absent(record("tok1", "abc123", 1_700_000_000_000))
            .await
            .expect("insert");
        assert_eq!(outcome, InsertOutcome::Inserted);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_who_conflicts() {
        let store = MemoryHistoryStore::new();
        store
            .insert_if_absent(record("tok1", "abc123", 1_700_000_000_000))
            .await
            .expect("insert");
        let outcome = store
            .insert_if_absent(record("tok1", "abc123", 1_700_000_000_000))
            .await
            .expect("insert");
        assert_eq!(outcome, InsertOutcome::AlreadyPresent);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_identical_inserts_accept_one() {
        let store = Arc::new(MemoryHistoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .insert_if_absent(record("tok1", "abc123", 1_700_000_000_000))
                    .await
                    .expect("insert")
            }));
        }
        let mut inserted = 0;
        for handle in handles {
            if handle.await.expect("join") == InsertOutcome::Inserted {
                inserted += 1;
            }
        }
        assert_eq!(inserted, 1, "exactly one concurrent insert may win");
    }

    #[tokio::test]
    async fn test_count_window_bounds() {
        let store = MemoryHistoryStore::new();
        let base = 1_700_000_000_000;
        store
            .insert_if_absent(record("a", "abc123", base))
            .await
            .expect("insert");
        store
            .insert_if_absent(record("b", "abc123", base - 60_000))
            .await
            .expect("insert");
        store
            .insert_if_absent(record("c", "abc123", base - 11 * 60_000))
            .await
            .expect("insert");
        store
            .insert_if_absent(record("d", "other1", base))
            .await
            .expect("insert");

        let until = DateTime::from_timestamp_millis(base).expect("ts");
        let since = until - Duration::minutes(10);
        let count = store
            .count_between("abc123", since, until)
            .await
            .expect("count");
        // record "c" is outside the window, "d" belongs to another user
        assert_eq!(count, 2);
    }

    #[test]
    fn test_out_of_range_timestamp() {
        let err = RequestHistoryRecord::new("tok", "abc123", i64::MAX).expect_err("out of range");
        assert!(matches!(err, HistoryStoreError::InvalidTimestamp(_)));
    }
}

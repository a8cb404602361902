//! Trailing-window request counting per identity.
//!
//! The guard only reports a count; whether a count is too high is a policy
//! decision owned by the caller. The default policy never rejects.

use std::sync::Arc;

use chrono::{DateTime, Duration};

use super::history::{HistoryStore, HistoryStoreError};

/// Counts accepted requests for an identity inside a trailing window.
pub struct ThrottleGuard {
    store: Arc<dyn HistoryStore>,
}

impl ThrottleGuard {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Count requests for `user_ref` with client time in
    /// `[now - interval, now]`.
    pub async fn count_recent(
        &self,
        user_ref: &str,
        interval_minutes: i64,
        now_ms: i64,
    ) -> Result<u64, HistoryStoreError> {
        let until =
            DateTime::from_timestamp_millis(now_ms).ok_or(HistoryStoreError::InvalidTimestamp(now_ms))?;
        let since = until - Duration::minutes(interval_minutes);
        self.store.count_between(user_ref, since, until).await
    }
}

/// Enforcement decision over a trailing-window count.
///
/// Consulted by the gate after the current request has been recorded, so the
/// count includes the request under consideration.
pub trait ThrottlePolicy: Send + Sync {
    fn allows(&self, recent_count: u64) -> bool;
}

/// Counting only; never rejects.
pub struct Unlimited;

impl ThrottlePolicy for Unlimited {
    fn allows(&self, _recent_count: u64) -> bool {
        true
    }
}

/// Fixed ceiling per interval for deployments that do enforce a limit.
pub struct MaxPerInterval(pub u64);

impl ThrottlePolicy for MaxPerInterval {
    fn allows(&self, recent_count: u64) -> bool {
        recent_count <= self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::history::MemoryHistoryStore;
    use crate::auth::replay::ReplayGuard;

    const BASE_MS: i64 = 1_700_000_000_000;

    async fn store_with_requests(times_ms: &[i64]) -> Arc<MemoryHistoryStore> {
        let store = Arc::new(MemoryHistoryStore::new());
        let guard = ReplayGuard::new(store.clone());
        for (i, t) in times_ms.iter().enumerate() {
            guard
                .record_if_new(&format!("tok{}", i), "abc123", *t)
                .await
                .expect("record");
        }
        store
    }

    #[tokio::test]
    async fn test_count_exact() {
        let store = store_with_requests(&[BASE_MS, BASE_MS - 60_000, BASE_MS - 120_000]).await;
        let guard = ThrottleGuard::new(store);
        let count = guard
            .count_recent("abc123", 10, BASE_MS)
            .await
            .expect("count");
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_old_request_excluded() {
        let eleven_minutes = 11 * 60_000;
        let store = store_with_requests(&[BASE_MS, BASE_MS - eleven_minutes]).await;
        let guard = ThrottleGuard::new(store);
        let count = guard
            .count_recent("abc123", 10, BASE_MS)
            .await
            .expect("count");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_other_user_not_counted() {
        let store = store_with_requests(&[BASE_MS]).await;
        let guard = ThrottleGuard::new(store);
        let count = guard
            .count_recent("other1", 10, BASE_MS)
            .await
            .expect("count");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_unlimited_always_allows() {
        assert!(Unlimited.allows(0));
        assert!(Unlimited.allows(u64::MAX));
    }

    #[test]
    fn test_max_per_interval() {
        let policy = MaxPerInterval(3);
        assert!(policy.allows(3));
        assert!(!policy.allows(4));
    }
}

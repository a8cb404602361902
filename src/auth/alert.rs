//! Stale-timestamp alerting collaborator.
//!
//! The gate reports freshness rejections here; routing them to a pager or
//! incident channel belongs to the deployment, not to this crate.

/// External alerting sink for stale-timestamp events.
pub trait AlertSink: Send + Sync {
    fn stale_timestamp(&self, user_ref: &str, server_time_ms: i64, client_time_ms: i64);
}

/// Default sink: elevated-severity structured log.
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn stale_timestamp(&self, user_ref: &str, server_time_ms: i64, client_time_ms: i64) {
        tracing::error!(
            user_ref = %user_ref,
            server_time_ms,
            client_time_ms,
            "stale request timestamp rejected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingAlertSink {
        pub events: Mutex<Vec<(String, i64, i64)>>,
    }

    impl AlertSink for RecordingAlertSink {
        fn stale_timestamp(&self, user_ref: &str, server_time_ms: i64, client_time_ms: i64) {
            self.events
                .lock()
                .expect("sink mutex")
                .push((user_ref.to_string(), server_time_ms, client_time_ms));
        }
    }

    #[test]
    fn test_recording_sink_captures_event() {
        let sink = RecordingAlertSink::default();
        sink.stale_timestamp("abc123", 100, 50);
        let events = sink.events.lock().expect("sink mutex");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], ("abc123".to_string(), 100, 50));
    }
}

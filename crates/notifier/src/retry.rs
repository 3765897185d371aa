use std::time::Duration;

use chrono::{DateTime, Utc};

use vigil_common::types::Notification;

/// Holding area for failed notifications awaiting their backoff window.
///
/// Entries always arrive with `last_retry_at` stamped; an unstamped entry is
/// treated as immediately due rather than lingering forever.
#[derive(Debug, Default)]
pub struct RetryLedger {
    entries: Vec<Notification>,
}

impl RetryLedger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Park a failed notification until its next attempt.
    pub fn push(&mut self, notification: Notification) {
        self.entries.push(notification);
    }

    /// Remove and return every entry whose backoff window has elapsed.
    /// Entries not yet due stay in the ledger untouched.
    pub fn take_due(&mut self, now: DateTime<Utc>, interval: Duration) -> Vec<Notification> {
        let interval_ms = interval.as_millis() as i64;
        let (due, waiting) = self.entries.drain(..).partition(|n| {
            n.last_retry_at.is_none_or(|stamped| {
                now.signed_duration_since(stamped).num_milliseconds() >= interval_ms
            })
        });
        self.entries = waiting;
        due
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

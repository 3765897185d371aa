use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use vigil_common::types::{CallRecord, ChannelStats, DeliveryRecord, Notification, PushRecord};

/// Attempts kept per channel before the oldest is dropped.
const ATTEMPT_LOG_CAPACITY: usize = 100;

/// Synthetic calls kept by the voice channel.
const CALL_LOG_CAPACITY: usize = 100;

/// Unread/read pushes kept in the app inbox.
const INBOX_CAPACITY: usize = 20;

/// Every simulated call "lasts" this long.
const CALL_DURATION_SECS: u32 = 30;

const PUSH_TITLE: &str = "Emergency notice";

/// A delivery attempt that did not go through.
#[derive(Debug, Clone, Error)]
pub enum SendError {
    #[error("invalid recipient '{recipient}': {reason}")]
    InvalidRecipient { recipient: String, reason: String },

    #[error("channel '{channel}' failed: {reason}")]
    Channel { channel: String, reason: String },
}

/// A delivery medium the dispatcher can hand notifications to.
///
/// Implementations own their bookkeeping: every `send` outcome must end up
/// in the sender's counters and attempt log, success or not.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// Registry name, matching `Notification::channel`.
    fn name(&self) -> &str;

    /// Attempt delivery of a single notification.
    async fn send(&self, notification: &Notification) -> Result<(), SendError>;

    /// Point-in-time sent/failed counters.
    fn stats(&self) -> ChannelStats;

    /// Most recent delivery attempts, newest first.
    fn recent_attempts(&self, limit: usize) -> Vec<DeliveryRecord>;
}

/// Shared attempt bookkeeping composed into each sender: atomic counters
/// plus a bounded append-only log.
pub struct DeliveryRecorder {
    channel: &'static str,
    sent: AtomicU64,
    failed: AtomicU64,
    log: Mutex<VecDeque<DeliveryRecord>>,
}

impl DeliveryRecorder {
    pub fn new(channel: &'static str) -> Self {
        Self {
            channel,
            sent: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            log: Mutex::new(VecDeque::with_capacity(ATTEMPT_LOG_CAPACITY)),
        }
    }

    /// Record one attempt outcome and bump the matching counter.
    pub fn record(&self, notification: &Notification, error: Option<&SendError>) {
        match error {
            None => self.sent.fetch_add(1, Ordering::Relaxed),
            Some(_) => self.failed.fetch_add(1, Ordering::Relaxed),
        };

        let record = DeliveryRecord {
            timestamp: Utc::now(),
            channel: self.channel.to_string(),
            notification_id: notification.id,
            recipient: notification.recipient.clone(),
            message: notification.message.clone(),
            priority: notification.priority,
            success: error.is_none(),
            error: error.map(|e| e.to_string()),
        };

        let mut log = self.log.lock();
        if log.len() == ATTEMPT_LOG_CAPACITY {
            log.pop_front();
        }
        log.push_back(record);
    }

    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    pub fn recent(&self, limit: usize) -> Vec<DeliveryRecord> {
        let log = self.log.lock();
        log.iter().rev().take(limit).cloned().collect()
    }
}

/// Simulated SMS gateway.
pub struct SmsSender {
    delay: Duration,
    recorder: DeliveryRecorder,
}

impl SmsSender {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            recorder: DeliveryRecorder::new("sms"),
        }
    }
}

#[async_trait]
impl ChannelSender for SmsSender {
    fn name(&self) -> &str {
        "sms"
    }

    async fn send(&self, notification: &Notification) -> Result<(), SendError> {
        tokio::time::sleep(self.delay).await;

        if notification.recipient.len() < 3 {
            let err = SendError::InvalidRecipient {
                recipient: notification.recipient.clone(),
                reason: "invalid phone number".to_string(),
            };
            self.recorder.record(notification, Some(&err));
            return Err(err);
        }

        self.recorder.record(notification, None);
        debug!(
            id = notification.id,
            recipient = %notification.recipient,
            "SMS delivered"
        );
        Ok(())
    }

    fn stats(&self) -> ChannelStats {
        self.recorder.stats()
    }

    fn recent_attempts(&self, limit: usize) -> Vec<DeliveryRecord> {
        self.recorder.recent(limit)
    }
}

/// Simulated voice call channel. Successful deliveries leave a synthetic
/// call record behind.
pub struct VoiceSender {
    delay: Duration,
    recorder: DeliveryRecorder,
    calls: Mutex<VecDeque<CallRecord>>,
}

impl VoiceSender {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            recorder: DeliveryRecorder::new("voice"),
            calls: Mutex::new(VecDeque::new()),
        }
    }

    /// Most recent synthetic calls, newest first.
    pub fn recent_calls(&self, limit: usize) -> Vec<CallRecord> {
        let calls = self.calls.lock();
        calls.iter().rev().take(limit).cloned().collect()
    }
}

#[async_trait]
impl ChannelSender for VoiceSender {
    fn name(&self) -> &str {
        "voice"
    }

    async fn send(&self, notification: &Notification) -> Result<(), SendError> {
        tokio::time::sleep(self.delay).await;

        if notification.recipient.len() < 3 {
            let err = SendError::InvalidRecipient {
                recipient: notification.recipient.clone(),
                reason: "invalid phone number".to_string(),
            };
            self.recorder.record(notification, Some(&err));
            return Err(err);
        }

        let now = Utc::now();
        let record = CallRecord {
            call_id: format!("CALL_{}_{}", notification.id, now.timestamp()),
            notification_id: notification.id,
            recipient: notification.recipient.clone(),
            message: notification.message.clone(),
            duration_secs: CALL_DURATION_SECS,
            status: "connected".to_string(),
            called_at: now,
        };
        {
            let mut calls = self.calls.lock();
            if calls.len() == CALL_LOG_CAPACITY {
                calls.pop_front();
            }
            calls.push_back(record);
        }

        self.recorder.record(notification, None);
        debug!(
            id = notification.id,
            recipient = %notification.recipient,
            "Voice call connected"
        );
        Ok(())
    }

    fn stats(&self) -> ChannelStats {
        self.recorder.stats()
    }

    fn recent_attempts(&self, limit: usize) -> Vec<DeliveryRecord> {
        self.recorder.recent(limit)
    }
}

/// Simulated app push channel backed by a bounded unread inbox.
pub struct PushSender {
    delay: Duration,
    recorder: DeliveryRecorder,
    inbox: Mutex<VecDeque<PushRecord>>,
}

impl PushSender {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            recorder: DeliveryRecorder::new("app"),
            inbox: Mutex::new(VecDeque::with_capacity(INBOX_CAPACITY)),
        }
    }

    /// Inbox contents, newest first.
    pub fn inbox(&self, limit: usize) -> Vec<PushRecord> {
        let inbox = self.inbox.lock();
        inbox.iter().rev().take(limit).cloned().collect()
    }
}

#[async_trait]
impl ChannelSender for PushSender {
    fn name(&self) -> &str {
        "app"
    }

    async fn send(&self, notification: &Notification) -> Result<(), SendError> {
        tokio::time::sleep(self.delay).await;

        if notification.recipient.is_empty() {
            let err = SendError::InvalidRecipient {
                recipient: notification.recipient.clone(),
                reason: "invalid recipient".to_string(),
            };
            self.recorder.record(notification, Some(&err));
            return Err(err);
        }

        let now = Utc::now();
        let record = PushRecord {
            push_id: format!("PUSH_{}_{}", notification.id, now.timestamp()),
            notification_id: notification.id,
            recipient: notification.recipient.clone(),
            title: PUSH_TITLE.to_string(),
            message: notification.message.clone(),
            priority: notification.priority,
            pushed_at: now,
            read: false,
        };
        {
            let mut inbox = self.inbox.lock();
            if inbox.len() == INBOX_CAPACITY {
                inbox.pop_front();
            }
            inbox.push_back(record);
        }

        self.recorder.record(notification, None);
        debug!(
            id = notification.id,
            recipient = %notification.recipient,
            "App push delivered"
        );
        Ok(())
    }

    fn stats(&self) -> ChannelStats {
        self.recorder.stats()
    }

    fn recent_attempts(&self, limit: usize) -> Vec<DeliveryRecord> {
        self.recorder.recent(limit)
    }
}

/// Build the three standard senders with the given simulated latencies.
///
/// Returned as concrete handles so callers can keep them for the call-log
/// and inbox views before registering them with the dispatcher.
pub fn standard_senders(
    sms_delay: Duration,
    voice_delay: Duration,
    push_delay: Duration,
) -> (
    std::sync::Arc<SmsSender>,
    std::sync::Arc<VoiceSender>,
    std::sync::Arc<PushSender>,
) {
    (
        std::sync::Arc::new(SmsSender::new(sms_delay)),
        std::sync::Arc::new(VoiceSender::new(voice_delay)),
        std::sync::Arc::new(PushSender::new(push_delay)),
    )
}

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use vigil_common::types::{
    DeliveryRecord, DeliveryStatus, DispatchStats, Notification, Priority,
};

use crate::channels::ChannelSender;
use crate::queue::DispatchQueues;
use crate::retry::RetryLedger;

/// Dispatch loop tuning. `Default` is the production cadence.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Upper bound on the wait between cycles; enqueue wakes the loop early.
    pub cycle_interval: Duration,

    /// Routine notifications drained per cycle.
    pub batch_size: usize,

    /// Backoff window before a failed notification is retried.
    pub retry_interval: Duration,

    /// Retry budget stamped onto each new notification.
    pub max_retries: u32,

    /// Capacity of the recent-delivery log.
    pub log_capacity: usize,

    /// How long `stop` waits for the worker to wind down.
    pub shutdown_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            cycle_interval: Duration::from_secs(1),
            batch_size: 5,
            retry_interval: Duration::from_secs(300),
            max_retries: 3,
            log_capacity: 100,
            shutdown_timeout: Duration::from_secs(2),
        }
    }
}

/// Owns the dispatch queues, the retry ledger and the channel registry, and
/// runs the background loop that drains them.
///
/// One long-lived instance per process, shared as `Arc<Dispatcher>`. Callers
/// never learn a delivery outcome from `enqueue`; outcomes surface through
/// `get_statistics` and the delivery logs.
pub struct Dispatcher {
    config: DispatcherConfig,
    channels: HashMap<String, Arc<dyn ChannelSender>>,
    queues: Mutex<DispatchQueues>,
    ledger: Mutex<RetryLedger>,
    deliveries: Mutex<VecDeque<DeliveryRecord>>,
    next_id: AtomicU64,
    running: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
    wake: Notify,
}

impl Dispatcher {
    /// Build a dispatcher with the given senders registered under their
    /// `name()`.
    pub fn new(config: DispatcherConfig, senders: Vec<Arc<dyn ChannelSender>>) -> Self {
        let channels: HashMap<String, Arc<dyn ChannelSender>> = senders
            .into_iter()
            .map(|sender| (sender.name().to_string(), sender))
            .collect();

        Self {
            config,
            channels,
            queues: Mutex::new(DispatchQueues::new()),
            ledger: Mutex::new(RetryLedger::new()),
            deliveries: Mutex::new(VecDeque::new()),
            next_id: AtomicU64::new(1),
            running: AtomicBool::new(false),
            worker: Mutex::new(None),
            wake: Notify::new(),
        }
    }

    /// Assign the next sequence id and queue a notification. Returns the id
    /// immediately; delivery happens in the background.
    pub fn enqueue(&self, recipient: &str, message: &str, priority: Priority, channel: &str) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            recipient: recipient.to_string(),
            message: message.to_string(),
            priority,
            channel: channel.to_string(),
            retry_count: 0,
            max_retries: self.config.max_retries,
            created_at: Utc::now(),
            last_retry_at: None,
            status: DeliveryStatus::Pending,
            error_message: None,
        };

        debug!(id, priority = %priority, channel = %channel, "Notification queued");
        self.queues.lock().push(notification);
        self.wake.notify_one();
        id
    }

    /// Launch the background dispatch task. Idempotent while the loop is
    /// live.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let dispatcher = Arc::clone(self);
        let handle = tokio::spawn(async move { dispatcher.run().await });
        *self.worker.lock() = Some(handle);
        info!("Notification dispatcher started");
    }

    /// Signal the loop to exit and wait (bounded) for it to finish. Queued
    /// and in-flight work is kept; only further draining halts. Idempotent.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.wake.notify_one();

        let handle = self.worker.lock().take();
        if let Some(handle) = handle
            && tokio::time::timeout(self.config.shutdown_timeout, handle)
                .await
                .is_err()
        {
            warn!("Dispatch loop still draining after shutdown timeout");
        }
        info!("Notification dispatcher stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Point-in-time snapshot; totals are sums of the per-channel counters.
    pub fn get_statistics(&self) -> DispatchStats {
        let mut channels = BTreeMap::new();
        let mut total_sent = 0;
        let mut total_failed = 0;
        for (name, sender) in &self.channels {
            let stats = sender.stats();
            total_sent += stats.sent;
            total_failed += stats.failed;
            channels.insert(name.clone(), stats);
        }

        let (pending_high, pending_low) = {
            let queues = self.queues.lock();
            (queues.high_len(), queues.routine_len())
        };

        DispatchStats {
            total_sent,
            total_failed,
            pending_high,
            pending_low,
            retrying: self.ledger.lock().len(),
            channels,
        }
    }

    /// Most recent delivery attempts across all channels, newest first.
    pub fn recent_deliveries(&self, limit: usize) -> Vec<DeliveryRecord> {
        let log = self.deliveries.lock();
        log.iter().rev().take(limit).cloned().collect()
    }

    /// Look up a registered sender by channel name.
    pub fn sender(&self, name: &str) -> Option<&Arc<dyn ChannelSender>> {
        self.channels.get(name)
    }

    async fn run(self: Arc<Self>) {
        info!(
            cycle_ms = self.config.cycle_interval.as_millis() as u64,
            batch_size = self.config.batch_size,
            retry_interval_secs = self.config.retry_interval.as_secs(),
            "Dispatch loop running"
        );

        while self.running.load(Ordering::SeqCst) {
            self.drain_high().await;
            self.drain_routine().await;
            self.scan_retries().await;

            tokio::select! {
                _ = self.wake.notified() => {}
                _ = tokio::time::sleep(self.config.cycle_interval) => {}
            }
        }

        debug!("Dispatch loop exited");
    }

    /// Pop-and-send until the high queue is empty, picking up items enqueued
    /// while the drain is in progress.
    async fn drain_high(&self) {
        loop {
            let next = self.queues.lock().pop_high();
            match next {
                Some(notification) => self.dispatch(notification).await,
                None => break,
            }
        }
    }

    async fn drain_routine(&self) {
        let batch = self.queues.lock().pop_routine_batch(self.config.batch_size);
        for notification in batch {
            self.dispatch(notification).await;
        }
    }

    async fn scan_retries(&self) {
        let due = self
            .ledger
            .lock()
            .take_due(Utc::now(), self.config.retry_interval);
        if due.is_empty() {
            return;
        }

        debug!(count = due.len(), "Retrying notifications past their backoff window");
        for notification in due {
            self.dispatch(notification).await;
        }
    }

    /// Deliver one notification and settle its fate: sent, parked for retry,
    /// or dropped.
    async fn dispatch(&self, mut notification: Notification) {
        let Some(sender) = self.channels.get(&notification.channel) else {
            warn!(
                id = notification.id,
                channel = %notification.channel,
                "Unknown notification channel, discarding"
            );
            return;
        };

        match sender.send(&notification).await {
            Ok(()) => {
                notification.status = DeliveryStatus::Sent;
                notification.error_message = None;
                info!(
                    id = notification.id,
                    channel = %notification.channel,
                    retries = notification.retry_count,
                    "Notification delivered"
                );
                self.push_delivery_record(&notification, None);
            }
            Err(err) => {
                let reason = err.to_string();
                notification.status = DeliveryStatus::Failed;
                notification.error_message = Some(reason.clone());
                self.push_delivery_record(&notification, Some(&reason));

                if notification.retry_count < notification.max_retries {
                    notification.retry_count += 1;
                    notification.last_retry_at = Some(Utc::now());
                    debug!(
                        id = notification.id,
                        retry_count = notification.retry_count,
                        max_retries = notification.max_retries,
                        error = %reason,
                        "Delivery failed, scheduling retry"
                    );
                    self.ledger.lock().push(notification);
                } else {
                    warn!(
                        id = notification.id,
                        channel = %notification.channel,
                        error = %reason,
                        "Retry budget exhausted, dropping notification"
                    );
                }
            }
        }
    }

    fn push_delivery_record(&self, notification: &Notification, error: Option<&str>) {
        let record = DeliveryRecord {
            timestamp: Utc::now(),
            channel: notification.channel.clone(),
            notification_id: notification.id,
            recipient: notification.recipient.clone(),
            message: notification.message.clone(),
            priority: notification.priority,
            success: error.is_none(),
            error: error.map(|e| e.to_string()),
        };

        let mut log = self.deliveries.lock();
        if log.len() == self.config.log_capacity {
            log.pop_front();
        }
        log.push_back(record);
    }
}

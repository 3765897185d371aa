use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use vigil_common::types::{Notification, Priority};

/// Heap entry wrapper.
///
/// `BinaryHeap` is a max-heap, so the ordering is inverted: the entry with
/// the most urgent priority class compares greatest, and among equal
/// priorities the smallest sequence id compares greatest (FIFO).
#[derive(Debug)]
struct QueuedNotification(Notification);

impl PartialEq for QueuedNotification {
    fn eq(&self, other: &Self) -> bool {
        self.0.priority == other.0.priority && self.0.id == other.0.id
    }
}

impl Eq for QueuedNotification {}

impl PartialOrd for QueuedNotification {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedNotification {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .priority
            .cmp(&self.0.priority)
            .then_with(|| other.0.id.cmp(&self.0.id))
    }
}

/// The two dispatch queues: a priority heap for urgent notifications and a
/// FIFO for routine ones, kept separate so urgent traffic is never starved
/// behind a routine backlog.
#[derive(Debug)]
pub struct DispatchQueues {
    high: BinaryHeap<QueuedNotification>,
    routine: VecDeque<Notification>,
}

impl DispatchQueues {
    pub fn new() -> Self {
        Self {
            high: BinaryHeap::new(),
            routine: VecDeque::new(),
        }
    }

    /// Route a notification to the queue its priority calls for.
    pub fn push(&mut self, notification: Notification) {
        if notification.priority == Priority::High {
            self.high.push(QueuedNotification(notification));
        } else {
            self.routine.push_back(notification);
        }
    }

    /// Pop the most urgent queued notification, if any.
    pub fn pop_high(&mut self) -> Option<Notification> {
        self.high.pop().map(|entry| entry.0)
    }

    /// Remove and return up to `max` routine notifications in FIFO order.
    pub fn pop_routine_batch(&mut self, max: usize) -> Vec<Notification> {
        let take = max.min(self.routine.len());
        self.routine.drain(..take).collect()
    }

    pub fn high_len(&self) -> usize {
        self.high.len()
    }

    pub fn routine_len(&self) -> usize {
        self.routine.len()
    }
}

impl Default for DispatchQueues {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vigil_common::types::DeliveryStatus;

    fn make_notification(id: u64, priority: Priority) -> Notification {
        Notification {
            id,
            recipient: "13800000000".to_string(),
            message: "test".to_string(),
            priority,
            channel: "sms".to_string(),
            retry_count: 0,
            max_retries: 3,
            created_at: Utc::now(),
            last_retry_at: None,
            status: DeliveryStatus::Pending,
            error_message: None,
        }
    }

    #[test]
    fn routes_by_priority() {
        let mut queues = DispatchQueues::new();
        queues.push(make_notification(1, Priority::High));
        queues.push(make_notification(2, Priority::Medium));
        queues.push(make_notification(3, Priority::Low));

        assert_eq!(queues.high_len(), 1);
        assert_eq!(queues.routine_len(), 2);
    }

    #[test]
    fn high_queue_pops_fifo_within_class() {
        let mut queues = DispatchQueues::new();
        queues.push(make_notification(5, Priority::High));
        queues.push(make_notification(2, Priority::High));
        queues.push(make_notification(9, Priority::High));

        let ids: Vec<u64> = std::iter::from_fn(|| queues.pop_high())
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn high_queue_orders_by_class_before_id() {
        // The heap only ever holds high-priority items in production, but
        // the ordering must still rank class above insertion order.
        let mut queues = DispatchQueues::new();
        queues.high.push(QueuedNotification(make_notification(1, Priority::Low)));
        queues.high.push(QueuedNotification(make_notification(2, Priority::High)));
        queues.high.push(QueuedNotification(make_notification(3, Priority::Medium)));

        let order: Vec<Priority> = std::iter::from_fn(|| queues.pop_high())
            .map(|n| n.priority)
            .collect();
        assert_eq!(order, vec![Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn routine_batch_is_bounded_and_fifo() {
        let mut queues = DispatchQueues::new();
        for id in 1..=8 {
            queues.push(make_notification(id, Priority::Low));
        }

        let batch: Vec<u64> = queues.pop_routine_batch(5).iter().map(|n| n.id).collect();
        assert_eq!(batch, vec![1, 2, 3, 4, 5]);
        assert_eq!(queues.routine_len(), 3);

        let rest: Vec<u64> = queues.pop_routine_batch(5).iter().map(|n| n.id).collect();
        assert_eq!(rest, vec![6, 7, 8]);
        assert!(queues.pop_routine_batch(5).is_empty());
    }

    #[test]
    fn empty_queues_yield_nothing() {
        let mut queues = DispatchQueues::new();
        assert!(queues.pop_high().is_none());
        assert!(queues.pop_routine_batch(5).is_empty());
        assert_eq!(queues.high_len(), 0);
        assert_eq!(queues.routine_len(), 0);
    }
}

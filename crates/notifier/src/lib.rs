//! Multi-channel notification dispatch.
//!
//! Outbound notifications arrive tagged with a priority and a channel name.
//! Urgent ones go to a priority heap, routine ones to a FIFO; a background
//! loop drains the heap completely each cycle, then a bounded routine batch,
//! then rescans the retry ledger for failures whose backoff window has
//! elapsed. Channel senders are simulated stand-ins for SMS, voice and app
//! push delivery.

pub mod channels;
pub mod dispatcher;
pub mod queue;
pub mod retry;

pub use channels::{
    ChannelSender, DeliveryRecorder, PushSender, SendError, SmsSender, VoiceSender,
    standard_senders,
};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use queue::DispatchQueues;
pub use retry::RetryLedger;

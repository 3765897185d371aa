//! Shared application state for the Axum API server.

use std::sync::Arc;
use std::time::Duration;

use vigil_common::config::AppConfig;
use vigil_engine::{EscalationPolicy, RiskAssessor};
use vigil_notifier::{
    Dispatcher, DispatcherConfig, PushSender, VoiceSender, standard_senders,
};

/// Application state shared across all route handlers via Axum `State`.
///
/// Holds the long-lived dispatcher plus concrete handles to the voice and
/// push senders, whose call log and inbox are served by dedicated routes.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub dispatcher: Arc<Dispatcher>,
    pub assessor: Arc<RiskAssessor>,
    pub policy: EscalationPolicy,
    pub voice: Arc<VoiceSender>,
    pub push: Arc<PushSender>,
}

impl AppState {
    /// Wire the full notification stack from configuration.
    pub fn new(config: AppConfig) -> Self {
        let (sms, voice, push) = standard_senders(
            Duration::from_millis(config.sms_delay_ms),
            Duration::from_millis(config.voice_delay_ms),
            Duration::from_millis(config.push_delay_ms),
        );

        let dispatcher_config = DispatcherConfig {
            cycle_interval: Duration::from_millis(config.dispatch_cycle_ms),
            batch_size: config.dispatch_batch_size,
            retry_interval: Duration::from_secs(config.dispatch_retry_interval_secs),
            max_retries: config.dispatch_max_retries,
            log_capacity: config.dispatch_log_capacity,
            ..DispatcherConfig::default()
        };

        let dispatcher = Arc::new(Dispatcher::new(
            dispatcher_config,
            vec![sms, voice.clone(), push.clone()],
        ));

        Self {
            config,
            dispatcher,
            assessor: Arc::new(RiskAssessor::new()),
            policy: EscalationPolicy::new(),
            voice,
            push,
        }
    }
}

//! Vigil alert simulator binary entrypoint.

mod generator;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use vigil_common::config::AppConfig;
use vigil_engine::{EscalationPolicy, RiskAssessor};
use vigil_notifier::{Dispatcher, DispatcherConfig, standard_senders};

use crate::generator::AlertGenerator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil_simulator=info,vigil_notifier=debug".into()),
        )
        .json()
        .init();

    tracing::info!("Vigil alert simulator starting...");

    // Load configuration
    let config = AppConfig::from_env()?;

    let (sms, voice, push) = standard_senders(
        Duration::from_millis(config.sms_delay_ms),
        Duration::from_millis(config.voice_delay_ms),
        Duration::from_millis(config.push_delay_ms),
    );

    let dispatcher = Arc::new(Dispatcher::new(
        DispatcherConfig {
            cycle_interval: Duration::from_millis(config.dispatch_cycle_ms),
            batch_size: config.dispatch_batch_size,
            retry_interval: Duration::from_secs(config.dispatch_retry_interval_secs),
            max_retries: config.dispatch_max_retries,
            log_capacity: config.dispatch_log_capacity,
            ..DispatcherConfig::default()
        },
        vec![sms, voice, push],
    ));
    dispatcher.start();

    let interval = Duration::from_secs(config.simulator_interval_secs);
    tracing::info!(interval_secs = interval.as_secs(), "Simulation loop started");

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        _ = run_simulation(&dispatcher, interval) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    dispatcher.stop().await;
    tracing::info!("Vigil alert simulator stopped.");

    Ok(())
}

/// Fabricate, assess and enqueue one alert per interval, logging dispatch
/// statistics at the end of each cycle.
async fn run_simulation(dispatcher: &Arc<Dispatcher>, interval: Duration) {
    let generator = AlertGenerator::new();
    let assessor = RiskAssessor::new();
    let policy = EscalationPolicy::new();

    loop {
        let (alert, weather) = generator.next_alert();
        let risk = assessor.assess(alert.location, Utc::now(), weather);
        let requests = policy.plan(&alert, &risk);

        tracing::info!(
            alert_id = %alert.id,
            user = %alert.user_name,
            kind = %alert.kind,
            weather = %weather,
            risk = %risk.level,
            score = risk.score,
            notifications = requests.len(),
            "Fabricated distress alert"
        );

        for request in &requests {
            dispatcher.enqueue(
                &request.recipient,
                &request.message,
                request.priority,
                request.channel.name(),
            );
        }

        tokio::time::sleep(interval).await;

        let stats = dispatcher.get_statistics();
        tracing::info!(
            total_sent = stats.total_sent,
            total_failed = stats.total_failed,
            pending_high = stats.pending_high,
            pending_low = stats.pending_low,
            retrying = stats.retrying,
            "Dispatch statistics"
        );
    }
}

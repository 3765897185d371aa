use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP API port (default: 3000)
    pub api_port: u16,

    /// Dispatch loop cycle interval in milliseconds (default: 1000)
    pub dispatch_cycle_ms: u64,

    /// Maximum routine notifications drained per cycle (default: 5)
    pub dispatch_batch_size: usize,

    /// Seconds a failed notification waits before redelivery (default: 300)
    pub dispatch_retry_interval_secs: u64,

    /// Delivery attempts allowed after the initial failure (default: 3)
    pub dispatch_max_retries: u32,

    /// Capacity of the recent-delivery log kept for the UI (default: 100)
    pub dispatch_log_capacity: usize,

    /// Simulated SMS gateway latency in milliseconds (default: 500)
    pub sms_delay_ms: u64,

    /// Simulated voice call setup latency in milliseconds (default: 1000)
    pub voice_delay_ms: u64,

    /// Simulated push delivery latency in milliseconds (default: 300)
    pub push_delay_ms: u64,

    /// Seconds between fabricated alerts in the simulator (default: 30)
    pub simulator_interval_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("API_PORT must be a valid u16"))?,
            dispatch_cycle_ms: std::env::var("DISPATCH_CYCLE_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DISPATCH_CYCLE_MS must be a valid u64"))?,
            dispatch_batch_size: std::env::var("DISPATCH_BATCH_SIZE")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DISPATCH_BATCH_SIZE must be a valid usize"))?,
            dispatch_retry_interval_secs: std::env::var("DISPATCH_RETRY_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DISPATCH_RETRY_INTERVAL_SECS must be a valid u64"))?,
            dispatch_max_retries: std::env::var("DISPATCH_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DISPATCH_MAX_RETRIES must be a valid u32"))?,
            dispatch_log_capacity: std::env::var("DISPATCH_LOG_CAPACITY")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DISPATCH_LOG_CAPACITY must be a valid usize"))?,
            sms_delay_ms: std::env::var("SMS_DELAY_MS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SMS_DELAY_MS must be a valid u64"))?,
            voice_delay_ms: std::env::var("VOICE_DELAY_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("VOICE_DELAY_MS must be a valid u64"))?,
            push_delay_ms: std::env::var("PUSH_DELAY_MS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PUSH_DELAY_MS must be a valid u64"))?,
            simulator_interval_secs: std::env::var("SIMULATOR_INTERVAL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SIMULATOR_INTERVAL_SECS must be a valid u64"))?,
        })
    }
}

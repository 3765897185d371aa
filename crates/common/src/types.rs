use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dispatch urgency class. Declaration order is the drain order:
/// `High` sorts before `Medium`, which sorts before `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// The delivery media with a built-in sender implementation.
///
/// Notifications carry their channel as a plain string so that a request for
/// an unregistered channel still reaches the dispatch decision; this enum is
/// the typed form used where the channel is known up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Sms,
    Voice,
    App,
}

impl ChannelKind {
    /// Registry name of the channel, matching `Notification::channel`.
    pub fn name(&self) -> &'static str {
        match self {
            ChannelKind::Sms => "sms",
            ChannelKind::Voice => "voice",
            ChannelKind::App => "app",
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Notification delivery status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

/// Situational risk level produced by the risk assessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl From<RiskLevel> for Priority {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::High => Priority::High,
            RiskLevel::Medium => Priority::Medium,
            RiskLevel::Low => Priority::Low,
        }
    }
}

/// Weather conditions recognized by the risk heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Overcast,
    LightRain,
    ModerateRain,
    HeavyRain,
    Rainstorm,
    Thunderstorm,
    Snow,
    Fog,
    Sandstorm,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 11] = [
        WeatherCondition::Clear,
        WeatherCondition::Cloudy,
        WeatherCondition::Overcast,
        WeatherCondition::LightRain,
        WeatherCondition::ModerateRain,
        WeatherCondition::HeavyRain,
        WeatherCondition::Rainstorm,
        WeatherCondition::Thunderstorm,
        WeatherCondition::Snow,
        WeatherCondition::Fog,
        WeatherCondition::Sandstorm,
    ];

    /// Additive risk contribution. Everything beyond clear/cloudy/overcast
    /// counts as adverse weather.
    pub fn risk_weight(&self) -> u32 {
        match self {
            WeatherCondition::Clear | WeatherCondition::Cloudy | WeatherCondition::Overcast => 0,
            _ => 1,
        }
    }
}

/// Category of a distress alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Fall,
    Medical,
    Fire,
    Security,
    Lost,
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One outbound message and its retry state.
///
/// Created by `Dispatcher::enqueue` and owned by the dispatcher from then on;
/// callers observe its fate only through statistics and delivery logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub recipient: String,
    pub message: String,
    pub priority: Priority,
    /// Registry name of the delivery channel ("sms", "voice", "app", ...).
    pub channel: String,
    pub retry_count: u32,
    /// Retry budget; once spent the notification is dropped for good.
    pub max_retries: u32,
    pub created_at: DateTime<Utc>,
    /// Stamped each time a failed attempt is rescheduled; None until then.
    pub last_retry_at: Option<DateTime<Utc>>,
    pub status: DeliveryStatus,
    pub error_message: Option<String>,
}

/// Outcome of a single delivery attempt, as kept in channel and dispatcher
/// logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub timestamp: DateTime<Utc>,
    pub channel: String,
    pub notification_id: u64,
    pub recipient: String,
    pub message: String,
    pub priority: Priority,
    pub success: bool,
    pub error: Option<String>,
}

/// Synthetic call placed by the voice channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub call_id: String,
    pub notification_id: u64,
    pub recipient: String,
    pub message: String,
    pub duration_secs: u32,
    pub status: String,
    pub called_at: DateTime<Utc>,
}

/// App push as it appears in the recipient's inbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRecord {
    pub push_id: String,
    pub notification_id: u64,
    pub recipient: String,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub pushed_at: DateTime<Utc>,
    pub read: bool,
}

/// A distress alert raised by (or on behalf of) a resident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistressAlert {
    pub id: Uuid,
    pub user_name: String,
    pub phone: String,
    /// Number the escalation notifications are addressed to.
    pub emergency_contact: String,
    pub location: GeoPoint,
    pub kind: AlertKind,
    pub description: String,
    pub reported_at: DateTime<Utc>,
}

/// One contributing factor of a risk assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub detail: String,
    pub weight: u32,
}

/// Result of scoring an alert's situation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub score: u32,
    pub factors: Vec<RiskFactor>,
    pub suggestions: Vec<String>,
    pub location: GeoPoint,
    pub weather: WeatherCondition,
    pub assessed_at: DateTime<Utc>,
}

/// A planned notification, ready to hand to `Dispatcher::enqueue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub recipient: String,
    pub message: String,
    pub priority: Priority,
    pub channel: ChannelKind,
}

/// Per-channel delivery counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ChannelStats {
    pub sent: u64,
    pub failed: u64,
}

/// Point-in-time dispatcher snapshot.
///
/// `total_sent` / `total_failed` are sums of the per-channel counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchStats {
    pub total_sent: u64,
    pub total_failed: u64,
    pub pending_high: usize,
    pub pending_low: usize,
    pub retrying: usize,
    pub channels: std::collections::BTreeMap<String, ChannelStats>,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Pending => write!(f, "pending"),
            DeliveryStatus::Sent => write!(f, "sent"),
            DeliveryStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::Fall => write!(f, "fall"),
            AlertKind::Medical => write!(f, "medical"),
            AlertKind::Fire => write!(f, "fire"),
            AlertKind::Security => write!(f, "security"),
            AlertKind::Lost => write!(f, "lost"),
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherCondition::Clear => write!(f, "clear"),
            WeatherCondition::Cloudy => write!(f, "cloudy"),
            WeatherCondition::Overcast => write!(f, "overcast"),
            WeatherCondition::LightRain => write!(f, "light_rain"),
            WeatherCondition::ModerateRain => write!(f, "moderate_rain"),
            WeatherCondition::HeavyRain => write!(f, "heavy_rain"),
            WeatherCondition::Rainstorm => write!(f, "rainstorm"),
            WeatherCondition::Thunderstorm => write!(f, "thunderstorm"),
            WeatherCondition::Snow => write!(f, "snow"),
            WeatherCondition::Fog => write!(f, "fog"),
            WeatherCondition::Sandstorm => write!(f, "sandstorm"),
        }
    }
}

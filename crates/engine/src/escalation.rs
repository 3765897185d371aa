//! Alert escalation policy.
//!
//! Expands one assessed distress alert into the notification requests its
//! risk level warrants: which channels, at what priority, with what text.
//! All requests are addressed to the resident's emergency contact.

use tracing::debug;

use vigil_common::types::{
    AlertKind, ChannelKind, DistressAlert, NotificationRequest, Priority, RiskAssessment,
    RiskLevel,
};

/// Maps risk levels to channel fan-out and composes the alert text.
#[derive(Clone)]
pub struct EscalationPolicy;

impl EscalationPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Plan the notification fan-out for an assessed alert.
    ///
    /// High risk reaches for every channel, voice first; medium drops the
    /// call; low is an app push only.
    pub fn plan(&self, alert: &DistressAlert, risk: &RiskAssessment) -> Vec<NotificationRequest> {
        let channels: &[ChannelKind] = match risk.level {
            RiskLevel::High => &[ChannelKind::Voice, ChannelKind::Sms, ChannelKind::App],
            RiskLevel::Medium => &[ChannelKind::Sms, ChannelKind::App],
            RiskLevel::Low => &[ChannelKind::App],
        };

        let priority = Priority::from(risk.level);
        let message = Self::compose_message(alert, risk);

        debug!(
            alert_id = %alert.id,
            risk = %risk.level,
            channels = channels.len(),
            "Escalation planned"
        );

        channels
            .iter()
            .map(|&channel| NotificationRequest {
                recipient: alert.emergency_contact.clone(),
                message: message.clone(),
                priority,
                channel,
            })
            .collect()
    }

    /// Build the human-readable alert text.
    fn compose_message(alert: &DistressAlert, risk: &RiskAssessment) -> String {
        let headline = match alert.kind {
            AlertKind::Fall => format!("{} has fallen and needs help", alert.user_name),
            AlertKind::Medical => format!("{} reports a medical emergency", alert.user_name),
            AlertKind::Fire => format!("Fire alarm raised at {}'s home", alert.user_name),
            AlertKind::Security => {
                format!("Suspicious person reported near {}'s home", alert.user_name)
            }
            AlertKind::Lost => format!("{} may be lost and cannot be reached", alert.user_name),
        };

        format!(
            "[{}] {}: {} (at {:.4}, {:.4})",
            risk.level.to_string().to_uppercase(),
            headline,
            alert.description,
            alert.location.lat,
            alert.location.lng
        )
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::new()
    }
}

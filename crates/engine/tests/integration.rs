//! Integration tests for the risk engine.
//!
//! Exercises the full assess → escalate pipeline: a distress alert plus
//! scene conditions go in, a channel fan-out of notification requests
//! comes out.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use vigil_common::types::{
    AlertKind, ChannelKind, DistressAlert, GeoPoint, Priority, RiskLevel, WeatherCondition,
};
use vigil_engine::{EscalationPolicy, RiskAssessor};

// ============================================================
// Shared helpers
// ============================================================

/// Open ground well away from any monitored waterway.
const REMOTE: GeoPoint = GeoPoint {
    lat: 40.5000,
    lng: 117.0000,
};

/// On the Yongding River bank.
const RIVERBANK: GeoPoint = GeoPoint {
    lat: 39.9100,
    lng: 116.4000,
};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
}

fn make_alert(kind: AlertKind, location: GeoPoint) -> DistressAlert {
    DistressAlert {
        id: Uuid::new_v4(),
        user_name: "Zhang Wei".to_string(),
        phone: "13800000000".to_string(),
        emergency_contact: "13922223333".to_string(),
        location,
        kind,
        description: "fall detected".to_string(),
        reported_at: Utc::now(),
    }
}

// ============================================================
// Assess → escalate pipeline
// ============================================================

#[test]
fn test_night_storm_on_riverbank_escalates_everywhere() {
    let assessor = RiskAssessor::new();
    let policy = EscalationPolicy::new();
    let alert = make_alert(AlertKind::Fall, RIVERBANK);

    let risk = assessor.assess(alert.location, at(23, 30), WeatherCondition::Rainstorm);
    assert_eq!(risk.level, RiskLevel::High);
    assert_eq!(risk.score, 4);
    assert_eq!(risk.factors.len(), 3);

    let requests = policy.plan(&alert, &risk);
    let channels: Vec<ChannelKind> = requests.iter().map(|r| r.channel).collect();
    assert_eq!(
        channels,
        vec![ChannelKind::Voice, ChannelKind::Sms, ChannelKind::App]
    );
    assert!(requests.iter().all(|r| r.priority == Priority::High));
    assert!(requests.iter().all(|r| r.recipient == "13922223333"));
    assert!(requests[0].message.contains("Zhang Wei has fallen"));
    assert!(requests[0].message.contains("fall detected"));
}

#[test]
fn test_calm_afternoon_stays_on_the_app() {
    let assessor = RiskAssessor::new();
    let policy = EscalationPolicy::new();
    let alert = make_alert(AlertKind::Lost, REMOTE);

    let risk = assessor.assess(alert.location, at(14, 0), WeatherCondition::Clear);
    assert_eq!(risk.level, RiskLevel::Low);
    assert_eq!(risk.score, 0);
    assert!(risk.factors.is_empty());

    let requests = policy.plan(&alert, &risk);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].channel, ChannelKind::App);
    assert_eq!(requests[0].priority, Priority::Low);
}

#[test]
fn test_waterway_alone_earns_a_text_message() {
    let assessor = RiskAssessor::new();
    let policy = EscalationPolicy::new();
    let alert = make_alert(AlertKind::Medical, RIVERBANK);

    let risk = assessor.assess(alert.location, at(10, 0), WeatherCondition::Clear);
    assert_eq!(risk.level, RiskLevel::Medium);
    assert_eq!(risk.score, 2);

    let requests = policy.plan(&alert, &risk);
    let channels: Vec<ChannelKind> = requests.iter().map(|r| r.channel).collect();
    assert_eq!(channels, vec![ChannelKind::Sms, ChannelKind::App]);
    assert!(requests.iter().all(|r| r.priority == Priority::Medium));
}

#[test]
fn test_high_risk_assessment_urges_immediate_contact() {
    let assessor = RiskAssessor::new();

    let risk = assessor.assess(RIVERBANK, at(23, 0), WeatherCondition::HeavyRain);
    assert_eq!(risk.level, RiskLevel::High);
    assert!(
        risk.suggestions
            .iter()
            .any(|s| s.contains("immediately")),
        "high risk should tell the contact to act now: {:?}",
        risk.suggestions
    );
}

#[test]
fn test_message_pinpoints_the_alert_location() {
    let assessor = RiskAssessor::new();
    let policy = EscalationPolicy::new();
    let alert = make_alert(AlertKind::Fire, RIVERBANK);

    let risk = assessor.assess(alert.location, at(12, 0), WeatherCondition::Clear);
    let requests = policy.plan(&alert, &risk);

    assert!(requests[0].message.contains("39.9100"));
    assert!(requests[0].message.contains("116.4000"));
}

//! Situational risk scoring.
//!
//! A pure in-memory heuristic over three signals: time of day, proximity to
//! a known waterway, and current weather. The resulting level is the
//! priority hint consumed by the escalation policy.

use chrono::{DateTime, Timelike, Utc};

use vigil_common::types::{GeoPoint, RiskAssessment, RiskFactor, RiskLevel, WeatherCondition};

/// Distance below which a location counts as waterway-adjacent, in meters.
const WATERWAY_THRESHOLD_METERS: f64 = 100.0;

/// Score at or above which the situation is high risk.
const HIGH_RISK_SCORE: u32 = 3;

/// Score at or above which the situation is medium risk.
const MEDIUM_RISK_SCORE: u32 = 2;

/// Mean Earth radius used by the haversine distance, in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

struct Waterway {
    name: &'static str,
    location: GeoPoint,
}

/// Waterway reference points watched for drowning/flood risk.
const WATERWAYS: &[Waterway] = &[
    Waterway {
        name: "Yongding River",
        location: GeoPoint {
            lat: 39.9100,
            lng: 116.4000,
        },
    },
    Waterway {
        name: "Chaobai River",
        location: GeoPoint {
            lat: 39.8900,
            lng: 116.4200,
        },
    },
    Waterway {
        name: "North Canal",
        location: GeoPoint {
            lat: 39.9200,
            lng: 116.3800,
        },
    },
    Waterway {
        name: "Juma River",
        location: GeoPoint {
            lat: 39.8800,
            lng: 116.4500,
        },
    },
];

/// Great-circle distance between two points in meters.
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Stateless risk scoring engine.
pub struct RiskAssessor;

impl RiskAssessor {
    pub fn new() -> Self {
        Self
    }

    /// Score a location at a point in time under the given weather.
    ///
    /// Night hours add 1, waterway proximity adds 2, adverse weather adds 1.
    /// Score >= 3 is high risk, >= 2 medium, anything below low.
    pub fn assess(
        &self,
        location: GeoPoint,
        at: DateTime<Utc>,
        weather: WeatherCondition,
    ) -> RiskAssessment {
        let mut score = 0;
        let mut factors = Vec::new();
        let mut suggestions = Vec::new();

        if Self::is_night(at) {
            score += 1;
            factors.push(RiskFactor {
                name: "night hours".to_string(),
                detail: format!(
                    "{} falls within night hours (22:00-06:00)",
                    at.format("%H:%M")
                ),
                weight: 1,
            });
            suggestions.push("Carry a light after dark and avoid going out alone".to_string());
        }

        if let Some(waterway) = Self::waterway_nearby(location) {
            score += 2;
            factors.push(RiskFactor {
                name: "near waterway".to_string(),
                detail: format!("within 100m of {}", waterway.name),
                weight: 2,
            });
            suggestions
                .push("Stay clear of the riverbank and mind slippery ground".to_string());
        }

        let weather_weight = weather.risk_weight();
        if weather_weight > 0 {
            score += weather_weight;
            factors.push(RiskFactor {
                name: "adverse weather".to_string(),
                detail: format!("current weather: {weather}"),
                weight: weather_weight,
            });
            suggestions.push(
                "Limit time outdoors in adverse weather, keep warm and watch your step"
                    .to_string(),
            );
        }

        let level = if score >= HIGH_RISK_SCORE {
            suggestions.push("Contact family or rescue services immediately".to_string());
            RiskLevel::High
        } else if score >= MEDIUM_RISK_SCORE {
            suggestions.push("Stay alert and be ready to call for help".to_string());
            RiskLevel::Medium
        } else {
            suggestions.push("Stay safe and keep your phone reachable".to_string());
            RiskLevel::Low
        };

        RiskAssessment {
            level,
            score,
            factors,
            suggestions,
            location,
            weather,
            assessed_at: at,
        }
    }

    /// Night runs from 22:00 through 06:00 inclusive.
    fn is_night(at: DateTime<Utc>) -> bool {
        let secs = at.time().num_seconds_from_midnight();
        secs >= 22 * 3600 || secs <= 6 * 3600
    }

    /// First watched waterway within the proximity threshold, if any.
    fn waterway_nearby(location: GeoPoint) -> Option<&'static Waterway> {
        WATERWAYS
            .iter()
            .find(|w| haversine_meters(location, w.location) <= WATERWAY_THRESHOLD_METERS)
    }
}

impl Default for RiskAssessor {
    fn default() -> Self {
        Self::new()
    }
}

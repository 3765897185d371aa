//! Fabricates plausible distress alerts for demo and soak runs.

use chrono::Utc;
use rand::RngExt;
use rand::seq::IndexedRandom;
use uuid::Uuid;

use vigil_common::types::{AlertKind, DistressAlert, GeoPoint, WeatherCondition};

/// A patrol area alerts are scattered over.
struct Village {
    name: &'static str,
    lat_range: (f64, f64),
    lng_range: (f64, f64),
}

const VILLAGES: &[Village] = &[
    Village {
        name: "East Village",
        lat_range: (39.90, 39.92),
        lng_range: (116.40, 116.42),
    },
    Village {
        name: "West Village",
        lat_range: (39.88, 39.90),
        lng_range: (116.38, 116.40),
    },
    Village {
        name: "South Village",
        lat_range: (39.86, 39.88),
        lng_range: (116.40, 116.42),
    },
    Village {
        name: "North Village",
        lat_range: (39.92, 39.94),
        lng_range: (116.38, 116.40),
    },
];

/// A registered resident with a reachable emergency contact.
struct Resident {
    name: &'static str,
    phone: &'static str,
    emergency_contact: &'static str,
}

const RESIDENTS: &[Resident] = &[
    Resident {
        name: "Zhang Guilan",
        phone: "13800010001",
        emergency_contact: "13900010001",
    },
    Resident {
        name: "Li Jianguo",
        phone: "13800010002",
        emergency_contact: "13900010002",
    },
    Resident {
        name: "Wang Xiuying",
        phone: "13800010003",
        emergency_contact: "13900010003",
    },
    Resident {
        name: "Liu Fugui",
        phone: "13800010004",
        emergency_contact: "13900010004",
    },
    Resident {
        name: "Chen Yulan",
        phone: "13800010005",
        emergency_contact: "13900010005",
    },
];

/// Incident scripts paired with the alert kind each one reports.
const INCIDENTS: &[(AlertKind, &str)] = &[
    (AlertKind::Fall, "fall detected, unable to get up"),
    (AlertKind::Medical, "sudden illness, first aid needed"),
    (AlertKind::Fire, "smoke reported inside the house"),
    (AlertKind::Security, "suspicious person at the door"),
    (AlertKind::Lost, "wandered off, cannot find the way home"),
    (AlertKind::Medical, "sudden heart attack"),
    (AlertKind::Fire, "gas leak suspected in the kitchen"),
    (AlertKind::Medical, "electric shock accident"),
    (AlertKind::Medical, "sudden fainting spell"),
];

/// Random but plausible distress alerts, one per call.
pub struct AlertGenerator;

impl AlertGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Fabricate one alert: a random resident at a random spot inside one
    /// of the patrol villages, with a random incident and scene weather.
    pub fn next_alert(&self) -> (DistressAlert, WeatherCondition) {
        let mut rng = rand::rng();

        let resident = RESIDENTS.choose(&mut rng).unwrap_or(&RESIDENTS[0]);
        let village = VILLAGES.choose(&mut rng).unwrap_or(&VILLAGES[0]);
        let (kind, description) = INCIDENTS.choose(&mut rng).copied().unwrap_or(INCIDENTS[0]);
        let weather = WeatherCondition::ALL
            .choose(&mut rng)
            .copied()
            .unwrap_or(WeatherCondition::Clear);

        let location = GeoPoint {
            lat: rng.random_range(village.lat_range.0..village.lat_range.1),
            lng: rng.random_range(village.lng_range.0..village.lng_range.1),
        };

        let alert = DistressAlert {
            id: Uuid::new_v4(),
            user_name: resident.name.to_string(),
            phone: resident.phone.to_string(),
            emergency_contact: resident.emergency_contact.to_string(),
            location,
            kind,
            description: format!("{} ({})", description, village.name),
            reported_at: Utc::now(),
        };

        (alert, weather)
    }
}

impl Default for AlertGenerator {
    fn default() -> Self {
        Self::new()
    }
}

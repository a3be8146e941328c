//! Fix model - wire records and validated position fixes.

use geo::Point;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The raw record as the realtime backend stores it under
/// `shares/{id}/location`.
///
/// Every field is optional on the wire: publishers with a degraded GPS fix
/// omit what they don't have, and a half-written record must not take the
/// view down. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixRecord {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Estimated accuracy radius in meters
    pub accuracy: Option<f64>,
    /// Ground speed in meters per second
    pub speed: Option<f64>,
    /// Compass bearing in degrees; any real value, normalized on display
    pub bearing: Option<f64>,
    /// Publisher's clock, epoch milliseconds
    pub timestamp: Option<i64>,
}

impl FixRecord {
    /// Interprets an opaque stream payload as a fix record.
    ///
    /// A payload that is not a JSON object (or carries wrongly-typed
    /// fields) yields `None` — indistinguishable from "no data yet",
    /// which is exactly how the reconciler treats it.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Whether both coordinates are present.
    pub fn has_position(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }

    /// Validates the record into a [`Fix`].
    ///
    /// A record missing either coordinate is not an error, it is "not yet
    /// available" — hence `Option`, not `Result`.
    pub fn validate(&self) -> Option<Fix> {
        let (lat, lng) = (self.lat?, self.lng?);
        Some(Fix {
            // geo convention: x = longitude, y = latitude
            position: Point::new(lng, lat),
            accuracy_m: self.accuracy,
            speed_mps: self.speed,
            bearing_deg: self.bearing,
            timestamp_ms: self.timestamp,
        })
    }
}

/// One validated position sample. The position is guaranteed present;
/// everything else stays optional and is rendered as unknown when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub position: Point<f64>,
    pub accuracy_m: Option<f64>,
    pub speed_mps: Option<f64>,
    pub bearing_deg: Option<f64>,
    pub timestamp_ms: Option<i64>,
}

impl Fix {
    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.position.y()
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.position.x()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_record_validates() {
        let value = json!({
            "lat": 19.4326,
            "lng": -99.1332,
            "accuracy": 12.5,
            "speed": 1.4,
            "bearing": 270.0,
            "timestamp": 1700000000000i64,
        });

        let fix = FixRecord::from_value(&value).unwrap().validate().unwrap();
        assert_eq!(fix.latitude(), 19.4326);
        assert_eq!(fix.longitude(), -99.1332);
        assert_eq!(fix.accuracy_m, Some(12.5));
        assert_eq!(fix.timestamp_ms, Some(1_700_000_000_000));
    }

    #[test]
    fn test_missing_coordinate_is_invalid() {
        let no_lng = FixRecord {
            lat: Some(19.4),
            ..Default::default()
        };
        assert!(!no_lng.has_position());
        assert!(no_lng.validate().is_none());

        let no_lat = FixRecord {
            lng: Some(-99.1),
            ..Default::default()
        };
        assert!(no_lat.validate().is_none());
    }

    #[test]
    fn test_optional_fields_default_absent() {
        let value = json!({"lat": 1.0, "lng": 2.0});
        let fix = FixRecord::from_value(&value).unwrap().validate().unwrap();
        assert_eq!(fix.accuracy_m, None);
        assert_eq!(fix.speed_mps, None);
        assert_eq!(fix.bearing_deg, None);
        assert_eq!(fix.timestamp_ms, None);
    }

    #[test]
    fn test_non_object_payloads_rejected() {
        assert!(FixRecord::from_value(&json!(null)).is_none());
        assert!(FixRecord::from_value(&json!("corrupt")).is_none());
        assert!(FixRecord::from_value(&json!([1, 2])).is_none());
        // Wrongly-typed field poisons the whole record
        assert!(FixRecord::from_value(&json!({"lat": "19.4", "lng": -99.1})).is_none());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let value = json!({"lat": 1.0, "lng": 2.0, "battery": 88, "provider": "gps"});
        assert!(FixRecord::from_value(&value).unwrap().has_position());
    }
}

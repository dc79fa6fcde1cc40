//! activity.raw_event.v1 schema definition
//!
//! A flat, source-agnostic record for one timestamped activity observation.
//! Export tools (Apple Health, fitness trackers) emit many of these per day;
//! the calendar core only needs the category, the timestamp and the value.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Current schema version
pub const SCHEMA_VERSION: &str = "activity.raw_event.v1";

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// Activity quantity an event measures
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    #[serde(alias = "HKQuantityTypeIdentifierStepCount")]
    StepCount,
    #[serde(alias = "HKQuantityTypeIdentifierDistanceWalkingRunning")]
    DistanceWalkingRunning,
    #[serde(alias = "HKQuantityTypeIdentifierFlightsClimbed")]
    FlightsClimbed,
    #[serde(alias = "HKQuantityTypeIdentifierActiveEnergyBurned")]
    ActiveEnergyBurned,
    /// For quantities without a dedicated variant
    #[serde(untagged)]
    Custom(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::StepCount => "step_count",
            Category::DistanceWalkingRunning => "distance_walking_running",
            Category::FlightsClimbed => "flights_climbed",
            Category::ActiveEnergyBurned => "active_energy_burned",
            Category::Custom(name) => name.as_str(),
        }
    }

    /// Resolve a category from its snake_case name or export identifier.
    pub fn from_name(name: &str) -> Category {
        match name.trim() {
            "step_count" | "steps" | "HKQuantityTypeIdentifierStepCount" => Category::StepCount,
            "distance_walking_running" | "HKQuantityTypeIdentifierDistanceWalkingRunning" => {
                Category::DistanceWalkingRunning
            }
            "flights_climbed" | "HKQuantityTypeIdentifierFlightsClimbed" => {
                Category::FlightsClimbed
            }
            "active_energy_burned" | "HKQuantityTypeIdentifierActiveEnergyBurned" => {
                Category::ActiveEnergyBurned
            }
            other => Category::Custom(other.to_string()),
        }
    }
}

/// Measurement unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Count,
    Meters,
    Kilometers,
    Kcal,
    /// For extensibility
    #[serde(untagged)]
    Custom(String),
}

/// Timestamp (de)serialization accepting the forms exporters actually produce.
///
/// Written back out as RFC 3339 with the original offset preserved.
pub mod timestamp_format {
    use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::error::CalendarError;

    /// `2024-01-15 08:30:00 +0800`
    const EXPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";
    /// `2024-01-15 08:30:00`, read as UTC
    const NAIVE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn parse(raw: &str) -> Result<DateTime<FixedOffset>, CalendarError> {
        let trimmed = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(ts);
        }
        if let Ok(ts) = DateTime::parse_from_str(trimmed, EXPORT_FORMAT) {
            return Ok(ts);
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, NAIVE_FORMAT) {
            return Ok(Utc.from_utc_datetime(&naive).into());
        }
        Err(CalendarError::DateParseError(format!(
            "unrecognised timestamp '{}'",
            trimmed
        )))
    }

    pub fn serialize<S>(ts: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// The activity.raw_event.v1 record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    /// Schema version identifier
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Unique event identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Quantity measured
    pub category: Category,
    /// When the observation was recorded, in the recorder's own offset
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<FixedOffset>,
    /// Observed amount
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    /// Recording device or app
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl RawEvent {
    /// Create a new event with a generated id
    pub fn new(category: Category, timestamp: DateTime<FixedOffset>, value: f64) -> Self {
        RawEvent {
            schema_version: SCHEMA_VERSION.to_string(),
            event_id: Some(uuid::Uuid::new_v4().to_string()),
            category,
            timestamp,
            value,
            unit: None,
            source: None,
        }
    }

    /// Create a step-count event
    pub fn steps(timestamp: DateTime<FixedOffset>, value: f64) -> Self {
        RawEvent::new(Category::StepCount, timestamp, value).with_unit(Unit::Count)
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Calendar day the event counts toward: the date as written in the
    /// event's own offset, with the time of day dropped.
    pub fn calendar_day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Validate the event schema
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ValidationError::InvalidSchemaVersion {
                expected: SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }

        if !self.value.is_finite() {
            return Err(ValidationError::NonFiniteValue);
        }

        if self.value < 0.0 {
            return Err(ValidationError::NegativeValue { value: self.value });
        }

        Ok(())
    }
}

/// Validation errors for raw events
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Value is not a finite number")]
    NonFiniteValue,

    #[error("Value must not be negative, got {value}")]
    NegativeValue { value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_deserialize_rfc3339_event() {
        let json = r#"{
            "schema_version": "activity.raw_event.v1",
            "category": "step_count",
            "timestamp": "2024-01-15T08:30:00+08:00",
            "value": 412
        }"#;

        let event: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.category, Category::StepCount);
        assert_eq!(event.value, 412.0);
        assert_eq!(event.timestamp.hour(), 8);
        assert_eq!(event.calendar_day(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_deserialize_export_identifier_and_timestamp() {
        let json = r#"{
            "category": "HKQuantityTypeIdentifierStepCount",
            "timestamp": "2023-10-01 23:59:10 +0800",
            "value": 35
        }"#;

        let event: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.category, Category::StepCount);
        assert_eq!(event.schema_version, SCHEMA_VERSION);
        // Late-evening local time stays on its own calendar day
        assert_eq!(event.calendar_day(), NaiveDate::from_ymd_opt(2023, 10, 1).unwrap());
    }

    #[test]
    fn test_naive_timestamp_is_read_as_utc() {
        let ts = timestamp_format::parse("2024-02-29 00:00:01").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 0);
        assert_eq!(ts.day(), 29);
    }

    #[test]
    fn test_unparseable_timestamp() {
        let json = r#"{"category": "step_count", "timestamp": "yesterday", "value": 1}"#;
        assert!(serde_json::from_str::<RawEvent>(json).is_err());
    }

    #[test]
    fn test_custom_category() {
        let json = r#"{"category": "swim_strokes", "timestamp": "2024-01-15T08:30:00Z", "value": 1}"#;
        let event: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.category, Category::Custom("swim_strokes".to_string()));
        assert_eq!(event.category.as_str(), "swim_strokes");
    }

    #[test]
    fn test_category_default_is_steps() {
        assert_eq!(Category::default(), Category::StepCount);
    }

    #[test]
    fn test_category_from_name() {
        assert_eq!(Category::from_name("steps"), Category::StepCount);
        assert_eq!(
            Category::from_name("HKQuantityTypeIdentifierFlightsClimbed"),
            Category::FlightsClimbed
        );
        assert_eq!(
            Category::from_name("heart_rate"),
            Category::Custom("heart_rate".to_string())
        );
    }

    #[test]
    fn test_serialize_keeps_offset() {
        let ts = timestamp_format::parse("2024-01-15 08:30:00 +0800").unwrap();
        let event = RawEvent::steps(ts, 100.0).with_source("Watch");
        let json = serde_json::to_string(&event).unwrap();

        assert!(json.contains("activity.raw_event.v1"));
        assert!(json.contains("2024-01-15T08:30:00+08:00"));
        assert!(json.contains("\"unit\":\"count\""));
        assert!(json.contains("Watch"));
    }

    #[test]
    fn test_validation() {
        let ts = timestamp_format::parse("2024-01-15T08:30:00Z").unwrap();
        assert!(RawEvent::steps(ts, 10.0).validate().is_ok());

        let negative = RawEvent::steps(ts, -1.0);
        assert!(matches!(
            negative.validate(),
            Err(ValidationError::NegativeValue { .. })
        ));

        let mut wrong_version = RawEvent::steps(ts, 1.0);
        wrong_version.schema_version = "wear.raw_event.v1".to_string();
        assert!(matches!(
            wrong_version.validate(),
            Err(ValidationError::InvalidSchemaVersion { .. })
        ));

        assert!(matches!(
            RawEvent::steps(ts, f64::NAN).validate(),
            Err(ValidationError::NonFiniteValue)
        ));
    }
}

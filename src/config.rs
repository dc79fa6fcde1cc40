//! Calendar configuration
//!
//! Settings that shape a pipeline run. Every field has a default, so a config
//! file only needs the keys it changes.

use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::months::DEFAULT_MAX_SPAN;
use crate::schema::Category;
use crate::types::WeekStart;

/// Upper limit accepted for `max_span`
pub const MAX_SPAN_LIMIT: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Event category aggregated into the calendar
    pub category: Category,
    /// Cap on week windows covered by one month label
    pub max_span: usize,
    /// First weekday row of the rendered grid
    pub week_start: WeekStart,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            category: Category::StepCount,
            max_span: DEFAULT_MAX_SPAN,
            week_start: WeekStart::Sunday,
        }
    }
}

impl CalendarConfig {
    /// Load and validate a config from JSON
    pub fn from_json(json: &str) -> Result<Self, CalendarError> {
        let config: CalendarConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, CalendarError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), CalendarError> {
        if !(1..=MAX_SPAN_LIMIT).contains(&self.max_span) {
            return Err(CalendarError::InvalidConfig(format!(
                "max_span must be between 1 and {}, got {}",
                MAX_SPAN_LIMIT, self.max_span
            )));
        }
        if self.category.as_str().is_empty() {
            return Err(CalendarError::InvalidConfig(
                "category must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_max_span(mut self, max_span: usize) -> Self {
        self.max_span = max_span;
        self
    }

    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CalendarConfig::default();
        assert_eq!(config.category, Category::StepCount);
        assert_eq!(config.max_span, 4);
        assert_eq!(config.week_start, WeekStart::Sunday);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CalendarConfig::from_json(r#"{"week_start": "monday"}"#).unwrap();
        assert_eq!(config.week_start, WeekStart::Monday);
        assert_eq!(config.max_span, 4);
    }

    #[test]
    fn test_category_alias_in_config() {
        let config =
            CalendarConfig::from_json(r#"{"category": "HKQuantityTypeIdentifierFlightsClimbed"}"#)
                .unwrap();
        assert_eq!(config.category, Category::FlightsClimbed);
    }

    #[test]
    fn test_invalid_max_span() {
        let result = CalendarConfig::from_json(r#"{"max_span": 0}"#);
        assert!(matches!(result, Err(CalendarError::InvalidConfig(_))));

        let result = CalendarConfig::default().with_max_span(40).validate();
        assert!(matches!(result, Err(CalendarError::InvalidConfig(_))));
    }

    #[test]
    fn test_round_trip() {
        let config = CalendarConfig::default()
            .with_category(Category::ActiveEnergyBurned)
            .with_max_span(5)
            .with_week_start(WeekStart::Monday);
        let back = CalendarConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }
}

//! Core types for the Step Calendar pipeline
//!
//! These are the values that flow between stages: per-day data points, their
//! intensity levels, month header groups and the final render model.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::weeks::WeekBuckets;

/// Intensity level of a day, 1 (lowest) to 5 (highest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const MIN: Level = Level(1);
    pub const MAX: Level = Level(5);

    pub fn new(value: u8) -> Result<Level, CalendarError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Level(value))
        } else {
            Err(CalendarError::InvalidLevel(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based heatmap shade index (level 1 → 0)
    pub fn intensity(self) -> u8 {
        self.0 - 1
    }
}

impl TryFrom<u8> for Level {
    type Error = CalendarError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Level::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.0
    }
}

/// Odd/even month flag used for alternating month striping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthParity {
    Odd,
    Even,
}

/// First row of the rendered grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Monday,
    #[default]
    Sunday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }
}

/// Calendar date (de)serialization: `YYYY-MM-DD` out, `YYYY-MM-DD` or `YYYY/M/D` in.
pub mod day_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::error::CalendarError;

    const ISO_FORMAT: &str = "%Y-%m-%d";
    const SLASH_FORMAT: &str = "%Y/%m/%d";

    pub fn parse(raw: &str) -> Result<NaiveDate, CalendarError> {
        let trimmed = raw.trim();
        NaiveDate::parse_from_str(trimmed, ISO_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(trimmed, SLASH_FORMAT))
            .map_err(|e| CalendarError::DateParseError(format!("'{}': {}", trimmed, e)))
    }

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(ISO_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// One calendar day with its summed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayDatum {
    /// Legacy snapshots store this as `dt`
    #[serde(alias = "dt", with = "day_format")]
    pub date: NaiveDate,
    pub value: f64,
    /// Unset until the series has been classified
    #[serde(default)]
    pub level: Option<Level>,
}

impl DayDatum {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        DayDatum {
            date,
            value,
            level: None,
        }
    }

    /// Zero-value placeholder for a day with no recorded events
    pub fn synthetic(date: NaiveDate) -> Self {
        DayDatum::new(date, 0.0)
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn month_parity(&self) -> MonthParity {
        if self.date.month() % 2 == 1 {
            MonthParity::Odd
        } else {
            MonthParity::Even
        }
    }
}

/// Four ascending thresholds separating the five levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundaries(pub [f64; 4]);

impl Boundaries {
    /// Level for a value: the first boundary it does not exceed, else 5.
    pub fn level_for(&self, value: f64) -> Level {
        let rank = self
            .0
            .iter()
            .position(|boundary| value <= *boundary)
            .unwrap_or(self.0.len());
        Level(rank as u8 + 1)
    }
}

/// Month header label covering `span` consecutive week windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSpanGroup {
    /// First day of the run
    #[serde(with = "day_format")]
    pub label: NaiveDate,
    /// Number of week windows the label covers (1..=max span)
    pub span: usize,
    /// Month number of every day in the window that closed this group
    pub diagnostic_months: Vec<u32>,
}

/// Aggregate facts about a finished series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarSummary {
    pub total_days: usize,
    /// Days with a non-zero value
    pub active_days: usize,
    pub total_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_day: Option<DayDatum>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "optional_day")]
    pub first_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "optional_day")]
    pub last_date: Option<NaiveDate>,
}

mod optional_day {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => super::day_format::serialize(d, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| super::day_format::parse(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Everything a renderer needs, produced by one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct CalendarModel {
    /// Continuous, classified day series
    pub days: Vec<DayDatum>,
    /// Days grouped into weekday lanes
    pub weeks: WeekBuckets,
    /// Month header groups in chronological order
    pub months: Vec<MonthSpanGroup>,
    /// Quantile cut points, absent for an empty model
    pub boundaries: Option<Boundaries>,
    pub summary: CalendarSummary,
}

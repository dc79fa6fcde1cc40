//! Pipeline orchestration
//!
//! This module provides the public API for Step Calendar.
//! It runs raw events through every stage and returns a `CalendarModel`,
//! which is the only state a caller needs to keep.

use log::{info, warn};

use crate::aggregator::{DailyAggregator, EventFilter};
use crate::classifier::LevelClassifier;
use crate::config::CalendarConfig;
use crate::error::CalendarError;
use crate::gap_filler::{check_continuity, GapFiller};
use crate::months::MonthSpanner;
use crate::schema::{RawEvent, RawEventAdapter};
use crate::snapshot;
use crate::types::{CalendarModel, CalendarSummary, DayDatum};
use crate::weeks::{WeekBucketer, WeekBuckets};

/// Build a calendar from raw events.
///
/// Pipeline stages:
/// 1. DailyAggregator - Sum accepted events per calendar day
/// 2. GapFiller - Sort and fill missing days with zeros
/// 3. LevelClassifier - Assign quantile levels
/// 4. WeekBucketer / MonthSpanner - Derive grid lanes and month headers
///
/// Nothing accepted by `predicate` yields an empty model, not an error.
pub fn build_calendar<F>(
    events: &[RawEvent],
    predicate: F,
    config: &CalendarConfig,
) -> Result<CalendarModel, CalendarError>
where
    F: Fn(&RawEvent) -> bool,
{
    config.validate()?;

    // Stage 1: Aggregate per day
    let series = DailyAggregator::daily_series(events, predicate);
    if series.is_empty() {
        info!("no matching events, nothing to render");
        return Ok(CalendarModel::empty());
    }

    // Stage 2: Fill gaps
    let continuous = GapFiller::fill(&series)?;

    // Stages 3-4
    let model = CalendarModel::from_continuous(&continuous, config)?;
    info!(
        "calendar built: {} days ({} active), {} month headers",
        model.summary.total_days,
        model.summary.active_days,
        model.months.len()
    );
    Ok(model)
}

impl CalendarModel {
    /// Model with nothing to render
    pub fn empty() -> Self {
        CalendarModel {
            days: Vec::new(),
            weeks: WeekBuckets::default(),
            months: Vec::new(),
            boundaries: None,
            summary: CalendarSummary::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Rebuild a model from a previously saved series.
    ///
    /// Aggregation is skipped. A series that is not continuous is repaired with
    /// the gap filler and a warning is logged.
    pub fn from_restored(
        days: Vec<DayDatum>,
        config: &CalendarConfig,
    ) -> Result<CalendarModel, CalendarError> {
        config.validate()?;

        if days.is_empty() {
            return Ok(CalendarModel::empty());
        }

        let issues = check_continuity(&days);
        if issues.is_empty() {
            return CalendarModel::from_continuous(&days, config);
        }

        warn!(
            "restored series has {} continuity issues, refilling",
            issues.len()
        );
        let repaired = GapFiller::fill(&days)?;
        CalendarModel::from_continuous(&repaired, config)
    }

    fn from_continuous(
        days: &[DayDatum],
        config: &CalendarConfig,
    ) -> Result<CalendarModel, CalendarError> {
        let (classified, boundaries) = LevelClassifier::classify(days);
        let weeks = WeekBucketer::bucket(&classified);
        let months = MonthSpanner::new(config.max_span)?.spans(&classified);
        let summary = summarize(&classified);

        Ok(CalendarModel {
            days: classified,
            weeks,
            months,
            boundaries,
            summary,
        })
    }

    /// Day series in snapshot form
    pub fn to_snapshot(&self) -> Result<String, CalendarError> {
        snapshot::to_json(&self.days)
    }
}

fn summarize(days: &[DayDatum]) -> CalendarSummary {
    let best_day = days
        .iter()
        .filter(|d| d.value > 0.0)
        .max_by(|a, b| a.value.total_cmp(&b.value).then(b.date.cmp(&a.date)))
        .cloned();

    CalendarSummary {
        total_days: days.len(),
        active_days: days.iter().filter(|d| d.value > 0.0).count(),
        total_value: days.iter().map(|d| d.value).sum(),
        best_day,
        first_date: days.first().map(|d| d.date),
        last_date: days.last().map(|d| d.date),
    }
}

/// Processor bound to one configuration.
///
/// Holds no calendar state; every call returns a fresh model.
#[derive(Debug, Clone, Default)]
pub struct CalendarProcessor {
    config: CalendarConfig,
}

impl CalendarProcessor {
    /// Create a processor with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor with a validated config
    pub fn with_config(config: CalendarConfig) -> Result<Self, CalendarError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    /// Build a calendar from events of the configured category
    pub fn process_events(&self, events: &[RawEvent]) -> Result<CalendarModel, CalendarError> {
        build_calendar(
            events,
            EventFilter::category(self.config.category.clone()),
            &self.config,
        )
    }

    /// Build a calendar from a JSON array of events
    pub fn process_json(&self, json: &str) -> Result<CalendarModel, CalendarError> {
        let events = RawEventAdapter::parse_array(json)?;
        self.process_events(&events)
    }

    /// Build a calendar from NDJSON events
    pub fn process_ndjson(&self, ndjson: &str) -> Result<CalendarModel, CalendarError> {
        let events = RawEventAdapter::parse_ndjson(ndjson)?;
        self.process_events(&events)
    }

    /// Rebuild a calendar from a saved snapshot
    pub fn restore_snapshot(&self, json: &str) -> Result<CalendarModel, CalendarError> {
        let days = snapshot::from_json(json)?;
        CalendarModel::from_restored(days, &self.config)
    }
}

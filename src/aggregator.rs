//! Daily aggregation
//!
//! Collapses raw timestamped events into one summed value per calendar day.
//! Which events count is decided by a caller-supplied predicate.

use chrono::NaiveDate;
use log::debug;
use std::collections::HashMap;

use crate::schema::{Category, RawEvent};
use crate::types::DayDatum;

/// Ready-made event predicates
pub struct EventFilter;

impl EventFilter {
    /// Keep events of one category
    pub fn category(category: Category) -> impl Fn(&RawEvent) -> bool {
        move |event| event.category == category
    }

    /// Keep events whose category is in the list
    pub fn any_of(categories: Vec<Category>) -> impl Fn(&RawEvent) -> bool {
        move |event| categories.contains(&event.category)
    }

    /// Keep everything
    pub fn any() -> impl Fn(&RawEvent) -> bool {
        |_| true
    }
}

/// Aggregator from raw events to per-day totals
pub struct DailyAggregator;

impl DailyAggregator {
    /// Sum the values of every accepted event by calendar day.
    ///
    /// An empty result means nothing matched; it is not an error.
    pub fn aggregate<F>(events: &[RawEvent], predicate: F) -> HashMap<NaiveDate, f64>
    where
        F: Fn(&RawEvent) -> bool,
    {
        let mut totals: HashMap<NaiveDate, f64> = HashMap::new();
        let mut accepted = 0usize;

        for event in events.iter().filter(|e| predicate(e)) {
            *totals.entry(event.calendar_day()).or_insert(0.0) += event.value;
            accepted += 1;
        }

        debug!(
            "aggregated {} of {} events into {} days",
            accepted,
            events.len(),
            totals.len()
        );

        totals
    }

    /// Turn a day→total mapping into a date-ordered series
    pub fn into_series(totals: HashMap<NaiveDate, f64>) -> Vec<DayDatum> {
        let mut series: Vec<DayDatum> = totals
            .into_iter()
            .map(|(date, value)| DayDatum::new(date, value))
            .collect();
        series.sort_by_key(|day| day.date);
        series
    }

    /// `aggregate` followed by `into_series`
    pub fn daily_series<F>(events: &[RawEvent], predicate: F) -> Vec<DayDatum>
    where
        F: Fn(&RawEvent) -> bool,
    {
        Self::into_series(Self::aggregate(events, predicate))
    }
}

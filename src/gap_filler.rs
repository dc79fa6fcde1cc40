//! Gap filling
//!
//! Expands a sparse day series into a contiguous one, inserting zero-value days
//! for every calendar day that had no events.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::Serialize;

use crate::error::CalendarError;
use crate::types::DayDatum;

/// Kind of continuity break between two neighbouring entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuityIssueKind {
    /// One or more days missing between the pair
    Gap,
    /// The same date twice
    Duplicate,
    /// The later entry is earlier than the previous one
    OutOfOrder,
}

/// A break in day-to-day continuity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContinuityIssue {
    pub previous: NaiveDate,
    pub next: NaiveDate,
    pub kind: ContinuityIssueKind,
}

/// Report every neighbouring pair that is not exactly one day apart.
pub fn check_continuity(series: &[DayDatum]) -> Vec<ContinuityIssue> {
    series
        .windows(2)
        .filter_map(|pair| {
            let (previous, next) = (pair[0].date, pair[1].date);
            let kind = match (next - previous).num_days() {
                1 => return None,
                0 => ContinuityIssueKind::Duplicate,
                d if d < 0 => ContinuityIssueKind::OutOfOrder,
                _ => ContinuityIssueKind::Gap,
            };
            Some(ContinuityIssue {
                previous,
                next,
                kind,
            })
        })
        .collect()
}

pub fn is_continuous(series: &[DayDatum]) -> bool {
    check_continuity(series).is_empty()
}

/// Gap filler for day series
pub struct GapFiller;

impl GapFiller {
    /// Build a new series covering every day from the first to the last input day.
    ///
    /// The input may be unsorted; it is left untouched. Entries sharing a date are
    /// merged by summing their values and lose any level. Missing days are inserted with value 0 and
    /// no level. Existing levels are carried over unchanged, so filling an already
    /// continuous series returns it as-is.
    pub fn fill(series: &[DayDatum]) -> Result<Vec<DayDatum>, CalendarError> {
        if series.is_empty() {
            return Err(CalendarError::EmptySeries);
        }

        let mut sorted = series.to_vec();
        sorted.sort_by_key(|day| day.date);

        let mut filled: Vec<DayDatum> = Vec::with_capacity(sorted.len());
        let mut inserted = 0usize;

        for day in sorted {
            if let Some(last) = filled.last_mut() {
                if last.date == day.date {
                    debug!("merging duplicate entry for {}", day.date);
                    last.value += day.value;
                    last.level = None;
                    continue;
                }

                let missing: Vec<DayDatum> = last
                    .date
                    .iter_days()
                    .skip(1)
                    .take_while(|date| *date < day.date)
                    .map(DayDatum::synthetic)
                    .collect();
                inserted += missing.len();
                filled.extend(missing);
            }
            filled.push(day);
        }

        debug!(
            "gap filling inserted {} days, series now {} days",
            inserted,
            filled.len()
        );

        for issue in check_continuity(&filled) {
            warn!(
                "day series not continuous after filling: {:?} between {} and {}",
                issue.kind, issue.previous, issue.next
            );
        }

        Ok(filled)
    }
}

//! Month header spanning
//!
//! Walks the series one week window (7 consecutive days) at a time and groups
//! consecutive windows of the same month into header labels.
//!
//! Rules, applied per window in order:
//! - a window whose first day falls in a different (year, month) than the open
//!   run closes that run first;
//! - the window joins the open run (or starts one labelled with its first day);
//! - a window that straddles two months closes the run it joined, so the
//!   transition week sits under the earlier month;
//! - a run that reaches the span cap is closed.
//!
//! Whatever is still open after the last (possibly partial) window is emitted,
//! so the spans always add up to the number of windows.

use chrono::{Datelike, NaiveDate};
use log::debug;

use crate::error::CalendarError;
use crate::types::{DayDatum, MonthSpanGroup};

/// Days per window
pub const WEEK_WINDOW: usize = 7;

/// Default cap on how many windows one label may cover
pub const DEFAULT_MAX_SPAN: usize = 4;

struct OpenRun {
    label: NaiveDate,
    month: (i32, u32),
    span: usize,
    diagnostic_months: Vec<u32>,
}

impl OpenRun {
    fn close(self) -> MonthSpanGroup {
        MonthSpanGroup {
            label: self.label,
            span: self.span,
            diagnostic_months: self.diagnostic_months,
        }
    }
}

/// Spanner from a continuous series to month header groups
#[derive(Debug, Clone, Copy)]
pub struct MonthSpanner {
    max_span: usize,
}

impl Default for MonthSpanner {
    fn default() -> Self {
        Self {
            max_span: DEFAULT_MAX_SPAN,
        }
    }
}

impl MonthSpanner {
    /// Create a spanner with a custom span cap
    pub fn new(max_span: usize) -> Result<Self, CalendarError> {
        if max_span == 0 {
            return Err(CalendarError::InvalidConfig(
                "max_span must be at least 1".to_string(),
            ));
        }
        Ok(Self { max_span })
    }

    pub fn max_span(&self) -> usize {
        self.max_span
    }

    /// Group the series' week windows into month header labels.
    pub fn spans(&self, series: &[DayDatum]) -> Vec<MonthSpanGroup> {
        let mut groups = Vec::new();
        let mut open: Option<OpenRun> = None;

        for window in series.chunks(WEEK_WINDOW) {
            let first = window[0].date;
            let month = (first.year(), first.month());
            let diagnostic_months: Vec<u32> = window.iter().map(|d| d.date.month()).collect();
            let uniform = window
                .iter()
                .all(|d| (d.date.year(), d.date.month()) == month);

            if open.as_ref().is_some_and(|run| run.month != month) {
                if let Some(run) = open.take() {
                    groups.push(run.close());
                }
            }

            let run = open.get_or_insert_with(|| OpenRun {
                label: first,
                month,
                span: 0,
                diagnostic_months: Vec::new(),
            });
            run.span += 1;
            run.diagnostic_months = diagnostic_months;

            if !uniform || run.span >= self.max_span {
                if let Some(run) = open.take() {
                    groups.push(run.close());
                }
            }
        }

        if let Some(run) = open.take() {
            groups.push(run.close());
        }

        debug!(
            "{} days grouped into {} month headers",
            series.len(),
            groups.len()
        );

        groups
    }
}

/// Number of week windows a series of `days` days is cut into
pub fn window_count(days: usize) -> usize {
    days.div_ceil(WEEK_WINDOW)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn days_from(start: NaiveDate, count: usize) -> Vec<DayDatum> {
        start.iter_days().take(count).map(DayDatum::synthetic).collect()
    }

    fn summary(groups: &[MonthSpanGroup]) -> Vec<(NaiveDate, usize)> {
        groups.iter().map(|g| (g.label, g.span)).collect()
    }

    #[test]
    fn test_single_partial_window() {
        let groups = MonthSpanner::default().spans(&days_from(date(2024, 1, 1), 3));
        assert_eq!(summary(&groups), vec![(date(2024, 1, 1), 1)]);
        assert_eq!(groups[0].diagnostic_months, vec![1, 1, 1]);
    }

    #[test]
    fn test_ten_days_in_january() {
        let groups = MonthSpanner::default().spans(&days_from(date(2024, 1, 1), 10));
        assert_eq!(summary(&groups), vec![(date(2024, 1, 1), 2)]);
    }

    #[test]
    fn test_transition_week_closes_earlier_month() {
        // Windows start Jan 1, 8, 15, 22, 29 (straddles), Feb 5, 12, 19, 26 (straddles)
        let groups = MonthSpanner::default().spans(&days_from(date(2024, 1, 1), 63));
        assert_eq!(
            summary(&groups),
            vec![
                (date(2024, 1, 1), 4),
                (date(2024, 1, 29), 1),
                (date(2024, 2, 5), 4),
            ]
        );
        assert_eq!(groups[1].diagnostic_months, vec![1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn test_straddling_first_window() {
        // Leap year: Feb 26 - Mar 3 straddles, then two March windows
        let groups = MonthSpanner::default().spans(&days_from(date(2024, 2, 26), 21));
        assert_eq!(
            summary(&groups),
            vec![(date(2024, 2, 26), 1), (date(2024, 3, 4), 2)]
        );
    }

    #[test]
    fn test_new_month_window_closes_open_run() {
        // Window 1: Jan 25-31 (all January), window 2: Feb 1-7 (all February)
        let groups = MonthSpanner::default().spans(&days_from(date(2024, 1, 25), 14));
        assert_eq!(
            summary(&groups),
            vec![(date(2024, 1, 25), 1), (date(2024, 2, 1), 1)]
        );
    }

    #[test]
    fn test_same_month_different_year_is_a_new_run() {
        let mut series = days_from(date(2023, 1, 1), 7);
        series.extend(days_from(date(2024, 1, 1), 7));
        let groups = MonthSpanner::default().spans(&series);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_span_never_exceeds_cap() {
        let series = days_from(date(2023, 3, 1), 400);
        for cap in 1..=6 {
            let groups = MonthSpanner::new(cap).unwrap().spans(&series);
            assert!(groups.iter().all(|g| (1..=cap).contains(&g.span)));
        }
    }

    #[test]
    fn test_spans_cover_every_window() {
        for start_day in 1..=7 {
            for len in [1, 6, 7, 8, 29, 30, 31, 90, 365, 366] {
                let series = days_from(date(2024, 1, start_day), len);
                let groups = MonthSpanner::default().spans(&series);
                let total: usize = groups.iter().map(|g| g.span).sum();
                assert_eq!(total, window_count(len), "start {} len {}", start_day, len);
            }
        }
    }

    #[test]
    fn test_labels_are_chronological_run_starts() {
        let series = days_from(date(2023, 11, 15), 120);
        let groups = MonthSpanner::default().spans(&series);
        assert_eq!(groups[0].label, date(2023, 11, 15));
        for pair in groups.windows(2) {
            assert!(pair[0].label < pair[1].label);
        }
        for group in &groups {
            let offset = (group.label - date(2023, 11, 15)).num_days() as usize;
            assert_eq!(offset % WEEK_WINDOW, 0);
        }
    }

    #[test]
    fn test_empty_series() {
        assert!(MonthSpanner::default().spans(&[]).is_empty());
    }

    #[test]
    fn test_zero_cap_rejected() {
        assert!(matches!(
            MonthSpanner::new(0),
            Err(CalendarError::InvalidConfig(_))
        ));
    }
}

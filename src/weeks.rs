//! Weekday bucketing
//!
//! Splits a day series into seven weekday lanes, one grid row each.

use chrono::Weekday;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::{DayDatum, WeekStart};

const DAYS_PER_WEEK: usize = 7;

/// Days grouped by ISO weekday, each lane in the order the days arrived
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekBuckets {
    lanes: [Vec<DayDatum>; DAYS_PER_WEEK],
}

impl WeekBuckets {
    /// Days falling on `weekday`
    pub fn get(&self, weekday: Weekday) -> &[DayDatum] {
        &self.lanes[weekday.num_days_from_monday() as usize]
    }

    /// Lanes from Monday through Sunday
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[DayDatum])> {
        self.iter_from(WeekStart::Monday)
    }

    /// Lanes in display order starting at `start`
    pub fn iter_from(&self, start: WeekStart) -> impl Iterator<Item = (Weekday, &[DayDatum])> {
        let first = start.weekday();
        (0..DAYS_PER_WEEK).scan(first, move |weekday, _| {
            let current = *weekday;
            *weekday = current.succ();
            Some((current, self.get(current)))
        })
    }

    /// Total number of days across all lanes
    pub fn len(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(Vec::is_empty)
    }
}

impl Serialize for WeekBuckets {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(DAYS_PER_WEEK))?;
        for (weekday, days) in self.iter() {
            map.serialize_entry(&weekday.to_string(), days)?;
        }
        map.end()
    }
}

/// Bucketer from a chronological series to weekday lanes
pub struct WeekBucketer;

impl WeekBucketer {
    pub fn bucket(series: &[DayDatum]) -> WeekBuckets {
        let mut buckets = WeekBuckets::default();
        for day in series {
            buckets.lanes[day.weekday().num_days_from_monday() as usize].push(day.clone());
        }
        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};
    use pretty_assertions::assert_eq;

    fn january(days: usize, first: u32) -> Vec<DayDatum> {
        NaiveDate::from_ymd_opt(2024, 1, first)
            .unwrap()
            .iter_days()
            .take(days)
            .enumerate()
            .map(|(i, date)| DayDatum::new(date, i as f64))
            .collect()
    }

    #[test]
    fn test_partition_is_complete() {
        let series = january(10, 3);
        let buckets = WeekBucketer::bucket(&series);

        assert_eq!(buckets.len(), series.len());
        for (weekday, days) in buckets.iter() {
            assert!(days.len() <= 2);
            assert!(days.iter().all(|d| d.date.weekday() == weekday));
        }
        for day in &series {
            let lane = buckets.get(day.weekday());
            assert_eq!(lane.iter().filter(|d| *d == day).count(), 1);
        }
    }

    #[test]
    fn test_lanes_keep_chronological_order() {
        let series = january(31, 1);
        let buckets = WeekBucketer::bucket(&series);

        // 2024-01-01 is a Monday
        let mondays: Vec<u32> = buckets.get(Weekday::Mon).iter().map(|d| d.date.day()).collect();
        assert_eq!(mondays, vec![1, 8, 15, 22, 29]);
        let sundays: Vec<u32> = buckets.get(Weekday::Sun).iter().map(|d| d.date.day()).collect();
        assert_eq!(sundays, vec![7, 14, 21, 28]);
    }

    #[test]
    fn test_iter_from_sunday() {
        let buckets = WeekBucketer::bucket(&january(7, 1));
        let order: Vec<Weekday> = buckets.iter_from(WeekStart::Sunday).map(|(w, _)| w).collect();
        assert_eq!(
            order,
            vec![
                Weekday::Sun,
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
            ]
        );
    }

    #[test]
    fn test_empty_series() {
        let buckets = WeekBucketer::bucket(&[]);
        assert!(buckets.is_empty());
        assert_eq!(buckets.iter().count(), 7);
    }

    #[test]
    fn test_serializes_as_weekday_map() {
        let buckets = WeekBucketer::bucket(&january(2, 1));
        let value = serde_json::to_value(&buckets).unwrap();

        assert_eq!(value["Mon"][0]["date"], "2024-01-01");
        assert_eq!(value["Tue"][0]["date"], "2024-01-02");
        assert_eq!(value["Sun"].as_array().unwrap().len(), 0);
    }
}

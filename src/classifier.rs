//! Level classification
//!
//! Assigns every day one of five intensity levels using quantile boundaries
//! computed over the whole value distribution.

use log::debug;

use crate::types::{Boundaries, DayDatum};

/// Number of levels produced
pub const LEVEL_COUNT: usize = 5;

/// Quantile-based level classifier
pub struct LevelClassifier;

impl LevelClassifier {
    /// Compute the four boundaries splitting `values` into five equal-count parts.
    ///
    /// For boundary k (1..=4) the rank is `p = k * n / 5`. An integral rank takes
    /// the element at `p - 1`; a fractional rank averages the elements at
    /// `floor(p) - 1` and `ceil(p) - 1`, with the lower index clamped to 0 for
    /// very small sets. Below five values this gives real boundaries instead of
    /// the NaN cut points the legacy app produced. Returns `None` for an empty set.
    pub fn boundaries(values: &[f64]) -> Option<Boundaries> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let n = sorted.len();

        let mut bounds = [0.0; LEVEL_COUNT - 1];
        for (i, bound) in bounds.iter_mut().enumerate() {
            let scaled = (i + 1) * n;
            let floor = scaled / LEVEL_COUNT;
            *bound = if scaled % LEVEL_COUNT == 0 {
                sorted[floor - 1]
            } else {
                (sorted[floor.saturating_sub(1)] + sorted[floor]) / 2.0
            };
        }

        Some(Boundaries(bounds))
    }

    /// Return a copy of `series` with every day's level set.
    ///
    /// Order of the input does not matter; the output keeps the input order.
    pub fn classify(series: &[DayDatum]) -> (Vec<DayDatum>, Option<Boundaries>) {
        let values: Vec<f64> = series.iter().map(|day| day.value).collect();
        let Some(boundaries) = Self::boundaries(&values) else {
            return (Vec::new(), None);
        };

        debug!("level boundaries {:?} over {} days", boundaries.0, series.len());

        let classified = series
            .iter()
            .map(|day| day.clone().with_level(boundaries.level_for(day.value)))
            .collect();

        (classified, Some(boundaries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Level;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn series_of(values: &[f64]) -> Vec<DayDatum> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        start
            .iter_days()
            .zip(values)
            .map(|(date, value)| DayDatum::new(date, *value))
            .collect()
    }

    fn levels(series: &[DayDatum]) -> Vec<u8> {
        series.iter().map(|d| d.level.map(Level::get).unwrap_or(0)).collect()
    }

    #[test]
    fn test_ten_values() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let boundaries = LevelClassifier::boundaries(&values).unwrap();
        assert_eq!(boundaries.0, [2.0, 4.0, 6.0, 8.0]);

        let (classified, _) = LevelClassifier::classify(&series_of(&values));
        assert_eq!(levels(&classified), vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
    }

    #[test]
    fn test_fractional_rank_averages() {
        // n = 6: ranks 1.2, 2.4, 3.6, 4.8
        let values: Vec<f64> = (1..=6).map(f64::from).collect();
        let boundaries = LevelClassifier::boundaries(&values).unwrap();
        assert_eq!(boundaries.0, [1.5, 2.5, 3.5, 4.5]);
    }

    #[test]
    fn test_order_independent() {
        let shuffled = [7.0, 1.0, 9.0, 3.0, 10.0, 2.0, 8.0, 4.0, 6.0, 5.0];
        let (classified, _) = LevelClassifier::classify(&series_of(&shuffled));
        assert_eq!(levels(&classified), vec![4, 1, 5, 2, 5, 1, 4, 2, 3, 3]);
    }

    #[test]
    fn test_every_day_gets_a_level() {
        let values = [0.0, 0.0, 0.0, 120.0, 0.0, 9000.0, 15.0];
        let (classified, _) = LevelClassifier::classify(&series_of(&values));
        assert_eq!(classified.len(), values.len());
        assert!(classified.iter().all(|d| d.level.is_some()));
    }

    #[test]
    fn test_monotonic_in_value() {
        let values = [
            0.0, 4200.0, 3100.0, 0.0, 8800.0, 12000.0, 640.0, 3100.0, 7000.0, 22.0, 15000.0,
            3100.0, 0.0,
        ];
        let (classified, _) = LevelClassifier::classify(&series_of(&values));
        for a in &classified {
            for b in &classified {
                if a.value < b.value {
                    assert!(a.level <= b.level, "{:?} vs {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_all_levels_used_for_distinct_values() {
        for n in 5..40 {
            let values: Vec<f64> = (0..n).map(|i| (i * 37 % 101) as f64 + i as f64 * 0.001).collect();
            let (classified, _) = LevelClassifier::classify(&series_of(&values));
            let used: HashSet<u8> = levels(&classified).into_iter().collect();
            assert_eq!(used.len(), LEVEL_COUNT, "n = {}", n);
        }
    }

    #[test]
    fn test_fewer_than_five_values() {
        let (classified, boundaries) = LevelClassifier::classify(&series_of(&[50.0]));
        assert_eq!(boundaries.unwrap().0, [50.0; 4]);
        assert_eq!(levels(&classified), vec![1]);

        let (classified, boundaries) = LevelClassifier::classify(&series_of(&[10.0, 20.0]));
        // ranks 0.4, 0.8, 1.2, 1.6
        assert_eq!(boundaries.unwrap().0, [10.0, 10.0, 15.0, 15.0]);
        assert_eq!(levels(&classified), vec![1, 5]);
    }

    #[test]
    fn test_all_equal_values_collapse() {
        let (classified, _) = LevelClassifier::classify(&series_of(&[0.0; 12]));
        assert!(levels(&classified).iter().all(|l| *l == 1));
    }

    #[test]
    fn test_empty_series() {
        let (classified, boundaries) = LevelClassifier::classify(&[]);
        assert!(classified.is_empty());
        assert!(boundaries.is_none());
    }

    #[test]
    fn test_input_not_mutated() {
        let input = series_of(&[1.0, 2.0, 3.0]);
        let _ = LevelClassifier::classify(&input);
        assert!(input.iter().all(|d| d.level.is_none()));
    }
}

//! Day series snapshots
//!
//! A finished series is stored as a plain JSON array of `{date, value, level}`
//! records and read back without re-running aggregation.

use log::debug;
use serde_json::Value;

use crate::error::CalendarError;
use crate::types::DayDatum;

/// Serialize a day series to its snapshot form
pub fn to_json(days: &[DayDatum]) -> Result<String, CalendarError> {
    Ok(serde_json::to_string(days)?)
}

/// Read a day series back from its snapshot form.
///
/// Anything other than a JSON array is a usage error.
pub fn from_json(json: &str) -> Result<Vec<DayDatum>, CalendarError> {
    let document: Value = serde_json::from_str(json)?;
    from_value(document)
}

pub fn from_value(document: Value) -> Result<Vec<DayDatum>, CalendarError> {
    let records = match document {
        Value::Array(records) => records,
        other => {
            return Err(CalendarError::InvalidInput(format!(
                "expected a JSON array of day records, got {}",
                json_kind(&other)
            )))
        }
    };

    let days = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value::<DayDatum>(record).map_err(|e| {
                CalendarError::ParseError(format!("day record {}: {}", index, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("restored {} days from snapshot", days.len());
    Ok(days)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::CalendarProcessor;
    use crate::types::Level;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_verbatim() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
        let days: Vec<DayDatum> = start
            .iter_days()
            .take(3)
            .enumerate()
            .map(|(i, d)| {
                DayDatum::new(d, i as f64 * 100.0).with_level(Level::new(i as u8 + 1).unwrap())
            })
            .collect();

        let json = to_json(&days).unwrap();
        assert!(json.starts_with('['));
        assert_eq!(from_json(&json).unwrap(), days);
    }

    #[test]
    fn test_rejects_non_array() {
        for doc in [r#"{"days": []}"#, "42", "null", r#""2024-01-01""#] {
            assert!(
                matches!(from_json(doc), Err(CalendarError::InvalidInput(_))),
                "{}",
                doc
            );
        }
    }

    #[test]
    fn test_bad_record_is_reported_with_index() {
        let json = r#"[{"date":"2024-01-01","value":1},{"date":"soon","value":2}]"#;
        let err = from_json(json).unwrap_err();
        assert!(err.to_string().contains("day record 1"));
    }

    const LEGACY_SNAPSHOT: &str = r#"[{"dt":"2023/09/30","value":5120,"level":3,"flag":0},{"dt":"2023/10/1","value":0,"level":null}]"#;

    #[test]
    fn test_legacy_records() {
        let days = from_json(LEGACY_SNAPSHOT).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2023, 9, 30).unwrap());
        assert_eq!(days[0].value, 5120.0);
        assert_eq!(days[0].level, Some(Level::new(3).unwrap()));
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2023, 10, 1).unwrap());
        assert_eq!(days[1].level, None);
    }

    #[test]
    fn test_legacy_snapshot_restores_into_model() {
        let model = CalendarProcessor::new()
            .restore_snapshot(LEGACY_SNAPSHOT)
            .unwrap();
        assert_eq!(model.days.len(), 2);
        assert_eq!(model.summary.total_value, 5120.0);
        assert!(model.days.iter().all(|d| d.level.is_some()));
        assert!(model
            .to_snapshot()
            .unwrap()
            .contains(r#""date":"2023-09-30""#));
    }
}

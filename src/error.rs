//! Error types for Step Calendar

use thiserror::Error;

/// Errors that can occur while building a calendar
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Day series is empty")]
    EmptySeries,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid level {0}: expected 1-5")]
    InvalidLevel(u8),
}

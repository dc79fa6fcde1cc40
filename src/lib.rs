//! Step Calendar - Activity heatmap engine for daily health metrics
//!
//! Step Calendar turns raw health-export events into a contribution-style
//! calendar through a deterministic pipeline: daily aggregation → gap filling
//! → quantile level classification → weekday bucketing → month header spans.
//!
//! ## Modules
//!
//! - **Pipeline**: Build a `CalendarModel` from raw events or a saved snapshot
//! - **Render**: Draw a model as a plain-text heatmap

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod error;
pub mod gap_filler;
pub mod months;
pub mod pipeline;
pub mod render;
pub mod schema;
pub mod snapshot;
pub mod types;
pub mod weeks;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::CalendarConfig;
pub use error::CalendarError;
pub use pipeline::{build_calendar, CalendarProcessor};
pub use render::{render_text, RenderOptions};

// Schema exports
pub use schema::{Category, RawEvent, RawEventAdapter, SCHEMA_VERSION};

// Model exports
pub use types::{
    Boundaries, CalendarModel, CalendarSummary, DayDatum, Level, MonthParity, MonthSpanGroup,
    WeekStart,
};
pub use weeks::WeekBuckets;

/// Library version reported by the CLI and FFI
pub const CALENDAR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "step-calendar";

//! activity.raw_event.v1 input schema
//!
//! Source-agnostic timestamped observations, as produced by whatever tool
//! unpacked the user's activity export.

mod adapter;
mod raw_event;

pub use adapter::*;
pub use raw_event::*;

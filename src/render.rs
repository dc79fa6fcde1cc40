//! Plain-text heatmap rendering
//!
//! Draws a `CalendarModel` as a terminal grid: a month header row, one row per
//! weekday and one glyph per day shaded by level.

use chrono::Weekday;
use std::fmt::Write;

use crate::config::CalendarConfig;
use crate::types::{CalendarModel, WeekStart};

const ROW_LABEL_WIDTH: usize = 4;
const CELL_WIDTH: usize = 2;

/// Rendering settings
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub week_start: WeekStart,
    /// Glyph for levels 1 through 5
    pub glyphs: [char; 5],
    pub show_legend: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            week_start: WeekStart::Sunday,
            glyphs: ['·', '░', '▒', '▓', '█'],
            show_legend: true,
        }
    }
}

impl From<&CalendarConfig> for RenderOptions {
    fn from(config: &CalendarConfig) -> Self {
        Self {
            week_start: config.week_start,
            ..Self::default()
        }
    }
}

/// Position of `weekday` in a week beginning at `start`
fn display_index(weekday: Weekday, start: WeekStart) -> usize {
    let offset = weekday.num_days_from_monday() + 7 - start.weekday().num_days_from_monday();
    (offset % 7) as usize
}

/// Render the model as text. An empty model renders as a single "no data" line.
pub fn render_text(model: &CalendarModel, options: &RenderOptions) -> String {
    let Some(first) = model.days.first() else {
        return "no data\n".to_string();
    };

    let mut out = String::new();
    out.push_str(&render_header(model));
    out.push('\n');

    let lead = display_index(first.weekday(), options.week_start);
    for (row, (weekday, days)) in model.weeks.iter_from(options.week_start).enumerate() {
        let mut line = format!("{:<width$}", weekday.to_string(), width = ROW_LABEL_WIDTH);
        if row < lead {
            line.push_str(&" ".repeat(CELL_WIDTH));
        }
        for day in days {
            let glyph = day
                .level
                .map(|level| options.glyphs[level.intensity() as usize])
                .unwrap_or(' ');
            line.push(glyph);
            line.push(' ');
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if options.show_legend {
        out.push_str(&render_legend(model, options));
        out.push('\n');
    }

    out
}

/// Month names placed at their first window's column. A name repeating the
/// previous one, or one that would overlap it, is skipped.
fn render_header(model: &CalendarModel) -> String {
    let mut header = " ".repeat(ROW_LABEL_WIDTH);
    let mut column = 0usize;
    let mut previous: Option<String> = None;

    for group in &model.months {
        let start = ROW_LABEL_WIDTH + column * CELL_WIDTH;
        column += group.span;

        let name = group.label.format("%b").to_string();
        if previous.as_deref() == Some(name.as_str()) || header.len() > start {
            continue;
        }
        header.push_str(&" ".repeat(start - header.len()));
        header.push_str(&name);
        previous = Some(name);
    }

    header.trim_end().to_string()
}

fn render_legend(model: &CalendarModel, options: &RenderOptions) -> String {
    let mut legend = String::from("Less");
    for glyph in options.glyphs {
        legend.push(' ');
        legend.push(glyph);
    }
    legend.push_str(" More");

    if let Some(boundaries) = model.boundaries {
        let cuts: Vec<String> = boundaries.0.iter().map(|b| b.to_string()).collect();
        let _ = write!(legend, "  (boundaries: {})", cuts.join(", "));
    }

    let _ = write!(
        legend,
        "  {} days, {} active",
        model.summary.total_days, model.summary.active_days
    );
    if let (Some(first), Some(last)) = (model.summary.first_date, model.summary.last_date) {
        let _ = write!(legend, ", {} to {}", first, last);
    }

    legend
}

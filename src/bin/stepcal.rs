//! Stepcal CLI - Command-line interface for Step Calendar
//!
//! Commands:
//! - build: Turn raw events into a calendar model (JSON)
//! - render: Draw a text heatmap from events or a saved snapshot
//! - validate: Validate raw event schema
//! - schema: Describe the input and output formats
//! - doctor: Diagnose configuration and snapshot files

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use step_calendar::gap_filler::check_continuity;
use step_calendar::schema::{Category, RawEvent, RawEventAdapter, SCHEMA_VERSION};
use step_calendar::types::{CalendarModel, WeekStart};
use step_calendar::{
    render_text, snapshot, CalendarConfig, CalendarError, CalendarProcessor, RenderOptions,
    CALENDAR_VERSION, PRODUCER_NAME,
};

/// Stepcal - Activity heatmaps from exported health data
#[derive(Parser)]
#[command(name = "stepcal")]
#[command(version = CALENDAR_VERSION)]
#[command(about = "Turn activity exports into contribution-calendar heatmaps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (JSON); flags below override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Event category to aggregate (e.g. step_count, flights_climbed)
    #[arg(long, global = true)]
    category: Option<String>,

    /// First weekday row of the grid
    #[arg(long, global = true)]
    week_start: Option<WeekStartArg>,

    /// Cap on week windows covered by one month label
    #[arg(long, global = true)]
    max_span: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a calendar model from raw events
    Build {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,

        /// Save the finished day series to this file
        #[arg(long)]
        save_snapshot: Option<PathBuf>,
    },

    /// Render a text heatmap
    Render {
        /// Input file path (use - for stdin)
        #[arg(short, long, conflicts_with = "snapshot", required_unless_present = "snapshot")]
        input: Option<PathBuf>,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Render a saved day series instead of raw events
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Omit the legend line
        #[arg(long)]
        no_legend: bool,
    },

    /// Validate raw event schema
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },

    /// Diagnose configuration and snapshot files
    Doctor {
        /// Check a saved snapshot file
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// JSON array of events
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaType {
    /// Input schema (activity.raw_event.v1)
    Input,
    /// Output schema (calendar model)
    Output,
}

#[derive(Clone, Copy, ValueEnum)]
enum WeekStartArg {
    Monday,
    Sunday,
}

impl From<WeekStartArg> for WeekStart {
    fn from(arg: WeekStartArg) -> Self {
        match arg {
            WeekStartArg::Monday => WeekStart::Monday,
            WeekStartArg::Sunday => WeekStart::Sunday,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` takes precedence over `-v`
fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), StepcalCliError> {
    match cli.command {
        Commands::Build {
            ref input,
            ref output,
            input_format,
            output_format,
            ref save_snapshot,
        } => {
            let config = resolve_config(&cli)?;
            cmd_build(
                input,
                output,
                input_format,
                output_format,
                save_snapshot.as_deref(),
                config,
            )
        }

        Commands::Render {
            ref input,
            input_format,
            ref snapshot,
            no_legend,
        } => {
            let config = resolve_config(&cli)?;
            cmd_render(input.as_deref(), input_format, snapshot.as_deref(), no_legend, config)
        }

        Commands::Validate {
            ref input,
            input_format,
            json,
        } => cmd_validate(input, input_format, json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),

        Commands::Doctor { ref snapshot, json } => {
            cmd_doctor(cli.config.as_deref(), snapshot.as_deref(), json)
        }
    }
}

/// Config file first, then individual flags on top
fn resolve_config(cli: &Cli) -> Result<CalendarConfig, StepcalCliError> {
    let mut config = match &cli.config {
        Some(path) => {
            debug!("loading config from {}", path.display());
            CalendarConfig::from_json(&fs::read_to_string(path)?)?
        }
        None => CalendarConfig::default(),
    };

    if let Some(name) = &cli.category {
        config = config.with_category(Category::from_name(name));
    }
    if let Some(week_start) = cli.week_start {
        config = config.with_week_start(week_start.into());
    }
    if let Some(max_span) = cli.max_span {
        config = config.with_max_span(max_span);
    }

    config.validate()?;
    Ok(config)
}

fn read_input(input: &Path) -> Result<String, StepcalCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_events(input: &Path, input_format: InputFormat) -> Result<Vec<RawEvent>, StepcalCliError> {
    let input_data = read_input(input)?;
    let events = match input_format {
        InputFormat::Ndjson => RawEventAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => RawEventAdapter::parse_array(&input_data)?,
    };

    // An empty file renders as "no data", same as events of another category
    if events.is_empty() {
        warn!("no events in {}", input.display());
    } else {
        info!("read {} events from {}", events.len(), input.display());
    }
    Ok(events)
}

fn cmd_build(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    save_snapshot: Option<&Path>,
    config: CalendarConfig,
) -> Result<(), StepcalCliError> {
    let events = read_events(input, input_format)?;
    let processor = CalendarProcessor::with_config(config)?;
    let model = processor.process_events(&events)?;

    if let Some(snapshot_path) = save_snapshot {
        fs::write(snapshot_path, model.to_snapshot()?)?;
        info!("saved snapshot to {}", snapshot_path.display());
    }

    let output_data = format_output(&model, output_format)?;
    if output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_render(
    input: Option<&Path>,
    input_format: InputFormat,
    snapshot_path: Option<&Path>,
    no_legend: bool,
    config: CalendarConfig,
) -> Result<(), StepcalCliError> {
    let processor = CalendarProcessor::with_config(config)?;

    let model = match (snapshot_path, input) {
        (Some(path), _) => processor.restore_snapshot(&fs::read_to_string(path)?)?,
        (None, Some(path)) => processor.process_events(&read_events(path, input_format)?)?,
        (None, None) => return Err(StepcalCliError::NoEvents),
    };

    let options = RenderOptions {
        show_legend: !no_legend,
        ..RenderOptions::from(processor.config())
    };
    print!("{}", render_text(&model, &options));
    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), StepcalCliError> {
    let input_data = read_input(input)?;
    let events = match input_format {
        InputFormat::Ndjson => RawEventAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => RawEventAdapter::parse_array(&input_data)?,
    };

    let results = RawEventAdapter::validate_events(&events);

    let report = ValidationReport {
        total_events: events.len(),
        valid_events: events.len() - results.len(),
        invalid_events: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                event_id: r.event_id.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total events:   {}", report.total_events);
        println!("Valid events:   {}", report.valid_events);
        println!("Invalid events: {}", report.invalid_events);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Event {} (index {}): {}",
                    err.event_id.as_deref().unwrap_or("unknown"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_events > 0 {
        Err(StepcalCliError::ValidationFailed(report.invalid_events))
    } else {
        Ok(())
    }
}

fn cmd_doctor(
    config_path: Option<&Path>,
    snapshot_path: Option<&Path>,
    json: bool,
) -> Result<(), StepcalCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck::ok(
        "calendar_version",
        format!("Step Calendar version {}", CALENDAR_VERSION),
    ));
    checks.push(DoctorCheck::ok(
        "schema_version",
        format!("Input schema: {}", SCHEMA_VERSION),
    ));

    if let Some(path) = config_path {
        checks.push(check_file("config", path, |content| {
            let config = CalendarConfig::from_json(content)?;
            Ok(format!(
                "Config valid (category {}, max_span {}, week starts {:?})",
                config.category.as_str(),
                config.max_span,
                config.week_start
            ))
        }));
    }

    if let Some(path) = snapshot_path {
        checks.push(check_file("snapshot", path, |content| {
            let days = snapshot::from_json(content)?;
            let issues = check_continuity(&days);
            if issues.is_empty() {
                Ok(format!("Snapshot valid ({} days, continuous)", days.len()))
            } else {
                Ok(format!(
                    "Snapshot readable ({} days, {} continuity issues will be repaired on load)",
                    days.len(),
                    issues.len()
                ))
            }
        }));
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck::ok("stdin", "stdin is a TTY (interactive mode)".to_string())
    } else {
        DoctorCheck::ok("stdin", "stdin is a pipe (ready for --input -)".to_string())
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: CALENDAR_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Stepcal Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(StepcalCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

/// Missing file is a warning; unreadable or invalid content is an error.
fn check_file<F>(name: &str, path: &Path, inspect: F) -> DoctorCheck
where
    F: FnOnce(&str) -> Result<String, CalendarError>,
{
    if !path.exists() {
        return DoctorCheck {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: format!("{} does not exist", path.display()),
        };
    }

    let (status, message) = match fs::read_to_string(path) {
        Ok(content) => match inspect(&content) {
            Ok(message) => (CheckStatus::Ok, message),
            Err(e) => (CheckStatus::Error, format!("Invalid {}: {}", name, e)),
        },
        Err(e) => (CheckStatus::Error, format!("Cannot read {}: {}", path.display(), e)),
    };

    DoctorCheck {
        name: name.to_string(),
        status,
        message,
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), StepcalCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("One record per sample:");
                println!("  - category: step_count, distance_walking_running, flights_climbed,");
                println!("              active_energy_burned, or any custom name");
                println!("              (HKQuantityTypeIdentifier* names are accepted)");
                println!("  - timestamp: RFC 3339 or \"YYYY-MM-DD HH:MM:SS +ZZZZ\"");
                println!("  - value: non-negative number");
                println!("  - unit, source, event_id: optional");
                println!();
                println!("Samples are summed per calendar day in their own offset.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", output_json_schema());
            } else {
                println!("Output Schema: calendar model");
                println!();
                println!("- days: continuous series of {{ date, value, level }}");
                println!("- weeks: {{ Mon..Sun: [days] }} in chronological order");
                println!("- months: [{{ label, span, diagnostic_months }}] header groups");
                println!("- boundaries: four quantile cut points, or null");
                println!("- summary: {{ total_days, active_days, total_value, best_day, first_date, last_date }}");
                println!();
                println!("A snapshot (--save-snapshot) is the bare `days` array.");
            }
        }
    }

    Ok(())
}

// Helper functions

fn format_output(model: &CalendarModel, format: OutputFormat) -> Result<String, StepcalCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(model)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(model)?),
    }
}

fn input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": SCHEMA_VERSION,
        "description": "Activity sample exported from a health data store",
        "type": "object",
        "required": ["category", "timestamp", "value"],
        "properties": {
            "schema_version": { "type": "string", "const": SCHEMA_VERSION },
            "event_id": { "type": "string" },
            "category": { "type": "string" },
            "timestamp": { "type": "string" },
            "value": { "type": "number", "minimum": 0 },
            "unit": { "type": "string" },
            "source": { "type": "string" }
        }
    })
    .to_string()
}

fn output_json_schema() -> String {
    let day = serde_json::json!({
        "type": "object",
        "required": ["date", "value"],
        "properties": {
            "date": { "type": "string", "format": "date" },
            "value": { "type": "number" },
            "level": { "type": ["integer", "null"], "minimum": 1, "maximum": 5 }
        }
    });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "calendar model",
        "type": "object",
        "required": ["days", "weeks", "months", "boundaries", "summary"],
        "properties": {
            "days": { "type": "array", "items": day },
            "weeks": {
                "type": "object",
                "additionalProperties": { "type": "array", "items": day }
            },
            "months": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "label": { "type": "string", "format": "date" },
                        "span": { "type": "integer", "minimum": 1 },
                        "diagnostic_months": { "type": "array", "items": { "type": "integer" } }
                    }
                }
            },
            "boundaries": {
                "type": ["array", "null"],
                "items": { "type": "number" },
                "minItems": 4,
                "maxItems": 4
            },
            "summary": { "type": "object" }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum StepcalCliError {
    Io(io::Error),
    Calendar(CalendarError),
    Json(serde_json::Error),
    NoEvents,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for StepcalCliError {
    fn from(e: io::Error) -> Self {
        StepcalCliError::Io(e)
    }
}

impl From<CalendarError> for StepcalCliError {
    fn from(e: CalendarError) -> Self {
        StepcalCliError::Calendar(e)
    }
}

impl From<serde_json::Error> for StepcalCliError {
    fn from(e: serde_json::Error) -> Self {
        StepcalCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<StepcalCliError> for CliError {
    fn from(e: StepcalCliError) -> Self {
        match e {
            StepcalCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            StepcalCliError::Calendar(e) => {
                let (code, hint) = match &e {
                    CalendarError::InvalidConfig(_) => {
                        ("INVALID_CONFIG", "Check --config, --max-span and --category")
                    }
                    CalendarError::InvalidInput(_) => {
                        ("INVALID_INPUT", "Snapshots must be a JSON array of day records")
                    }
                    _ => ("PARSE_ERROR", "Ensure input matches activity.raw_event.v1"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            StepcalCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            StepcalCliError::NoEvents => CliError {
                code: "NO_EVENTS".to_string(),
                message: "No event input given".to_string(),
                hint: Some("Pass --input or --snapshot".to_string()),
            },
            StepcalCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} events failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            StepcalCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_events: usize,
    valid_events: usize,
    invalid_events: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    event_id: Option<String>,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

impl DoctorCheck {
    fn ok(name: &str, message: String) -> Self {
        DoctorCheck {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message,
        }
    }
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

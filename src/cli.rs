//! CLI argument parsing for slotdist

use crate::dedup::DedupPolicy;
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary tables (default)
    Text,
    /// JSON document for machine parsing
    Json,
    /// CSV rows for spreadsheet analysis
    Csv,
    /// Long-form markdown report
    Markdown,
    /// One styled HTML page per venue
    Html,
}

/// Parse a time-of-day flag value such as "10:00"
pub fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("invalid time of day '{value}' (expected HH:MM)"))
}

#[derive(Parser, Debug)]
#[command(name = "slotdist")]
#[command(version)]
#[command(
    about = "Analyze venue availability logs for slot release timing patterns",
    long_about = None
)]
pub struct Cli {
    /// Availability log in JSONL format
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        default_value = "availability_log.jsonl"
    )]
    pub input: PathBuf,

    /// First civil date to analyze (YYYY-MM-DD)
    #[arg(short = 's', long = "start", value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Last civil date to analyze (YYYY-MM-DD)
    #[arg(short = 'e', long = "end", value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Venue catalog TOML (display names and colors); restricts analysis to listed venues
    #[arg(long = "venues", value_name = "PATH")]
    pub venues: Option<PathBuf>,

    /// Minimum minutes between distinct release events
    #[arg(long = "interval", value_name = "MINUTES", default_value = "15")]
    pub interval: i64,

    /// Deduplication comparison rule
    #[arg(long = "policy", value_enum, default_value = "last-accepted")]
    pub policy: DedupPolicy,

    /// Business-hours window start
    #[arg(long = "open", value_name = "TIME", value_parser = parse_time, default_value = "10:00")]
    pub open: NaiveTime,

    /// Business-hours window end (exclusive)
    #[arg(long = "close", value_name = "TIME", value_parser = parse_time, default_value = "20:00")]
    pub close: NaiveTime,

    /// Width of the coarse distribution buckets in minutes
    #[arg(long = "bucket-width", value_name = "MINUTES", default_value = "15")]
    pub bucket_width: i64,

    /// Re-bucket the busiest window at fine resolution
    #[arg(long = "zoom")]
    pub zoom: bool,

    /// Fine bucket width for --zoom, in minutes
    #[arg(long = "zoom-width", value_name = "MINUTES", default_value = "1")]
    pub zoom_width: i64,

    /// Ranking rows shown in text, markdown, and HTML reports
    #[arg(long = "top", value_name = "N", default_value = "10")]
    pub top: usize,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Directory for HTML report pages
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Hours east of UTC for the venue's civil time
    #[arg(long = "utc-offset", value_name = "HOURS", default_value = "9")]
    pub utc_offset: i32,

    /// Verbose tracing output on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

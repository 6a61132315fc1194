//! Availability log ingestion
//!
//! Reads the collector's JSONL log, converts UTC sample times to the
//! configured civil offset at minute resolution, applies the optional date
//! range and venue filters, and hands each venue a sorted release sequence.

use crate::event::{RawEvent, ReleaseEvent, WireRecord};
use crate::venues::VenueCatalog;
use anyhow::{bail, Context, Result};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Ingestion configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Keep only releases on or after this civil date
    pub start: Option<NaiveDate>,
    /// Keep only releases on or before this civil date
    pub end: Option<NaiveDate>,
    /// Hours east of UTC for the civil zone (the venue's local time)
    pub utc_offset_hours: i32,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            utc_offset_hours: 9,
        }
    }
}

impl IngestOptions {
    fn offset(&self) -> Result<FixedOffset> {
        match FixedOffset::east_opt(self.utc_offset_hours * 3600) {
            Some(offset) => Ok(offset),
            None => bail!("invalid UTC offset: {} hours", self.utc_offset_hours),
        }
    }
}

/// Per-venue release events, sorted ascending by observed time
#[derive(Debug, Default)]
pub struct AvailabilityLog {
    venues: BTreeMap<String, Vec<ReleaseEvent>>,
    /// Non-blank lines seen
    pub total_lines: usize,
    /// Lines that failed to parse and were skipped
    pub skipped_lines: usize,
    /// Well-formed samples that observed the slot as unavailable
    pub unavailable_samples: usize,
}

impl AvailabilityLog {
    pub fn venues(&self) -> impl Iterator<Item = (&str, &[ReleaseEvent])> {
        self.venues
            .iter()
            .map(|(code, events)| (code.as_str(), events.as_slice()))
    }

    pub fn venue_count(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    pub fn releases(&self, code: &str) -> Option<&[ReleaseEvent]> {
        self.venues.get(code).map(Vec::as_slice)
    }
}

/// Load and normalize the availability log at `path`
pub fn load_log(
    path: &Path,
    options: &IngestOptions,
    catalog: &VenueCatalog,
) -> Result<AvailabilityLog> {
    let file = File::open(path)
        .with_context(|| format!("failed to open availability log {}", path.display()))?;
    read_log(BufReader::new(file), options, catalog)
}

/// Ingest JSONL availability records from any buffered reader
pub fn read_log<R: BufRead>(
    reader: R,
    options: &IngestOptions,
    catalog: &VenueCatalog,
) -> Result<AvailabilityLog> {
    let offset = options.offset()?;
    let mut log = AvailabilityLog::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read log line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        log.total_lines += 1;

        let record: WireRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(error) => {
                warn!(line = index + 1, %error, "skipping malformed log line");
                log.skipped_lines += 1;
                continue;
            }
        };

        if !catalog.selects(&record.pavilion_code) {
            continue;
        }

        let civil = truncate_to_minute(record.timestamp.with_timezone(&offset).naive_local());
        if options.start.is_some_and(|start| civil.date() < start) {
            continue;
        }
        if options.end.is_some_and(|end| civil.date() > end) {
            continue;
        }

        let state = record.state();
        let raw = RawEvent {
            venue_id: record.pavilion_code,
            observed_at: civil,
            slot_label: record.time_slot,
            state,
        };
        match raw.into_release() {
            Some(release) => log
                .venues
                .entry(release.venue_id.clone())
                .or_default()
                .push(release),
            None => log.unavailable_samples += 1,
        }
    }

    for (code, events) in &mut log.venues {
        events.sort_by_key(|event| event.observed_at);
        debug!(venue = %code, releases = events.len(), "ingested venue releases");
    }

    Ok(log)
}

/// Drop seconds and sub-second precision; samples are minute-grained
fn truncate_to_minute(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn line(timestamp: &str, code: &str, status: i64) -> String {
        format!(
            r#"{{"timestamp":"{timestamp}","pavilion_code":"{code}","time_slot":"14:00-15:00","status":{status}}}"#
        )
    }

    fn ingest(lines: &[String], options: &IngestOptions) -> AvailabilityLog {
        let input = lines.join("\n");
        read_log(Cursor::new(input), options, &VenueCatalog::default()).unwrap()
    }

    #[test]
    fn test_utc_timestamps_convert_to_civil_offset() {
        let log = ingest(
            &[line("2025-06-01T01:30:45Z", "C060", 0)],
            &IngestOptions::default(),
        );
        let releases = log.releases("C060").unwrap();
        // 01:30:45 UTC is 10:30 JST, truncated to the minute
        assert_eq!(
            releases[0].observed_at,
            NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_unavailable_samples_are_counted_not_kept() {
        let log = ingest(
            &[
                line("2025-06-01T01:30:00Z", "C060", 0),
                line("2025-06-01T01:35:00Z", "C060", 1),
            ],
            &IngestOptions::default(),
        );
        assert_eq!(log.releases("C060").unwrap().len(), 1);
        assert_eq!(log.unavailable_samples, 1);
    }

    #[test]
    fn test_malformed_lines_are_skipped_with_count() {
        let log = ingest(
            &[
                "not json at all".to_string(),
                line("2025-06-01T01:30:00Z", "C060", 0),
                r#"{"timestamp":"yesterday","pavilion_code":"C060","time_slot":"x","status":0}"#
                    .to_string(),
            ],
            &IngestOptions::default(),
        );
        assert_eq!(log.total_lines, 3);
        assert_eq!(log.skipped_lines, 2);
        assert_eq!(log.releases("C060").unwrap().len(), 1);
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let input = format!("\n{}\n\n", line("2025-06-01T01:30:00Z", "C060", 0));
        let log = read_log(
            Cursor::new(input),
            &IngestOptions::default(),
            &VenueCatalog::default(),
        )
        .unwrap();
        assert_eq!(log.total_lines, 1);
        assert_eq!(log.skipped_lines, 0);
    }

    #[test]
    fn test_date_filter_uses_civil_date_not_utc() {
        // 2025-06-01T16:00Z is already 2025-06-02 01:00 in JST
        let options = IngestOptions {
            start: Some(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()),
            ..IngestOptions::default()
        };
        let log = ingest(&[line("2025-06-01T16:00:00Z", "C060", 0)], &options);
        assert_eq!(log.releases("C060").unwrap().len(), 1);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let options = IngestOptions {
            start: Some(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
            end: Some(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()),
            ..IngestOptions::default()
        };
        let log = ingest(
            &[
                line("2025-05-31T01:00:00Z", "C060", 0),
                line("2025-06-01T01:00:00Z", "C060", 0),
                line("2025-06-02T01:00:00Z", "C060", 0),
                line("2025-06-03T01:00:00Z", "C060", 0),
            ],
            &options,
        );
        assert_eq!(log.releases("C060").unwrap().len(), 2);
    }

    #[test]
    fn test_catalog_filters_unlisted_venues() {
        let catalog: VenueCatalog =
            toml::from_str("[venues.C060]\nname = \"Ireland Live Music\"\n").unwrap();
        let input = [
            line("2025-06-01T01:30:00Z", "C060", 0),
            line("2025-06-01T01:30:00Z", "HEH0", 0),
        ]
        .join("\n");
        let log = read_log(Cursor::new(input), &IngestOptions::default(), &catalog).unwrap();
        assert!(log.releases("C060").is_some());
        assert!(log.releases("HEH0").is_none());
    }

    #[test]
    fn test_events_are_sorted_per_venue() {
        let log = ingest(
            &[
                line("2025-06-01T05:00:00Z", "C060", 0),
                line("2025-06-01T01:00:00Z", "C060", 0),
                line("2025-06-01T03:00:00Z", "C060", 0),
            ],
            &IngestOptions::default(),
        );
        let releases = log.releases("C060").unwrap();
        assert!(releases
            .windows(2)
            .all(|pair| pair[0].observed_at <= pair[1].observed_at));
    }

    #[test]
    fn test_invalid_offset_fails() {
        let options = IngestOptions {
            utc_offset_hours: 30,
            ..IngestOptions::default()
        };
        let result = read_log(Cursor::new(""), &options, &VenueCatalog::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_input_yields_empty_log() {
        let log = ingest(&[], &IngestOptions::default());
        assert!(log.is_empty());
        assert_eq!(log.venue_count(), 0);
    }
}

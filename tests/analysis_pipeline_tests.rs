//! Library-level pipeline tests: ingest -> dedup -> distribution -> zoom

use chrono::{Duration, NaiveTime, Timelike};
use slotdist::analyzer::{analyze_log, analyze_venue, AnalyzerConfig};
use slotdist::dedup::DedupPolicy;
use slotdist::ingest::{read_log, IngestOptions};
use slotdist::venues::VenueCatalog;
use std::io::Cursor;

fn jsonl(entries: &[(&str, &str, i64)]) -> String {
    entries
        .iter()
        .map(|(timestamp, code, status)| {
            format!(
                r#"{{"timestamp":"{timestamp}","pavilion_code":"{code}","time_slot":"14:00-15:00","status":{status}}}"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_burst_collapses_and_lands_in_one_bucket() {
    // 10:00, 10:05, 10:20, 10:21 JST with a 15 minute interval: the
    // streaming rule keeps 10:00 and 10:20.
    let input = jsonl(&[
        ("2025-06-01T01:00:00Z", "C060", 0),
        ("2025-06-01T01:05:00Z", "C060", 0),
        ("2025-06-01T01:20:00Z", "C060", 0),
        ("2025-06-01T01:21:00Z", "C060", 0),
    ]);
    let log = read_log(
        Cursor::new(input),
        &IngestOptions::default(),
        &VenueCatalog::default(),
    )
    .unwrap();

    let analysis = analyze_venue(
        "C060",
        log.releases("C060").unwrap(),
        &AnalyzerConfig::default(),
    )
    .unwrap();

    let minutes: Vec<u32> = analysis
        .kept
        .iter()
        .map(|e| e.observed_at.time().minute())
        .collect();
    assert_eq!(minutes, vec![0, 20]);

    // Both survivors fall into [10:00, 10:15) and [10:15, 10:30)
    assert_eq!(analysis.distribution.total_events, 2);
    assert_eq!(analysis.distribution.buckets[0].1.count, 1);
    assert_eq!(analysis.distribution.buckets[1].1.count, 1);
}

#[test]
fn test_strict_policy_on_the_same_stream() {
    let input = jsonl(&[
        ("2025-06-01T01:00:00Z", "C060", 0),
        ("2025-06-01T01:12:00Z", "C060", 0),
        ("2025-06-01T01:24:00Z", "C060", 0),
    ]);
    let log = read_log(
        Cursor::new(input),
        &IngestOptions::default(),
        &VenueCatalog::default(),
    )
    .unwrap();

    let config = AnalyzerConfig {
        policy: DedupPolicy::AllRetained,
        ..AnalyzerConfig::default()
    };
    let analysis = analyze_venue("C060", log.releases("C060").unwrap(), &config).unwrap();

    // 10:12 is rejected against accepted 10:00; 10:24 is 24 minutes from the
    // only accepted event, so it stays.
    let minutes: Vec<u32> = analysis
        .kept
        .iter()
        .map(|e| e.observed_at.time().minute())
        .collect();
    assert_eq!(minutes, vec![0, 24]);
}

#[test]
fn test_zoom_focuses_on_busiest_coarse_bucket() {
    let input = jsonl(&[
        ("2025-06-01T04:02:00Z", "C060", 0), // 13:02 JST
        ("2025-06-02T04:09:00Z", "C060", 0), // 13:09 JST
        ("2025-06-03T07:40:00Z", "C060", 0), // 16:40 JST
    ]);
    let log = read_log(
        Cursor::new(input),
        &IngestOptions::default(),
        &VenueCatalog::default(),
    )
    .unwrap();

    let config = AnalyzerConfig {
        zoom_width: Some(Duration::minutes(1)),
        ..AnalyzerConfig::default()
    };
    let analysis = analyze_venue("C060", log.releases("C060").unwrap(), &config).unwrap();
    let zoom = analysis.zoom.expect("zoom should be available");

    assert_eq!(zoom.focus.start, NaiveTime::from_hms_opt(13, 0, 0).unwrap());
    assert_eq!(zoom.window_events, 2);
    assert_eq!(analysis.distribution.total_events, 3);
    // The fine pass re-buckets the same deduplicated events at 1 minute
    let nonzero: Vec<String> = zoom
        .distribution
        .buckets
        .iter()
        .filter(|(_, stat)| stat.count > 0)
        .map(|(bucket, _)| bucket.label())
        .collect();
    assert_eq!(nonzero, vec!["13:02~13:03", "13:09~13:10"]);
}

#[test]
fn test_events_outside_business_hours_are_invisible_to_percentages() {
    let input = jsonl(&[
        ("2025-06-01T12:30:00Z", "C060", 0), // 21:30 JST, after close
        ("2025-06-01T04:00:00Z", "C060", 0), // 13:00 JST
    ]);
    let log = read_log(
        Cursor::new(input),
        &IngestOptions::default(),
        &VenueCatalog::default(),
    )
    .unwrap();

    let analysis = analyze_venue(
        "C060",
        log.releases("C060").unwrap(),
        &AnalyzerConfig::default(),
    )
    .unwrap();

    assert_eq!(analysis.kept.len(), 2);
    assert_eq!(analysis.distribution.total_events, 1);
    assert_eq!(analysis.distribution.busiest().unwrap().percentage, 100.0);
}

#[test]
fn test_multi_venue_log_analyzes_independently() {
    let input = jsonl(&[
        ("2025-06-01T01:02:00Z", "C060", 0),
        ("2025-06-01T01:03:00Z", "HEH0", 0),
        ("2025-06-01T01:04:00Z", "C060", 0),
        ("2025-06-01T05:00:00Z", "HEH0", 0),
    ]);
    let log = read_log(
        Cursor::new(input),
        &IngestOptions::default(),
        &VenueCatalog::default(),
    )
    .unwrap();

    let analyses = analyze_log(&log, &AnalyzerConfig::default()).unwrap();
    assert_eq!(analyses.len(), 2);

    // C060's burst merges; HEH0's two events are 4 hours apart
    assert_eq!(analyses[0].venue_id, "C060");
    assert_eq!(analyses[0].kept.len(), 1);
    assert_eq!(analyses[1].venue_id, "HEH0");
    assert_eq!(analyses[1].kept.len(), 2);
}

#[test]
fn test_custom_window_and_width() {
    let input = jsonl(&[("2025-06-01T00:07:00Z", "C060", 0)]); // 09:07 JST
    let log = read_log(
        Cursor::new(input),
        &IngestOptions::default(),
        &VenueCatalog::default(),
    )
    .unwrap();

    let config = AnalyzerConfig {
        open: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        close: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        bucket_width: Duration::minutes(30),
        ..AnalyzerConfig::default()
    };
    let analysis = analyze_venue("C060", log.releases("C060").unwrap(), &config).unwrap();

    assert_eq!(analysis.distribution.buckets.len(), 18);
    assert_eq!(analysis.distribution.busiest().unwrap().bucket.label(), "09:00~09:30");
}

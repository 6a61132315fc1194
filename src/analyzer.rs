//! Per-venue analysis pipeline
//!
//! Wires the stages together for one run: deduplicate the release burst
//! stream, bucket the survivors into the business-hours distribution, zoom
//! into the busiest bucket when asked, and derive the weekday / trend /
//! regularity views. Venues are independent and processed in sequence.

use crate::dedup::{DedupPolicy, Deduplicator};
use crate::distribution::{
    DistributionEngine, DistributionError, VenueDistribution, ZoomDistribution,
};
use crate::event::ReleaseEvent;
use crate::ingest::AvailabilityLog;
use crate::trends::{
    daily_release_times, RegularityStats, TemporalTrends, WeekdayPattern, WEEKDAY_LABELS,
};
use crate::venues::VenueCatalog;
use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveTime};
use std::collections::BTreeMap;
use tracing::debug;

/// Knobs for one analysis run, shared by every venue
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Minimum separation between distinct release events
    pub min_interval: Duration,
    pub policy: DedupPolicy,
    /// Business-hours window start
    pub open: NaiveTime,
    /// Business-hours window end (exclusive)
    pub close: NaiveTime,
    pub bucket_width: Duration,
    /// Fine bucket width for the zoom pass; `None` disables zoom
    pub zoom_width: Option<Duration>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::minutes(15),
            policy: DedupPolicy::LastAccepted,
            open: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN),
            bucket_width: Duration::minutes(15),
            zoom_width: None,
        }
    }
}

/// Everything the reports need about one venue
#[derive(Debug, Clone)]
pub struct VenueAnalysis {
    pub venue_id: String,
    /// Release signals before deduplication
    pub raw_releases: usize,
    /// Distinct release events after deduplication
    pub kept: Vec<ReleaseEvent>,
    /// Signals merged into an accepted neighbor
    pub dropped: usize,
    pub distribution: VenueDistribution,
    pub zoom: Option<ZoomDistribution>,
    pub weekday: WeekdayPattern,
    pub trends: TemporalTrends,
    pub regularity: RegularityStats,
    pub daily_times: BTreeMap<NaiveDate, Vec<NaiveTime>>,
}

impl VenueAnalysis {
    /// Share of raw signals removed by deduplication, in percent
    pub fn removal_rate(&self) -> f64 {
        if self.raw_releases == 0 {
            0.0
        } else {
            self.dropped as f64 / self.raw_releases as f64 * 100.0
        }
    }

    /// Render the plain-text report section for this venue
    pub fn render_text(&self, catalog: &VenueCatalog, top: usize) -> String {
        let mut out = String::new();
        let name = catalog.display_name(&self.venue_id);

        out.push_str(&format!("=== {} ({}) ===\n", name, self.venue_id));
        out.push_str(&format!(
            "releases: {} kept of {} raw ({:.1}% merged)\n",
            self.kept.len(),
            self.raw_releases,
            self.removal_rate()
        ));
        out.push_str(&format!(
            "window {}~{}: {} releases\n\n",
            self.distribution.open.format("%H:%M"),
            self.distribution.close.format("%H:%M"),
            self.distribution.total_events
        ));

        out.push_str(" share%   count  window\n");
        out.push_str("-------  ------  -----------\n");
        for ranked in self.distribution.ranking.iter().take(top) {
            out.push_str(&format!(
                "{:7.2}  {:>6}  {}\n",
                ranked.percentage,
                ranked.count,
                ranked.bucket.label()
            ));
        }
        if self.distribution.ranking.is_empty() {
            out.push_str("(no releases inside the window)\n");
        }

        if let Some(zoom) = &self.zoom {
            out.push_str(&format!(
                "\nzoom into {} ({} releases):\n",
                zoom.focus.label(),
                zoom.window_events
            ));
            for (bucket, stat) in zoom
                .distribution
                .buckets
                .iter()
                .filter(|(_, stat)| stat.count > 0)
            {
                out.push_str(&format!("{:>7}  {}\n", stat.count, bucket.label()));
            }
        }

        if self.weekday.total > 0 {
            let weekdays = WEEKDAY_LABELS
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    format!("{} {} ({:.1}%)", label, self.weekday.counts[i], self.weekday.percentage(i))
                })
                .collect::<Vec<_>>()
                .join(" | ");
            out.push_str(&format!("\nweekdays: {}\n", weekdays));
        }

        if !self.regularity.gaps_days.is_empty() {
            out.push_str(&format!(
                "gaps: mean {:.1} d, median {:.1} d, mode {} d, std {:.1} d, longest daily streak {}\n",
                self.regularity.gap_stats.mean,
                self.regularity.gap_stats.median,
                self.regularity.gap_stats.mode,
                self.regularity.gap_stats.std_dev,
                self.regularity.max_consecutive_days
            ));
        }
        if let Some((label, count)) = self.regularity.slot_counts.first() {
            out.push_str(&format!("most released slot: {} ({} times)\n", label, count));
        }

        out
    }
}

/// Run the full pipeline for one venue
pub fn analyze_venue(
    venue_id: &str,
    events: &[ReleaseEvent],
    config: &AnalyzerConfig,
) -> Result<VenueAnalysis> {
    let dedup = Deduplicator::new(config.min_interval, config.policy)?;
    let engine = DistributionEngine::new(config.open, config.close, config.bucket_width)?;

    let outcome = dedup.run(events)?;
    debug!(
        venue = venue_id,
        raw = events.len(),
        kept = outcome.kept.len(),
        "deduplicated release signals"
    );

    let distribution = engine.bucket(venue_id, &outcome.kept);
    let zoom = match config.zoom_width {
        Some(width) => match DistributionEngine::zoom(&distribution, &outcome.kept, width) {
            Ok(zoom) => Some(zoom),
            Err(DistributionError::EmptyRanking) => {
                debug!(venue = venue_id, "no releases inside the window, zoom skipped");
                None
            }
            Err(error) => return Err(error.into()),
        },
        None => None,
    };

    Ok(VenueAnalysis {
        venue_id: venue_id.to_string(),
        raw_releases: events.len(),
        weekday: WeekdayPattern::from_events(&outcome.kept),
        trends: TemporalTrends::from_events(&outcome.kept),
        regularity: RegularityStats::from_events(&outcome.kept),
        daily_times: daily_release_times(&outcome.kept),
        distribution,
        zoom,
        dropped: outcome.dropped,
        kept: outcome.kept,
    })
}

/// Analyze every venue in the log, in venue-code order
pub fn analyze_log(log: &AvailabilityLog, config: &AnalyzerConfig) -> Result<Vec<VenueAnalysis>> {
    let mut analyses = Vec::with_capacity(log.venue_count());
    for (venue_id, events) in log.venues() {
        analyses.push(analyze_venue(venue_id, events, config)?);
    }
    Ok(analyses)
}

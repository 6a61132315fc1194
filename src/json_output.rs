//! JSON output format for analysis reports

use crate::analyzer::VenueAnalysis;
use crate::dedup::DedupPolicy;
use crate::distribution::{VenueDistribution, ZoomDistribution};
use crate::trends::WEEKDAY_LABELS;
use crate::venues::VenueCatalog;
use anyhow::Result;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// One bucket of a distribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonBucket {
    /// Window label, e.g. "10:00~10:15"
    pub window: String,
    pub count: u64,
    pub percentage: f64,
}

/// Ranked non-empty bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRankedBucket {
    pub rank: usize,
    pub window: String,
    pub count: u64,
    pub percentage: f64,
}

/// Fine-resolution pass inside the busiest coarse bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonZoom {
    pub focus: String,
    pub window_events: u64,
    pub buckets: Vec<JsonBucket>,
}

/// Weekday share entry (Monday first)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWeekday {
    pub weekday: String,
    pub count: u64,
    pub percentage: f64,
}

/// Release-date regularity summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRegularity {
    pub mean_gap_days: f64,
    pub median_gap_days: f64,
    pub mode_gap_days: i64,
    pub std_dev_gap_days: f64,
    pub max_consecutive_days: u32,
    pub top_slots: Vec<JsonSlotCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSlotCount {
    pub slot: String,
    pub count: u64,
}

/// Deduplicated release times for one civil date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDaily {
    pub date: String,
    pub times: Vec<String>,
}

/// Full analysis result for one venue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonVenue {
    pub code: String,
    pub name: String,
    pub raw_releases: usize,
    pub releases: usize,
    pub removed: usize,
    pub removal_rate: f64,
    pub total_in_window: u64,
    pub distribution: Vec<JsonBucket>,
    pub ranking: Vec<JsonRankedBucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<JsonZoom>,
    pub weekdays: Vec<JsonWeekday>,
    pub daily: Vec<JsonDaily>,
    pub regularity: JsonRegularity,
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    /// Tool version that produced the report
    pub version: String,
    /// Format identifier
    pub format: String,
    pub interval_minutes: i64,
    pub policy: String,
    pub window: String,
    pub venues: Vec<JsonVenue>,
}

impl JsonReport {
    /// Build the report document from per-venue analyses
    pub fn build(
        analyses: &[VenueAnalysis],
        catalog: &VenueCatalog,
        interval: Duration,
        policy: DedupPolicy,
    ) -> Self {
        let window = analyses
            .first()
            .map(|a| {
                format!(
                    "{}~{}",
                    a.distribution.open.format("%H:%M"),
                    a.distribution.close.format("%H:%M")
                )
            })
            .unwrap_or_default();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "slotdist-report-v1".to_string(),
            interval_minutes: interval.num_minutes(),
            policy: policy.name().to_string(),
            window,
            venues: analyses
                .iter()
                .map(|analysis| Self::build_venue(analysis, catalog))
                .collect(),
        }
    }

    fn build_venue(analysis: &VenueAnalysis, catalog: &VenueCatalog) -> JsonVenue {
        JsonVenue {
            code: analysis.venue_id.clone(),
            name: catalog.display_name(&analysis.venue_id).to_string(),
            raw_releases: analysis.raw_releases,
            releases: analysis.kept.len(),
            removed: analysis.dropped,
            removal_rate: analysis.removal_rate(),
            total_in_window: analysis.distribution.total_events,
            distribution: buckets_of(&analysis.distribution),
            ranking: analysis
                .distribution
                .ranking
                .iter()
                .enumerate()
                .map(|(index, ranked)| JsonRankedBucket {
                    rank: index + 1,
                    window: ranked.bucket.label(),
                    count: ranked.count,
                    percentage: ranked.percentage,
                })
                .collect(),
            zoom: analysis.zoom.as_ref().map(zoom_of),
            weekdays: WEEKDAY_LABELS
                .iter()
                .enumerate()
                .map(|(index, label)| JsonWeekday {
                    weekday: (*label).to_string(),
                    count: analysis.weekday.counts[index],
                    percentage: analysis.weekday.percentage(index),
                })
                .collect(),
            daily: analysis
                .daily_times
                .iter()
                .map(|(date, times)| JsonDaily {
                    date: date.format("%Y-%m-%d").to_string(),
                    times: times
                        .iter()
                        .map(|time| time.format("%H:%M").to_string())
                        .collect(),
                })
                .collect(),
            regularity: JsonRegularity {
                mean_gap_days: analysis.regularity.gap_stats.mean,
                median_gap_days: analysis.regularity.gap_stats.median,
                mode_gap_days: analysis.regularity.gap_stats.mode,
                std_dev_gap_days: analysis.regularity.gap_stats.std_dev,
                max_consecutive_days: analysis.regularity.max_consecutive_days,
                top_slots: analysis
                    .regularity
                    .slot_counts
                    .iter()
                    .take(3)
                    .map(|(slot, count)| JsonSlotCount {
                        slot: slot.clone(),
                        count: *count,
                    })
                    .collect(),
            },
        }
    }

    /// Serialize the report as pretty-printed JSON
    pub fn render(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn buckets_of(distribution: &VenueDistribution) -> Vec<JsonBucket> {
    distribution
        .buckets
        .iter()
        .map(|(bucket, stat)| JsonBucket {
            window: bucket.label(),
            count: stat.count,
            percentage: stat.percentage,
        })
        .collect()
}

fn zoom_of(zoom: &ZoomDistribution) -> JsonZoom {
    JsonZoom {
        focus: zoom.focus.label(),
        window_events: zoom.window_events,
        buckets: buckets_of(&zoom.distribution),
    }
}

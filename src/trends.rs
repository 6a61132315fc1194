//! Weekday, trend, and regularity analyses over deduplicated releases
//!
//! Everything here is retrospective frequency description computed from the
//! deduplicated event set of a single venue.

use crate::event::ReleaseEvent;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use std::collections::{BTreeMap, HashMap};

/// Weekday display labels, Monday first
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Release counts per weekday (index 0 = Monday)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekdayPattern {
    pub counts: [u64; 7],
    pub total: u64,
}

impl WeekdayPattern {
    pub fn from_events(events: &[ReleaseEvent]) -> Self {
        let mut counts = [0u64; 7];
        for event in events {
            counts[event.date().weekday().num_days_from_monday() as usize] += 1;
        }
        Self {
            counts,
            total: counts.iter().sum(),
        }
    }

    /// Share of releases on the given weekday, 0 when there are no releases
    pub fn percentage(&self, weekday: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.counts[weekday] as f64 / self.total as f64 * 100.0
        }
    }

    /// Weekday index with the most releases, earliest on ties
    pub fn busiest(&self) -> Option<usize> {
        let max = *self.counts.iter().max()?;
        if max == 0 {
            return None;
        }
        self.counts.iter().position(|&c| c == max)
    }
}

/// Release counts per day, ISO week (keyed by its Monday), and month
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalTrends {
    pub daily: BTreeMap<NaiveDate, u64>,
    pub weekly: BTreeMap<NaiveDate, u64>,
    pub monthly: BTreeMap<(i32, u32), u64>,
}

impl TemporalTrends {
    pub fn from_events(events: &[ReleaseEvent]) -> Self {
        let mut trends = Self::default();
        for event in events {
            let date = event.date();
            *trends.daily.entry(date).or_insert(0) += 1;
            let week_start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
            *trends.weekly.entry(week_start).or_insert(0) += 1;
            *trends.monthly.entry((date.year(), date.month())).or_insert(0) += 1;
        }
        trends
    }
}

/// Mean / median / mode / standard deviation of day gaps
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GapStats {
    pub mean: f64,
    pub median: f64,
    pub mode: i64,
    pub std_dev: f64,
}

/// How regular the release schedule is across dates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegularityStats {
    /// Gaps in days between consecutive distinct release dates
    pub gaps_days: Vec<i64>,
    pub gap_stats: GapStats,
    /// Longest run of consecutive release days
    pub max_consecutive_days: u32,
    /// Slot labels by frequency, descending, ties broken alphabetically
    pub slot_counts: Vec<(String, u64)>,
}

impl RegularityStats {
    pub fn from_events(events: &[ReleaseEvent]) -> Self {
        let mut dates: Vec<NaiveDate> = events.iter().map(|e| e.date()).collect();
        dates.sort_unstable();
        dates.dedup();

        let gaps_days: Vec<i64> = dates
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_days())
            .collect();

        let mut streak = 1u32;
        let mut max_consecutive_days = u32::from(!dates.is_empty());
        for gap in &gaps_days {
            if *gap == 1 {
                streak += 1;
                max_consecutive_days = max_consecutive_days.max(streak);
            } else {
                streak = 1;
            }
        }

        let mut label_counts: HashMap<&str, u64> = HashMap::new();
        for event in events {
            *label_counts.entry(event.slot_label.as_str()).or_insert(0) += 1;
        }
        let mut slot_counts: Vec<(String, u64)> = label_counts
            .into_iter()
            .map(|(label, count)| (label.to_string(), count))
            .collect();
        slot_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            gap_stats: gap_stats(&gaps_days),
            gaps_days,
            max_consecutive_days,
            slot_counts,
        }
    }
}

/// Deduplicated release times grouped per civil date, for the daily table
pub fn daily_release_times(events: &[ReleaseEvent]) -> BTreeMap<NaiveDate, Vec<NaiveTime>> {
    let mut daily: BTreeMap<NaiveDate, Vec<NaiveTime>> = BTreeMap::new();
    for event in events {
        daily.entry(event.date()).or_default().push(event.time_of_day());
    }
    for times in daily.values_mut() {
        times.sort_unstable();
    }
    daily
}

fn gap_stats(gaps: &[i64]) -> GapStats {
    if gaps.is_empty() {
        return GapStats::default();
    }

    let count = gaps.len();
    let sum: i64 = gaps.iter().sum();
    let mean = sum as f64 / count as f64;

    let mut sorted = gaps.to_vec();
    sorted.sort_unstable();
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) as f64 / 2.0
    } else {
        sorted[count / 2] as f64
    };

    let mut frequency: HashMap<i64, u64> = HashMap::new();
    for gap in gaps {
        *frequency.entry(*gap).or_insert(0) += 1;
    }
    // Most frequent gap, smallest on ties
    let mode = frequency
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(gap, _)| gap)
        .unwrap_or(0);

    let variance = gaps
        .iter()
        .map(|gap| {
            let diff = *gap as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / count as f64;

    GapStats {
        mean,
        median,
        mode,
        std_dev: variance.sqrt(),
    }
}

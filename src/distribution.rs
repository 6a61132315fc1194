//! Time-of-day bucketing and ranked release distributions
//!
//! Partitions a business-hours window into fixed-width buckets, histograms
//! deduplicated release times into them, and ranks the non-empty buckets by
//! share. The same engine runs the coarse 15-minute pass and the 1-minute
//! zoom pass inside the busiest coarse bucket.

use crate::event::ReleaseEvent;
use chrono::{Duration, NaiveTime};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DistributionError {
    #[error("bucket width must be positive, got {0} seconds")]
    NonPositiveWidth(i64),
    #[error("window close {close} must be after open {open}")]
    EmptyWindow { open: NaiveTime, close: NaiveTime },
    #[error("bucket width of {width_minutes} minutes does not evenly divide the window {open}..{close}")]
    UnevenPartition {
        open: NaiveTime,
        close: NaiveTime,
        width_minutes: i64,
    },
    #[error("no bucket has any events, nothing to zoom into")]
    EmptyRanking,
}

/// Half-open interval of civil time-of-day, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeBucket {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeBucket {
    /// Label in the report format, e.g. "10:00~10:15"
    pub fn label(&self) -> String {
        format!("{}~{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }

    /// Whether a time-of-day falls inside this bucket
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time < self.end
    }
}

/// Count and share of one bucket for one venue
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BucketStatistic {
    pub count: u64,
    /// `count / total_events * 100`, defined as 0 when the total is 0
    pub percentage: f64,
}

/// A non-empty bucket with its rank data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedBucket {
    pub bucket: TimeBucket,
    pub count: u64,
    pub percentage: f64,
}

/// Ranked time-of-day distribution for one venue
#[derive(Debug, Clone, PartialEq)]
pub struct VenueDistribution {
    pub venue_id: String,
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub bucket_width: Duration,
    /// Number of deduplicated events inside `[open, close)`; events outside
    /// the window count neither here nor in any bucket
    pub total_events: u64,
    /// Every bucket of the partition, in window order, empty ones included
    pub buckets: Vec<(TimeBucket, BucketStatistic)>,
    /// Buckets with `count > 0`, sorted by share descending, ties broken by
    /// earlier start time
    pub ranking: Vec<RankedBucket>,
}

impl VenueDistribution {
    /// First entry of the ranking, if any bucket saw events
    pub fn busiest(&self) -> Option<&RankedBucket> {
        self.ranking.first()
    }
}

/// Fine-resolution re-bucketing of the busiest coarse bucket
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomDistribution {
    /// The winning coarse bucket the zoom window equals
    pub focus: TimeBucket,
    /// Events inside the zoom window (distinct from the venue total)
    pub window_events: u64,
    pub distribution: VenueDistribution,
}

/// Buckets deduplicated release events within a validated window partition
#[derive(Debug, Clone, Copy)]
pub struct DistributionEngine {
    open: NaiveTime,
    close: NaiveTime,
    width: Duration,
    bucket_count: usize,
}

impl DistributionEngine {
    /// Validate the window configuration. The width must be positive, the
    /// window non-empty, and the width must evenly divide the window so the
    /// buckets exactly cover `[open, close)`.
    pub fn new(
        open: NaiveTime,
        close: NaiveTime,
        width: Duration,
    ) -> Result<Self, DistributionError> {
        if width <= Duration::zero() {
            return Err(DistributionError::NonPositiveWidth(width.num_seconds()));
        }
        if close <= open {
            return Err(DistributionError::EmptyWindow { open, close });
        }
        let span = close.signed_duration_since(open);
        if span.num_seconds() % width.num_seconds() != 0 {
            return Err(DistributionError::UnevenPartition {
                open,
                close,
                width_minutes: width.num_minutes(),
            });
        }
        let bucket_count = (span.num_seconds() / width.num_seconds()) as usize;
        Ok(Self {
            open,
            close,
            width,
            bucket_count,
        })
    }

    pub fn open(&self) -> NaiveTime {
        self.open
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }

    pub fn width(&self) -> Duration {
        self.width
    }

    /// The ordered bucket partition of the window
    pub fn partition(&self) -> Vec<TimeBucket> {
        (0..self.bucket_count)
            .map(|i| {
                let start = self.open + self.width * i as i32;
                TimeBucket {
                    start,
                    end: start + self.width,
                }
            })
            .collect()
    }

    /// Histogram events by time-of-day and rank the non-empty buckets.
    ///
    /// Total function: an empty event set or one entirely outside the window
    /// yields `total_events == 0`, every percentage 0, and an empty ranking.
    pub fn bucket(&self, venue_id: &str, events: &[ReleaseEvent]) -> VenueDistribution {
        let mut counts = vec![0u64; self.bucket_count];
        let width_secs = self.width.num_seconds();
        let span_secs = self.close.signed_duration_since(self.open).num_seconds();

        for event in events {
            let offset = event
                .time_of_day()
                .signed_duration_since(self.open)
                .num_seconds();
            // Outside business hours: excluded from counts and denominator
            if offset < 0 || offset >= span_secs {
                continue;
            }
            counts[(offset / width_secs) as usize] += 1;
        }

        let total_events: u64 = counts.iter().sum();
        let buckets: Vec<(TimeBucket, BucketStatistic)> = self
            .partition()
            .into_iter()
            .zip(counts)
            .map(|(bucket, count)| {
                let percentage = if total_events > 0 {
                    count as f64 / total_events as f64 * 100.0
                } else {
                    0.0
                };
                (bucket, BucketStatistic { count, percentage })
            })
            .collect();

        // Share descending is count descending for a fixed denominator, so
        // rank on the integer and avoid float comparisons.
        let mut ranking: Vec<RankedBucket> = buckets
            .iter()
            .filter(|(_, stat)| stat.count > 0)
            .map(|(bucket, stat)| RankedBucket {
                bucket: *bucket,
                count: stat.count,
                percentage: stat.percentage,
            })
            .collect();
        ranking.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.bucket.start.cmp(&b.bucket.start))
        });

        VenueDistribution {
            venue_id: venue_id.to_string(),
            open: self.open,
            close: self.close,
            bucket_width: self.width,
            total_events,
            buckets,
            ranking,
        }
    }

    /// Re-bucket the same deduplicated event set at a finer width inside the
    /// top-ranked coarse bucket. Fails with [`DistributionError::EmptyRanking`]
    /// when the coarse pass saw no in-window events.
    pub fn zoom(
        coarse: &VenueDistribution,
        events: &[ReleaseEvent],
        fine_width: Duration,
    ) -> Result<ZoomDistribution, DistributionError> {
        let top = coarse
            .ranking
            .first()
            .ok_or(DistributionError::EmptyRanking)?;
        let engine = Self::new(top.bucket.start, top.bucket.end, fine_width)?;
        let distribution = engine.bucket(&coarse.venue_id, events);
        Ok(ZoomDistribution {
            focus: top.bucket,
            window_events: distribution.total_events,
            distribution,
        })
    }
}

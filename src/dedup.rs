//! Minimum-interval deduplication of release signals
//!
//! The collector samples availability every few minutes, so one logical
//! release shows up as a burst of records. Two collapse rules are in use:
//! a streaming comparison against the last accepted event, and a stricter
//! comparison against every accepted event. Call sites pick one explicitly.

use crate::event::ReleaseEvent;
use chrono::Duration;
use clap::ValueEnum;
use thiserror::Error;

/// Which comparison rule decides that two release signals are distinct
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DedupPolicy {
    /// Accept an event when it is at least the minimum interval after the
    /// most recently accepted event. O(n), rejected events merge into the
    /// previous accepted one.
    LastAccepted,
    /// Accept an event only when it is at least the minimum interval away
    /// from every already-accepted event. O(n²). On sorted input the nearest
    /// accepted event is the most recent one, so this selects the same set
    /// as `LastAccepted`; call sites still declare which rule they mean.
    AllRetained,
}

impl DedupPolicy {
    /// Stable name used in reports and the JSON output
    pub fn name(&self) -> &'static str {
        match self {
            DedupPolicy::LastAccepted => "last-accepted",
            DedupPolicy::AllRetained => "all-retained",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DedupError {
    #[error("minimum interval must be positive, got {0} seconds")]
    NonPositiveInterval(i64),
    #[error("release events are not sorted ascending by observed time (violation at index {0})")]
    UnsortedInput(usize),
}

/// Result of one deduplication run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupOutcome {
    /// Accepted events, in input order
    pub kept: Vec<ReleaseEvent>,
    /// Number of events merged into an accepted neighbor
    pub dropped: usize,
}

/// Collapses bursts of release signals into distinct release events.
///
/// Pure function of (sorted input, interval, policy). Input must already be
/// sorted ascending by `observed_at`; the ingestion layer is the one place
/// that sorts, so an out-of-order sequence here is a caller bug and fails
/// with [`DedupError::UnsortedInput`] rather than being silently reordered.
#[derive(Debug, Clone, Copy)]
pub struct Deduplicator {
    min_interval: Duration,
    policy: DedupPolicy,
}

impl Deduplicator {
    /// Build a deduplicator. The interval must be strictly positive: zero
    /// would keep every sample and a negative interval is meaningless.
    pub fn new(min_interval: Duration, policy: DedupPolicy) -> Result<Self, DedupError> {
        if min_interval <= Duration::zero() {
            return Err(DedupError::NonPositiveInterval(min_interval.num_seconds()));
        }
        Ok(Self {
            min_interval,
            policy,
        })
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Run the configured policy over one venue's sorted release events.
    ///
    /// Re-applying the same policy to its own output keeps everything: both
    /// rules only ever accept events that are pairwise separated by at least
    /// the minimum interval.
    pub fn run(&self, events: &[ReleaseEvent]) -> Result<DedupOutcome, DedupError> {
        if let Some(position) = first_unsorted_index(events) {
            return Err(DedupError::UnsortedInput(position));
        }

        let kept = match self.policy {
            DedupPolicy::LastAccepted => self.run_last_accepted(events),
            DedupPolicy::AllRetained => self.run_all_retained(events),
        };
        let dropped = events.len() - kept.len();
        Ok(DedupOutcome { kept, dropped })
    }

    fn run_last_accepted(&self, events: &[ReleaseEvent]) -> Vec<ReleaseEvent> {
        let mut kept: Vec<ReleaseEvent> = Vec::new();
        let mut last_accepted = None;

        for event in events {
            let accept = match last_accepted {
                None => true,
                Some(last) => event.observed_at - last >= self.min_interval,
            };
            if accept {
                last_accepted = Some(event.observed_at);
                kept.push(event.clone());
            }
        }
        kept
    }

    fn run_all_retained(&self, events: &[ReleaseEvent]) -> Vec<ReleaseEvent> {
        let mut kept: Vec<ReleaseEvent> = Vec::new();

        for event in events {
            let accept = kept
                .iter()
                .all(|accepted| event.observed_at - accepted.observed_at >= self.min_interval);
            if accept {
                kept.push(event.clone());
            }
        }
        kept
    }
}

/// Index of the first event observed earlier than its predecessor, if any
fn first_unsorted_index(events: &[ReleaseEvent]) -> Option<usize> {
    events
        .windows(2)
        .position(|pair| pair[1].observed_at < pair[0].observed_at)
        .map(|i| i + 1)
}

//! Domain model for availability log records and release events

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Availability state of a reservation slot at sample time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// The slot can be booked (a release signal)
    Available,
    /// The slot is taken
    Unavailable,
}

/// One line of the availability log as the collector writes it.
///
/// The wire `status` is an integer where `0` means the slot is open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRecord {
    /// Sample time in UTC (RFC 3339)
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Opaque venue code (e.g. "C060")
    pub pavilion_code: String,
    /// Opaque label of the reservation slot the sample concerns
    pub time_slot: String,
    /// Raw availability flag: 0 = available, anything else = unavailable
    pub status: i64,
}

impl WireRecord {
    /// Decode the raw status flag
    pub fn state(&self) -> SlotState {
        if self.status == 0 {
            SlotState::Available
        } else {
            SlotState::Unavailable
        }
    }
}

/// A state sample normalized to civil time at minute resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub venue_id: String,
    /// Civil timestamp in the configured fixed offset
    pub observed_at: NaiveDateTime,
    pub slot_label: String,
    pub state: SlotState,
}

impl RawEvent {
    /// Keep only samples that observed the slot as available
    pub fn into_release(self) -> Option<ReleaseEvent> {
        match self.state {
            SlotState::Available => Some(ReleaseEvent {
                venue_id: self.venue_id,
                observed_at: self.observed_at,
                slot_label: self.slot_label,
            }),
            SlotState::Unavailable => None,
        }
    }
}

/// The moment a slot became available, before or after deduplication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEvent {
    pub venue_id: String,
    pub observed_at: NaiveDateTime,
    pub slot_label: String,
}

impl ReleaseEvent {
    /// Civil date of the release
    pub fn date(&self) -> NaiveDate {
        self.observed_at.date()
    }

    /// Civil time-of-day of the release
    pub fn time_of_day(&self) -> NaiveTime {
        self.observed_at.time()
    }
}

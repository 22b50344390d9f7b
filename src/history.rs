//! Daily consumption history for the dashboard chart.
//!
//! Fixed capacity, no heap. Once full, new points are dropped; nothing
//! is evicted. The counters in [`SchedulerState`](crate::scheduler::SchedulerState)
//! stay the source of truth.

use serde::Serialize;

use crate::config::HISTORY_CAPACITY;

/// One sample: cumulative grams eaten at a given time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryPoint {
    /// Seconds since midnight.
    #[serde(rename = "t")]
    pub timestamp_secs: u32,
    /// Cumulative mass dispensed today (grams).
    #[serde(rename = "m")]
    pub cumulative_mass_g: i32,
}

#[derive(Debug, Clone, Default)]
pub struct FeedHistory {
    points: heapless::Vec<HistoryPoint, HISTORY_CAPACITY>,
}

impl FeedHistory {
    pub const fn new() -> Self {
        Self {
            points: heapless::Vec::new(),
        }
    }

    /// Append a point. Returns `false` if the buffer is already full.
    pub fn record(&mut self, timestamp_secs: u32, cumulative_mass_g: i32) -> bool {
        self.points
            .push(HistoryPoint {
                timestamp_secs,
                cumulative_mass_g,
            })
            .is_ok()
    }

    /// Drop everything and start over from a single zero point.
    pub fn reset_to_zero(&mut self, timestamp_secs: u32) {
        self.points.clear();
        let _ = self.record(timestamp_secs, 0);
    }

    pub fn points(&self) -> &[HistoryPoint] {
        &self.points
    }

    /// The backing buffer, for snapshots that keep the fixed capacity.
    pub fn buffer(&self) -> &heapless::Vec<HistoryPoint, HISTORY_CAPACITY> {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.points.is_full()
    }
}

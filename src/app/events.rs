//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them: log to serial, show on the display, etc.

use crate::scheduler::{FeedOutcome, FeedingWindow};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service restored its state and is running.
    Started(StatusData),

    /// A feed was attempted (automatically or on request).
    Feed {
        outcome: FeedOutcome,
        at_secs: u32,
        consumed_g: i32,
    },

    /// Daily counters were cleared.
    DayReset { manual: bool },

    /// Auto-feed switch or window changed.
    SettingsChanged {
        auto_feed: bool,
        window: FeedingWindow,
    },

    /// Result of a clock resynchronisation attempt.
    ClockSynced(bool),

    /// Status snapshot requested by the user.
    Status(StatusData),

    /// Seconds until the next automatic full feed.
    NextFeedIn { secs: u32 },
}

/// A point-in-time summary of the feeder, small enough for a display line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusData {
    pub full_feeds: u32,
    pub snacks: u32,
    pub consumed_g: i32,
    pub ration_g: i32,
    pub next_full_feed_secs: u32,
    pub auto_feed: bool,
}

//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A display adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::clock::{format_duration, format_time_of_day};
use crate::scheduler::FeedOutcome;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Feed {
                outcome,
                at_secs,
                consumed_g,
            } => {
                let at = format_time_of_day(*at_secs);
                match outcome {
                    FeedOutcome::Fed { kind, mass_g } => info!(
                        "FEED | {} | {} +{}g | total={}g",
                        at, kind, mass_g, consumed_g
                    ),
                    other => info!("FEED | {} | {} | total={}g", at, other.message(), consumed_g),
                }
            }
            AppEvent::DayReset { manual } => {
                info!("DAY | reset ({})", if *manual { "manual" } else { "midnight" });
            }
            AppEvent::SettingsChanged { auto_feed, window } => {
                info!(
                    "SET | auto={} | window={}",
                    if *auto_feed { "on" } else { "off" },
                    window
                );
            }
            AppEvent::ClockSynced(true) => info!("CLOCK | synchronised"),
            AppEvent::ClockSynced(false) => warn!("CLOCK | sync failed, keeping local time"),
            AppEvent::Status(s) | AppEvent::Started(s) => {
                let tag = if matches!(event, AppEvent::Started(_)) {
                    "START"
                } else {
                    "STATUS"
                };
                info!(
                    "{} | croquettes={} croquinettes={} | {}/{}g | next={} | auto={}",
                    tag,
                    s.full_feeds,
                    s.snacks,
                    s.consumed_g,
                    s.ration_g,
                    format_time_of_day(s.next_full_feed_secs),
                    if s.auto_feed { "on" } else { "off" }
                );
            }
            AppEvent::NextFeedIn { secs } => {
                info!("NEXT | croquettes in {}", format_duration(*secs));
            }
        }
    }
}

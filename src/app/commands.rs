//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (button, HTTP)
//! that the [`AppService`](super::service::AppService) interprets and acts upon.

use crate::error::WindowError;
use crate::scheduler::{FeedKind, FeedOutcome, WindowEdge};

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Dispense now, subject to bowl, ration and cooldown checks.
    Feed(FeedKind),

    /// Turn time-driven feeding on or off.
    SetAutoFeed(bool),

    /// Move one bound of the feeding window.
    SetWindow {
        edge: WindowEdge,
        hour: u8,
        minute: u8,
    },

    /// Start a new day now.
    ResetDay,

    /// Resynchronise the wall clock.
    ResyncClock,

    /// Emit a status snapshot.
    ShowStatus,

    /// Emit the time left before the next full feed.
    ShowNextFeed,
}

/// What a command did. Returned to the caller for display or HTTP text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Feed(FeedOutcome),
    /// Setting or reset applied.
    Applied,
    /// Window setting refused; nothing changed.
    Rejected(WindowError),
    ClockSync(bool),
    /// Informational command, event emitted.
    Shown,
}

impl CommandOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Feed(outcome) => outcome.message(),
            Self::Applied | Self::Shown => "OK".to_string(),
            Self::Rejected(e) => e.to_string(),
            Self::ClockSync(true) => "Clock synchronised".to_string(),
            Self::ClockSync(false) => "Clock sync failed".to_string(),
        }
    }
}

//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the feeding scheduler. It turns loop events and
//! user commands into scheduler operations and reports what happened
//! through the [`EventSink`]. All I/O flows through port traits injected
//! at call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  ClockPort ───▶ ┌────────────────────────┐ ──▶ EventSink
//! PresencePort ──▶│       AppService        │
//! DispenserPort ◀─│  FeedingScheduler       │◀──▶ StoragePort
//!                 └────────────────────────┘
//! ```

use log::{info, warn};

use crate::api::responses::DashboardData;
use crate::clock::WallTime;
use crate::config::FeederConfig;
use crate::events::Event;
use crate::scheduler::{FeedKind, FeedOutcome, FeedingScheduler};

use super::commands::{AppCommand, CommandOutcome};
use super::events::{AppEvent, StatusData};
use super::ports::{ClockPort, DispenserPort, EventSink, PresencePort, StoragePort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    scheduler: FeedingScheduler,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** load persisted state; call [`start`](Self::start) next.
    pub fn new(config: FeederConfig) -> Self {
        Self {
            scheduler: FeedingScheduler::new(config),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Restore persisted state and start a new day if the stored counters
    /// belong to an earlier one (a reboot across midnight).
    pub fn start(
        &mut self,
        clock: &impl ClockPort,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        self.scheduler.restore(store);
        let now = clock.now();

        let stored_day = self.scheduler.state().day_stamp;
        if clock.is_synced() && stored_day != 0 && stored_day != now.day_stamp() {
            info!(
                "AppService: counters are from {}, today is {}",
                stored_day,
                now.day_stamp()
            );
            self.scheduler.on_midnight(&now, store);
            sink.emit(&AppEvent::DayReset { manual: false });
        } else {
            self.scheduler.seed_history(now.seconds_since_midnight());
        }

        let status = self.status();
        sink.emit(&AppEvent::Started(status));
        info!(
            "AppService started: {} / {} g, auto feed {}",
            status.consumed_g, status.ration_g, status.auto_feed
        );
    }

    // ── Event dispatch ────────────────────────────────────────

    /// Handle one control-loop event.
    ///
    /// The `hw` parameter satisfies **both** [`PresencePort`] and
    /// [`DispenserPort`]; they usually live on the same board adapter.
    pub fn handle_event(
        &mut self,
        event: Event,
        hw: &mut (impl PresencePort + DispenserPort),
        clock: &mut impl ClockPort,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        match event {
            Event::ControlTick => self.tick(hw, &*clock, store, sink),
            Event::Midnight => {
                let now = clock.now();
                self.scheduler.on_midnight(&now, store);
                sink.emit(&AppEvent::DayReset { manual: false });
                // Best-effort; the day already rolled over on local time.
                let ok = clock.resync();
                if !ok {
                    warn!("AppService: clock resync after midnight failed");
                }
                sink.emit(&AppEvent::ClockSynced(ok));
            }
            Event::ButtonShortPress
            | Event::ButtonDoublePress
            | Event::ButtonLongPress
            | Event::ButtonVeryLongPress
            | Event::ButtonVeryVeryLongPress => {
                if let Some(cmd) = command_for_button(event) {
                    let _ = self.handle_command(cmd, hw, clock, store, sink);
                }
            }
        }
    }

    /// One feed check. Exposed for callers that drive the loop directly.
    pub fn tick(
        &mut self,
        hw: &mut (impl PresencePort + DispenserPort),
        clock: &impl ClockPort,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let now = clock.now();
        if let Some(outcome) = self.scheduler.tick(&now, hw, store) {
            self.emit_feed(outcome, &now, sink);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (button, HTTP).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut (impl PresencePort + DispenserPort),
        clock: &mut impl ClockPort,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> CommandOutcome {
        match cmd {
            AppCommand::Feed(kind) => {
                let now = clock.now();
                let outcome = self.scheduler.attempt_feed(kind, &now, hw, store);
                self.emit_feed(outcome, &now, sink);
                CommandOutcome::Feed(outcome)
            }
            AppCommand::SetAutoFeed(enabled) => {
                self.scheduler.set_auto_feed_enabled(enabled, store);
                self.emit_settings(sink);
                CommandOutcome::Applied
            }
            AppCommand::SetWindow { edge, hour, minute } => {
                match self.scheduler.set_window(edge, hour, minute, store) {
                    Ok(()) => {
                        self.emit_settings(sink);
                        CommandOutcome::Applied
                    }
                    Err(e) => {
                        warn!("AppService: window change refused: {}", e);
                        CommandOutcome::Rejected(e)
                    }
                }
            }
            AppCommand::ResetDay => {
                let now = clock.now();
                self.scheduler.reset(&now, store);
                sink.emit(&AppEvent::DayReset { manual: true });
                CommandOutcome::Applied
            }
            AppCommand::ResyncClock => {
                let ok = clock.resync();
                sink.emit(&AppEvent::ClockSynced(ok));
                CommandOutcome::ClockSync(ok)
            }
            AppCommand::ShowStatus => {
                sink.emit(&AppEvent::Status(self.status()));
                CommandOutcome::Shown
            }
            AppCommand::ShowNextFeed => {
                let secs = self
                    .scheduler
                    .secs_until_next_full_feed(clock.seconds_since_midnight());
                sink.emit(&AppEvent::NextFeedIn { secs });
                CommandOutcome::Shown
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self) -> StatusData {
        let s = self.scheduler.state();
        StatusData {
            full_feeds: s.full_feed_count,
            snacks: s.snack_feed_count,
            consumed_g: self.scheduler.consumed_mass_g(),
            ration_g: self.scheduler.config().daily_ration_target_g,
            next_full_feed_secs: self.scheduler.next_full_feed_secs(),
            auto_feed: s.auto_feed_enabled,
        }
    }

    /// Snapshot for the web dashboard.
    pub fn dashboard(&self) -> DashboardData {
        DashboardData::from_scheduler(&self.scheduler)
    }

    pub fn scheduler(&self) -> &FeedingScheduler {
        &self.scheduler
    }

    /// Feed checks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn emit_feed(&self, outcome: FeedOutcome, now: &WallTime, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Feed {
            outcome,
            at_secs: now.seconds_since_midnight(),
            consumed_g: self.scheduler.consumed_mass_g(),
        });
    }

    fn emit_settings(&self, sink: &mut impl EventSink) {
        let s = self.scheduler.state();
        sink.emit(&AppEvent::SettingsChanged {
            auto_feed: s.auto_feed_enabled,
            window: s.window,
        });
    }
}

/// Button gesture → command.
pub fn command_for_button(event: Event) -> Option<AppCommand> {
    match event {
        Event::ButtonShortPress => Some(AppCommand::ShowStatus),
        Event::ButtonDoublePress => Some(AppCommand::ShowNextFeed),
        Event::ButtonLongPress => Some(AppCommand::Feed(FeedKind::Snack)),
        Event::ButtonVeryLongPress => Some(AppCommand::ResyncClock),
        Event::ButtonVeryVeryLongPress => Some(AppCommand::ResetDay),
        Event::ControlTick | Event::Midnight => None,
    }
}

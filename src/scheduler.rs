//! Feeding scheduler and dispensing engine.
//!
//! Owns every feeding decision: when the automatic full feed fires, whether
//! a manual request may dispense, how the remaining daily ration is spread
//! over the rest of the window, and what gets persisted afterwards.
//!
//! ```text
//!   ControlTick ──▶ tick() ──┐
//!   Button / HTTP ───────────┼──▶ attempt_feed() ──▶ PresencePort
//!                            │          │
//!                            │          ├──▶ DispenserPort (blocking, ≤ 2 s)
//!                            │          ├──▶ recompute_pacing()
//!                            │          ├──▶ FeedHistory
//!                            │          └──▶ StoragePort (fire-and-forget)
//!   Midnight / reset ────────┴──▶ reset_day()
//! ```
//!
//! There is no "dispensing in progress" state: the valve call is synchronous
//! and every caller runs on the single control-loop thread, so two feed
//! attempts can never interleave.

use core::fmt;

use log::{debug, info};

use crate::app::ports::{DispenserPort, PresencePort, StoragePort};
use crate::clock::{WallTime, format_hhmm};
use crate::config::{FeederConfig, MAX_DISPENSE_MS};
use crate::error::WindowError;
use crate::history::FeedHistory;
use crate::persistence;

// ═══════════════════════════════════════════════════════════════
//  Window
// ═══════════════════════════════════════════════════════════════

/// Daily interval during which automatic feeding may happen.
/// Same-day only: `end` is never before `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedingWindow {
    pub start_hour: u8,
    pub start_minute: u8,
    pub end_hour: u8,
    pub end_minute: u8,
}

/// Which bound of the window a setter targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEdge {
    Start,
    End,
}

impl FeedingWindow {
    pub fn from_config(config: &FeederConfig) -> Self {
        Self {
            start_hour: config.default_start_hour,
            start_minute: config.default_start_minute,
            end_hour: config.default_end_hour,
            end_minute: config.default_end_minute,
        }
    }

    pub fn validate(&self) -> Result<(), WindowError> {
        check_hour_minute(self.start_hour, self.start_minute)?;
        check_hour_minute(self.end_hour, self.end_minute)?;
        if self.end_minute_of_day() < self.start_minute_of_day() {
            return Err(WindowError::EndBeforeStart);
        }
        Ok(())
    }

    /// Inclusive on both ends, compared at minute granularity: with an end
    /// of 23:15 the whole 23:15 minute is still inside.
    pub fn contains(&self, secs_since_midnight: u32) -> bool {
        let minute = secs_since_midnight / 60;
        minute >= self.start_minute_of_day() && minute <= self.end_minute_of_day()
    }

    pub fn start_secs(&self) -> u32 {
        self.start_minute_of_day() * 60
    }

    pub fn end_secs(&self) -> u32 {
        self.end_minute_of_day() * 60
    }

    /// Copy with one edge moved. Not validated.
    pub fn with_edge(mut self, edge: WindowEdge, hour: u8, minute: u8) -> Self {
        match edge {
            WindowEdge::Start => {
                self.start_hour = hour;
                self.start_minute = minute;
            }
            WindowEdge::End => {
                self.end_hour = hour;
                self.end_minute = minute;
            }
        }
        self
    }

    fn start_minute_of_day(&self) -> u32 {
        self.start_hour as u32 * 60 + self.start_minute as u32
    }

    fn end_minute_of_day(&self) -> u32 {
        self.end_hour as u32 * 60 + self.end_minute as u32
    }
}

impl fmt::Display for FeedingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            format_hhmm(self.start_hour, self.start_minute),
            format_hhmm(self.end_hour, self.end_minute)
        )
    }
}

fn check_hour_minute(hour: u8, minute: u8) -> Result<(), WindowError> {
    if hour > 23 {
        return Err(WindowError::HourOutOfRange(hour));
    }
    if minute > 59 {
        return Err(WindowError::MinuteOutOfRange(minute));
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
//  State
// ═══════════════════════════════════════════════════════════════

/// The mutable heart of the feeder. One instance, owned by
/// [`FeedingScheduler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerState {
    /// Master switch for time-driven feeding. Manual feeds ignore it.
    pub auto_feed_enabled: bool,
    pub window: FeedingWindow,
    /// Seconds since midnight of the last full feed.
    pub last_full_feed_secs: u32,
    /// Seconds since midnight of the last snack.
    pub last_snack_feed_secs: u32,
    pub full_feed_count: u32,
    pub snack_feed_count: u32,
    /// Full feeds postponed because the bowl was not empty.
    pub deferral_count: u32,
    /// Adaptive minimum gap between full feeds.
    pub full_feed_interval_secs: u32,
    /// `yyyymmdd` of the day the counters belong to; 0 when unknown.
    pub day_stamp: u32,
}

impl SchedulerState {
    /// First-boot state: counters cleared, first feed due when the window opens.
    pub fn initial(config: &FeederConfig) -> Self {
        let window = FeedingWindow::from_config(config);
        Self {
            auto_feed_enabled: config.default_auto_feed,
            window,
            last_full_feed_secs: window
                .start_secs()
                .saturating_sub(config.full_feed_base_interval_secs),
            last_snack_feed_secs: 0,
            full_feed_count: 0,
            snack_feed_count: 0,
            deferral_count: 0,
            full_feed_interval_secs: config.full_feed_base_interval_secs,
            day_stamp: 0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Outcomes
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    /// Scheduled ration portion.
    Full,
    /// Small manual treat.
    Snack,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Snack => write!(f, "snack"),
        }
    }
}

/// Result of a feed attempt. None of these are failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// Food was dispensed.
    Fed { kind: FeedKind, mass_g: i32 },
    /// Full feed postponed, bowl still has food.
    Deferred { deferrals: u32 },
    /// Snack refused, bowl still has food.
    Rejected,
    /// Daily ration already reached.
    RationMet,
    /// Snack cooldown still running.
    TooSoon { remaining_secs: u32 },
}

impl FeedOutcome {
    pub fn is_fed(&self) -> bool {
        matches!(self, Self::Fed { .. })
    }

    /// User-facing message for the display and HTTP responses.
    pub fn message(&self) -> String {
        match self {
            Self::Fed {
                kind: FeedKind::Full,
                mass_g,
            } => format!("Croquettes served ({mass_g} g)"),
            Self::Fed {
                kind: FeedKind::Snack,
                mass_g,
            } => format!("Croquinette served ({mass_g} g)"),
            Self::Deferred { deferrals } => {
                format!("Bowl not empty, feed postponed ({deferrals}x)")
            }
            Self::Rejected => "Bowl not empty, no snack".to_string(),
            Self::RationMet => "Daily ration reached".to_string(),
            Self::TooSoon { remaining_secs } => {
                format!("Too soon, wait {} min", remaining_secs.div_ceil(60))
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

pub struct FeedingScheduler {
    config: FeederConfig,
    state: SchedulerState,
    history: FeedHistory,
}

impl FeedingScheduler {
    /// Scheduler in first-boot state. Call [`restore`](Self::restore) to
    /// load persisted values.
    pub fn new(config: FeederConfig) -> Self {
        let state = SchedulerState::initial(&config);
        Self {
            config,
            state,
            history: FeedHistory::new(),
        }
    }

    /// Replace the in-memory state with what the store holds. Missing keys
    /// keep their defaults.
    pub fn restore(&mut self, store: &impl StoragePort) {
        self.state = persistence::load(store, &self.config);
        info!(
            "Scheduler: restored auto={} window={} full={} snack={} day={}",
            self.state.auto_feed_enabled,
            self.state.window,
            self.state.full_feed_count,
            self.state.snack_feed_count,
            self.state.day_stamp
        );
    }

    /// Start the chart from the restored consumption when nothing is
    /// recorded yet (after a reboot).
    pub fn seed_history(&mut self, now_secs: u32) {
        if self.history.is_empty() {
            let mass = self.consumed_mass_g();
            self.history.record(now_secs, mass);
        }
    }

    // ── Periodic check ────────────────────────────────────────

    /// Level-triggered automatic feed check. Call at least once per second.
    ///
    /// Returns the outcome when a full feed was attempted, `None` otherwise.
    /// A stalled loop only makes the feed late, never early.
    pub fn tick(
        &mut self,
        now: &WallTime,
        hw: &mut (impl PresencePort + DispenserPort),
        store: &mut impl StoragePort,
    ) -> Option<FeedOutcome> {
        if !self.state.auto_feed_enabled {
            return None;
        }
        let now_secs = now.seconds_since_midnight();
        if !self.state.window.contains(now_secs) {
            return None;
        }

        let delta = i64::from(now_secs) - i64::from(self.state.last_full_feed_secs);
        if delta > 0 && delta >= i64::from(self.effective_delay_secs()) {
            Some(self.attempt_feed(FeedKind::Full, now, hw, store))
        } else {
            None
        }
    }

    // ── Feed attempt ──────────────────────────────────────────

    /// Try to dispense. Callable at any time, inside or outside the window.
    ///
    /// Blocks for at most [`MAX_DISPENSE_MS`] while the valve is open.
    pub fn attempt_feed(
        &mut self,
        kind: FeedKind,
        now: &WallTime,
        hw: &mut (impl PresencePort + DispenserPort),
        store: &mut impl StoragePort,
    ) -> FeedOutcome {
        let now_secs = now.seconds_since_midnight();

        if hw.is_food_present() {
            return match kind {
                FeedKind::Full => {
                    self.state.deferral_count += 1;
                    info!(
                        "Scheduler: bowl not empty, full feed deferred ({}x, next in {} s)",
                        self.state.deferral_count,
                        self.effective_delay_secs()
                    );
                    FeedOutcome::Deferred {
                        deferrals: self.state.deferral_count,
                    }
                }
                FeedKind::Snack => {
                    info!("Scheduler: bowl not empty, snack rejected");
                    FeedOutcome::Rejected
                }
            };
        }

        if self.ration_met() {
            debug!(
                "Scheduler: ration met ({} / {} g), {} refused",
                self.consumed_mass_g(),
                self.config.daily_ration_target_g,
                kind
            );
            return FeedOutcome::RationMet;
        }

        match kind {
            FeedKind::Full => {
                hw.dispense(self.config.full_feed_dispense_ms.min(MAX_DISPENSE_MS));
                self.state.last_full_feed_secs = now_secs;
                self.state.full_feed_count += 1;
                self.state.deferral_count = 0;
                self.after_dispense(now);
                persistence::save_full_feed(store, &self.state);
                info!(
                    "Scheduler: full feed #{} at {} s, {} / {} g, next gap {} s",
                    self.state.full_feed_count,
                    now_secs,
                    self.consumed_mass_g(),
                    self.config.daily_ration_target_g,
                    self.state.full_feed_interval_secs
                );
                FeedOutcome::Fed {
                    kind,
                    mass_g: self.config.full_feed_g,
                }
            }
            FeedKind::Snack => {
                // A timestamp later than now belongs to another day: cooldown over.
                let delta = i64::from(now_secs) - i64::from(self.state.last_snack_feed_secs);
                let cooldown = i64::from(self.config.min_snack_interval_secs);
                if (0..cooldown).contains(&delta) {
                    let remaining_secs = (cooldown - delta) as u32;
                    info!("Scheduler: snack too soon, {} s left", remaining_secs);
                    return FeedOutcome::TooSoon { remaining_secs };
                }

                hw.dispense(self.config.snack_dispense_ms.min(MAX_DISPENSE_MS));
                self.state.last_snack_feed_secs = now_secs;
                self.state.snack_feed_count += 1;
                self.after_dispense(now);
                persistence::save_snack(store, &self.state);
                info!(
                    "Scheduler: snack #{} at {} s, {} / {} g",
                    self.state.snack_feed_count,
                    now_secs,
                    self.consumed_mass_g(),
                    self.config.daily_ration_target_g
                );
                FeedOutcome::Fed {
                    kind,
                    mass_g: self.config.snack_g,
                }
            }
        }
    }

    fn after_dispense(&mut self, now: &WallTime) {
        let now_secs = now.seconds_since_midnight();
        self.state.day_stamp = now.day_stamp();
        self.recompute_pacing(now_secs);
        let mass = self.consumed_mass_g();
        if !self.history.record(now_secs, mass) {
            debug!("Scheduler: history full, point at {} s dropped", now_secs);
        }
    }

    /// Greedy even spacing: spread the full feeds still owed over the time
    /// left in the window. Leaves the interval untouched when either is
    /// exhausted.
    pub fn recompute_pacing(&mut self, now_secs: u32) {
        let remaining_secs = i64::from(self.state.window.end_secs()) - i64::from(now_secs);
        let remaining_full_feeds = i64::from(
            (self.config.daily_ration_target_g - self.consumed_mass_g()) / self.config.full_feed_g,
        );
        if remaining_secs <= 0 || remaining_full_feeds <= 0 {
            return;
        }
        self.state.full_feed_interval_secs = (remaining_secs / remaining_full_feeds) as u32;
    }

    // ── Day boundary ──────────────────────────────────────────

    /// Midnight rollover. Clock resync is the caller's job.
    pub fn on_midnight(&mut self, now: &WallTime, store: &mut impl StoragePort) {
        info!("Scheduler: midnight rollover");
        self.reset_day(now, store);
    }

    /// Manual "new day" override. Same effect as a midnight rollover.
    pub fn reset(&mut self, now: &WallTime, store: &mut impl StoragePort) {
        info!("Scheduler: manual day reset");
        self.reset_day(now, store);
    }

    fn reset_day(&mut self, now: &WallTime, store: &mut impl StoragePort) {
        let base = self.config.full_feed_base_interval_secs;
        let s = &mut self.state;
        s.full_feed_count = 0;
        s.snack_feed_count = 0;
        s.deferral_count = 0;
        s.last_full_feed_secs = s.window.start_secs().saturating_sub(base);
        s.last_snack_feed_secs = 0;
        s.full_feed_interval_secs = base;
        s.day_stamp = now.day_stamp();
        self.history.reset_to_zero(now.seconds_since_midnight());
        persistence::save_day(store, &self.state);
    }

    // ── Settings ──────────────────────────────────────────────

    pub fn set_auto_feed_enabled(&mut self, enabled: bool, store: &mut impl StoragePort) {
        self.state.auto_feed_enabled = enabled;
        persistence::save_settings(store, &self.state);
        info!("Scheduler: auto feed {}", if enabled { "on" } else { "off" });
    }

    /// Move one edge of the window. Rejects out-of-range values and
    /// windows that would end before they start; state is unchanged on error.
    pub fn set_window(
        &mut self,
        edge: WindowEdge,
        hour: u8,
        minute: u8,
        store: &mut impl StoragePort,
    ) -> Result<(), WindowError> {
        check_hour_minute(hour, minute)?;
        let window = self.state.window.with_edge(edge, hour, minute);
        window.validate()?;
        self.state.window = window;
        persistence::save_settings(store, &self.state);
        info!("Scheduler: window now {}", window);
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn config(&self) -> &FeederConfig {
        &self.config
    }

    pub fn history(&self) -> &FeedHistory {
        &self.history
    }

    /// Grams dispensed today, derived from the counters.
    pub fn consumed_mass_g(&self) -> i32 {
        let full = i64::from(self.state.full_feed_count) * i64::from(self.config.full_feed_g);
        let snack = i64::from(self.state.snack_feed_count) * i64::from(self.config.snack_g);
        i32::try_from(full + snack).unwrap_or(i32::MAX)
    }

    pub fn ration_met(&self) -> bool {
        self.consumed_mass_g() >= self.config.daily_ration_target_g
    }

    /// Pacing interval plus the snooze backoff from deferrals.
    pub fn effective_delay_secs(&self) -> u32 {
        self.state.full_feed_interval_secs.saturating_add(
            self.state
                .deferral_count
                .saturating_mul(self.config.snooze_delay_secs),
        )
    }

    /// Seconds since midnight at which the next full feed becomes due.
    /// Wraps past 24 h for display.
    pub fn next_full_feed_secs(&self) -> u32 {
        self.state
            .last_full_feed_secs
            .saturating_add(self.effective_delay_secs())
    }

    /// Seconds until the next full feed becomes due, 0 if already due.
    pub fn secs_until_next_full_feed(&self, now_secs: u32) -> u32 {
        self.next_full_feed_secs().saturating_sub(now_secs)
    }
}

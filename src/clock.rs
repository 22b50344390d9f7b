//! Wall-clock helpers: civil time, day rollover detection, display formatting.
//!
//! The RTC / SNTP plumbing lives behind [`ClockPort`](crate::app::ports::ClockPort);
//! everything here is plain date arithmetic so it runs identically on host and device.

use core::fmt::Write as _;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Timelike, Utc};

/// Seconds in one civil day.
pub const SECS_PER_DAY: u32 = 86_400;

/// A broken-down local date and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WallTime {
    pub year: u16,
    /// 1–12
    pub month: u8,
    /// 1–31
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl WallTime {
    /// Convert a UTC Unix timestamp to local civil date/time at a fixed
    /// offset. An out-of-range timestamp or offset reads as the epoch in UTC.
    pub fn from_unix(utc_secs: i64, utc_offset_secs: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_secs).unwrap_or_else(|| Utc.fix());
        let local = DateTime::<Utc>::from_timestamp(utc_secs, 0)
            .unwrap_or_default()
            .with_timezone(&offset);

        Self {
            year: u16::try_from(local.year()).unwrap_or(0),
            month: local.month() as u8,
            day: local.day() as u8,
            hour: local.hour() as u8,
            minute: local.minute() as u8,
            second: local.second() as u8,
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(i32::from(self.year), u32::from(self.month), u32::from(self.day))
    }

    /// Seconds elapsed since local midnight.
    pub fn seconds_since_midnight(&self) -> u32 {
        self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }

    /// Compact `yyyymmdd` stamp identifying the calendar day.
    pub fn day_stamp(&self) -> u32 {
        self.year as u32 * 10_000 + self.month as u32 * 100 + self.day as u32
    }

    /// Build a time on an arbitrary date from seconds since midnight.
    /// Handy for simulation and tests.
    pub fn at_secs(year: u16, month: u8, day: u8, secs: u32) -> Self {
        let secs = secs % SECS_PER_DAY;
        Self {
            year,
            month,
            day,
            hour: (secs / 3600) as u8,
            minute: ((secs % 3600) / 60) as u8,
            second: (secs % 60) as u8,
        }
    }
}

// ── Day rollover ──────────────────────────────────────────────

/// Reports exactly one rollover per calendar-date change.
///
/// The main loop feeds every observed time in; a `true` return becomes
/// an `Event::Midnight`. The first observation only records the time,
/// so a reboot never looks like a midnight. Only a step onto the next
/// calendar day counts: an SNTP correction that lands the clock on any
/// other date re-arms the watch instead, and so does [`rearm`](Self::rearm).
#[derive(Debug, Default)]
pub struct MidnightWatch {
    last: Option<WallTime>,
}

impl MidnightWatch {
    pub const fn new() -> Self {
        Self { last: None }
    }

    pub fn observe(&mut self, now: &WallTime) -> bool {
        let Some(prev) = self.last.replace(*now) else {
            return false;
        };
        if prev.day_stamp() == now.day_stamp() {
            return false;
        }
        match (prev.date(), now.date()) {
            (Some(before), Some(after)) => before.succ_opt() == Some(after),
            _ => false,
        }
    }

    /// Forget the last observation; the next one only records the time.
    pub fn rearm(&mut self) {
        self.last = None;
    }
}

// ── Formatting ────────────────────────────────────────────────

/// Human duration: `"2h 15m 30s"`, `"4m 0s"`, `"12s"`.
/// Minutes are shown whenever hours are.
pub fn format_duration(secs: u32) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;

    let mut out = String::new();
    if h > 0 {
        let _ = write!(out, "{h}h ");
    }
    if m > 0 || h > 0 {
        let _ = write!(out, "{m}m ");
    }
    let _ = write!(out, "{s}s");
    out
}

/// Time of day as `"08h00"`, wrapping at 24 h.
pub fn format_time_of_day(secs: u32) -> String {
    let secs = secs % SECS_PER_DAY;
    format!("{:02}h{:02}", secs / 3600, (secs % 3600) / 60)
}

/// Window bound as `"08:00"`, the format the `/setMiamTime` form uses.
pub fn format_hhmm(hour: u8, minute: u8) -> String {
    format!("{hour:02}:{minute:02}")
}

/// Parse `"HH:MM"` into `(hour, minute)`. Only checks shape; range checks
/// belong to [`FeedingWindow`](crate::scheduler::FeedingWindow).
pub fn parse_hhmm(s: &str) -> Option<(u8, u8)> {
    let (h, m) = s.split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    if !h.bytes().all(|b| b.is_ascii_digit()) || !m.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((h.parse().ok()?, m.parse().ok()?))
}

//! System configuration parameters
//!
//! All tunable parameters for the Croquinator feeder. The ration masses
//! and dispense durations are fixed per build; the feeding window and the
//! auto-feed switch here are only the first-boot defaults, the live values
//! come from NVS (see [`crate::persistence`]).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound on a single valve opening. Every dispense blocks the
/// control loop for at most this long.
pub const MAX_DISPENSE_MS: u32 = 2_000;

/// Number of points kept in the daily consumption history.
pub const HISTORY_CAPACITY: usize = 30;

/// Core feeder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeederConfig {
    // --- Ration ---
    /// Ideal daily intake in grams
    pub daily_ration_target_g: i32,
    /// Mass delivered by one full feed (grams)
    pub full_feed_g: i32,
    /// Mass delivered by one snack (grams)
    pub snack_g: i32,

    // --- Valve ---
    /// Valve open time for a full feed (milliseconds)
    pub full_feed_dispense_ms: u32,
    /// Valve open time for a snack (milliseconds)
    pub snack_dispense_ms: u32,

    // --- Pacing ---
    /// Default minimum delay between two full feeds (seconds)
    pub full_feed_base_interval_secs: u32,
    /// Minimum delay between two snacks (seconds)
    pub min_snack_interval_secs: u32,
    /// Extra delay added per deferred full feed (seconds)
    pub snooze_delay_secs: u32,

    // --- Window defaults ---
    pub default_start_hour: u8,
    pub default_start_minute: u8,
    pub default_end_hour: u8,
    pub default_end_minute: u8,
    /// Automatic feeding enabled on first boot
    pub default_auto_feed: bool,

    // --- Clock ---
    /// Local time offset from UTC (seconds)
    pub utc_offset_secs: i32,
    /// SNTP server used for resynchronisation
    pub ntp_server: heapless::String<32>,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
}

impl Default for FeederConfig {
    fn default() -> Self {
        let mut ntp_server = heapless::String::new();
        let _ = ntp_server.push_str("pool.ntp.org");

        Self {
            // Ration
            daily_ration_target_g: 75,
            full_feed_g: 5,
            snack_g: 1,

            // Valve
            full_feed_dispense_ms: 500,
            snack_dispense_ms: 111,

            // Pacing
            full_feed_base_interval_secs: 2 * 60 * 60,
            min_snack_interval_secs: 60,
            snooze_delay_secs: 30,

            // Window 07:30 – 23:15
            default_start_hour: 7,
            default_start_minute: 30,
            default_end_hour: 23,
            default_end_minute: 15,
            default_auto_feed: true,

            // Clock (CET)
            utc_offset_secs: 3600,
            ntp_server,

            // Timing
            control_loop_interval_ms: 1000, // 1 Hz
            watchdog_timeout_ms: 10_000,
        }
    }
}

/// Errors from [`FeederConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl FeederConfig {
    /// Range-check every field. Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.full_feed_g <= 0 {
            return Err(ConfigError::ValidationFailed("full_feed_g must be > 0"));
        }
        if self.snack_g <= 0 {
            return Err(ConfigError::ValidationFailed("snack_g must be > 0"));
        }
        if self.daily_ration_target_g < self.full_feed_g {
            return Err(ConfigError::ValidationFailed(
                "daily_ration_target_g must be >= full_feed_g",
            ));
        }
        if !(1..=MAX_DISPENSE_MS).contains(&self.full_feed_dispense_ms) {
            return Err(ConfigError::ValidationFailed(
                "full_feed_dispense_ms must be 1–2000",
            ));
        }
        if !(1..=MAX_DISPENSE_MS).contains(&self.snack_dispense_ms) {
            return Err(ConfigError::ValidationFailed(
                "snack_dispense_ms must be 1–2000",
            ));
        }
        if self.full_feed_base_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "full_feed_base_interval_secs must be > 0",
            ));
        }
        if self.default_start_hour > 23 || self.default_end_hour > 23 {
            return Err(ConfigError::ValidationFailed("window hours must be 0–23"));
        }
        if self.default_start_minute > 59 || self.default_end_minute > 59 {
            return Err(ConfigError::ValidationFailed("window minutes must be 0–59"));
        }
        let start = self.default_start_hour as u32 * 60 + self.default_start_minute as u32;
        let end = self.default_end_hour as u32 * 60 + self.default_end_minute as u32;
        if end < start {
            return Err(ConfigError::ValidationFailed(
                "default window must not cross midnight",
            ));
        }
        if !(-12 * 3600..=14 * 3600).contains(&self.utc_offset_secs) {
            return Err(ConfigError::ValidationFailed(
                "utc_offset_secs must be -12h–+14h",
            ));
        }
        if !(100..=5000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 100–5000",
            ));
        }
        if self.watchdog_timeout_ms <= MAX_DISPENSE_MS + self.control_loop_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms must exceed one dispense plus one tick",
            ));
        }
        Ok(())
    }
}

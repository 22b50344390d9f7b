//! Mapping between [`SchedulerState`] and the persistent key-value layout.
//!
//! Namespace `croquinator`. Key names are kept from the first generation of
//! the firmware so devices in the field keep their settings across updates.
//!
//! | Key                  | Type | Field                      |
//! |----------------------|------|----------------------------|
//! | `autoMiam`           | bool | `auto_feed_enabled`        |
//! | `heureDebutMiam`     | u32  | `window.start_hour`        |
//! | `minuteDebutMiam`    | u32  | `window.start_minute`      |
//! | `heureFinMiam`       | u32  | `window.end_hour`          |
//! | `minuteFinMiam`      | u32  | `window.end_minute`        |
//! | `croquetteTime`      | u64  | `last_full_feed_secs`      |
//! | `croquinetteTime`    | u64  | `last_snack_feed_secs`     |
//! | `compteurCroquette`  | u32  | `full_feed_count`          |
//! | `compteurCroquinette`| u32  | `snack_feed_count`         |
//! | `jourMiam`           | u32  | `day_stamp` (`yyyymmdd`)   |
//!
//! Writes are fire-and-forget: a failure is logged and the in-memory state
//! stays authoritative until the next successful write.

use log::warn;

use crate::app::ports::{StorageError, StoragePort, StoredValue};
use crate::config::FeederConfig;
use crate::scheduler::SchedulerState;

pub const NAMESPACE: &str = "croquinator";

pub mod keys {
    pub const AUTO_FEED: &str = "autoMiam";
    pub const START_HOUR: &str = "heureDebutMiam";
    pub const START_MINUTE: &str = "minuteDebutMiam";
    pub const END_HOUR: &str = "heureFinMiam";
    pub const END_MINUTE: &str = "minuteFinMiam";
    pub const LAST_FULL_FEED: &str = "croquetteTime";
    pub const LAST_SNACK: &str = "croquinetteTime";
    pub const FULL_FEED_COUNT: &str = "compteurCroquette";
    pub const SNACK_COUNT: &str = "compteurCroquinette";
    pub const DAY_STAMP: &str = "jourMiam";
}

// ── Load ──────────────────────────────────────────────────────

/// Build the boot state from storage. Absent or unreadable keys keep the
/// first-boot default; a stored window that fails validation is dropped.
pub fn load(store: &impl StoragePort, config: &FeederConfig) -> SchedulerState {
    let mut state = SchedulerState::initial(config);

    if let Some(v) = or_default(store.read_bool(NAMESPACE, keys::AUTO_FEED), keys::AUTO_FEED) {
        state.auto_feed_enabled = v;
    }

    let mut window = state.window;
    if let Some(v) = read_u8(store, keys::START_HOUR) {
        window.start_hour = v;
    }
    if let Some(v) = read_u8(store, keys::START_MINUTE) {
        window.start_minute = v;
    }
    if let Some(v) = read_u8(store, keys::END_HOUR) {
        window.end_hour = v;
    }
    if let Some(v) = read_u8(store, keys::END_MINUTE) {
        window.end_minute = v;
    }
    match window.validate() {
        Ok(()) => state.window = window,
        Err(e) => warn!(
            "Persistence: stored window {} invalid ({}), using {}",
            window, e, state.window
        ),
    }
    // The first-boot "due at window open" timestamp follows the real window.
    state.last_full_feed_secs = state
        .window
        .start_secs()
        .saturating_sub(config.full_feed_base_interval_secs);

    if let Some(v) = read_secs(store, keys::LAST_FULL_FEED) {
        state.last_full_feed_secs = v;
    }
    if let Some(v) = read_secs(store, keys::LAST_SNACK) {
        state.last_snack_feed_secs = v;
    }
    if let Some(v) = read_count(store, keys::FULL_FEED_COUNT, config, config.full_feed_g) {
        state.full_feed_count = v;
    }
    if let Some(v) = read_count(store, keys::SNACK_COUNT, config, config.snack_g) {
        state.snack_feed_count = v;
    }
    if let Some(v) = or_default(store.read_u32(NAMESPACE, keys::DAY_STAMP), keys::DAY_STAMP) {
        state.day_stamp = v;
    }

    state
}

fn or_default<T>(res: Result<Option<T>, StorageError>, key: &str) -> Option<T> {
    match res {
        Ok(v) => v,
        Err(e) => {
            warn!("Persistence: read '{}' failed ({}), using default", key, e);
            None
        }
    }
}

fn read_u8(store: &impl StoragePort, key: &str) -> Option<u8> {
    let v = or_default(store.read_u32(NAMESPACE, key), key)?;
    // Out-of-range values fall through to window validation.
    Some(u8::try_from(v).unwrap_or(u8::MAX))
}

/// Timestamps are stored as u64 but are always seconds since midnight.
fn read_secs(store: &impl StoragePort, key: &str) -> Option<u32> {
    let v = or_default(store.read_u64(NAMESPACE, key), key)?;
    match u32::try_from(v) {
        Ok(secs) if secs < crate::clock::SECS_PER_DAY => Some(secs),
        _ => {
            warn!("Persistence: '{}' = {} is not a time of day, ignored", key, v);
            None
        }
    }
}

/// A day's counter can't exceed what the ration guard lets through: the
/// last accepted feed starts below the target.
fn read_count(
    store: &impl StoragePort,
    key: &str,
    config: &FeederConfig,
    unit_g: i32,
) -> Option<u32> {
    let v = or_default(store.read_u32(NAMESPACE, key), key)?;
    let ceiling = config.daily_ration_target_g + config.full_feed_g.max(config.snack_g);
    let max = u32::try_from(ceiling / unit_g.max(1)).unwrap_or(0);
    if v > max {
        warn!("Persistence: '{}' = {} exceeds {}, reset to 0", key, v, max);
        return Some(0);
    }
    Some(v)
}

// ── Save ──────────────────────────────────────────────────────

/// Auto-feed switch and window bounds.
pub fn save_settings(store: &mut impl StoragePort, state: &SchedulerState) {
    let w = &state.window;
    write(
        store,
        &[
            (keys::AUTO_FEED, StoredValue::Bool(state.auto_feed_enabled)),
            (keys::START_HOUR, StoredValue::U32(w.start_hour as u32)),
            (keys::START_MINUTE, StoredValue::U32(w.start_minute as u32)),
            (keys::END_HOUR, StoredValue::U32(w.end_hour as u32)),
            (keys::END_MINUTE, StoredValue::U32(w.end_minute as u32)),
        ],
    );
}

/// Fields touched by a full feed.
pub fn save_full_feed(store: &mut impl StoragePort, state: &SchedulerState) {
    write(
        store,
        &[
            (
                keys::LAST_FULL_FEED,
                StoredValue::U64(state.last_full_feed_secs as u64),
            ),
            (keys::FULL_FEED_COUNT, StoredValue::U32(state.full_feed_count)),
            (keys::DAY_STAMP, StoredValue::U32(state.day_stamp)),
        ],
    );
}

/// Fields touched by a snack.
pub fn save_snack(store: &mut impl StoragePort, state: &SchedulerState) {
    write(
        store,
        &[
            (
                keys::LAST_SNACK,
                StoredValue::U64(state.last_snack_feed_secs as u64),
            ),
            (keys::SNACK_COUNT, StoredValue::U32(state.snack_feed_count)),
            (keys::DAY_STAMP, StoredValue::U32(state.day_stamp)),
        ],
    );
}

/// Every daily field, after a midnight or manual reset.
pub fn save_day(store: &mut impl StoragePort, state: &SchedulerState) {
    write(
        store,
        &[
            (
                keys::LAST_FULL_FEED,
                StoredValue::U64(state.last_full_feed_secs as u64),
            ),
            (
                keys::LAST_SNACK,
                StoredValue::U64(state.last_snack_feed_secs as u64),
            ),
            (keys::FULL_FEED_COUNT, StoredValue::U32(state.full_feed_count)),
            (keys::SNACK_COUNT, StoredValue::U32(state.snack_feed_count)),
            (keys::DAY_STAMP, StoredValue::U32(state.day_stamp)),
        ],
    );
}

fn write(store: &mut impl StoragePort, entries: &[(&str, StoredValue)]) {
    if let Err(e) = store.write_batch(NAMESPACE, entries) {
        warn!(
            "Persistence: write of {} keys failed ({}), state kept in RAM only",
            entries.len(),
            e
        );
    }
}

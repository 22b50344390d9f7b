//! Mock adapters for integration tests.
//!
//! Each mock records what the domain asked of it so tests can assert on
//! the full call history without touching real GPIO/PWM/NVS.

use std::collections::HashMap;

use croquinator::app::events::AppEvent;
use croquinator::app::ports::{
    ClockPort, DispenserPort, EventSink, PresencePort, StorageError, StoragePort, StoredValue,
};
use croquinator::clock::WallTime;

// ── Bowl: presence sensor + valve ─────────────────────────────

/// The bowl as the feeder sees it: an IR reading and a gate.
#[derive(Default)]
pub struct MockBowl {
    pub food_present: bool,
    /// Every `dispense` duration, in call order.
    pub dispenses: Vec<u32>,
    pub presence_reads: u32,
}

#[allow(dead_code)]
impl MockBowl {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn full() -> Self {
        Self {
            food_present: true,
            ..Self::default()
        }
    }

    pub fn dispense_count(&self) -> usize {
        self.dispenses.len()
    }
}

impl PresencePort for MockBowl {
    fn is_food_present(&mut self) -> bool {
        self.presence_reads += 1;
        self.food_present
    }
}

impl DispenserPort for MockBowl {
    fn dispense(&mut self, duration_ms: u32) {
        self.dispenses.push(duration_ms);
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Settable wall clock.
pub struct MockClock {
    pub now: WallTime,
    pub synced: bool,
    /// What the next `resync` reports.
    pub resync_ok: bool,
    pub resync_calls: u32,
}

#[allow(dead_code)]
impl MockClock {
    /// 2024-03-10 at `secs` after midnight, synced.
    pub fn at(secs: u32) -> Self {
        Self {
            now: WallTime::at_secs(2024, 3, 10, secs),
            synced: true,
            resync_ok: true,
            resync_calls: 0,
        }
    }

    pub fn set_secs(&mut self, secs: u32) {
        self.now = WallTime::at_secs(self.now.year, self.now.month, self.now.day, secs);
    }

    pub fn set_day(&mut self, year: u16, month: u8, day: u8, secs: u32) {
        self.now = WallTime::at_secs(year, month, day, secs);
    }
}

impl ClockPort for MockClock {
    fn now(&self) -> WallTime {
        self.now
    }

    fn resync(&mut self) -> bool {
        self.resync_calls += 1;
        if self.resync_ok {
            self.synced = true;
        }
        self.resync_ok
    }

    fn is_synced(&self) -> bool {
        self.synced
    }
}

// ── Storage ───────────────────────────────────────────────────

/// In-memory typed store with write-failure injection.
#[derive(Default)]
pub struct MemStore {
    values: HashMap<(String, String), StoredValue>,
    pub batches: u32,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, namespace: &str, key: &str, value: StoredValue) -> Self {
        self.values
            .insert((namespace.to_string(), key.to_string()), value);
        self
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<StoredValue> {
        self.values
            .get(&(namespace.to_string(), key.to_string()))
            .copied()
    }
}

impl StoragePort for MemStore {
    fn read_u32(&self, namespace: &str, key: &str) -> Result<Option<u32>, StorageError> {
        match self.get(namespace, key) {
            None => Ok(None),
            Some(StoredValue::U32(v)) => Ok(Some(v)),
            Some(_) => Err(StorageError::TypeMismatch),
        }
    }

    fn read_u64(&self, namespace: &str, key: &str) -> Result<Option<u64>, StorageError> {
        match self.get(namespace, key) {
            None => Ok(None),
            Some(StoredValue::U64(v)) => Ok(Some(v)),
            Some(_) => Err(StorageError::TypeMismatch),
        }
    }

    fn read_bool(&self, namespace: &str, key: &str) -> Result<Option<bool>, StorageError> {
        match self.get(namespace, key) {
            None => Ok(None),
            Some(StoredValue::Bool(v)) => Ok(Some(v)),
            Some(_) => Err(StorageError::TypeMismatch),
        }
    }

    fn write_batch(
        &mut self,
        namespace: &str,
        entries: &[(&str, StoredValue)],
    ) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.batches += 1;
        for (key, value) in entries {
            self.values
                .insert((namespace.to_string(), (*key).to_string()), *value);
        }
        Ok(())
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&AppEvent> {
        self.events.last()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ FeedingScheduler / AppService (domain)
//! ```
//!
//! Driven adapters (clock, bowl sensor, valve, storage, event sinks)
//! implement these traits. The domain consumes them via generics injected
//! at call sites, so the feeding logic never touches hardware directly.

use crate::clock::WallTime;

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: RTC / SNTP → domain)
// ───────────────────────────────────────────────────────────────

/// Local wall-clock time source.
pub trait ClockPort {
    /// Current local date and time.
    fn now(&self) -> WallTime;

    /// Seconds elapsed since local midnight.
    fn seconds_since_midnight(&self) -> u32 {
        self.now().seconds_since_midnight()
    }

    /// Best-effort resynchronisation with a network time source.
    /// Returns `true` on success; failure is never fatal.
    fn resync(&mut self) -> bool;

    /// Whether the clock has been set from a trusted source since boot.
    fn is_synced(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Presence port (driven adapter: bowl sensor → domain)
// ───────────────────────────────────────────────────────────────

/// Bowl occupancy sensor.
pub trait PresencePort {
    /// `true` while previously dispensed food is still in the bowl.
    /// Implementations report `true` when the sensor cannot be read.
    fn is_food_present(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Dispenser port (driven adapter: domain → valve)
// ───────────────────────────────────────────────────────────────

/// Longest a single dispense may block the caller.
pub use crate::config::MAX_DISPENSE_MS;

/// Food gate actuator.
///
/// `dispense` opens the gate, blocks for `duration_ms`, then closes it.
/// There is no feedback path: a jammed gate is invisible to the domain.
/// Implementations clamp `duration_ms` to [`MAX_DISPENSE_MS`].
pub trait DispenserPort {
    fn dispense(&mut self, duration_ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / display)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log,
/// display, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// A typed value as persisted in NVS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredValue {
    U32(u32),
    U64(u64),
    Bool(bool),
}

/// Namespaced, typed key-value storage that survives power loss.
///
/// - Reads return `Ok(None)` when the key has never been written.
/// - `write_batch` opens the namespace once, writes every entry, commits
///   once and closes. A failed batch may be partially applied; callers
///   treat persistence as fire-and-forget.
pub trait StoragePort {
    fn read_u32(&self, namespace: &str, key: &str) -> Result<Option<u32>, StorageError>;

    fn read_u64(&self, namespace: &str, key: &str) -> Result<Option<u64>, StorageError>;

    fn read_bool(&self, namespace: &str, key: &str) -> Result<Option<bool>, StorageError>;

    fn write_batch(
        &mut self,
        namespace: &str,
        entries: &[(&str, StoredValue)],
    ) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Storage partition is full.
    Full,
    /// The key exists but holds a different type.
    TypeMismatch,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Full => write!(f, "storage full"),
            Self::TypeMismatch => write!(f, "stored type mismatch"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

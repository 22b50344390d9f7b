//! Unified error types for the Croquinator firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the binary
//! edge can report any failure uniformly. All variants are `Copy`.
//!
//! Feed outcomes (`Deferred`, `RationMet`, ...) are *not* errors; they live
//! in [`crate::scheduler::FeedOutcome`].

use core::fmt;

pub use crate::app::ports::StorageError;
pub use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Persistent storage could not be read or written.
    Storage(StorageError),
    /// A feeding window setting was rejected.
    Window(WindowError),
    /// Configuration failed validation.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// A network subsystem failed.
    Comms(CommsError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Window(e) => write!(f, "window: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Feeding window errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    /// Hour outside 0–23.
    HourOutOfRange(u8),
    /// Minute outside 0–59.
    MinuteOutOfRange(u8),
    /// The window would end before it starts (midnight wrap is unsupported).
    EndBeforeStart,
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HourOutOfRange(h) => write!(f, "hour {h} out of range 0-23"),
            Self::MinuteOutOfRange(m) => write!(f, "minute {m} out of range 0-59"),
            Self::EndBeforeStart => write!(f, "window end is before window start"),
        }
    }
}

impl From<WindowError> for Error {
    fn from(e: WindowError) -> Self {
        Self::Window(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    InvalidCredentials,
    WifiConnectFailed,
    HttpServerFailed,
    SntpFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "WiFi credentials invalid"),
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::HttpServerFailed => write!(f, "HTTP server failed"),
            Self::SntpFailed => write!(f, "SNTP sync failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

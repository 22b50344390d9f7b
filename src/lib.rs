//! Croquinator firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod api;
pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod persistence;
pub mod pins;
pub mod scheduler;

// The implementations are guarded by cfg attributes inside; the host
// build gets simulation backends.
pub mod adapters;
pub mod drivers;

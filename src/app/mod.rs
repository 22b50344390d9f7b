//! Application core: pure domain logic, zero I/O.
//!
//! This module wires the feeding scheduler to the outside world: loop
//! events and user commands come in, [`events::AppEvent`]s go out.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod feeder;
pub mod ports;
pub mod service;

//! Peripheral drivers: food gate, bowl sensor, button, watchdog.

pub mod button;
pub mod presence;
pub mod valve;
pub mod watchdog;

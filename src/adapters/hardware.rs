//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the bowl sensor and the valve, exposing them through
//! [`PresencePort`] and [`DispenserPort`] as a single `hw` value so the
//! scheduler can borrow both at once. Generic over the embedded-hal
//! pins, so the same adapter runs on ESP-IDF drivers and on host mocks.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::{DispenserPort, PresencePort};
use crate::drivers::presence::PresenceSensor;
use crate::drivers::valve::ServoValve;

/// Concrete adapter that combines the feeder hardware behind port traits.
pub struct FeederHardware<I, P, D>
where
    I: InputPin,
    P: SetDutyCycle,
    D: DelayNs,
{
    presence: PresenceSensor<I>,
    valve: ServoValve<P, D>,
}

impl<I, P, D> FeederHardware<I, P, D>
where
    I: InputPin,
    P: SetDutyCycle,
    D: DelayNs,
{
    pub fn new(presence: PresenceSensor<I>, valve: ServoValve<P, D>) -> Self {
        Self { presence, valve }
    }

    pub fn valve(&self) -> &ServoValve<P, D> {
        &self.valve
    }
}

// ── PresencePort implementation ───────────────────────────────

impl<I, P, D> PresencePort for FeederHardware<I, P, D>
where
    I: InputPin,
    P: SetDutyCycle,
    D: DelayNs,
{
    fn is_food_present(&mut self) -> bool {
        self.presence.is_food_present()
    }
}

// ── DispenserPort implementation ──────────────────────────────

impl<I, P, D> DispenserPort for FeederHardware<I, P, D>
where
    I: InputPin,
    P: SetDutyCycle,
    D: DelayNs,
{
    fn dispense(&mut self, duration_ms: u32) {
        self.valve.dispense(duration_ms);
    }
}

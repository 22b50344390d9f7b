//! Infrared bowl sensor.
//!
//! Reflective IR module above the bowl; its output pulls LOW while kibble
//! reflects the beam. Wired to a GPIO input with pull-up.
//!
//! A failed read is reported as "food present" so a faulty sensor can
//! only postpone feeds, never cause extra ones.

use embedded_hal::digital::InputPin;
use log::warn;

pub struct PresenceSensor<P: InputPin> {
    pin: P,
}

impl<P: InputPin> PresenceSensor<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn is_food_present(&mut self) -> bool {
        match self.pin.is_low() {
            Ok(low) => low,
            Err(e) => {
                warn!("Presence: read failed ({:?}), assuming food present", e);
                true
            }
        }
    }
}

//! Servo-driven food gate.
//!
//! A hobby servo rotates a flap under the hopper: 180° lets kibble fall,
//! 60° shuts it. Standard 50 Hz servo signal, 0.5–2.5 ms pulse for 0–180°.
//!
//! ## Blocking contract
//!
//! [`ServoValve::dispense`] opens, sleeps for the requested time and closes.
//! The open time is clamped to [`MAX_DISPENSE_MS`]; that is the longest any
//! feed can stall the control loop.
//!
//! There is no position feedback. A jammed flap goes unnoticed.

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;
use log::{debug, warn};

use crate::config::MAX_DISPENSE_MS;

pub const OPEN_ANGLE_DEG: u16 = 180;
pub const CLOSED_ANGLE_DEG: u16 = 60;

/// 50 Hz servo frame.
pub const SERVO_PERIOD_US: u16 = 20_000;
const MIN_PULSE_US: u16 = 500;
const MAX_PULSE_US: u16 = 2_500;

/// Time for the horn to travel between the two stops.
const SETTLE_MS: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveState {
    Closed,
    Open,
}

pub struct ServoValve<P: SetDutyCycle, D: DelayNs> {
    pwm: P,
    delay: D,
    state: ValveState,
    dispense_count: u32,
}

impl<P: SetDutyCycle, D: DelayNs> ServoValve<P, D> {
    /// Take the PWM channel and drive the gate closed.
    pub fn new(pwm: P, delay: D) -> Self {
        let mut valve = Self {
            pwm,
            delay,
            state: ValveState::Open,
            dispense_count: 0,
        };
        valve.close();
        valve
    }

    /// Open for `duration_ms` (clamped), then close. Blocks.
    pub fn dispense(&mut self, duration_ms: u32) {
        let duration_ms = duration_ms.min(MAX_DISPENSE_MS);
        debug!("Valve: open for {} ms", duration_ms);
        self.open();
        self.delay.delay_ms(duration_ms);
        self.close();
        self.delay.delay_ms(SETTLE_MS);
        self.dispense_count = self.dispense_count.wrapping_add(1);
    }

    pub fn state(&self) -> ValveState {
        self.state
    }

    /// Dispenses since boot.
    pub fn dispense_count(&self) -> u32 {
        self.dispense_count
    }

    fn open(&mut self) {
        self.set_angle(OPEN_ANGLE_DEG);
        self.state = ValveState::Open;
    }

    fn close(&mut self) {
        self.set_angle(CLOSED_ANGLE_DEG);
        self.state = ValveState::Closed;
    }

    fn set_angle(&mut self, angle_deg: u16) {
        let pulse = pulse_us_for_angle(angle_deg);
        if let Err(e) = self.pwm.set_duty_cycle_fraction(pulse, SERVO_PERIOD_US) {
            warn!("Valve: PWM write failed ({:?})", e);
        }
    }
}

/// Linear angle → pulse width mapping, clamped to 0–180°.
pub fn pulse_us_for_angle(angle_deg: u16) -> u16 {
    let angle = angle_deg.min(180) as u32;
    MIN_PULSE_US + (angle * (MAX_PULSE_US - MIN_PULSE_US) as u32 / 180) as u16
}

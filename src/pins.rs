//! GPIO / peripheral pin assignments for the Croquinator board.
//!
//! Every driver references this module rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Food gate servo
// ---------------------------------------------------------------------------

/// LEDC PWM output driving the servo signal line.
pub const SERVO_GPIO: i32 = 13;
/// Standard hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// Reflective IR module above the bowl. LOW = kibble in the bowl.
pub const IR_SENSOR_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// User button (active-low, internal pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button: status, next feed, snack, resync, reset.
pub const BUTTON_GPIO: i32 = 0;

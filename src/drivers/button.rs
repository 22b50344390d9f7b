//! Debounced push-button with click and hold gestures.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up. The main loop samples the
//! level every few milliseconds and feeds it to [`ButtonClassifier::tick`],
//! which runs the debounce + gesture state machine. Holds are classified
//! on release, so one press yields exactly one gesture.
//!
//! ## Gesture detection
//!
//! | Gesture        | Condition                                | Event               |
//! |----------------|------------------------------------------|---------------------|
//! | Short press    | Release < 1.5 s, no second press ≤ 400 ms| `ShortPress`        |
//! | Double press   | Second click within 400 ms               | `DoublePress`       |
//! | Long press     | Held ≥ 1.5 s                             | `LongPress`         |
//! | Very long      | Held ≥ 5 s                               | `VeryLongPress`     |
//! | Very very long | Held ≥ 10 s                              | `VeryVeryLongPress` |

use embedded_hal::digital::InputPin;

use crate::events::Event;

const DEBOUNCE_MS: u32 = 50;
const MULTI_CLICK_GAP_MS: u32 = 400;
const LONG_PRESS_MS: u32 = 1_500;
const VERY_LONG_PRESS_MS: u32 = 5_000;
const VERY_VERY_LONG_PRESS_MS: u32 = 10_000;

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    DoublePress,
    LongPress,
    VeryLongPress,
    VeryVeryLongPress,
}

impl From<ButtonEvent> for Event {
    fn from(e: ButtonEvent) -> Self {
        match e {
            ButtonEvent::ShortPress => Event::ButtonShortPress,
            ButtonEvent::DoublePress => Event::ButtonDoublePress,
            ButtonEvent::LongPress => Event::ButtonLongPress,
            ButtonEvent::VeryLongPress => Event::ButtonVeryLongPress,
            ButtonEvent::VeryVeryLongPress => Event::ButtonVeryVeryLongPress,
        }
    }
}

/// Internal state machine for gesture detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    DebounceWait { since_ms: u32, clicks: u8 },
    Pressed { since_ms: u32, clicks: u8 },
    WaitSecondPress { released_ms: u32 },
}

/// Pure gesture classifier; no hardware access.
#[derive(Debug)]
pub struct ButtonClassifier {
    state: GestureState,
}

impl Default for ButtonClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonClassifier {
    pub const fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    /// Feed one level sample. `now_ms` is monotonic milliseconds (wrapping).
    pub fn tick(&mut self, now_ms: u32, pressed: bool) -> Option<ButtonEvent> {
        match self.state {
            GestureState::Idle => {
                if pressed {
                    self.state = GestureState::DebounceWait {
                        since_ms: now_ms,
                        clicks: 0,
                    };
                }
                None
            }

            GestureState::DebounceWait { since_ms, clicks } => {
                if !pressed {
                    // Bounce: fall back to where we were.
                    self.state = if clicks == 0 {
                        GestureState::Idle
                    } else {
                        GestureState::WaitSecondPress {
                            released_ms: since_ms,
                        }
                    };
                } else if now_ms.wrapping_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = GestureState::Pressed { since_ms, clicks };
                }
                None
            }

            GestureState::Pressed { since_ms, clicks } => {
                if pressed {
                    return None;
                }
                let held_ms = now_ms.wrapping_sub(since_ms);
                let hold = if held_ms >= VERY_VERY_LONG_PRESS_MS {
                    Some(ButtonEvent::VeryVeryLongPress)
                } else if held_ms >= VERY_LONG_PRESS_MS {
                    Some(ButtonEvent::VeryLongPress)
                } else if held_ms >= LONG_PRESS_MS {
                    Some(ButtonEvent::LongPress)
                } else {
                    None
                };
                if hold.is_some() {
                    self.state = GestureState::Idle;
                    return hold;
                }
                if clicks >= 1 {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::DoublePress);
                }
                self.state = GestureState::WaitSecondPress {
                    released_ms: now_ms,
                };
                None
            }

            GestureState::WaitSecondPress { released_ms } => {
                if pressed {
                    self.state = GestureState::DebounceWait {
                        since_ms: now_ms,
                        clicks: 1,
                    };
                    return None;
                }
                if now_ms.wrapping_sub(released_ms) > MULTI_CLICK_GAP_MS {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::ShortPress);
                }
                None
            }
        }
    }

    /// True while a gesture is being tracked.
    pub fn is_busy(&self) -> bool {
        self.state != GestureState::Idle
    }
}

/// Classifier bound to an active-low input pin.
pub struct ButtonDriver<P: InputPin> {
    pin: P,
    classifier: ButtonClassifier,
}

impl<P: InputPin> ButtonDriver<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            classifier: ButtonClassifier::new(),
        }
    }

    /// Sample the pin and advance the classifier. A read error counts as
    /// released.
    pub fn poll(&mut self, now_ms: u32) -> Option<ButtonEvent> {
        let pressed = self.pin.is_low().unwrap_or(false);
        self.classifier.tick(now_ms, pressed)
    }
}

//! Control-loop event queue.
//!
//! Events are produced by:
//! - The 1 Hz loop timer (feed check)
//! - The day-rollover watch (midnight)
//! - The button gesture classifier
//!
//! Events are consumed by the main control loop, which hands them one at
//! a time to [`AppService::handle_event`](crate::app::service::AppService::handle_event).
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Loop timer   │────▶│              │     │              │
//! │ MidnightWatch│────▶│  Event Queue │────▶│  Main Loop   │
//! │ Button       │────▶│  (lock-free) │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of pending events.
/// Power of 2 for efficient ring buffer modulo.
const EVENT_QUEUE_CAP: usize = 16;

/// Control-loop events, ordered by rough priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    // ── Day boundary ──────────────────────────────────────
    /// Calendar date changed.
    Midnight = 0,

    // ── Control ───────────────────────────────────────────
    /// Feed check tick (1 Hz).
    ControlTick = 10,

    // ── User input ────────────────────────────────────────
    /// Single click.
    ButtonShortPress = 20,
    /// Two clicks within the multi-click gap.
    ButtonDoublePress = 21,
    /// Held ≥ 1.5 s.
    ButtonLongPress = 22,
    /// Held ≥ 5 s.
    ButtonVeryLongPress = 23,
    /// Held ≥ 10 s.
    ButtonVeryVeryLongPress = 24,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// The timer/button side writes (produces), the main loop reads (consumes).
// Atomic head/tail indices; slots are atomics too, so no `static mut`.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
static EVENT_BUFFER: [AtomicU8; EVENT_QUEUE_CAP] = [const { AtomicU8::new(0) }; EVENT_QUEUE_CAP];

/// Push an event into the queue.
/// Lock-free; safe from a timer callback.
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false; // Queue full; drop event.
    }

    EVENT_BUFFER[head as usize].store(event as u8, Ordering::Relaxed);
    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event from the queue.
/// Called from the main loop (single consumer).
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    loop {
        let tail = EVENT_TAIL.load(Ordering::Relaxed);
        let head = EVENT_HEAD.load(Ordering::Acquire);

        if tail == head {
            return None; // Empty.
        }

        let raw = EVENT_BUFFER[tail as usize].load(Ordering::Relaxed);
        EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

        // Only valid discriminants are ever stored.
        if let Some(event) = event_from_u8(raw) {
            return Some(event);
        }
    }
}

/// Drain all pending events into a callback.
/// Processes events in FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Check if the event queue is empty.
pub fn queue_is_empty() -> bool {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);
    tail == head
}

/// Number of pending events.
pub fn queue_len() -> usize {
    let head = EVENT_HEAD.load(Ordering::Relaxed) as usize;
    let tail = EVENT_TAIL.load(Ordering::Relaxed) as usize;
    (head + EVENT_QUEUE_CAP - tail) % EVENT_QUEUE_CAP
}

// ── Internal ──────────────────────────────────────────────────

fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        0 => Some(Event::Midnight),
        10 => Some(Event::ControlTick),
        20 => Some(Event::ButtonShortPress),
        21 => Some(Event::ButtonDoublePress),
        22 => Some(Event::ButtonLongPress),
        23 => Some(Event::ButtonVeryLongPress),
        24 => Some(Event::ButtonVeryVeryLongPress),
        _ => None,
    }
}

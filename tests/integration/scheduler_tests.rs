//! Feeding scheduler against mock bowl, clock and store.

use croquinator::app::ports::StoredValue;
use croquinator::clock::WallTime;
use croquinator::config::FeederConfig;
use croquinator::persistence::{keys, NAMESPACE};
use croquinator::scheduler::{FeedKind, FeedOutcome, FeedingScheduler, WindowEdge};

use crate::mock_hw::{MemStore, MockBowl};

/// 07:30, the default window start.
const WINDOW_OPEN: u32 = 7 * 3600 + 30 * 60;
/// 23:15, the default window end.
const WINDOW_CLOSE: u32 = 23 * 3600 + 15 * 60;

fn at(secs: u32) -> WallTime {
    WallTime::at_secs(2024, 3, 10, secs)
}

fn scheduler() -> FeedingScheduler {
    FeedingScheduler::new(FeederConfig::default())
}

/// Run `tick` once per second over `[from, to)`; returns the fed times.
fn run_ticks(
    s: &mut FeedingScheduler,
    bowl: &mut MockBowl,
    store: &mut MemStore,
    from: u32,
    to: u32,
) -> Vec<u32> {
    let mut fed = Vec::new();
    for secs in from..to {
        if let Some(outcome) = s.tick(&at(secs), bowl, store) {
            if outcome.is_fed() {
                fed.push(secs);
            }
        }
    }
    fed
}

#[test]
fn first_feed_lands_on_window_open() {
    let mut s = scheduler();
    let mut bowl = MockBowl::empty();
    let mut store = MemStore::new();

    let fed = run_ticks(&mut s, &mut bowl, &mut store, 0, WINDOW_OPEN + 1);
    assert_eq!(fed, vec![WINDOW_OPEN]);
    assert_eq!(bowl.dispenses, vec![500]);
    assert_eq!(s.consumed_mass_g(), 5);
}

#[test]
fn pacing_spreads_the_remaining_ration() {
    let mut s = scheduler();
    let mut bowl = MockBowl::empty();
    let mut store = MemStore::new();

    run_ticks(&mut s, &mut bowl, &mut store, WINDOW_OPEN, WINDOW_OPEN + 1);
    // 70 g left in 5 g feeds over 56 700 s.
    assert_eq!(s.state().full_feed_interval_secs, (WINDOW_CLOSE - WINDOW_OPEN) / 14);
    assert_eq!(s.next_full_feed_secs(), WINDOW_OPEN + 4050);

    let fed = run_ticks(&mut s, &mut bowl, &mut store, WINDOW_OPEN + 1, WINDOW_OPEN + 4051);
    assert_eq!(fed, vec![WINDOW_OPEN + 4050]);
}

#[test]
fn whole_day_never_exceeds_the_ration() {
    let mut s = scheduler();
    let mut bowl = MockBowl::empty();
    let mut store = MemStore::new();

    let fed = run_ticks(&mut s, &mut bowl, &mut store, 0, 86_400);
    assert!(s.ration_met());
    assert_eq!(s.state().full_feed_count, 15);
    assert_eq!(fed.len(), 15);
    assert!(fed.iter().all(|&t| (WINDOW_OPEN..=WINDOW_CLOSE + 59).contains(&t)));
}

#[test]
fn full_bowl_defers_with_growing_backoff() {
    let mut s = scheduler();
    let mut bowl = MockBowl::full();
    let mut store = MemStore::new();

    assert_eq!(
        s.tick(&at(WINDOW_OPEN), &mut bowl, &mut store),
        Some(FeedOutcome::Deferred { deferrals: 1 })
    );
    // One snooze step later, not before.
    assert_eq!(s.tick(&at(WINDOW_OPEN + 29), &mut bowl, &mut store), None);
    assert_eq!(
        s.tick(&at(WINDOW_OPEN + 30), &mut bowl, &mut store),
        Some(FeedOutcome::Deferred { deferrals: 2 })
    );
    assert_eq!(s.effective_delay_secs(), 7200 + 60);

    bowl.food_present = false;
    let outcome = s.tick(&at(WINDOW_OPEN + 90), &mut bowl, &mut store);
    assert!(matches!(outcome, Some(FeedOutcome::Fed { kind: FeedKind::Full, .. })));
    assert_eq!(s.state().deferral_count, 0);
    assert_eq!(bowl.dispense_count(), 1);
}

#[test]
fn snack_cooldown_and_rejection() {
    let mut s = scheduler();
    let mut bowl = MockBowl::empty();
    let mut store = MemStore::new();

    let noon = 12 * 3600;
    assert!(s.attempt_feed(FeedKind::Snack, &at(noon), &mut bowl, &mut store).is_fed());
    assert_eq!(
        s.attempt_feed(FeedKind::Snack, &at(noon + 15), &mut bowl, &mut store),
        FeedOutcome::TooSoon { remaining_secs: 45 }
    );
    assert!(s.attempt_feed(FeedKind::Snack, &at(noon + 60), &mut bowl, &mut store).is_fed());

    bowl.food_present = true;
    assert_eq!(
        s.attempt_feed(FeedKind::Snack, &at(noon + 600), &mut bowl, &mut store),
        FeedOutcome::Rejected
    );
    assert_eq!(bowl.dispenses, vec![111, 111]);
    assert_eq!(s.state().snack_feed_count, 2);
}

#[test]
fn manual_feed_works_outside_the_window() {
    let mut s = scheduler();
    let mut bowl = MockBowl::empty();
    let mut store = MemStore::new();

    let outcome = s.attempt_feed(FeedKind::Full, &at(3 * 3600), &mut bowl, &mut store);
    assert_eq!(
        outcome,
        FeedOutcome::Fed {
            kind: FeedKind::Full,
            mass_g: 5
        }
    );
}

#[test]
fn auto_feed_off_stops_ticks_only() {
    let mut s = scheduler();
    let mut bowl = MockBowl::empty();
    let mut store = MemStore::new();

    s.set_auto_feed_enabled(false, &mut store);
    assert!(run_ticks(&mut s, &mut bowl, &mut store, WINDOW_OPEN, WINDOW_OPEN + 10).is_empty());
    assert!(s.attempt_feed(FeedKind::Full, &at(WINDOW_OPEN), &mut bowl, &mut store).is_fed());
}

#[test]
fn ration_met_refuses_everything() {
    let mut store = MemStore::new()
        .with(NAMESPACE, keys::FULL_FEED_COUNT, StoredValue::U32(15))
        .with(NAMESPACE, keys::DAY_STAMP, StoredValue::U32(20240310));
    let mut s = scheduler();
    s.restore(&store);
    let mut bowl = MockBowl::empty();

    assert!(s.ration_met());
    assert_eq!(
        s.attempt_feed(FeedKind::Full, &at(WINDOW_OPEN), &mut bowl, &mut store),
        FeedOutcome::RationMet
    );
    assert_eq!(
        s.attempt_feed(FeedKind::Snack, &at(WINDOW_OPEN), &mut bowl, &mut store),
        FeedOutcome::RationMet
    );
    assert_eq!(bowl.dispense_count(), 0);
}

#[test]
fn feeds_are_persisted() {
    let mut s = scheduler();
    let mut bowl = MockBowl::empty();
    let mut store = MemStore::new();

    s.attempt_feed(FeedKind::Full, &at(WINDOW_OPEN), &mut bowl, &mut store);
    assert_eq!(store.get(NAMESPACE, keys::FULL_FEED_COUNT), Some(StoredValue::U32(1)));
    assert_eq!(
        store.get(NAMESPACE, keys::LAST_FULL_FEED),
        Some(StoredValue::U64(u64::from(WINDOW_OPEN)))
    );
    assert_eq!(store.get(NAMESPACE, keys::DAY_STAMP), Some(StoredValue::U32(20240310)));

    let mut reloaded = scheduler();
    reloaded.restore(&store);
    assert_eq!(reloaded.state().full_feed_count, 1);
    assert_eq!(reloaded.state().last_full_feed_secs, WINDOW_OPEN);
}

#[test]
fn storage_failure_keeps_feeding() {
    let mut s = scheduler();
    let mut bowl = MockBowl::empty();
    let mut store = MemStore::new();
    store.fail_writes = true;

    assert!(s.attempt_feed(FeedKind::Full, &at(WINDOW_OPEN), &mut bowl, &mut store).is_fed());
    assert_eq!(s.state().full_feed_count, 1);
    assert_eq!(store.get(NAMESPACE, keys::FULL_FEED_COUNT), None);
}

#[test]
fn midnight_clears_the_day() {
    let mut s = scheduler();
    let mut bowl = MockBowl::empty();
    let mut store = MemStore::new();
    run_ticks(&mut s, &mut bowl, &mut store, WINDOW_OPEN, WINDOW_OPEN + 1);
    s.attempt_feed(FeedKind::Snack, &at(WINDOW_OPEN + 5), &mut bowl, &mut store);

    s.on_midnight(&WallTime::at_secs(2024, 3, 11, 0), &mut store);
    let st = s.state();
    assert_eq!((st.full_feed_count, st.snack_feed_count, st.deferral_count), (0, 0, 0));
    assert_eq!(st.full_feed_interval_secs, 7200);
    assert_eq!(st.last_full_feed_secs, WINDOW_OPEN - 7200);
    assert_eq!(st.day_stamp, 20240311);
    assert_eq!(s.history().points().len(), 1);
    assert_eq!(s.history().points()[0].cumulative_mass_g, 0);
    assert_eq!(store.get(NAMESPACE, keys::SNACK_COUNT), Some(StoredValue::U32(0)));
}

#[test]
fn window_change_moves_the_first_feed() {
    let mut s = scheduler();
    let mut bowl = MockBowl::empty();
    let mut store = MemStore::new();

    s.set_window(WindowEdge::Start, 9, 0, &mut store).unwrap();
    s.reset(&at(0), &mut store);
    let fed = run_ticks(&mut s, &mut bowl, &mut store, 0, 9 * 3600 + 1);
    assert_eq!(fed, vec![9 * 3600]);
}

#[test]
fn inverted_window_is_refused() {
    let mut s = scheduler();
    let mut store = MemStore::new();
    assert!(s.set_window(WindowEdge::End, 6, 0, &mut store).is_err());
    assert_eq!(s.state().window.end_hour, 23);
    assert_eq!(store.batches, 0);
}

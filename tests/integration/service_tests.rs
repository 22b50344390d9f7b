//! AppService lifecycle, loop events and button commands.

use croquinator::app::commands::{AppCommand, CommandOutcome};
use croquinator::app::events::AppEvent;
use croquinator::app::ports::StoredValue;
use croquinator::app::service::AppService;
use croquinator::config::FeederConfig;
use croquinator::events::Event;
use croquinator::persistence::{keys, NAMESPACE};
use croquinator::scheduler::{FeedKind, FeedOutcome};

use crate::mock_hw::{MemStore, MockBowl, MockClock, RecordingSink};

const WINDOW_OPEN: u32 = 7 * 3600 + 30 * 60;

struct Rig {
    app: AppService,
    bowl: MockBowl,
    clock: MockClock,
    store: MemStore,
    sink: RecordingSink,
}

impl Rig {
    fn new(store: MemStore, clock: MockClock) -> Self {
        let mut rig = Self {
            app: AppService::new(FeederConfig::default()),
            bowl: MockBowl::empty(),
            clock,
            store,
            sink: RecordingSink::new(),
        };
        rig.app.start(&rig.clock, &mut rig.store, &mut rig.sink);
        rig
    }

    fn event(&mut self, event: Event) {
        self.app.handle_event(
            event,
            &mut self.bowl,
            &mut self.clock,
            &mut self.store,
            &mut self.sink,
        );
    }

    fn command(&mut self, cmd: AppCommand) -> CommandOutcome {
        self.app.handle_command(
            cmd,
            &mut self.bowl,
            &mut self.clock,
            &mut self.store,
            &mut self.sink,
        )
    }
}

fn yesterdays_store() -> MemStore {
    MemStore::new()
        .with(NAMESPACE, keys::FULL_FEED_COUNT, StoredValue::U32(9))
        .with(NAMESPACE, keys::SNACK_COUNT, StoredValue::U32(3))
        .with(NAMESPACE, keys::DAY_STAMP, StoredValue::U32(20240309))
}

#[test]
fn start_emits_started_with_restored_counts() {
    let store = MemStore::new().with(NAMESPACE, keys::FULL_FEED_COUNT, StoredValue::U32(2));
    let rig = Rig::new(store, MockClock::at(WINDOW_OPEN));

    match rig.sink.last() {
        Some(AppEvent::Started(status)) => {
            assert_eq!(status.full_feeds, 2);
            assert_eq!(status.consumed_g, 10);
            assert!(status.auto_feed);
        }
        other => panic!("expected Started, got {other:?}"),
    }
    assert_eq!(rig.app.scheduler().history().len(), 1);
}

#[test]
fn reboot_across_midnight_starts_a_new_day() {
    let rig = Rig::new(yesterdays_store(), MockClock::at(WINDOW_OPEN));

    assert_eq!(rig.app.scheduler().state().full_feed_count, 0);
    assert_eq!(rig.app.scheduler().state().day_stamp, 20240310);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::DayReset { manual: false })), 1);
    assert_eq!(rig.store.get(NAMESPACE, keys::FULL_FEED_COUNT), Some(StoredValue::U32(0)));
}

#[test]
fn unsynced_clock_keeps_stored_counters() {
    let mut clock = MockClock::at(WINDOW_OPEN);
    clock.synced = false;
    let rig = Rig::new(yesterdays_store(), clock);

    assert_eq!(rig.app.scheduler().state().full_feed_count, 9);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::DayReset { .. })), 0);
}

#[test]
fn control_tick_feeds_and_reports() {
    let mut rig = Rig::new(MemStore::new(), MockClock::at(WINDOW_OPEN));
    rig.event(Event::ControlTick);

    assert_eq!(rig.app.tick_count(), 1);
    assert_eq!(rig.bowl.dispenses, vec![500]);
    assert_eq!(
        rig.sink.last(),
        Some(&AppEvent::Feed {
            outcome: FeedOutcome::Fed {
                kind: FeedKind::Full,
                mass_g: 5
            },
            at_secs: WINDOW_OPEN,
            consumed_g: 5,
        })
    );

    // Not due again one second later.
    rig.clock.set_secs(WINDOW_OPEN + 1);
    let before = rig.sink.events.len();
    rig.event(Event::ControlTick);
    assert_eq!(rig.sink.events.len(), before);
}

#[test]
fn midnight_resets_and_resyncs() {
    let mut rig = Rig::new(MemStore::new(), MockClock::at(WINDOW_OPEN));
    rig.event(Event::ControlTick);
    rig.clock.set_day(2024, 3, 11, 0);
    rig.clock.resync_ok = false;
    rig.event(Event::Midnight);

    assert_eq!(rig.app.scheduler().state().full_feed_count, 0);
    assert_eq!(rig.clock.resync_calls, 1);
    assert_eq!(rig.sink.last(), Some(&AppEvent::ClockSynced(false)));
}

#[test]
fn corrupted_counter_starts_from_zero() {
    let store = MemStore::new()
        .with(NAMESPACE, keys::FULL_FEED_COUNT, StoredValue::U32(1_000_000_000))
        .with(NAMESPACE, keys::DAY_STAMP, StoredValue::U32(20240310));
    let mut rig = Rig::new(store, MockClock::at(WINDOW_OPEN));
    assert_eq!(rig.app.scheduler().state().full_feed_count, 0);

    rig.event(Event::ControlTick);
    assert_eq!(rig.bowl.dispenses, vec![500]);
    assert_eq!(rig.app.scheduler().consumed_mass_g(), 5);
}

#[test]
fn midnight_resets_an_offline_feeder() {
    let mut clock = MockClock::at(WINDOW_OPEN);
    clock.synced = false;
    clock.resync_ok = false;
    let mut rig = Rig::new(MemStore::new(), clock);
    rig.event(Event::ControlTick);
    assert_eq!(rig.app.scheduler().consumed_mass_g(), 5);

    rig.clock.set_day(2024, 3, 11, 0);
    rig.event(Event::Midnight);
    assert_eq!(rig.app.scheduler().consumed_mass_g(), 0);
    assert_eq!(rig.app.scheduler().state().day_stamp, 20240311);
}

#[test]
fn long_press_serves_a_snack() {
    let mut rig = Rig::new(MemStore::new(), MockClock::at(12 * 3600));
    rig.event(Event::ButtonLongPress);

    assert_eq!(rig.bowl.dispenses, vec![111]);
    assert_eq!(rig.app.scheduler().state().snack_feed_count, 1);
}

#[test]
fn short_and_double_press_only_report() {
    let mut rig = Rig::new(MemStore::new(), MockClock::at(WINDOW_OPEN - 600));
    rig.event(Event::ButtonShortPress);
    assert!(matches!(rig.sink.last(), Some(AppEvent::Status(_))));

    rig.event(Event::ButtonDoublePress);
    assert_eq!(rig.sink.last(), Some(&AppEvent::NextFeedIn { secs: 600 }));
    assert!(rig.bowl.dispenses.is_empty());
}

#[test]
fn very_very_long_press_resets_the_day() {
    let mut rig = Rig::new(MemStore::new(), MockClock::at(WINDOW_OPEN));
    rig.event(Event::ControlTick);
    rig.event(Event::ButtonVeryVeryLongPress);

    assert_eq!(rig.app.scheduler().consumed_mass_g(), 0);
    assert_eq!(rig.sink.last(), Some(&AppEvent::DayReset { manual: true }));
}

#[test]
fn very_long_press_resyncs_the_clock() {
    let mut rig = Rig::new(MemStore::new(), MockClock::at(WINDOW_OPEN));
    rig.event(Event::ButtonVeryLongPress);
    assert_eq!(rig.clock.resync_calls, 1);
    assert_eq!(rig.sink.last(), Some(&AppEvent::ClockSynced(true)));
}

#[test]
fn settings_commands_emit_and_persist() {
    let mut rig = Rig::new(MemStore::new(), MockClock::at(WINDOW_OPEN));

    assert_eq!(rig.command(AppCommand::SetAutoFeed(false)), CommandOutcome::Applied);
    assert_eq!(rig.store.get(NAMESPACE, keys::AUTO_FEED), Some(StoredValue::Bool(false)));
    assert!(matches!(
        rig.sink.last(),
        Some(AppEvent::SettingsChanged { auto_feed: false, .. })
    ));

    let outcome = rig.command(AppCommand::SetWindow {
        edge: croquinator::scheduler::WindowEdge::Start,
        hour: 23,
        minute: 30,
    });
    assert!(matches!(outcome, CommandOutcome::Rejected(_)));
}

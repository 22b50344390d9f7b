//! Web command surface through the shared feeder bundle.

use croquinator::api::responses::{APPLICATION_JSON, TEXT_PLAIN};
use croquinator::app::feeder::Feeder;
use croquinator::app::service::AppService;
use croquinator::config::FeederConfig;
use croquinator::events::Event;

use crate::mock_hw::{MemStore, MockBowl, MockClock, RecordingSink};

const WINDOW_OPEN: u32 = 7 * 3600 + 30 * 60;

type TestFeeder = Feeder<MockBowl, MockClock, MemStore, RecordingSink>;

fn feeder_at(secs: u32) -> TestFeeder {
    let mut f = Feeder::new(
        AppService::new(FeederConfig::default()),
        MockBowl::empty(),
        MockClock::at(secs),
        MemStore::new(),
        RecordingSink::new(),
    );
    f.start();
    f
}

#[test]
fn feed_cat_dispenses_full_or_snack() {
    let mut f = feeder_at(12 * 3600);

    let resp = f.handle_request("/feedCat?v=1");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type, TEXT_PLAIN);
    assert_eq!(resp.body, "Croquettes served (5 g)");

    let resp = f.handle_request("/feedCat?v=0");
    assert_eq!(resp.body, "Croquinette served (1 g)");
    assert_eq!(f.hw.dispenses, vec![500, 111]);
}

#[test]
fn feed_cat_reports_a_full_bowl() {
    let mut f = feeder_at(12 * 3600);
    f.hw.food_present = true;

    let resp = f.handle_request("/feedCat?v=0");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, "Bowl not empty, no snack");
    assert!(f.hw.dispenses.is_empty());
}

#[test]
fn bad_queries_are_rejected() {
    let mut f = feeder_at(12 * 3600);
    for uri in [
        "/feedCat",
        "/feedCat?v=2",
        "/setAutomiam?v=yes",
        "/setMiamTime?type=lunch&val=12:00",
        "/setMiamTime?type=start&val=25:00",
        "/setMiamTime?type=start",
    ] {
        assert_eq!(f.handle_request(uri).status, 400, "{uri}");
    }
    assert!(f.hw.dispenses.is_empty());
}

#[test]
fn unknown_path_is_404() {
    let mut f = feeder_at(0);
    assert_eq!(f.handle_request("/admin").status, 404);
}

#[test]
fn set_miam_time_updates_the_window() {
    let mut f = feeder_at(6 * 3600);

    let resp = f.handle_request("/setMiamTime?type=start&val=06%3A45");
    assert_eq!(resp.status, 200);
    let w = f.app.scheduler().state().window;
    assert_eq!((w.start_hour, w.start_minute), (6, 45));

    // Would end before it starts.
    let resp = f.handle_request("/setMiamTime?type=end&val=05:00");
    assert_eq!(resp.status, 400);
    assert_eq!(f.app.scheduler().state().window.end_hour, 23);
}

#[test]
fn set_automiam_toggles_ticks() {
    let mut f = feeder_at(WINDOW_OPEN);
    assert_eq!(f.handle_request("/setAutomiam?v=0").status, 200);
    f.handle_event(Event::ControlTick);
    assert!(f.hw.dispenses.is_empty());

    assert_eq!(f.handle_request("/setAutomiam?v=1").status, 200);
    f.handle_event(Event::ControlTick);
    assert_eq!(f.hw.dispenses, vec![500]);
}

#[test]
fn dashboard_json_has_the_expected_shape() {
    let mut f = feeder_at(WINDOW_OPEN);
    f.handle_event(Event::ControlTick);
    f.handle_request("/feedCat?v=0");

    let resp = f.handle_request("/api/data");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type, APPLICATION_JSON);

    let v: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(v["nbCroquettes"], 1);
    assert_eq!(v["nbCroquinettes"], 1);
    assert_eq!(v["mass"], 6);
    assert_eq!(v["ration"], 75);
    assert_eq!(v["hCroquettes"], "07h30");
    assert_eq!(v["autoMiam"], true);
    assert_eq!(v["timeStart"], "07:30");
    assert_eq!(v["timeEnd"], "23:15");
    assert_eq!(v["deferrals"], 0);

    let history = v["history"].as_array().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2]["m"], 6);
    assert_eq!(history[2]["t"], WINDOW_OPEN);
}

#[test]
fn reset_clears_counters() {
    let mut f = feeder_at(WINDOW_OPEN);
    f.handle_event(Event::ControlTick);
    assert_eq!(f.handle_request("/reset").status, 200);
    assert_eq!(f.app.scheduler().consumed_mass_g(), 0);
}

#[test]
fn index_points_at_the_data_endpoint() {
    let mut f = feeder_at(0);
    let resp = f.handle_request("/");
    assert_eq!(resp.status, 200);
    assert!(resp.body.contains("/api/data"));
}

//! HTTP response shapes and the dashboard JSON document.

use serde::Serialize;

use crate::clock::{format_duration, format_hhmm, format_time_of_day};
use crate::config::HISTORY_CAPACITY;
use crate::history::HistoryPoint;
use crate::scheduler::FeedingScheduler;

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";

/// Transport-agnostic HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl ApiResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: TEXT_PLAIN,
            body: body.into(),
        }
    }

    pub fn json(body: String) -> Self {
        Self {
            status: 200,
            content_type: APPLICATION_JSON,
            body,
        }
    }

    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self {
            status: 400,
            content_type: TEXT_PLAIN,
            body: reason.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            content_type: TEXT_PLAIN,
            body: "Not found".to_string(),
        }
    }

    pub fn internal_error(reason: impl Into<String>) -> Self {
        Self {
            status: 500,
            content_type: TEXT_PLAIN,
            body: reason.into(),
        }
    }
}

/// `/api/data` payload. Field names match the element ids of the
/// dashboard page, which copies each value into the matching element.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    #[serde(rename = "nbCroquettes")]
    pub full_feeds: u32,
    #[serde(rename = "nbCroquinettes")]
    pub snacks: u32,
    /// Grams dispensed today.
    pub mass: i32,
    /// Daily target in grams.
    pub ration: i32,
    #[serde(rename = "hCroquettes")]
    pub last_full_feed: String,
    #[serde(rename = "hCroquinettes")]
    pub last_snack: String,
    #[serde(rename = "hNextCroquettes")]
    pub next_full_feed: String,
    /// Current effective gap between full feeds.
    pub delay: String,
    pub deferrals: u32,
    #[serde(rename = "autoMiam")]
    pub auto_feed: bool,
    #[serde(rename = "timeStart")]
    pub time_start: String,
    #[serde(rename = "timeEnd")]
    pub time_end: String,
    pub history: heapless::Vec<HistoryPoint, HISTORY_CAPACITY>,
}

const NONE_YET: &str = "--";

impl DashboardData {
    pub fn from_scheduler(scheduler: &FeedingScheduler) -> Self {
        let s = scheduler.state();
        let w = &s.window;

        let last_full_feed = if s.full_feed_count > 0 {
            format_time_of_day(s.last_full_feed_secs)
        } else {
            NONE_YET.to_string()
        };
        let last_snack = if s.snack_feed_count > 0 {
            format_time_of_day(s.last_snack_feed_secs)
        } else {
            NONE_YET.to_string()
        };
        let next_full_feed = if scheduler.ration_met() || !s.auto_feed_enabled {
            NONE_YET.to_string()
        } else {
            format_time_of_day(scheduler.next_full_feed_secs().max(w.start_secs()))
        };

        Self {
            full_feeds: s.full_feed_count,
            snacks: s.snack_feed_count,
            mass: scheduler.consumed_mass_g(),
            ration: scheduler.config().daily_ration_target_g,
            last_full_feed,
            last_snack,
            next_full_feed,
            delay: format_duration(scheduler.effective_delay_secs()),
            deferrals: s.deferral_count,
            auto_feed: s.auto_feed_enabled,
            time_start: format_hhmm(w.start_hour, w.start_minute),
            time_end: format_hhmm(w.end_hour, w.end_minute),
            history: scheduler.history().buffer().clone(),
        }
    }
}

//! Path + query dispatch for the local web interface.
//!
//! | Path           | Params                          | Command                  |
//! |----------------|---------------------------------|--------------------------|
//! | `/feedCat`     | `v=0\|1`                        | `Feed(Snack \| Full)`    |
//! | `/setAutomiam` | `v=0\|1`                        | `SetAutoFeed`            |
//! | `/setMiamTime` | `type=start\|end`, `val=HH:MM`  | `SetWindow`              |
//! | `/reset`       | (none)                          | `ResetDay`               |
//! | `/api/data`    | (none)                          | dashboard snapshot       |
//!
//! Handlers run synchronously on whatever thread owns the [`AppService`];
//! the server adapter serialises them with the control loop.

use log::{debug, warn};

use crate::app::commands::{AppCommand, CommandOutcome};
use crate::app::ports::{ClockPort, DispenserPort, EventSink, PresencePort, StoragePort};
use crate::app::service::AppService;
use crate::clock::parse_hhmm;
use crate::scheduler::{FeedKind, WindowEdge};

use super::responses::ApiResponse;

/// Parse one request and execute it against the service.
pub fn handle_request(
    app: &mut AppService,
    path_and_query: &str,
    hw: &mut (impl PresencePort + DispenserPort),
    clock: &mut impl ClockPort,
    store: &mut impl StoragePort,
    sink: &mut impl EventSink,
) -> ApiResponse {
    let (path, query) = path_and_query
        .split_once('?')
        .unwrap_or((path_and_query, ""));
    debug!("HTTP: {} ?{}", path, query);

    let cmd = match route(path, query) {
        Ok(Route::Command(cmd)) => cmd,
        Ok(Route::Dashboard) => {
            return match serde_json::to_string(&app.dashboard()) {
                Ok(body) => ApiResponse::json(body),
                Err(e) => {
                    warn!("HTTP: dashboard serialisation failed: {}", e);
                    ApiResponse::internal_error("serialisation failed")
                }
            };
        }
        Ok(Route::Index) => {
            return ApiResponse::ok("Croquinator is running. Data: /api/data");
        }
        Err(RouteError::NotFound) => return ApiResponse::not_found(),
        Err(RouteError::BadRequest(reason)) => {
            warn!("HTTP: {} rejected: {}", path, reason);
            return ApiResponse::bad_request(reason);
        }
    };

    match app.handle_command(cmd, hw, clock, store, sink) {
        CommandOutcome::Rejected(e) => ApiResponse::bad_request(e.to_string()),
        outcome => ApiResponse::ok(outcome.message()),
    }
}

// ── Routing ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    Dashboard,
    Command(AppCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    NotFound,
    BadRequest(&'static str),
}

/// Map a path and raw query string to what should happen. Pure.
pub fn route(path: &str, query: &str) -> Result<Route, RouteError> {
    match path {
        "/" => Ok(Route::Index),
        "/api/data" => Ok(Route::Dashboard),
        "/reset" => Ok(Route::Command(AppCommand::ResetDay)),
        "/feedCat" => {
            let kind = if flag(query)? {
                FeedKind::Full
            } else {
                FeedKind::Snack
            };
            Ok(Route::Command(AppCommand::Feed(kind)))
        }
        "/setAutomiam" => Ok(Route::Command(AppCommand::SetAutoFeed(flag(query)?))),
        "/setMiamTime" => {
            let edge = match param(query, "type").as_deref() {
                Some("start") => WindowEdge::Start,
                Some("end") => WindowEdge::End,
                Some(_) => return Err(RouteError::BadRequest("type must be start or end")),
                None => return Err(RouteError::BadRequest("missing type")),
            };
            let val = param(query, "val").ok_or(RouteError::BadRequest("missing val"))?;
            let (hour, minute) =
                parse_hhmm(&val).ok_or(RouteError::BadRequest("val must be HH:MM"))?;
            if hour > 23 || minute > 59 {
                return Err(RouteError::BadRequest("val out of range"));
            }
            Ok(Route::Command(AppCommand::SetWindow { edge, hour, minute }))
        }
        _ => Err(RouteError::NotFound),
    }
}

fn flag(query: &str) -> Result<bool, RouteError> {
    match param(query, "v").as_deref() {
        Some("1") => Ok(true),
        Some("0") => Ok(false),
        Some(_) => Err(RouteError::BadRequest("v must be 0 or 1")),
        None => Err(RouteError::BadRequest("missing v")),
    }
}

/// First value of `name` in a query string, percent-decoded.
fn param(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(k, _)| *k == name)
        .and_then(|(_, v)| percent_decode(v))
}

fn percent_decode(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = s.get(i + 1..i + 3)?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_flag_selects_kind() {
        assert_eq!(
            route("/feedCat", "v=1"),
            Ok(Route::Command(AppCommand::Feed(FeedKind::Full)))
        );
        assert_eq!(
            route("/feedCat", "v=0"),
            Ok(Route::Command(AppCommand::Feed(FeedKind::Snack)))
        );
        assert_eq!(
            route("/feedCat", "v=2"),
            Err(RouteError::BadRequest("v must be 0 or 1"))
        );
        assert_eq!(
            route("/feedCat", ""),
            Err(RouteError::BadRequest("missing v"))
        );
    }

    #[test]
    fn set_time_parses_encoded_colon() {
        assert_eq!(
            route("/setMiamTime", "type=start&val=08%3A15"),
            Ok(Route::Command(AppCommand::SetWindow {
                edge: WindowEdge::Start,
                hour: 8,
                minute: 15
            }))
        );
    }

    #[test]
    fn set_time_rejects_malformed_values() {
        for q in [
            "type=start&val=8h15",
            "type=start&val=24:00",
            "type=end&val=12:60",
            "type=middle&val=12:00",
            "type=end",
            "val=12:00",
        ] {
            assert!(
                matches!(route("/setMiamTime", q), Err(RouteError::BadRequest(_))),
                "{q} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_path_is_not_found() {
        assert_eq!(route("/feedDog", "v=1"), Err(RouteError::NotFound));
    }

    #[test]
    fn percent_decoding() {
        assert_eq!(percent_decode("a%20b+c").as_deref(), Some("a b c"));
        assert_eq!(percent_decode("%4"), None);
        assert_eq!(percent_decode("%zz"), None);
    }
}

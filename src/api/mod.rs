//! Local web command surface.
//!
//! [`router`] is transport-agnostic and runs on the host; the ESP-IDF HTTP
//! server binding lives in [`crate::adapters::http_server`].

pub mod responses;
pub mod router;

pub use responses::{ApiResponse, DashboardData};
pub use router::handle_request;

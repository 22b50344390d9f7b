//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements                  | Connects to              |
//! |---------------|-----------------------------|--------------------------|
//! | `hardware`    | PresencePort, DispenserPort | IR sensor GPIO, servo PWM|
//! | `http_server` | (driving)                   | ESP-IDF httpd            |
//! | `log_sink`    | EventSink                   | Serial log output        |
//! | `nvs`         | StoragePort                 | NVS / in-memory store    |
//! | `time`        | ClockPort                   | System time + SNTP       |
//! | `wifi`        | (link bring-up)             | ESP-IDF WiFi STA         |

pub mod hardware;
pub mod http_server;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod wifi;

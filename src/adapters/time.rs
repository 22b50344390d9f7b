//! Wall-clock adapter.
//!
//! Implements [`ClockPort`] for the Croquinator.
//!
//! - **`target_os = "espidf"`**: reads `gettimeofday()` and resyncs through
//!   `EspSntp`. Local time is UTC plus the configured fixed offset.
//! - **`not(target_os = "espidf")`**: uses `std::time::SystemTime` for
//!   host-side simulation; resync accepts any reading from 2020 on.

use log::{info, warn};

use crate::app::ports::ClockPort;
use crate::clock::WallTime;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sntp::{EspSntp, SntpConf, SyncStatus};

/// Anything earlier is the RTC's power-on default, not real time.
const EPOCH_2020: i64 = 1_577_836_800;

/// Used when the configured server name does not fit.
const DEFAULT_NTP_SERVER: &str = "pool.ntp.org";

fn ntp_server_name(name: &str) -> heapless::String<32> {
    let mut s = heapless::String::new();
    if s.push_str(name).is_err() {
        warn!(
            "Clock: NTP server '{}' longer than {} bytes, using {}",
            name,
            s.capacity(),
            DEFAULT_NTP_SERVER
        );
        s.clear();
        let _ = s.push_str(DEFAULT_NTP_SERVER);
    }
    s
}

pub struct SystemClock {
    utc_offset_secs: i32,
    synced: bool,
    ntp_server: heapless::String<32>,
    #[cfg(target_os = "espidf")]
    sntp: Option<EspSntp<'static>>,
}

impl SystemClock {
    pub fn new(utc_offset_secs: i32, ntp_server: &str) -> Self {
        Self {
            utc_offset_secs,
            synced: false,
            ntp_server: ntp_server_name(ntp_server),
            #[cfg(target_os = "espidf")]
            sntp: None,
        }
    }

    pub fn ntp_server(&self) -> &str {
        &self.ntp_server
    }

    #[cfg(target_os = "espidf")]
    fn utc_secs() -> i64 {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: tv is a valid out-pointer; a null timezone is allowed.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return 0;
        }
        tv.tv_sec as i64
    }

    #[cfg(not(target_os = "espidf"))]
    fn utc_secs() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> WallTime {
        WallTime::from_unix(Self::utc_secs(), self.utc_offset_secs)
    }

    #[cfg(target_os = "espidf")]
    fn resync(&mut self) -> bool {
        use std::time::Duration;

        if self.sntp.is_none() {
            let conf = SntpConf {
                servers: [self.ntp_server.as_str()],
                ..Default::default()
            };
            match EspSntp::new(&conf) {
                Ok(sntp) => self.sntp = Some(sntp),
                Err(e) => {
                    warn!("Clock: SNTP init failed: {:?}", e);
                    return false;
                }
            }
        }

        let Some(sntp) = self.sntp.as_ref() else {
            return false;
        };
        // Poll up to 5 s; the caller is the control loop.
        for _ in 0..10 {
            if sntp.get_sync_status() == SyncStatus::Completed && Self::utc_secs() >= EPOCH_2020
            {
                self.synced = true;
                info!("Clock: SNTP sync complete ({})", self.ntp_server);
                return true;
            }
            std::thread::sleep(Duration::from_millis(500));
        }
        warn!("Clock: SNTP sync timed out");
        false
    }

    #[cfg(not(target_os = "espidf"))]
    fn resync(&mut self) -> bool {
        self.synced = Self::utc_secs() >= EPOCH_2020;
        if self.synced {
            info!("Clock: host clock accepted as synchronised");
        } else {
            warn!("Clock: host clock is before 2020");
        }
        self.synced
    }

    fn is_synced(&self) -> bool {
        self.synced
    }
}

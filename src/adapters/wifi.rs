//! WiFi station-mode adapter.
//!
//! Brings the station link up once at boot so the dashboard and SNTP are
//! reachable. The feeder keeps running offline if the link never comes up;
//! only the HTTP surface and clock resync depend on it.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` in client mode.
//! - **all other targets**: simulation that only validates credentials.
//!
//! Credentials come from the `CROQUINATOR_WIFI_SSID` / `CROQUINATOR_WIFI_PASS`
//! build-time environment variables.

use log::info;

use crate::error::CommsError;

pub const BUILD_SSID: Option<&str> = option_env!("CROQUINATOR_WIFI_SSID");
pub const BUILD_PASSWORD: Option<&str> = option_env!("CROQUINATOR_WIFI_PASS");

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// SSID 1–32 printable bytes; password empty (open) or 8–64 bytes (WPA2).
pub fn validate_credentials(ssid: &str, password: &str) -> Result<(), CommsError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CommsError::InvalidCredentials);
    }
    if !password.is_empty() && !(8..=64).contains(&password.len()) {
        return Err(CommsError::InvalidCredentials);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
}

pub struct WifiAdapter {
    state: WifiState,
    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
}

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    pub fn new(
        modem: esp_idf_svc::hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: Option<esp_idf_svc::nvs::EspDefaultNvsPartition>,
    ) -> Result<Self, CommsError> {
        use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

        let esp_wifi =
            EspWifi::new(modem, sysloop.clone(), nvs).map_err(|_| CommsError::WifiConnectFailed)?;
        let wifi =
            BlockingWifi::wrap(esp_wifi, sysloop).map_err(|_| CommsError::WifiConnectFailed)?;
        Ok(Self {
            state: WifiState::Disconnected,
            wifi,
        })
    }

    /// Join the access point and wait for an IP address. Blocks.
    pub fn connect(&mut self, ssid: &str, password: &str) -> Result<(), CommsError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        validate_credentials(ssid, password)?;
        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| CommsError::InvalidCredentials)?,
            password: password
                .try_into()
                .map_err(|_| CommsError::InvalidCredentials)?,
            auth_method,
            ..Default::default()
        });

        info!("WiFi: connecting to '{}'", ssid);
        if let Err(e) = self.bring_up(&config) {
            log::error!("WiFi: connection failed ({})", e);
            self.state = WifiState::Disconnected;
            return Err(CommsError::WifiConnectFailed);
        }

        if let Ok(ip) = self.wifi.wifi().sta_netif().get_ip_info() {
            info!("WiFi: connected, IP {}", ip.ip);
        }
        self.state = WifiState::Connected;
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    fn bring_up(
        &mut self,
        config: &esp_idf_svc::wifi::Configuration,
    ) -> Result<(), esp_idf_svc::sys::EspError> {
        self.wifi.set_configuration(config)?;
        self.wifi.start()?;
        self.wifi.connect()?;
        self.wifi.wait_netif_up()
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
        }
    }

    pub fn connect(&mut self, ssid: &str, password: &str) -> Result<(), CommsError> {
        validate_credentials(ssid, password)?;
        info!("WiFi(sim): connected to '{}'", ssid);
        self.state = WifiState::Connected;
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl WifiAdapter {
    pub fn state(&self) -> WifiState {
        self.state
    }
}

//! ESP-IDF HTTP server binding for the web command surface.
//!
//! Each route in [`ROUTES`] gets a GET handler that locks the shared
//! [`Feeder`](crate::app::feeder::Feeder) and forwards the raw URI to its
//! `handle_request`.
//! Handlers run on the httpd task; the mutex serialises them with the
//! control loop, so a web feed never overlaps a scheduled one.

#[cfg(target_os = "espidf")]
use crate::app::feeder::Feeder;

/// Every path the router answers. Unknown paths get httpd's own 404.
pub const ROUTES: &[&str] = &[
    "/",
    "/api/data",
    "/feedCat",
    "/setAutomiam",
    "/setMiamTime",
    "/reset",
];

/// Handler stack size. A feed request dispenses from inside the handler.
#[cfg(target_os = "espidf")]
const HTTPD_STACK_SIZE: usize = 10 * 1024;

#[cfg(target_os = "espidf")]
pub fn start<H, C, S, K>(
    feeder: std::sync::Arc<std::sync::Mutex<Feeder<H, C, S, K>>>,
) -> Result<esp_idf_svc::http::server::EspHttpServer<'static>, crate::error::CommsError>
where
    H: crate::app::ports::PresencePort + crate::app::ports::DispenserPort + Send + 'static,
    C: crate::app::ports::ClockPort + Send + 'static,
    S: crate::app::ports::StoragePort + Send + 'static,
    K: crate::app::ports::EventSink + Send + 'static,
{
    use esp_idf_svc::http::server::{Configuration, EspHttpServer};
    use esp_idf_svc::http::Method;
    use esp_idf_svc::io::Write;
    use log::{info, warn};

    use crate::api::ApiResponse;
    use crate::error::CommsError;

    let conf = Configuration {
        stack_size: HTTPD_STACK_SIZE,
        ..Default::default()
    };
    let mut server = EspHttpServer::new(&conf).map_err(|e| {
        warn!("HTTP: server start failed ({})", e);
        CommsError::HttpServerFailed
    })?;

    for &path in ROUTES {
        let feeder = feeder.clone();
        server
            .fn_handler::<anyhow::Error, _>(path, Method::Get, move |req| {
                let uri = req.uri().to_string();
                let resp = match feeder.lock() {
                    Ok(mut f) => f.handle_request(&uri),
                    Err(_) => ApiResponse::internal_error("feeder unavailable"),
                };
                req.into_response(resp.status, None, &[("Content-Type", resp.content_type)])?
                    .write_all(resp.body.as_bytes())?;
                Ok(())
            })
            .map_err(|e| {
                warn!("HTTP: cannot register {} ({})", path, e);
                CommsError::HttpServerFailed
            })?;
    }

    info!("HTTP: serving {} routes", ROUTES.len());
    Ok(server)
}

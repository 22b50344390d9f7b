//! The service bundled with its adapters.
//!
//! The control loop and the HTTP server share one `Feeder` behind a mutex,
//! so every tick, button gesture and web command runs one at a time.

use crate::api::{self, ApiResponse};
use crate::events::Event;

use super::ports::{ClockPort, DispenserPort, EventSink, PresencePort, StoragePort};
use super::service::AppService;

pub struct Feeder<H, C, S, K> {
    pub app: AppService,
    pub hw: H,
    pub clock: C,
    pub store: S,
    pub sink: K,
}

impl<H, C, S, K> Feeder<H, C, S, K>
where
    H: PresencePort + DispenserPort,
    C: ClockPort,
    S: StoragePort,
    K: EventSink,
{
    pub fn new(app: AppService, hw: H, clock: C, store: S, sink: K) -> Self {
        Self {
            app,
            hw,
            clock,
            store,
            sink,
        }
    }

    /// Restore persisted state; see [`AppService::start`].
    pub fn start(&mut self) {
        self.app.start(&self.clock, &mut self.store, &mut self.sink);
    }

    pub fn handle_event(&mut self, event: Event) {
        self.app.handle_event(
            event,
            &mut self.hw,
            &mut self.clock,
            &mut self.store,
            &mut self.sink,
        );
    }

    pub fn handle_request(&mut self, path_and_query: &str) -> ApiResponse {
        api::handle_request(
            &mut self.app,
            path_and_query,
            &mut self.hw,
            &mut self.clock,
            &mut self.store,
            &mut self.sink,
        )
    }
}

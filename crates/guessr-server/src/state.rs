//! Shared application state for the game server.
//!
//! [`AppState`] is wrapped in [`Arc`] and injected via Axum's `State`
//! extractor. It bundles the coordinator that owns the session, the page
//! renderer, and the clock every request samples `now` from.

use std::sync::Arc;

use guessr_core::clock::{Clock, SystemClock};
use guessr_core::rules::GameRules;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::coordinator::RequestCoordinator;
use crate::render::PageRenderer;

/// Shared state for the Axum application.
pub struct AppState {
    /// Serializes access to the game session and visit counter.
    pub coordinator: RequestCoordinator,
    /// Turns page views into HTML.
    pub renderer: PageRenderer,
    /// Time source sampled once per request.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Assemble state from explicit parts.
    pub fn new(
        coordinator: RequestCoordinator,
        renderer: PageRenderer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            coordinator,
            renderer,
            clock,
        }
    }

    /// State for a live server: system clock, a fresh round, and a secret
    /// generator seeded from `seed` or the OS.
    pub fn live(
        rules: GameRules,
        seed: Option<u64>,
        reset_on_reload: bool,
        renderer: PageRenderer,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let coordinator =
            RequestCoordinator::new(rules, rng, clock.now()).reset_on_reload(reset_on_reload);
        Self::new(coordinator, renderer, clock)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("coordinator", &self.coordinator)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

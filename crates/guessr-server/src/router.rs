//! Axum router construction for the game server.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the game server.
///
/// The router includes:
/// - `GET /` -- show the page (new round by default)
/// - `POST /` -- guess, restart, or re-render
///
/// Other methods on `/` answer `405`; other paths answer `404`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::play).post(handlers::play))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

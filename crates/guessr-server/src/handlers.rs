//! HTTP handler for the game page.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Show the page (starts a round unless reload-reset is off) |
//! | `POST` | `/` | `restart=true` restarts, `guess=N` guesses, anything else re-renders |

use std::sync::Arc;

use axum::Form;
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::Html;
use tracing::debug;

use crate::coordinator::GameForm;
use crate::error::GameServerError;
use crate::state::AppState;

/// Play one step of the game and render the page.
///
/// `now` is sampled once here and used for every timing rule of the
/// request. The page is rendered after the coordinator released the
/// session lock; a render failure leaves the already-applied move in
/// place and answers `500`.
pub async fn play(
    State(state): State<Arc<AppState>>,
    method: Method,
    form: Result<Form<GameForm>, FormRejection>,
) -> Result<(StatusCode, Html<String>), GameServerError> {
    let form = form.map(|Form(form)| form).unwrap_or_else(|rejection| {
        debug!(%rejection, "unreadable form, treating as empty");
        GameForm::default()
    });

    let now = state.clock.now();
    let (status, page) = state.coordinator.handle(&method, &form, now).await;

    let html = state.renderer.render(&page)?;
    Ok((status, Html(html)))
}

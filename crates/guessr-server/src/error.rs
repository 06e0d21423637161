//! Error types for the game HTTP layer.
//!
//! [`GameServerError`] unifies the failures a request can hit after the
//! round has been updated. It converts into an Axum response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The
//! player only ever sees a generic message; details go to the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::render::RenderError;

/// Errors that can occur while answering a game request.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// The page template could not be rendered.
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

impl IntoResponse for GameServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(error = %self, status = status.as_u16(), "request failed");
        (status, "internal server error").into_response()
    }
}

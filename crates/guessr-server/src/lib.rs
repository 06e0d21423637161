//! Browser-facing HTTP server for the guessr number-guessing game.
//!
//! This crate provides an Axum HTTP server that exposes a single page at
//! `/`. Opening the page starts a round; posting the page's forms submits
//! guesses or restarts the round.
//!
//! # Architecture
//!
//! There is exactly one game session per process. It lives inside the
//! [`RequestCoordinator`], which admits one request at a time into a
//! short critical section that applies the pure round transition from
//! `guessr-core`, records the visit, and copies out a [`PageView`]. The
//! page is rendered with `minijinja` after the lock is released.
//!
//! [`RequestCoordinator`]: coordinator::RequestCoordinator
//! [`PageView`]: coordinator::PageView

pub mod coordinator;
pub mod error;
pub mod handlers;
pub mod render;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;

// Re-export primary types for convenience.
pub use coordinator::{GameForm, PageView, RequestCoordinator};
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;

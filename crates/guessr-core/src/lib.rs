//! Round state machine, rules, and clock for the guessr number-guessing game.
//!
//! A round starts with a secret drawn uniformly from the configured range.
//! The player has a fixed time for the whole round and a shorter window
//! between consecutive guesses. Every guess is answered with "secret is
//! larger", "secret is smaller", or "correct"; the round ends on a correct
//! guess or when the round time runs out.
//!
//! # Modules
//!
//! - [`clock`] -- [`Clock`] trait with system and manual implementations.
//! - [`config`] -- Configuration loading from `guessr-config.yaml` into
//!   strongly-typed structs.
//! - [`engine`] -- The pure [`transition`] function and [`Action`] enum.
//! - [`rules`] -- Validated [`GameRules`] (timing windows, secret range).
//! - [`session`] -- [`SessionState`], [`VisitStats`], and the derived
//!   [`RoundView`].
//!
//! [`Clock`]: clock::Clock
//! [`transition`]: engine::transition
//! [`Action`]: engine::Action
//! [`GameRules`]: rules::GameRules
//! [`SessionState`]: session::SessionState
//! [`VisitStats`]: session::VisitStats
//! [`RoundView`]: session::RoundView

pub mod clock;
pub mod config;
pub mod engine;
pub mod rules;
pub mod session;

//! Validated game rules.

use chrono::TimeDelta;

use crate::config::GameSection;

/// Placeholder shown instead of the secret while a round is running.
pub const MASKED_SECRET: &str = "***";

/// Errors produced when a [`GameSection`] cannot be turned into rules.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RulesError {
    /// A duration was zero or too large to represent.
    #[error("invalid {name}: {seconds} seconds")]
    InvalidDuration {
        /// Which setting was rejected.
        name: &'static str,
        /// The rejected value.
        seconds: u64,
    },

    /// The secret range is empty.
    #[error("empty secret range: {min}..={max}")]
    EmptyRange {
        /// Configured lower bound.
        min: i64,
        /// Configured upper bound.
        max: i64,
    },
}

/// Timing windows and the secret range for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    round_limit: TimeDelta,
    guess_window: TimeDelta,
    secret_min: i64,
    secret_max: i64,
}

impl GameRules {
    /// Build rules from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError`] if either window is zero or the range is empty.
    pub fn new(
        round_seconds: u64,
        guess_window_seconds: u64,
        secret_min: i64,
        secret_max: i64,
    ) -> Result<Self, RulesError> {
        let round_limit = seconds("round_seconds", round_seconds)?;
        let guess_window = seconds("guess_window_seconds", guess_window_seconds)?;
        if secret_min > secret_max {
            return Err(RulesError::EmptyRange {
                min: secret_min,
                max: secret_max,
            });
        }
        Ok(Self {
            round_limit,
            guess_window,
            secret_min,
            secret_max,
        })
    }

    /// Validate the `game` section of the config file.
    ///
    /// # Errors
    ///
    /// See [`GameRules::new`].
    pub fn from_section(section: &GameSection) -> Result<Self, RulesError> {
        Self::new(
            section.round_seconds,
            section.guess_window_seconds,
            section.secret_min,
            section.secret_max,
        )
    }

    /// How long a round lasts before it expires.
    pub const fn round_limit(&self) -> TimeDelta {
        self.round_limit
    }

    /// Maximum gap allowed between consecutive guesses.
    pub const fn guess_window(&self) -> TimeDelta {
        self.guess_window
    }

    /// Smallest possible secret.
    pub const fn secret_min(&self) -> i64 {
        self.secret_min
    }

    /// Largest possible secret.
    pub const fn secret_max(&self) -> i64 {
        self.secret_max
    }

    /// Whether `value` can be the secret.
    pub const fn in_range(&self, value: i64) -> bool {
        value >= self.secret_min && value <= self.secret_max
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            round_limit: TimeDelta::seconds(60),
            guess_window: TimeDelta::seconds(5),
            secret_min: 1,
            secret_max: 100,
        }
    }
}

fn seconds(name: &'static str, value: u64) -> Result<TimeDelta, RulesError> {
    let invalid = RulesError::InvalidDuration {
        name,
        seconds: value,
    };
    if value == 0 {
        return Err(invalid);
    }
    i64::try_from(value)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .ok_or(invalid)
}

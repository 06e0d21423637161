//! Round and visit state.
//!
//! [`SessionState`] is the record of the round in progress. It is only
//! ever replaced wholesale by the output of
//! [`transition`](crate::engine::transition); the fields are private so
//! nothing else can break its invariants:
//!
//! - the secret lies inside the rule range and never changes mid-round,
//! - once `over` is set, guesses leave the state untouched until a reset,
//! - `last_action_at` never precedes `started_at`.
//!
//! [`VisitStats`] counts handled requests for the lifetime of the process.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::rules::{GameRules, MASKED_SECRET};

/// Feedback shown to the player after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// The round ran out of time.
    TimeExpired,
    /// The guess arrived after the per-guess window closed.
    TooSlow {
        /// Length of the window in seconds.
        window_secs: i64,
    },
    /// The guess was not an integer.
    InvalidValue,
    /// The guess was an integer outside the secret range.
    OutOfRange {
        /// Smallest accepted guess.
        min: i64,
        /// Largest accepted guess.
        max: i64,
    },
    /// The guess matched the secret.
    Correct,
    /// The guess was below the secret.
    SecretIsLarger,
    /// The guess was above the secret.
    SecretIsSmaller,
}

impl Feedback {
    /// Whether this feedback reports malformed player input.
    pub const fn is_input_error(self) -> bool {
        matches!(self, Self::InvalidValue | Self::OutOfRange { .. })
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeExpired => f.write_str("time expired"),
            Self::TooSlow { window_secs } => {
                write!(f, "too slow, respond within {window_secs} seconds")
            }
            Self::InvalidValue => f.write_str("invalid value"),
            Self::OutOfRange { min, max } => {
                write!(f, "value out of range, pick a number from {min} to {max}")
            }
            Self::Correct => f.write_str("correct"),
            Self::SecretIsLarger => f.write_str("secret is larger"),
            Self::SecretIsSmaller => f.write_str("secret is smaller"),
        }
    }
}

/// The round currently being played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    secret: i64,
    started_at: DateTime<Utc>,
    last_action_at: DateTime<Utc>,
    history: Vec<String>,
    over: bool,
    won: bool,
    message: Option<Feedback>,
}

impl SessionState {
    /// Start a fresh round at `now` with a secret drawn from `rng`.
    pub fn new_round<R: Rng>(rules: &GameRules, now: DateTime<Utc>, rng: &mut R) -> Self {
        let secret = rng.random_range(rules.secret_min()..=rules.secret_max());
        Self::with_secret(secret, now)
    }

    /// Start a fresh round at `now` with a known secret.
    ///
    /// Used to restore a specific round, e.g. in tests.
    pub const fn with_secret(secret: i64, now: DateTime<Utc>) -> Self {
        Self {
            secret,
            started_at: now,
            last_action_at: now,
            history: Vec::new(),
            over: false,
            won: false,
            message: None,
        }
    }

    /// Override both timestamps of a round.
    ///
    /// `last_action_at` is clamped so it never precedes `started_at`.
    #[must_use]
    pub fn with_times(
        mut self,
        started_at: DateTime<Utc>,
        last_action_at: DateTime<Utc>,
    ) -> Self {
        self.started_at = started_at;
        self.last_action_at = last_action_at.max(started_at);
        self
    }

    /// The secret number.
    pub const fn secret(&self) -> i64 {
        self.secret
    }

    /// When the round began.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the last guess was accepted.
    pub const fn last_action_at(&self) -> DateTime<Utc> {
        self.last_action_at
    }

    /// Previous incorrect guesses in submission order.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Whether the round has ended.
    pub const fn is_over(&self) -> bool {
        self.over
    }

    /// Whether the round ended with a correct guess.
    pub const fn is_won(&self) -> bool {
        self.won
    }

    /// The last feedback message, if any.
    pub const fn message(&self) -> Option<Feedback> {
        self.message
    }

    /// Seconds left in the round as of `now`, never negative.
    pub fn time_left(&self, rules: &GameRules, now: DateTime<Utc>) -> i64 {
        if self.over && !self.won {
            return 0;
        }
        let elapsed = now.signed_duration_since(self.started_at).num_seconds();
        rules
            .round_limit()
            .num_seconds()
            .saturating_sub(elapsed.max(0))
            .max(0)
    }

    /// The secret once the round is over, the mask before that.
    pub fn display_secret(&self) -> String {
        if self.over {
            self.secret.to_string()
        } else {
            MASKED_SECRET.to_owned()
        }
    }

    /// Project the round for display at `now`.
    pub fn view(&self, rules: &GameRules, now: DateTime<Utc>) -> RoundView {
        RoundView {
            display_secret: self.display_secret(),
            time_left: self.time_left(rules, now),
            message: self.message.map(|m| m.to_string()),
            input_error: self.message.is_some_and(Feedback::is_input_error),
            history: self.history.clone(),
            over: self.over,
            won: self.won,
        }
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_action_at = now.max(self.started_at);
    }

    pub(crate) fn set_message(&mut self, feedback: Feedback) {
        self.message = Some(feedback);
    }

    pub(crate) fn push_guess(&mut self, raw: String) {
        self.history.push(raw);
    }

    pub(crate) fn finish(&mut self, won: bool) {
        self.over = true;
        self.won = won;
    }
}

/// Derived, display-ready fields of a round.
///
/// Computed fresh for every response and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundView {
    /// The secret if the round is over, otherwise the mask.
    pub display_secret: String,
    /// Whole seconds remaining in the round.
    pub time_left: i64,
    /// Last feedback text.
    pub message: Option<String>,
    /// Whether the last feedback reports malformed input.
    pub input_error: bool,
    /// Previous incorrect guesses.
    pub history: Vec<String>,
    /// Whether the round has ended.
    pub over: bool,
    /// Whether the player won.
    pub won: bool,
}

/// Process-wide request statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitStats {
    count: u64,
    last_visit_at: Option<DateTime<Utc>>,
}

impl VisitStats {
    /// Number of requests handled so far.
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Time of the most recent request, if any.
    pub const fn last_visit_at(&self) -> Option<DateTime<Utc>> {
        self.last_visit_at
    }

    /// Count one more request made at `now`.
    pub fn record(&mut self, now: DateTime<Utc>) {
        self.count = self.count.saturating_add(1);
        self.last_visit_at = Some(now);
    }
}

//! Pure round transitions.
//!
//! [`transition`] takes the current [`SessionState`], one [`Action`], the
//! request's `now`, the rules and a random source, and returns the next
//! state together with the freshly derived [`RoundView`]. It reads no
//! globals and performs no I/O, so every rule can be tested without a
//! server or a lock.
//!
//! # Precedence
//!
//! 1. `StartNewRound` / `Restart` draw a new secret and clear the round.
//! 2. An active round older than the round limit expires before anything
//!    else is looked at.
//! 3. A finished round ignores guesses and repeats its terminal message.
//! 4. A guess is checked against the guess window, then parsed, then
//!    range-checked, then compared.
//! 5. `QueryOnly` changes nothing beyond step 2.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::rules::GameRules;
use crate::session::{Feedback, RoundView, SessionState};

/// Longest trimmed guess that is parsed at all; anything longer is an
/// invalid value. Wide enough for every `i64` including its sign.
pub const MAX_GUESS_LEN: usize = 20;

/// Something the player asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Begin a round because the page was opened.
    StartNewRound,
    /// Begin a round because the player pressed restart.
    Restart,
    /// Evaluate a raw guess as typed by the player.
    SubmitGuess(String),
    /// Show the current round without acting on it.
    QueryOnly,
}

impl Action {
    /// Whether this action throws the current round away.
    pub const fn is_reset(&self) -> bool {
        matches!(self, Self::StartNewRound | Self::Restart)
    }
}

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The state that replaces the old one.
    pub state: SessionState,
    /// Feedback produced (or repeated) by this action.
    pub feedback: Option<Feedback>,
    /// Display fields derived from `state` at the same `now`.
    pub view: RoundView,
}

impl Transition {
    /// Whether the action was rejected as malformed input.
    pub fn is_input_error(&self) -> bool {
        self.feedback.is_some_and(Feedback::is_input_error)
    }
}

/// Compute the state that follows `action` at `now`.
pub fn transition<R: Rng>(
    state: &SessionState,
    action: Action,
    now: DateTime<Utc>,
    rules: &GameRules,
    rng: &mut R,
) -> Transition {
    let (next, feedback) = apply(state, action, now, rules, rng);
    let view = next.view(rules, now);
    Transition {
        state: next,
        feedback,
        view,
    }
}

fn apply<R: Rng>(
    state: &SessionState,
    action: Action,
    now: DateTime<Utc>,
    rules: &GameRules,
    rng: &mut R,
) -> (SessionState, Option<Feedback>) {
    if action.is_reset() {
        return (SessionState::new_round(rules, now, rng), None);
    }

    let mut next = state.clone();

    if !next.is_over() && now.signed_duration_since(next.started_at()) > rules.round_limit() {
        next.finish(false);
        next.set_message(Feedback::TimeExpired);
        return (next, Some(Feedback::TimeExpired));
    }

    let Action::SubmitGuess(raw) = action else {
        return (next, None);
    };

    if next.is_over() {
        let repeated = next.message();
        return (next, repeated);
    }

    let feedback = evaluate(&mut next, &raw, now, rules);
    next.touch(now);
    next.set_message(feedback);
    (next, Some(feedback))
}

fn evaluate(
    state: &mut SessionState,
    raw: &str,
    now: DateTime<Utc>,
    rules: &GameRules,
) -> Feedback {
    if now.signed_duration_since(state.last_action_at()) > rules.guess_window() {
        return Feedback::TooSlow {
            window_secs: rules.guess_window().num_seconds(),
        };
    }

    let guess = raw.trim();
    if guess.len() > MAX_GUESS_LEN {
        return Feedback::InvalidValue;
    }
    let Ok(value) = guess.parse::<i64>() else {
        return Feedback::InvalidValue;
    };

    if !rules.in_range(value) {
        return Feedback::OutOfRange {
            min: rules.secret_min(),
            max: rules.secret_max(),
        };
    }

    let secret = state.secret();
    if value == secret {
        state.finish(true);
        return Feedback::Correct;
    }

    let feedback = if value < secret {
        Feedback::SecretIsLarger
    } else {
        Feedback::SecretIsSmaller
    };
    state.push_guess(guess.to_owned());
    feedback
}

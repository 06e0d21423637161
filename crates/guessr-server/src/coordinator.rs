//! Serialized access to the single game session.
//!
//! [`RequestCoordinator`] owns the round, the visit statistics and the
//! secret generator behind one [`Mutex`]. Each request:
//!
//! 1. maps its method and form fields to an [`Action`],
//! 2. takes the lock,
//! 3. runs the pure [`transition`] with the request's `now`,
//! 4. stores the new state and records the visit,
//! 5. copies everything the page needs into a [`PageView`],
//! 6. releases the lock.
//!
//! Nothing awaits or logs while the lock is held, and only owned copies
//! leave it, so rendering and socket writes never block other players.

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use guessr_core::engine::{Action, transition};
use guessr_core::rules::GameRules;
use guessr_core::session::{Feedback, RoundView, SessionState, VisitStats};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Display format for the previous visit timestamp.
pub const LAST_VISIT_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Form fields accepted by `POST /`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameForm {
    /// The raw guess, if the guess form was submitted.
    pub guess: Option<String>,
    /// `"true"` when the restart button was pressed.
    pub restart: Option<String>,
}

impl GameForm {
    /// A form carrying only a guess.
    pub fn guess(raw: impl Into<String>) -> Self {
        Self {
            guess: Some(raw.into()),
            restart: None,
        }
    }

    /// A form asking for a restart.
    pub fn restart() -> Self {
        Self {
            guess: None,
            restart: Some("true".to_owned()),
        }
    }

    fn wants_restart(&self) -> bool {
        self.restart.as_deref().is_some_and(|v| v.trim() == "true")
    }
}

/// Everything the page template needs, copied out of the critical section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    /// Requests handled before this one.
    pub visits: u64,
    /// Time of the previous request, formatted for display; empty on the
    /// first request.
    pub last_visit: String,
    /// The round as of this request.
    pub round: RoundView,
    /// Length of a round in seconds.
    pub round_secs: i64,
    /// Maximum seconds between guesses.
    pub guess_window_secs: i64,
    /// Smallest accepted guess.
    pub secret_min: i64,
    /// Largest accepted guess.
    pub secret_max: i64,
}

struct Shared {
    session: SessionState,
    visits: VisitStats,
    rng: StdRng,
}

/// Owner of the game session and visit counter.
pub struct RequestCoordinator {
    rules: GameRules,
    reset_on_reload: bool,
    shared: Mutex<Shared>,
}

impl RequestCoordinator {
    /// Create a coordinator with a fresh round started at `now`.
    pub fn new(rules: GameRules, mut rng: StdRng, now: DateTime<Utc>) -> Self {
        let session = SessionState::new_round(&rules, now, &mut rng);
        Self::with_session(rules, rng, session)
    }

    /// Create a coordinator around an existing round.
    pub fn with_session(rules: GameRules, rng: StdRng, session: SessionState) -> Self {
        Self {
            rules,
            reset_on_reload: true,
            shared: Mutex::new(Shared {
                session,
                visits: VisitStats::default(),
                rng,
            }),
        }
    }

    /// Choose whether a plain page load starts a new round.
    #[must_use]
    pub fn reset_on_reload(mut self, enabled: bool) -> Self {
        self.reset_on_reload = enabled;
        self
    }

    /// The rules rounds are played by.
    pub const fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Map a request to the action it asks for.
    ///
    /// A restart wins over a guess sent in the same form.
    pub fn action_for(&self, method: &Method, form: &GameForm) -> Action {
        if *method == Method::GET {
            return if self.reset_on_reload {
                Action::StartNewRound
            } else {
                Action::QueryOnly
            };
        }
        if *method != Method::POST {
            return Action::QueryOnly;
        }
        if form.wants_restart() {
            return Action::Restart;
        }
        form.guess
            .clone()
            .map_or(Action::QueryOnly, Action::SubmitGuess)
    }

    /// Apply one request to the session.
    ///
    /// Returns `400` when the guess was rejected as malformed input and
    /// `200` otherwise, together with the page to render.
    pub async fn handle(
        &self,
        method: &Method,
        form: &GameForm,
        now: DateTime<Utc>,
    ) -> (StatusCode, PageView) {
        let action = self.action_for(method, form);
        let reset = action.is_reset();

        let mut shared = self.shared.lock().await;
        let Shared {
            session,
            visits,
            rng,
        } = &mut *shared;

        let was_over = session.is_over();
        let outcome = transition(session, action, now, &self.rules, rng);
        let status = if outcome.is_input_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        };
        *session = outcome.state;

        let page = PageView {
            visits: visits.count(),
            last_visit: visits
                .last_visit_at()
                .map(|at| at.format(LAST_VISIT_FORMAT).to_string())
                .unwrap_or_default(),
            round: outcome.view,
            round_secs: self.rules.round_limit().num_seconds(),
            guess_window_secs: self.rules.guess_window().num_seconds(),
            secret_min: self.rules.secret_min(),
            secret_max: self.rules.secret_max(),
        };
        visits.record(now);
        let visit = visits.count();
        drop(shared);

        let event = RoundEvent::classify(reset, was_over, outcome.feedback);
        log_outcome(method, event, &page, visit);
        (status, page)
    }

    /// A copy of the current round.
    pub async fn session(&self) -> SessionState {
        self.shared.lock().await.session.clone()
    }

    /// A copy of the visit statistics.
    pub async fn visits(&self) -> VisitStats {
        self.shared.lock().await.visits
    }
}

/// What a request did to the round, as far as the log is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundEvent {
    Started,
    Expired,
    Won,
    Ignored,
    Evaluated(Feedback),
    Shown,
}

impl RoundEvent {
    fn classify(reset: bool, was_over: bool, feedback: Option<Feedback>) -> Self {
        match feedback {
            None if reset => Self::Started,
            Some(Feedback::TimeExpired) if !was_over => Self::Expired,
            Some(Feedback::Correct) if !was_over => Self::Won,
            Some(_) if was_over => Self::Ignored,
            Some(feedback) => Self::Evaluated(feedback),
            None => Self::Shown,
        }
    }
}

fn log_outcome(method: &Method, event: RoundEvent, page: &PageView, visit: u64) {
    let round = &page.round;
    match event {
        RoundEvent::Started => info!(%method, visit, "round started"),
        RoundEvent::Expired => {
            info!(secret = %round.display_secret, guesses = round.history.len(), "round expired");
        }
        RoundEvent::Won => {
            info!(secret = %round.display_secret, guesses = round.history.len(), "round won");
        }
        RoundEvent::Ignored => debug!(%method, visit, "guess after round end ignored"),
        RoundEvent::Evaluated(feedback) => debug!(%method, visit, %feedback, "guess evaluated"),
        RoundEvent::Shown => debug!(%method, visit, "round shown"),
    }
}

impl std::fmt::Debug for RequestCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCoordinator")
            .field("rules", &self.rules)
            .field("reset_on_reload", &self.reset_on_reload)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeDelta;
    use rand::SeedableRng;

    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn secs(n: i64) -> DateTime<Utc> {
        t0() + TimeDelta::seconds(n)
    }

    fn coordinator_with_secret(secret: i64) -> RequestCoordinator {
        RequestCoordinator::with_session(
            GameRules::default(),
            StdRng::seed_from_u64(1),
            SessionState::with_secret(secret, t0()),
        )
    }

    #[test]
    fn method_and_form_map_to_actions() {
        let c = coordinator_with_secret(50);
        let empty = GameForm::default();

        assert_eq!(c.action_for(&Method::GET, &empty), Action::StartNewRound);
        assert_eq!(c.action_for(&Method::POST, &GameForm::restart()), Action::Restart);
        assert_eq!(
            c.action_for(&Method::POST, &GameForm::guess("42")),
            Action::SubmitGuess("42".to_owned())
        );
        assert_eq!(c.action_for(&Method::POST, &empty), Action::QueryOnly);
        assert_eq!(c.action_for(&Method::PUT, &GameForm::guess("42")), Action::QueryOnly);

        let both = GameForm {
            guess: Some("42".to_owned()),
            restart: Some("true".to_owned()),
        };
        assert_eq!(c.action_for(&Method::POST, &both), Action::Restart);

        let not_restart = GameForm {
            guess: None,
            restart: Some("false".to_owned()),
        };
        assert_eq!(c.action_for(&Method::POST, &not_restart), Action::QueryOnly);
    }

    #[test]
    fn reload_can_keep_the_round() {
        let c = coordinator_with_secret(50).reset_on_reload(false);
        assert_eq!(c.action_for(&Method::GET, &GameForm::default()), Action::QueryOnly);
    }

    #[tokio::test]
    async fn scenario_from_first_guess_to_win() {
        let c = coordinator_with_secret(50);

        let (status, page) = c.handle(&Method::POST, &GameForm::guess("30"), secs(1)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page.round.message.as_deref(), Some("secret is larger"));
        assert_eq!(page.round.history, ["30"]);

        let (_, page) = c.handle(&Method::POST, &GameForm::guess("70"), secs(2)).await;
        assert_eq!(page.round.message.as_deref(), Some("secret is smaller"));
        assert_eq!(page.round.history, ["30", "70"]);

        let (status, page) = c.handle(&Method::POST, &GameForm::guess("50"), secs(3)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page.round.message.as_deref(), Some("correct"));
        assert!(page.round.over);
        assert_eq!(page.round.display_secret, "50");
        assert_eq!(page.round.history, ["30", "70"]);

        let session = c.session().await;
        assert!(session.is_won());
        assert_eq!(session.message(), Some(Feedback::Correct));
    }

    #[tokio::test]
    async fn malformed_guess_is_bad_request_and_keeps_round() {
        let c = coordinator_with_secret(50);
        let (status, page) = c.handle(&Method::POST, &GameForm::guess("abc"), secs(1)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(page.round.message.as_deref(), Some("invalid value"));
        assert!(!page.round.over);
        assert!(page.round.history.is_empty());

        let (status, _) = c.handle(&Method::POST, &GameForm::guess("101"), secs(2)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, page) = c.handle(&Method::POST, &GameForm::default(), secs(3)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!page.round.over);
    }

    #[tokio::test]
    async fn padded_guesses_do_not_grow_shared_history() {
        let c = coordinator_with_secret(50);
        let padded = format!("{}20", " ".repeat(1_000_000));
        let (status, page) = c.handle(&Method::POST, &GameForm::guess(padded), secs(1)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page.round.history, ["20"]);

        let zeros = format!("{}30", "0".repeat(1_000_000));
        let (status, page) = c.handle(&Method::POST, &GameForm::guess(zeros), secs(2)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(page.round.message.as_deref(), Some("invalid value"));

        assert_eq!(c.session().await.history(), ["20"]);
    }

    #[test]
    fn round_events_distinguish_fresh_and_repeated_endings() {
        assert_eq!(RoundEvent::classify(true, true, None), RoundEvent::Started);
        assert_eq!(RoundEvent::classify(false, false, Some(Feedback::Correct)), RoundEvent::Won);
        assert_eq!(RoundEvent::classify(false, true, Some(Feedback::Correct)), RoundEvent::Ignored);
        assert_eq!(
            RoundEvent::classify(false, false, Some(Feedback::TimeExpired)),
            RoundEvent::Expired
        );
        assert_eq!(
            RoundEvent::classify(false, false, Some(Feedback::InvalidValue)),
            RoundEvent::Evaluated(Feedback::InvalidValue)
        );
        assert_eq!(RoundEvent::classify(false, false, None), RoundEvent::Shown);
    }

    #[tokio::test]
    async fn lock_is_free_once_the_page_is_built() {
        let c = coordinator_with_secret(50);
        c.handle(&Method::POST, &GameForm::guess("50"), secs(1)).await;
        c.handle(&Method::POST, &GameForm::guess("10"), secs(2)).await;
        assert!(c.shared.try_lock().is_ok());
    }

    #[tokio::test]
    async fn get_restarts_round_by_default() {
        let c = coordinator_with_secret(50);
        c.handle(&Method::POST, &GameForm::guess("30"), secs(1)).await;

        let (status, page) = c.handle(&Method::GET, &GameForm::default(), secs(2)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(page.round.history.is_empty());
        assert_eq!(page.round.time_left, 60);
        assert_eq!(c.session().await.started_at(), secs(2));
    }

    #[tokio::test]
    async fn get_keeps_round_when_reload_reset_disabled() {
        let c = coordinator_with_secret(50).reset_on_reload(false);
        c.handle(&Method::POST, &GameForm::guess("30"), secs(1)).await;

        let (_, page) = c.handle(&Method::GET, &GameForm::default(), secs(2)).await;
        assert_eq!(page.round.history, ["30"]);
        assert_eq!(page.round.time_left, 58);
    }

    #[tokio::test]
    async fn visits_show_previous_request() {
        let c = coordinator_with_secret(50);

        let (_, first) = c.handle(&Method::GET, &GameForm::default(), secs(0)).await;
        assert_eq!(first.visits, 0);
        assert_eq!(first.last_visit, "");

        let (_, second) = c.handle(&Method::GET, &GameForm::default(), secs(1)).await;
        assert_eq!(second.visits, 1);
        assert_eq!(second.last_visit, "14.11.2023 22:13:20");

        let stats = c.visits().await;
        assert_eq!(stats.count(), 2);
        assert_eq!(stats.last_visit_at(), Some(secs(1)));
    }

    #[tokio::test]
    async fn page_carries_rules() {
        let c = coordinator_with_secret(50);
        let (_, page) = c.handle(&Method::POST, &GameForm::default(), secs(0)).await;
        assert_eq!(page.round_secs, 60);
        assert_eq!(page.guess_window_secs, 5);
        assert_eq!(page.secret_min, 1);
        assert_eq!(page.secret_max, 100);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_lose_no_visits() {
        let c = Arc::new(coordinator_with_secret(50));
        let requests: u64 = 200;

        let mut handles = Vec::new();
        for i in 0..requests {
            let c = Arc::clone(&c);
            handles.push(tokio::spawn(async move {
                let form = if i % 2 == 0 {
                    GameForm::guess("10")
                } else {
                    GameForm::default()
                };
                c.handle(&Method::POST, &form, secs(1)).await
            }));
        }

        let mut seen = Vec::new();
        for handle in handles {
            let (_, page) = handle.await.unwrap();
            seen.push(page.visits);
        }

        assert_eq!(c.visits().await.count(), requests);
        seen.sort_unstable();
        let expected: Vec<u64> = (0..requests).collect();
        assert_eq!(seen, expected);

        let session = c.session().await;
        assert_eq!(session.history().len(), 100);
        assert!(session.history().iter().all(|g| g == "10"));
    }
}

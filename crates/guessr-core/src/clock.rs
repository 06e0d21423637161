//! Wall-clock time source for the game.
//!
//! Every timing rule in the game (round timeout, per-guess window, visit
//! timestamps) is evaluated against a single `now` sampled from a
//! [`Clock`] once per request. The clock is injected so tests can pin and
//! advance time without sleeping.
//!
//! # Implementations
//!
//! - [`SystemClock`] -- reads [`Utc::now`], used by the server binary.
//! - [`ManualClock`] -- holds an explicit instant that tests move forward
//!   with [`ManualClock::advance`].

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};

/// A source of the current time.
///
/// Implementations must be cheap to call and safe to share across
/// request tasks.
pub trait Clock: Send + Sync {
    /// Return the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system's wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually driven clock with millisecond resolution.
///
/// The current instant is stored as milliseconds since the Unix epoch in
/// an atomic, so a shared `Arc<ManualClock>` can be advanced by a test
/// while request tasks read it.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Create a clock pinned at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Set the clock to an explicit instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        self.millis
            .store(instant.timestamp_millis(), Ordering::Release);
    }

    /// Move the clock by `delta` (negative deltas move it backwards).
    ///
    /// Saturates at the representable range instead of wrapping.
    pub fn advance(&self, delta: TimeDelta) {
        let step = delta.num_milliseconds();
        let _ = self
            .millis
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(step))
            });
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::default())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(Ordering::Acquire);
        DateTime::from_timestamp_millis(millis).unwrap_or_default()
    }
}

//! Lap timer predicting whether one more unit of work fits before a deadline.
//!
//! An anytime strategy typically refines its answer in a loop: before starting an iteration it
//! asks [`AdaptiveTimer::finished`], and after each iteration it calls [`AdaptiveTimer::lap`].
//! The timer keeps the running mean and sample variance of lap durations (Welford's online
//! algorithm) and predicts overrun instead of measuring it.
//!
//! ```
//! use std::time::Duration;
//! use ai_contest::timer::AdaptiveTimer;
//!
//! let mut timer = AdaptiveTimer::start(Duration::from_millis(50));
//! let mut iterations = 0;
//! while !timer.finished(2.0) {
//!     iterations += 1; // one unit of work
//!     timer.lap();
//! }
//! assert!(iterations >= 1);
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use tracing::trace;

/// Elapsed-time statistics over the laps of one time budget.
#[derive(Debug, Clone)]
pub struct AdaptiveTimer {
    started: Instant,
    deadline: Instant,
    previous: Instant,
    laps: u32,
    last_lap: Duration,
    // nanoseconds
    mean: f64,
    m2: f64,
    // nanoseconds squared
    variance: f64,
    confidence: f64,
}

impl AdaptiveTimer {
    /// Starts a timer whose deadline is `budget` from now.
    pub fn start(budget: Duration) -> Self {
        Self::start_at(Instant::now(), budget, 0.0)
    }

    /// Starts a timer that reserves `confidence` standard deviations of margin in
    /// [`is_finished`](Self::is_finished).
    pub fn start_strict(budget: Duration, confidence: f64) -> Self {
        Self::start_at(Instant::now(), budget, confidence)
    }

    fn start_at(now: Instant, budget: Duration, confidence: f64) -> Self {
        Self {
            started: now,
            deadline: now + budget,
            previous: now,
            laps: 0,
            last_lap: Duration::ZERO,
            mean: 0.0,
            m2: 0.0,
            variance: 0.0,
            confidence,
        }
    }

    /// Closes the current lap.
    pub fn lap(&mut self) {
        self.lap_at(Instant::now());
    }

    /// Closes the current lap at `now`.
    pub fn lap_at(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.previous);
        self.previous = now;
        self.last_lap = elapsed;
        self.laps += 1;

        let elapsed = elapsed.as_nanos() as f64;
        let delta = elapsed - self.mean;
        self.mean += delta / f64::from(self.laps);
        self.m2 += delta * (elapsed - self.mean);
        if self.laps > 1 {
            self.variance = self.m2 / f64::from(self.laps - 1);
        }
        trace!(timer = %self.snapshot(), "lap");
    }

    /// True if another lap is predicted to end after the deadline.
    ///
    /// The prediction is `now + mean + confidence * sigma`. A `confidence` of 0 uses the mean
    /// only; larger values keep a margin proportional to the observed spread of lap durations.
    pub fn finished(&self, confidence: f64) -> bool {
        self.finished_at(Instant::now(), confidence)
    }

    /// [`finished`](Self::finished) with the confidence given at start.
    pub fn is_finished(&self) -> bool {
        self.finished(self.confidence)
    }

    /// [`finished`](Self::finished) evaluated at `now`.
    pub fn finished_at(&self, now: Instant, confidence: f64) -> bool {
        let margin = (self.mean + confidence * self.variance.sqrt()).max(0.0);
        now + Duration::from_nanos(margin.round() as u64) > self.deadline
    }

    /// Number of closed laps.
    pub fn laps(&self) -> u32 {
        self.laps
    }

    /// Duration of the last closed lap.
    pub fn last_lap(&self) -> Duration {
        self.last_lap
    }

    /// Mean lap duration.
    pub fn mean(&self) -> Duration {
        Duration::from_nanos(self.mean.round() as u64)
    }

    /// Sample variance of lap durations, in nanoseconds squared.
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Sample standard deviation of lap durations.
    pub fn std_dev(&self) -> Duration {
        Duration::from_nanos(self.variance.sqrt().round() as u64)
    }

    /// When the timer was started.
    pub fn started(&self) -> Instant {
        self.started
    }

    /// When the budget runs out.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Copy of the current statistics.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            laps: self.laps,
            last_lap: self.last_lap,
            mean: self.mean,
            variance: self.variance,
            started: self.started,
            deadline: self.deadline,
        }
    }
}

/// Statistics of an [`AdaptiveTimer`] at one point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSnapshot {
    /// Number of closed laps.
    pub laps: u32,
    /// Duration of the last closed lap.
    pub last_lap: Duration,
    /// Mean lap duration in nanoseconds.
    pub mean: f64,
    /// Sample variance in nanoseconds squared.
    pub variance: f64,
    /// Start of the budget.
    pub started: Instant,
    /// End of the budget.
    pub deadline: Instant,
}

impl fmt::Display for TimerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lap={}, elapsed={}, mean={}, sigma^2={}, sigma={:.1}",
            self.laps,
            self.last_lap.as_nanos(),
            self.mean as u64,
            self.variance as u64,
            self.variance.sqrt()
        )
    }
}

//! Settings for running a contest
//!
//! Settings can be created programmatically using [`Settings::new()`] or by reading environment
//! variables using [`Settings::from_env()`].
//!
//! # Environment Variables
//!
//! All values are optional. Flags are case-insensitive: set them to `"true"` to enable them.
//! Values that cannot be parsed fall back to the default.
//!
//! - `CONTEST_MATCHES`: matches played per game (default: `5`)
//! - `CONTEST_GAME_THREADS`: workers running games (default: number of logical CPUs)
//! - `CONTEST_MATCH_THREADS`: workers running matches (default: number of logical CPUs)
//! - `CONTEST_TURN_BUDGET_MS`: per-turn budget of time-boxed strategies (default: `100`)
//! - `CONTEST_GRACE_MS`: time given to a time-boxed worker to stop (default: `1000`)
//! - `CONTEST_VERBOSE`: print every finished game to stdout (default: `false`)
//! - `CONTEST_LOG`: log to a file (default: `false`)
//! - `CONTEST_LOG_DIR`: directory of the log file (default: `.`)

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::bail;
use tracing::warn;

use crate::error::Result;
use crate::pool::WorkerPool;
use crate::time_box::{TimeBoxedExecutor, TimeBoxedStrategy, DEFAULT_GRACE};

/// Matches played per game unless told otherwise.
pub const DEFAULT_NUMBER_OF_MATCHES: usize = 5;

/// Per-turn budget of time-boxed strategies unless told otherwise.
pub const DEFAULT_TURN_BUDGET: Duration = Duration::from_millis(100);

/// Contest settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub(crate) number_of_matches: usize,
    pub(crate) game_threads: usize,
    pub(crate) match_threads: usize,
    pub(crate) turn_budget: Duration,
    pub(crate) grace: Duration,
    pub(crate) verbose: bool,
    pub(crate) log: bool,
    pub(crate) log_dir: PathBuf,
}

impl Settings {
    /// Create new settings with default parameters.
    ///
    /// By default:
    /// - Each game plays 5 matches.
    /// - Both pools get one worker per logical CPU.
    /// - Time-boxed strategies get 100ms per turn, and 1s to stop once their budget is spent.
    /// - Nothing is printed to stdout and logging to file is disabled.
    pub fn new() -> Self {
        let cpus = num_cpus::get();
        Self {
            number_of_matches: DEFAULT_NUMBER_OF_MATCHES,
            game_threads: cpus,
            match_threads: cpus,
            turn_budget: DEFAULT_TURN_BUDGET,
            grace: DEFAULT_GRACE,
            verbose: false,
            log: false,
            log_dir: PathBuf::from("."),
        }
    }

    /// Create settings from environment variables.
    ///
    /// See the [module documentation](crate::configuration) for the recognized variables. Any
    /// variable that is unset or invalid keeps its default value.
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        fn parse_usize(var: &str) -> Option<usize> {
            let raw = env::var(var).ok()?;
            match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("ignoring {var}={raw:?}: not a positive integer");
                    None
                }
            }
        }

        fn parse_duration_millis(var: &str) -> Option<Duration> {
            parse_usize(var).map(|ms| Duration::from_millis(ms as u64))
        }

        let defaults = Self::new();
        Self {
            number_of_matches: parse_usize("CONTEST_MATCHES").unwrap_or(defaults.number_of_matches),
            game_threads: parse_usize("CONTEST_GAME_THREADS").unwrap_or(defaults.game_threads),
            match_threads: parse_usize("CONTEST_MATCH_THREADS").unwrap_or(defaults.match_threads),
            turn_budget: parse_duration_millis("CONTEST_TURN_BUDGET_MS")
                .unwrap_or(defaults.turn_budget),
            grace: parse_duration_millis("CONTEST_GRACE_MS").unwrap_or(defaults.grace),
            verbose: get_env_flag("CONTEST_VERBOSE", defaults.verbose),
            log: get_env_flag("CONTEST_LOG", defaults.log),
            log_dir: env::var_os("CONTEST_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
        }
    }

    /// Set the number of matches per game.
    pub fn with_number_of_matches(mut self, value: usize) -> Self {
        self.number_of_matches = value;
        self
    }

    /// Set the number of workers running games.
    pub fn with_game_threads(mut self, value: usize) -> Self {
        self.game_threads = value;
        self
    }

    /// Set the number of workers running matches.
    pub fn with_match_threads(mut self, value: usize) -> Self {
        self.match_threads = value;
        self
    }

    /// Set the per-turn budget of time-boxed strategies.
    pub fn with_turn_budget(mut self, value: Duration) -> Self {
        self.turn_budget = value;
        self
    }

    /// Set the time given to a time-boxed worker to stop after its budget.
    pub fn with_grace(mut self, value: Duration) -> Self {
        self.grace = value;
        self
    }

    /// Enable or disable printing finished games to stdout.
    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Set the directory the log file is created in.
    pub fn with_log_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.log_dir = value.into();
        self
    }

    /// Matches per game.
    pub fn number_of_matches(&self) -> usize {
        self.number_of_matches
    }

    /// Workers running games.
    pub fn game_threads(&self) -> usize {
        self.game_threads
    }

    /// Workers running matches.
    pub fn match_threads(&self) -> usize {
        self.match_threads
    }

    /// Per-turn budget of time-boxed strategies.
    pub fn turn_budget(&self) -> Duration {
        self.turn_budget
    }

    /// Grace period of time-boxed workers.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// True if finished games are printed to stdout.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// True if logs are written to a file.
    pub fn log(&self) -> bool {
        self.log
    }

    /// Directory of the log file.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Checks that a contest can run with these settings.
    ///
    /// # Errors
    /// If no match would be played, or a pool would have no worker.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.number_of_matches == 0 {
            bail!("number of matches must be greater than 0");
        }
        if self.game_threads == 0 || self.match_threads == 0 {
            bail!(
                "pools need at least one worker (games: {}, matches: {})",
                self.game_threads,
                self.match_threads
            );
        }
        if self.turn_budget.is_zero() {
            bail!("turn budget must be greater than 0");
        }
        Ok(())
    }

    /// The pool games are submitted to.
    ///
    /// # Errors
    /// [`Error::ThreadPool`](crate::error::Error::ThreadPool) if the pool cannot be built.
    pub fn game_pool(&self) -> Result<WorkerPool> {
        WorkerPool::new("game", self.game_threads)
    }

    /// The pool matches are submitted to.
    ///
    /// # Errors
    /// [`Error::ThreadPool`](crate::error::Error::ThreadPool) if the pool cannot be built.
    pub fn match_pool(&self) -> Result<WorkerPool> {
        WorkerPool::new("match", self.match_threads)
    }

    /// Executor honoring the configured grace period.
    pub fn executor(&self) -> TimeBoxedExecutor {
        TimeBoxedExecutor::new(self.grace)
    }

    /// Wraps `strategy` so that each of its turns fits in the configured budget.
    pub fn time_boxed<S>(&self, strategy: S) -> TimeBoxedStrategy<S> {
        TimeBoxedStrategy::new(strategy, self.turn_budget, self.executor())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

//! Error type shared by every layer of a contest.
//!
//! Failures are never recovered locally: a [`Match`](crate::match_runner::Match) failure fails
//! its [`Game`](crate::game::Game), which fails its [`Contest`](crate::contest::Contest). The
//! value surfaced to the caller is the one produced where the failure originated.

use std::time::Duration;

use thiserror::Error;

use crate::game_interface::Side;

/// Errors that can occur while playing matches, games and contests.
#[derive(Debug, Error)]
pub enum Error {
    /// A strategy could not be built, or its `play()` failed.
    #[error("{side} strategy failed: {source}")]
    Strategy {
        /// Side the failing strategy was playing.
        side: Side,
        /// Error returned by the strategy.
        #[source]
        source: anyhow::Error,
    },

    /// The game engine could not be built, or its `start()`/`run()` failed.
    #[error("game engine failed: {0}")]
    Engine(#[source] anyhow::Error),

    /// A time-boxed worker did not stop within the grace period after being signaled.
    #[error("worker did not stop within {grace:?} after the stop signal")]
    TimeoutUnrecoverable {
        /// Grace period the worker was given.
        grace: Duration,
    },

    /// A contest needs at least two competitors.
    #[error("a contest needs at least two competitors, got {0}")]
    InvalidTournamentSize(usize),

    /// A match was invoked after it already finished or aborted.
    #[error("match already played")]
    Replay,

    /// A game or contest was configured to play zero matches.
    #[error("number of matches must be greater than 0")]
    NoMatches,

    /// A contest was configured without any game engine variant.
    #[error("a contest needs at least one game engine variant")]
    NoEngineVariants,

    /// A time-boxed strategy published no action before its deadline.
    #[error("no output was published before the deadline")]
    NoOutput,

    /// A time-boxed operation returned an error.
    #[error("time-boxed operation failed: {0}")]
    Operation(#[source] anyhow::Error),

    /// A time-boxed operation panicked.
    #[error("time-boxed worker panicked")]
    WorkerPanicked,

    /// A strategy or the game engine panicked during a match.
    #[error("match panicked: {0}")]
    MatchPanicked(String),

    /// The worker thread could not be spawned.
    #[error("could not spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// A worker pool could not be built.
    #[error("could not build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for contest operations.
pub type Result<T> = std::result::Result<T, Error>;

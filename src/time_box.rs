//! Wall-clock budgets for a single strategy turn.
//!
//! A [`TimeBoxedExecutor`] runs an operation on a dedicated worker thread. The operation publishes
//! its best answer so far in an [`OutputSlot`] and polls a [`StopToken`]. When the budget expires,
//! the slot is sealed (freezing the answer), the stop signal is raised, and the executor waits a
//! bounded grace period for the worker to exit before returning the sealed answer.
//!
//! [`TimeBoxedStrategy`] uses the executor to turn an [`AnytimeStrategy`] into a [`Strategy`]
//! whose every `play()` fits in a fixed budget.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use tracing::{error, instrument, trace, warn};

use crate::error::{Error, Result};
use crate::game_interface::{GameEngine, Strategy};

/// Grace period given to a worker to honor the stop signal.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(1);

/// Cooperative stop signal shared between the executor and its worker.
///
/// Cloning is cheap and every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    /// A token that is not stopped yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the stop signal.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// True once [`stop`](Self::stop) was called on any clone.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct SlotState<T> {
    value: Option<T>,
    sealed: bool,
}

/// Latest output of a time-boxed operation.
#[derive(Debug)]
pub struct OutputSlot<T> {
    state: Arc<Mutex<SlotState<T>>>,
}

impl<T> Clone for OutputSlot<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T> Default for OutputSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OutputSlot<T> {
    /// An empty, unsealed slot.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SlotState {
                value: None,
                sealed: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the current output. Returns false, dropping `value`, once the slot is sealed.
    pub fn publish(&self, value: T) -> bool {
        let mut state = self.lock();
        if state.sealed {
            return false;
        }
        state.value = Some(value);
        true
    }

    /// Clone of the current output.
    pub fn latest(&self) -> Option<T>
    where
        T: Clone,
    {
        self.lock().value.clone()
    }

    /// Freezes the slot and takes its output. Later publications are ignored.
    pub fn seal(&self) -> Option<T> {
        let mut state = self.lock();
        state.sealed = true;
        state.value.take()
    }

    /// True once the slot was sealed.
    pub fn is_sealed(&self) -> bool {
        self.lock().sealed
    }
}

/// Runs operations under a hard wall-clock budget.
#[derive(Debug, Clone, Copy)]
pub struct TimeBoxedExecutor {
    grace: Duration,
}

impl Default for TimeBoxedExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE)
    }
}

impl TimeBoxedExecutor {
    /// An executor giving workers `grace` to stop after the signal.
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }

    /// Grace period given to workers.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Runs `operation` on a new worker for at most `budget`.
    ///
    /// Returns the last output the operation published before the budget expired (or before it
    /// returned, if it finished early), `None` if it published nothing. The worker has exited
    /// when this returns `Ok`.
    ///
    /// # Errors
    /// - [`Error::TimeoutUnrecoverable`] if the worker is still running `grace` after the stop
    ///   signal. The worker is detached and must be considered lost.
    /// - [`Error::Operation`] if the operation returned an error.
    /// - [`Error::WorkerPanicked`] if the operation panicked.
    /// - [`Error::Spawn`] if the worker thread could not be created.
    #[instrument(skip_all, fields(budget = ?budget))]
    pub fn run<T, F>(&self, budget: Duration, operation: F) -> Result<Option<T>>
    where
        T: Send + 'static,
        F: FnOnce(&StopToken, &OutputSlot<T>) -> anyhow::Result<()> + Send + 'static,
    {
        let stop = StopToken::new();
        let slot = OutputSlot::new();
        let (done_tx, done_rx) = mpsc::channel();

        let worker = {
            let stop = stop.clone();
            let slot = slot.clone();
            thread::Builder::new()
                .name("time-boxed-worker".to_string())
                .spawn(move || {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| operation(&stop, &slot)));
                    let _ = done_tx.send(outcome);
                })?
        };

        let early = done_rx.recv_timeout(budget);

        // freeze the answer first, so nothing published after the deadline can leak out
        let output = slot.seal();
        stop.stop();

        let outcome = match early {
            Ok(outcome) => {
                trace!("operation returned before the deadline");
                outcome
            }
            Err(RecvTimeoutError::Timeout) => match done_rx.recv_timeout(self.grace) {
                Ok(outcome) => outcome,
                Err(RecvTimeoutError::Timeout) => {
                    error!(grace = ?self.grace, "worker ignored the stop signal, detaching it");
                    drop(worker);
                    return Err(Error::TimeoutUnrecoverable { grace: self.grace });
                }
                Err(RecvTimeoutError::Disconnected) => return Err(Error::WorkerPanicked),
            },
            Err(RecvTimeoutError::Disconnected) => return Err(Error::WorkerPanicked),
        };

        // the outcome was sent: only the thread epilogue is left
        if worker.join().is_err() {
            return Err(Error::WorkerPanicked);
        }

        match outcome {
            Ok(Ok(())) => Ok(output),
            Ok(Err(err)) => {
                warn!("time-boxed operation failed: {err:#}");
                Err(Error::Operation(err))
            }
            Err(_) => Err(Error::WorkerPanicked),
        }
    }
}

/// A strategy that keeps refining its actions until told to stop.
pub trait AnytimeStrategy<G: GameEngine>: Send + 'static {
    /// Searches the actions of the current turn.
    ///
    /// Should publish an answer in `best` as early as possible, improve it while `stop` is not
    /// raised, and return promptly once it is.
    fn search(
        &mut self,
        stop: &StopToken,
        best: &OutputSlot<Vec<G::Action>>,
    ) -> anyhow::Result<()>;

    /// Forgets anything learned during a previous match.
    fn reset(&mut self) {}

    /// True if the strategy learns during a match.
    fn is_stateful(&self) -> bool {
        false
    }
}

/// A [`Strategy`] answering every turn within a fixed budget.
pub struct TimeBoxedStrategy<S> {
    inner: Arc<Mutex<S>>,
    budget: Duration,
    executor: TimeBoxedExecutor,
}

impl<S> TimeBoxedStrategy<S> {
    /// Bounds every turn of `strategy` to `budget`.
    pub fn new(strategy: S, budget: Duration, executor: TimeBoxedExecutor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(strategy)),
            budget,
            executor,
        }
    }

    /// Per-turn budget.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// `None` while a detached worker still holds the strategy.
    fn try_lock(&self) -> Option<MutexGuard<'_, S>> {
        match self.inner.try_lock() {
            Ok(strategy) => Some(strategy),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => {
                warn!("strategy is still held by a detached worker");
                None
            }
        }
    }
}

impl<G, S> Strategy<G> for TimeBoxedStrategy<S>
where
    G: GameEngine,
    S: AnytimeStrategy<G>,
{
    fn play(&mut self) -> anyhow::Result<Vec<G::Action>> {
        let inner = self.inner.clone();
        let output = self.executor.run(self.budget, move |stop, best| {
            let mut strategy = inner
                .lock()
                .map_err(|_| anyhow!("strategy poisoned by a previous panic"))?;
            strategy.search(stop, best)
        })?;
        output.ok_or_else(|| Error::NoOutput.into())
    }

    /// Skipped if a worker detached by an unrecoverable timeout still runs the strategy.
    fn reset(&mut self) {
        if let Some(mut strategy) = self.try_lock() {
            strategy.reset();
        }
    }

    fn is_stateful(&self) -> bool {
        self.try_lock().is_some_and(|strategy| strategy.is_stateful())
    }
}

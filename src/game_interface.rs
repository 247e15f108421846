//! Module defining traits that need to be implemented to run a contest
//!
//! A contest only ever sees games and strategies through this module: a [`GameEngine`] built by a
//! [`GameFactory`], and [`Strategy`] instances built by a [`StrategyFactory`] from a
//! [`StrategyConfig`] and an [`InputSource`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::bail;
use serde_json::Value;

/// One of the two seats of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// First seat.
    Player,
    /// Second seat.
    Opponent,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "player"),
            Side::Opponent => write!(f, "opponent"),
        }
    }
}

/// Status reported by a [`GameEngine`] after each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    /// The player side won.
    Player,
    /// The opponent side won.
    Opponent,
    /// The match is not over yet.
    Ongoing,
}

impl Winner {
    /// The winning side, or `None` while the match is ongoing.
    pub fn side(self) -> Option<Side> {
        match self {
            Winner::Player => Some(Side::Player),
            Winner::Opponent => Some(Side::Opponent),
            Winner::Ongoing => None,
        }
    }
}

/// What the game should implement
///
/// A turn-based state machine played simultaneously by two sides.
pub trait GameEngine: Send {
    /// Per-turn value exposed to a strategy. Cloned on every read.
    type Input: Send + Clone + 'static;
    /// What should be returned by strategies to make the game progress.
    type Action: Send + 'static;

    /// Computes the very first state (build the board, place the players, ...).
    ///
    /// # Error
    /// Returned when the engine cannot be set up. The match is aborted.
    fn start(&mut self) -> anyhow::Result<()>;

    /// Computes the next state from both sides' actions.
    ///
    /// # Error
    /// Returned when the actions cannot be applied. The match is aborted.
    fn run(
        &mut self,
        player_actions: &[Self::Action],
        opponent_actions: &[Self::Action],
    ) -> anyhow::Result<()>;

    /// The match winner, [`Winner::Ongoing`] otherwise.
    fn winner(&self) -> Winner;

    /// Current player score
    fn player_score(&self) -> i64;

    /// Current opponent score
    fn opponent_score(&self) -> i64;

    /// Number of executed rounds
    fn rounds(&self) -> u32;

    /// The input given to the player strategy for the coming turn.
    fn player_input(&self) -> Self::Input;

    /// The input given to the opponent strategy for the coming turn.
    fn opponent_input(&self) -> Self::Input;
}

/// What will be given to the contest to allow it to create games
pub trait GameFactory<G: GameEngine>: Send + Sync {
    /// Returns a fresh, not yet started, game engine
    fn new_game(&self) -> anyhow::Result<G>;
}

impl<G, F> GameFactory<G> for F
where
    G: GameEngine,
    F: Fn() -> anyhow::Result<G> + Send + Sync,
{
    fn new_game(&self) -> anyhow::Result<G> {
        self()
    }
}

/// A named game engine factory. A contest plays every pairing once per variant.
pub struct EngineVariant<G: GameEngine> {
    name: String,
    factory: Arc<dyn GameFactory<G>>,
}

impl<G: GameEngine> EngineVariant<G> {
    /// Wrap `factory` under `name`.
    pub fn new(name: impl Into<String>, factory: impl GameFactory<G> + 'static) -> Self {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// Name of the variant.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared handle on the factory.
    pub fn factory(&self) -> Arc<dyn GameFactory<G>> {
        self.factory.clone()
    }
}

impl<G: GameEngine> Clone for EngineVariant<G> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl<G: GameEngine> fmt::Debug for EngineVariant<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineVariant")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Creates the two ends of a per-side input channel.
pub fn input_channel<I>() -> (InputFeed<I>, InputSource<I>) {
    let cell = Arc::new(Mutex::new(InputCell {
        current: None,
        closed: false,
    }));
    (InputFeed { cell: cell.clone() }, InputSource { cell })
}

#[derive(Debug)]
struct InputCell<I> {
    current: Option<I>,
    closed: bool,
}

fn lock<I>(cell: &Mutex<InputCell<I>>) -> MutexGuard<'_, InputCell<I>> {
    cell.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Match-side end of an input channel: exposes what the engine shows one side this turn.
///
/// Dropping the feed ends the match for the reading side.
#[derive(Debug)]
pub struct InputFeed<I> {
    cell: Arc<Mutex<InputCell<I>>>,
}

impl<I> InputFeed<I> {
    /// Replaces the input exposed to the strategy. Any input not read yet is discarded.
    pub fn push(&self, input: I) {
        lock(&self.cell).current = Some(input);
    }
}

impl<I> Drop for InputFeed<I> {
    fn drop(&mut self) {
        let mut cell = lock(&self.cell);
        cell.closed = true;
        cell.current = None;
    }
}

/// Strategy-side end of an input channel.
///
/// Reads never consume: every `read()` during a turn returns that turn's input.
#[derive(Debug)]
pub struct InputSource<I> {
    cell: Arc<Mutex<InputCell<I>>>,
}

impl<I: Clone> InputSource<I> {
    /// Reads the input the engine currently exposes for this side.
    ///
    /// # Error
    /// Returned before the first turn, or once the match is over.
    pub fn read(&self) -> anyhow::Result<I> {
        let cell = lock(&self.cell);
        match &cell.current {
            Some(input) => Ok(input.clone()),
            None if cell.closed => bail!("match is over, no more input"),
            None => bail!("no input exposed yet"),
        }
    }

    /// Current input, if the match exposes one.
    pub fn try_read(&self) -> Option<I> {
        lock(&self.cell).current.clone()
    }
}

/// Immutable configuration a strategy is built from.
///
/// Parameters are arbitrary JSON values keyed by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrategyConfig {
    name: String,
    params: BTreeMap<String, Value>,
}

impl StrategyConfig {
    /// An empty configuration named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) a parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Name of the configured competitor.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All parameters.
    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    /// Raw parameter value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Parameter as an integer.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Parameter as a float.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Parameter as a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Parameter as a boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }
}

impl fmt::Display for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.params.is_empty() {
            let params = self
                .params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, " {{{params}}}")?;
        }
        Ok(())
    }
}

/// What the AI should implement
pub trait Strategy<G: GameEngine>: Send {
    /// Computes the actions of the current turn.
    ///
    /// Per-turn inputs are read from the [`InputSource`] the strategy was built with.
    fn play(&mut self) -> anyhow::Result<Vec<G::Action>>;

    /// Forgets anything learned during a previous match.
    ///
    /// Only called when [`is_stateful`](Self::is_stateful) returns true.
    fn reset(&mut self) {}

    /// True if the strategy learns during a match and must be reset before the next one.
    fn is_stateful(&self) -> bool {
        false
    }
}

/// Builds ready-to-use strategies
pub trait StrategyFactory<G: GameEngine>: Send + Sync {
    /// Returns a strategy configured by `config`, reading its inputs from `input`
    fn new_strategy(
        &self,
        config: &StrategyConfig,
        input: InputSource<G::Input>,
    ) -> anyhow::Result<Box<dyn Strategy<G>>>;
}

impl<G, F> StrategyFactory<G> for F
where
    G: GameEngine,
    F: Fn(&StrategyConfig, InputSource<G::Input>) -> anyhow::Result<Box<dyn Strategy<G>>>
        + Send
        + Sync,
{
    fn new_strategy(
        &self,
        config: &StrategyConfig,
        input: InputSource<G::Input>,
    ) -> anyhow::Result<Box<dyn Strategy<G>>> {
        self(config, input)
    }
}

/// A contest participant: a configuration and the factory turning it into strategies.
///
/// One competitor yields a new, semantically equivalent, strategy instance per match.
pub struct Competitor<G: GameEngine> {
    config: Arc<StrategyConfig>,
    factory: Arc<dyn StrategyFactory<G>>,
}

impl<G: GameEngine> Competitor<G> {
    /// Binds `config` to `factory`.
    pub fn new(config: StrategyConfig, factory: impl StrategyFactory<G> + 'static) -> Self {
        Self {
            config: Arc::new(config),
            factory: Arc::new(factory),
        }
    }

    /// Competitor name, taken from its configuration.
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// Configuration shared by every instance of this competitor.
    pub fn config(&self) -> &Arc<StrategyConfig> {
        &self.config
    }

    /// Builds a fresh strategy reading from `input`.
    pub fn build(&self, input: InputSource<G::Input>) -> anyhow::Result<Box<dyn Strategy<G>>> {
        self.factory.new_strategy(&self.config, input)
    }
}

impl<G: GameEngine> Clone for Competitor<G> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl<G: GameEngine> fmt::Debug for Competitor<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Competitor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

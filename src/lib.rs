//! # Ai Contest
//!
//! A modular Rust crate for evaluating game-playing strategies via round-robin contests.
//!
//! It provides:
//! - Match execution between two strategies on a turn-based [`GameEngine`](crate::game_interface::GameEngine)
//! - Games: repeated matches between the same pair, summarized by averages and a majority winner
//! - Round-robin contests over several engine variants, ranked by victories (`Contest`)
//! - Per-turn wall-clock budgets for anytime strategies (`TimeBoxedStrategy`)
//! - An adaptive timer predicting whether one more iteration fits in a budget
//!
//! Games run on one worker pool and their matches on another, so a contest keeps every worker
//! busy while aggregating results in a deterministic order.
//!
//! # Documentation Overview
//!
//! - For implementing custom games and strategies, check out the [`GameEngine`], [`GameFactory`],
//!   [`Strategy`] and [`StrategyFactory`] traits.
//! - For running a contest and reading its ranking, see the [`contest`] and [`ranking`] modules.
//! - For configuring the contest, see [`Settings`](crate::configuration::Settings).
//! - For bounding the thinking time of a strategy, see the [`time_box`] and [`timer`] modules.
//!
//! [`GameEngine`]: crate::game_interface::GameEngine
//! [`GameFactory`]: crate::game_interface::GameFactory
//! [`Strategy`]: crate::game_interface::Strategy
//! [`StrategyFactory`]: crate::game_interface::StrategyFactory
//!
//! # Usage Example
//!
//! Below is a minimal contest where each side adds numbers to its score and the first to reach
//! 10 wins:
//!
//! ```no_run
//! use ai_contest::anyhow;
//! use ai_contest::prelude::*;
//!
//! #[derive(Default)]
//! struct Race {
//!     scores: [i64; 2],
//!     rounds: u32,
//! }
//!
//! impl GameEngine for Race {
//!     type Input = i64;
//!     type Action = i64;
//!
//!     fn start(&mut self) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//!
//!     fn run(&mut self, player: &[i64], opponent: &[i64]) -> anyhow::Result<()> {
//!         self.scores[0] += player.iter().sum::<i64>();
//!         self.scores[1] += opponent.iter().sum::<i64>();
//!         self.rounds += 1;
//!         Ok(())
//!     }
//!
//!     fn winner(&self) -> Winner {
//!         match self.scores {
//!             [p, o] if p >= 10 && p >= o => Winner::Player,
//!             [_, o] if o >= 10 => Winner::Opponent,
//!             _ => Winner::Ongoing,
//!         }
//!     }
//!
//!     fn player_score(&self) -> i64 {
//!         self.scores[0]
//!     }
//!
//!     fn opponent_score(&self) -> i64 {
//!         self.scores[1]
//!     }
//!
//!     fn rounds(&self) -> u32 {
//!         self.rounds
//!     }
//!
//!     fn player_input(&self) -> i64 {
//!         self.scores[0]
//!     }
//!
//!     fn opponent_input(&self) -> i64 {
//!         self.scores[1]
//!     }
//! }
//!
//! struct Stepper {
//!     step: i64,
//!     input: InputSource<i64>,
//! }
//!
//! impl Strategy<Race> for Stepper {
//!     fn play(&mut self) -> anyhow::Result<Vec<i64>> {
//!         let _my_score = self.input.read()?;
//!         Ok(vec![self.step])
//!     }
//! }
//!
//! fn stepper(
//!     config: &StrategyConfig,
//!     input: InputSource<i64>,
//! ) -> anyhow::Result<Box<dyn Strategy<Race>>> {
//!     let step = config.get_i64("step").unwrap_or(1);
//!     Ok(Box::new(Stepper { step, input }))
//! }
//!
//! fn new_race() -> anyhow::Result<Race> {
//!     Ok(Race::default())
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let competitors: Vec<Competitor<Race>> = (1..=3)
//!         .map(|step| {
//!             let config = StrategyConfig::new(format!("step-{step}")).with_param("step", step);
//!             Competitor::new(config, stepper)
//!         })
//!         .collect();
//!     let engines = vec![EngineVariant::new("race", new_race)];
//!
//!     let settings = Settings::from_env().with_number_of_matches(3);
//!     settings.validate()?;
//!     let contest = Contest::from_settings(competitors, engines, &settings)?;
//!
//!     // 1- step-3 {step=3}: victories=2, ...
//!     print!("{}", contest.run()?);
//!     Ok(())
//! }
//! ```
#![warn(missing_docs)]

pub mod configuration;
pub mod contest;
pub mod error;
pub mod game;
pub mod game_interface;
mod logger;
pub mod match_runner;
pub mod pool;
pub mod ranking;
pub mod round_robin;
pub mod time_box;
pub mod timer;

pub use anyhow;
pub use error::{Error, Result};
pub use logger::init_logger;

/// Commonly used types and traits for quick access.
///
/// Import this prelude to get started easily:
/// ```rust
/// use ai_contest::prelude::*;
/// ```
///
/// Includes:
/// - [`Settings`](crate::configuration::Settings)
/// - [`Contest`](crate::contest::Contest) and its [`ContestResult`](crate::ranking::ContestResult)
/// - every trait and type needed to implement a game and its strategies
/// - the [`time_box`](crate::time_box) building blocks
pub mod prelude {
    pub use crate::configuration::Settings;
    pub use crate::contest::Contest;
    pub use crate::error::{Error, Result};
    pub use crate::game::{Game, GameOutcome, GameResult};
    pub use crate::game_interface::{
        Competitor, EngineVariant, GameEngine, GameFactory, InputSource, Side, Strategy,
        StrategyConfig, StrategyFactory, Winner,
    };
    pub use crate::match_runner::{Match, MatchResult};
    pub use crate::pool::WorkerPool;
    pub use crate::ranking::{Classification, ContestResult};
    pub use crate::time_box::{
        AnytimeStrategy, OutputSlot, StopToken, TimeBoxedExecutor, TimeBoxedStrategy,
    };
    pub use crate::timer::AdaptiveTimer;
}

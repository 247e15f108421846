//! A single play-through between two strategies on one game engine.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, instrument, trace, warn};

use crate::error::{Error, Result};
use crate::game_interface::{
    input_channel, Competitor, GameEngine, GameFactory, InputFeed, Side, Strategy,
};

/// Lifecycle of a [`Match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// Built, engine not initialized yet.
    Created,
    /// Engine initialized, no turn played.
    Started,
    /// Turns are being played.
    Running,
    /// A result was produced.
    Finished,
    /// A strategy or the engine failed.
    Aborted,
}

/// Final scores of one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    player_score: i64,
    opponent_score: i64,
    rounds: u32,
    winner: Side,
}

impl MatchResult {
    pub(crate) fn new(player_score: i64, opponent_score: i64, rounds: u32, winner: Side) -> Self {
        Self {
            player_score,
            opponent_score,
            rounds,
            winner,
        }
    }

    /// Final player score.
    pub fn player_score(&self) -> i64 {
        self.player_score
    }

    /// Final opponent score.
    pub fn opponent_score(&self) -> i64 {
        self.opponent_score
    }

    /// Number of rounds played.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Winning side.
    pub fn winner(&self) -> Side {
        self.winner
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} in {} rounds, {} wins",
            self.player_score, self.opponent_score, self.rounds, self.winner
        )
    }
}

/// One strategy pair bound to one engine instance.
///
/// The match owns its engine and both strategies exclusively. It can be played once.
pub struct Match<G: GameEngine> {
    engine: G,
    player: Box<dyn Strategy<G>>,
    opponent: Box<dyn Strategy<G>>,
    player_feed: InputFeed<G::Input>,
    opponent_feed: InputFeed<G::Input>,
    player_stateful: bool,
    opponent_stateful: bool,
    state: MatchState,
}

impl<G: GameEngine> Match<G> {
    /// Builds a fresh engine from `factory` and a fresh strategy for each competitor.
    ///
    /// # Errors
    /// [`Error::Engine`] or [`Error::Strategy`] if a factory fails.
    pub fn new(
        player: &Competitor<G>,
        opponent: &Competitor<G>,
        factory: &dyn GameFactory<G>,
    ) -> Result<Self> {
        let engine = factory.new_game().map_err(Error::Engine)?;

        let (player_feed, player_input) = input_channel();
        let (opponent_feed, opponent_input) = input_channel();
        let player = player.build(player_input).map_err(|source| Error::Strategy {
            side: Side::Player,
            source,
        })?;
        let opponent = opponent
            .build(opponent_input)
            .map_err(|source| Error::Strategy {
                side: Side::Opponent,
                source,
            })?;

        Ok(Self {
            engine,
            player_stateful: player.is_stateful(),
            opponent_stateful: opponent.is_stateful(),
            player,
            opponent,
            player_feed,
            opponent_feed,
            state: MatchState::Created,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MatchState {
        self.state
    }

    /// Clears learned state of stateful strategies and initializes the engine.
    ///
    /// # Errors
    /// [`Error::Replay`] unless the match was just created, [`Error::Engine`] if the engine
    /// cannot start.
    pub fn start(&mut self) -> Result<()> {
        if self.state != MatchState::Created {
            return Err(Error::Replay);
        }
        if self.player_stateful {
            self.player.reset();
        }
        if self.opponent_stateful {
            self.opponent.reset();
        }
        if let Err(err) = self.engine.start() {
            self.state = MatchState::Aborted;
            return Err(Error::Engine(err));
        }
        self.state = MatchState::Started;
        Ok(())
    }

    /// Plays turns until the engine reports a winner.
    ///
    /// Starts the match first if needed.
    ///
    /// # Errors
    /// [`Error::Replay`] if the match already finished or aborted. Any strategy or engine failure
    /// aborts the match and is returned as is. A panic aborts it with [`Error::MatchPanicked`].
    #[instrument(skip_all)]
    pub fn play(&mut self) -> Result<MatchResult> {
        match self.state {
            MatchState::Created => self.start()?,
            MatchState::Started => {}
            MatchState::Running | MatchState::Finished | MatchState::Aborted => {
                return Err(Error::Replay)
            }
        }

        self.state = MatchState::Running;
        let turns = panic::catch_unwind(AssertUnwindSafe(|| self.run_turns()))
            .unwrap_or_else(|payload| Err(Error::MatchPanicked(panic_message(&*payload))));
        match turns {
            Ok(result) => {
                self.state = MatchState::Finished;
                debug!(%result, "match finished");
                Ok(result)
            }
            Err(err) => {
                self.state = MatchState::Aborted;
                warn!("match aborted: {err}");
                Err(err)
            }
        }
    }

    fn run_turns(&mut self) -> Result<MatchResult> {
        loop {
            self.player_feed.push(self.engine.player_input());
            self.opponent_feed.push(self.engine.opponent_input());

            let player_actions = self
                .player
                .play()
                .map_err(|err| strategy_error(Side::Player, err))?;
            let opponent_actions = self
                .opponent
                .play()
                .map_err(|err| strategy_error(Side::Opponent, err))?;

            self.engine
                .run(&player_actions, &opponent_actions)
                .map_err(Error::Engine)?;

            let winner = self.engine.winner();
            trace!(round = self.engine.rounds(), ?winner, "turn played");

            if let Some(side) = winner.side() {
                return Ok(MatchResult::new(
                    self.engine.player_score(),
                    self.engine.opponent_score(),
                    self.engine.rounds(),
                    side,
                ));
            }
        }
    }
}

/// Errors raised by this crate (e.g. a time-boxed strategy timing out) are surfaced unchanged.
fn strategy_error(side: Side, err: anyhow::Error) -> Error {
    match err.downcast::<Error>() {
        Ok(err) => err,
        Err(source) => Error::Strategy { side, source },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

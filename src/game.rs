//! Repeated matches between a fixed strategy pair.
//!
//! Playing several matches is useful when strategies or engines are not deterministic; otherwise
//! a single match is enough.

use std::fmt;
use std::sync::Arc;

use tracing::{info, instrument, trace};

use crate::error::{Error, Result};
use crate::game_interface::{Competitor, GameEngine, GameFactory, Side};
use crate::match_runner::{Match, MatchResult};
use crate::pool::WorkerPool;

/// Who won the majority of the matches of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// The player won strictly more matches.
    Player,
    /// The opponent won strictly more matches.
    Opponent,
    /// Both sides won the same number of matches.
    Draw,
}

impl GameOutcome {
    /// The winning side, `None` on a draw.
    pub fn winner(self) -> Option<Side> {
        match self {
            GameOutcome::Player => Some(Side::Player),
            GameOutcome::Opponent => Some(Side::Opponent),
            GameOutcome::Draw => None,
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Player => write!(f, "player"),
            GameOutcome::Opponent => write!(f, "opponent"),
            GameOutcome::Draw => write!(f, "draw"),
        }
    }
}

/// Summary of all matches of one game, kept in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct GameResult {
    match_results: Vec<MatchResult>,
}

impl GameResult {
    /// # Errors
    /// [`Error::NoMatches`] if `match_results` is empty: averages and winner would be undefined.
    pub(crate) fn new(match_results: Vec<MatchResult>) -> Result<Self> {
        if match_results.is_empty() {
            return Err(Error::NoMatches);
        }
        Ok(Self { match_results })
    }

    /// Every match result, in submission order.
    pub fn match_results(&self) -> &[MatchResult] {
        &self.match_results
    }

    /// Number of matches played.
    pub fn number_of_matches(&self) -> usize {
        self.match_results.len()
    }

    fn mean(&self, value: impl Fn(&MatchResult) -> f64) -> f64 {
        self.match_results.iter().map(value).sum::<f64>() / self.match_results.len() as f64
    }

    fn wins(&self, side: Side) -> usize {
        self.match_results
            .iter()
            .filter(|result| result.winner() == side)
            .count()
    }

    /// Mean final player score.
    pub fn average_player_score(&self) -> f64 {
        self.mean(|result| result.player_score() as f64)
    }

    /// Mean final opponent score.
    pub fn average_opponent_score(&self) -> f64 {
        self.mean(|result| result.opponent_score() as f64)
    }

    /// Mean number of rounds.
    pub fn average_rounds(&self) -> f64 {
        self.mean(|result| f64::from(result.rounds()))
    }

    /// Matches won by the player.
    pub fn player_wins(&self) -> usize {
        self.wins(Side::Player)
    }

    /// Matches won by the opponent.
    pub fn opponent_wins(&self) -> usize {
        self.wins(Side::Opponent)
    }

    /// Share of matches won by the player.
    pub fn player_win_rate(&self) -> f64 {
        self.player_wins() as f64 / self.match_results.len() as f64
    }

    /// Share of matches won by the opponent.
    pub fn opponent_win_rate(&self) -> f64 {
        self.opponent_wins() as f64 / self.match_results.len() as f64
    }

    /// Average player score minus average opponent score.
    pub fn score_margin(&self) -> f64 {
        self.average_player_score() - self.average_opponent_score()
    }

    /// Side with the strict majority of match wins, [`GameOutcome::Draw`] on an even split.
    pub fn outcome(&self) -> GameOutcome {
        let player = self.player_wins();
        let opponent = self.opponent_wins();
        match player.cmp(&opponent) {
            std::cmp::Ordering::Greater => GameOutcome::Player,
            std::cmp::Ordering::Less => GameOutcome::Opponent,
            std::cmp::Ordering::Equal => GameOutcome::Draw,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "averagePlayerScore={:.2}, averageOpponentScore={:.2}, averageRounds={:.2}, \
             playerWinRate={:.3}, numberOfMatches={}, winner={}",
            self.average_player_score(),
            self.average_opponent_score(),
            self.average_rounds(),
            self.player_win_rate(),
            self.number_of_matches(),
            self.outcome()
        )
    }
}

/// A batch of independent matches between a fixed strategy pair.
pub struct Game<G: GameEngine> {
    player: Competitor<G>,
    opponent: Competitor<G>,
    factory: Arc<dyn GameFactory<G>>,
    number_of_matches: usize,
    pool: WorkerPool,
}

impl<G: GameEngine> Game<G> {
    /// A game of `number_of_matches` matches submitted to `pool`.
    ///
    /// # Errors
    /// [`Error::NoMatches`] if `number_of_matches` is 0.
    pub fn new(
        player: Competitor<G>,
        opponent: Competitor<G>,
        factory: Arc<dyn GameFactory<G>>,
        number_of_matches: usize,
        pool: WorkerPool,
    ) -> Result<Self> {
        if number_of_matches == 0 {
            return Err(Error::NoMatches);
        }
        Ok(Self {
            player,
            opponent,
            factory,
            number_of_matches,
            pool,
        })
    }

    /// A game with a dedicated pool running all its matches at once.
    ///
    /// # Errors
    /// [`Error::NoMatches`] if `number_of_matches` is 0, [`Error::ThreadPool`] if the pool cannot
    /// be built.
    pub fn with_own_pool(
        player: Competitor<G>,
        opponent: Competitor<G>,
        factory: Arc<dyn GameFactory<G>>,
        number_of_matches: usize,
    ) -> Result<Self> {
        if number_of_matches == 0 {
            return Err(Error::NoMatches);
        }
        let pool = WorkerPool::new("match", number_of_matches)?;
        Self::new(player, opponent, factory, number_of_matches, pool)
    }

    /// Number of matches this game plays.
    pub fn number_of_matches(&self) -> usize {
        self.number_of_matches
    }

    /// The player side.
    pub fn player(&self) -> &Competitor<G> {
        &self.player
    }

    /// The opponent side.
    pub fn opponent(&self) -> &Competitor<G> {
        &self.opponent
    }

    /// Plays every match on fresh engine and strategy instances and summarizes them.
    ///
    /// # Errors
    /// The first match failure, unchanged. No partial result is produced.
    #[instrument(skip_all, fields(player = self.player.name(), opponent = self.opponent.name()))]
    pub fn run(&self) -> Result<GameResult> {
        let indexes = (0..self.number_of_matches).collect();
        let match_results = self.pool.try_map(indexes, |index| {
            trace!(index, "match submitted");
            Match::new(&self.player, &self.opponent, self.factory.as_ref())?.play()
        })?;

        let result = GameResult::new(match_results)?;
        info!(%result, "game finished");
        Ok(result)
    }
}

//! Contest scores and final ranking.
//!
//! Each game yields one victory to the side that won the majority of its matches, or one draw to
//! both sides on an even split. Competitors are ranked by victories, then by cumulated score
//! margin, then by registration order.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::game::{GameOutcome, GameResult};
use crate::game_interface::StrategyConfig;
use crate::round_robin::Pairing;

/// Running totals of one competitor, accumulated game after game.
#[derive(Debug, Clone)]
pub(crate) struct Score {
    index: usize,
    config: Arc<StrategyConfig>,
    victory_count: u32,
    draw_count: u32,
    games_played: u32,
    score_margin: f64,
}

impl Score {
    pub(crate) fn new(index: usize, config: Arc<StrategyConfig>) -> Self {
        Self {
            index,
            config,
            victory_count: 0,
            draw_count: 0,
            games_played: 0,
            score_margin: 0.0,
        }
    }

    /// Credits one game seen from the player seat.
    pub(crate) fn record_as_player(&mut self, result: &GameResult) {
        self.record(result.outcome(), GameOutcome::Player, result.score_margin());
    }

    /// Credits one game seen from the opponent seat.
    pub(crate) fn record_as_opponent(&mut self, result: &GameResult) {
        self.record(
            result.outcome(),
            GameOutcome::Opponent,
            -result.score_margin(),
        );
    }

    fn record(&mut self, outcome: GameOutcome, seat: GameOutcome, margin: f64) {
        self.games_played += 1;
        self.score_margin += margin;
        if outcome == seat {
            self.victory_count += 1;
        } else if outcome == GameOutcome::Draw {
            self.draw_count += 1;
        }
    }
}

/// Final standing of one competitor.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    index: usize,
    config: Arc<StrategyConfig>,
    victory_count: u32,
    draw_count: u32,
    games_played: u32,
    win_rate: f64,
    score_margin: f64,
}

impl Classification {
    /// `reachable` is the number of games each competitor plays, `(K-1) × V`.
    pub(crate) fn new(score: Score, reachable: usize) -> Self {
        let win_rate = if reachable == 0 {
            0.0
        } else {
            f64::from(score.victory_count) / reachable as f64
        };
        Self {
            index: score.index,
            config: score.config,
            victory_count: score.victory_count,
            draw_count: score.draw_count,
            games_played: score.games_played,
            win_rate,
            score_margin: score.score_margin,
        }
    }

    /// Position of the competitor in the list given to the contest.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Competitor name.
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// Competitor configuration.
    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Games won.
    pub fn victory_count(&self) -> u32 {
        self.victory_count
    }

    /// Games drawn.
    pub fn draw_count(&self) -> u32 {
        self.draw_count
    }

    /// Games lost.
    pub fn defeat_count(&self) -> u32 {
        self.games_played - self.victory_count - self.draw_count
    }

    /// Games played.
    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    /// Victories over the number of games the competitor played.
    pub fn win_rate(&self) -> f64 {
        self.win_rate
    }

    /// Sum over all games of the competitor's average score minus its opponent's.
    pub fn score_margin(&self) -> f64 {
        self.score_margin
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: victories={}, draws={}, winRate={:.3}, margin={:+.2}",
            self.config, self.victory_count, self.draw_count, self.win_rate, self.score_margin
        )
    }
}

/// Victories descending, then score margin descending, then registration order.
fn rank(a: &Classification, b: &Classification) -> Ordering {
    b.victory_count
        .cmp(&a.victory_count)
        .then_with(|| b.score_margin.total_cmp(&a.score_margin))
        .then_with(|| a.index.cmp(&b.index))
}

/// One game of the contest and its result.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pairing: Pairing,
    variant: String,
    player: String,
    opponent: String,
    result: GameResult,
}

impl GameRecord {
    pub(crate) fn new(
        pairing: Pairing,
        variant: String,
        player: String,
        opponent: String,
        result: GameResult,
    ) -> Self {
        Self {
            pairing,
            variant,
            player,
            opponent,
            result,
        }
    }

    /// Competitor and variant indexes.
    pub fn pairing(&self) -> Pairing {
        self.pairing
    }

    /// Engine variant name.
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Name of the competitor in the player seat.
    pub fn player(&self) -> &str {
        &self.player
    }

    /// Name of the competitor in the opponent seat.
    pub fn opponent(&self) -> &str {
        &self.opponent
    }

    /// Summary of the matches.
    pub fn result(&self) -> &GameResult {
        &self.result
    }
}

impl fmt::Display for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vs {} on {}: {}",
            self.player, self.opponent, self.variant, self.result
        )
    }
}

/// Outcome of a whole contest.
#[derive(Debug, Clone, PartialEq)]
pub struct ContestResult {
    classifications: Vec<Classification>,
    games: Vec<GameRecord>,
}

impl ContestResult {
    pub(crate) fn new(scores: Vec<Score>, games: Vec<GameRecord>, reachable: usize) -> Self {
        let mut classifications: Vec<_> = scores
            .into_iter()
            .map(|score| Classification::new(score, reachable))
            .collect();
        classifications.sort_by(rank);
        Self {
            classifications,
            games,
        }
    }

    /// Every competitor, best first.
    pub fn classifications(&self) -> &[Classification] {
        &self.classifications
    }

    /// Every game, in pairing order.
    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    /// Best ranked competitor.
    pub fn winner(&self) -> Option<&Classification> {
        self.classifications.first()
    }

    /// Standing of the competitor named `name`.
    pub fn get(&self, name: &str) -> Option<&Classification> {
        self.classifications.iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for ContestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, classification) in self.classifications.iter().enumerate() {
            writeln!(f, "{}- {classification}", position + 1)?;
        }
        Ok(())
    }
}

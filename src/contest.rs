//! Round-robin contest between competitors, over one or more engine variants.
//!
//! A [`Contest`] plays one [`Game`] per [pairing](crate::round_robin::pairings). Games are
//! submitted to the game pool and their matches to the match pool, so games of different pairings
//! overlap. Results are aggregated in pairing order once every game has finished, which keeps the
//! ranking independent of completion order.
//!
//! Any failure in any match fails the whole contest: there are no partial rankings.

use tracing::{info, instrument, warn};

use crate::configuration::Settings;
use crate::error::{Error, Result};
use crate::game::{Game, GameResult};
use crate::game_interface::{Competitor, EngineVariant, GameEngine};
use crate::logger::init_logger;
use crate::pool::WorkerPool;
use crate::ranking::{ContestResult, GameRecord, Score};
use crate::round_robin::{self, Pairing};

/// A round-robin contest, ready to run.
pub struct Contest<G: GameEngine> {
    competitors: Vec<Competitor<G>>,
    engines: Vec<EngineVariant<G>>,
    number_of_matches: usize,
    game_pool: WorkerPool,
    match_pool: WorkerPool,
    verbose: bool,
}

impl<G: GameEngine> Contest<G> {
    /// A contest where each pairing plays `number_of_matches` matches on every variant.
    ///
    /// # Errors
    /// - [`Error::InvalidTournamentSize`] with fewer than two competitors.
    /// - [`Error::NoEngineVariants`] without any engine variant.
    /// - [`Error::NoMatches`] if `number_of_matches` is 0.
    pub fn new(
        competitors: Vec<Competitor<G>>,
        engines: Vec<EngineVariant<G>>,
        number_of_matches: usize,
        game_pool: WorkerPool,
        match_pool: WorkerPool,
    ) -> Result<Self> {
        if competitors.len() < 2 {
            return Err(Error::InvalidTournamentSize(competitors.len()));
        }
        if engines.is_empty() {
            return Err(Error::NoEngineVariants);
        }
        if number_of_matches == 0 {
            return Err(Error::NoMatches);
        }
        Ok(Self {
            competitors,
            engines,
            number_of_matches,
            game_pool,
            match_pool,
            verbose: false,
        })
    }

    /// A contest built from `settings`: pools, number of matches, verbosity and file logging.
    ///
    /// A log file that cannot be set up is reported and ignored.
    ///
    /// # Errors
    /// Same as [`Contest::new`], plus [`Error::ThreadPool`] if a pool cannot be built.
    pub fn from_settings(
        competitors: Vec<Competitor<G>>,
        engines: Vec<EngineVariant<G>>,
        settings: &Settings,
    ) -> Result<Self> {
        if settings.log {
            match init_logger(&settings.log_dir) {
                Ok(path) => info!("logging to {}", path.display()),
                Err(err) => warn!("file logging disabled: {err:#}"),
            }
        }
        let contest = Self::new(
            competitors,
            engines,
            settings.number_of_matches,
            settings.game_pool()?,
            settings.match_pool()?,
        )?;
        Ok(contest.with_verbose(settings.verbose))
    }

    /// Enable or disable printing every finished game to stdout.
    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Registered competitors.
    pub fn competitors(&self) -> &[Competitor<G>] {
        &self.competitors
    }

    /// Registered engine variants.
    pub fn engines(&self) -> &[EngineVariant<G>] {
        &self.engines
    }

    /// Matches played per game.
    pub fn number_of_matches(&self) -> usize {
        self.number_of_matches
    }

    /// Every game this contest plays, in aggregation order.
    pub fn pairings(&self) -> Vec<Pairing> {
        round_robin::pairings(self.competitors.len(), self.engines.len())
    }

    /// Plays every game and ranks the competitors.
    ///
    /// # Errors
    /// The first game failure, unchanged.
    #[instrument(skip_all, fields(
        competitors = self.competitors.len(),
        variants = self.engines.len(),
        matches = self.number_of_matches
    ))]
    pub fn run(&self) -> Result<ContestResult> {
        let pairings = self.pairings();
        info!(games = pairings.len(), "contest started");

        let results = self
            .game_pool
            .try_map(pairings.clone(), |pairing| self.play(pairing))
            .inspect_err(|err| warn!("contest aborted: {err}"))?;

        let mut scores: Vec<_> = self
            .competitors
            .iter()
            .enumerate()
            .map(|(index, competitor)| Score::new(index, competitor.config().clone()))
            .collect();
        let mut games = Vec::with_capacity(results.len());
        for (pairing, result) in pairings.into_iter().zip(results) {
            scores[pairing.player].record_as_player(&result);
            scores[pairing.opponent].record_as_opponent(&result);
            games.push(self.record(pairing, result));
        }

        let reachable =
            round_robin::games_per_competitor(self.competitors.len(), self.engines.len());
        let result = ContestResult::new(scores, games, reachable);
        info!("contest finished\n{result}");
        Ok(result)
    }

    fn play(&self, pairing: Pairing) -> Result<GameResult> {
        let game = Game::new(
            self.competitors[pairing.player].clone(),
            self.competitors[pairing.opponent].clone(),
            self.engines[pairing.variant].factory(),
            self.number_of_matches,
            self.match_pool.clone(),
        )?;
        let result = game.run()?;
        if self.verbose {
            print_game_result(&self.record(pairing, result.clone()));
        }
        Ok(result)
    }

    fn record(&self, pairing: Pairing, result: GameResult) -> GameRecord {
        GameRecord::new(
            pairing,
            self.engines[pairing.variant].name().to_string(),
            self.competitors[pairing.player].name().to_string(),
            self.competitors[pairing.opponent].name().to_string(),
            result,
        )
    }
}

fn print_game_result(record: &GameRecord) {
    // clear line, green pairing, results
    println!(
        "\x1b[2K\x1b[32m{} vs {} on {}: \x1b[39m{}\x1b[0G",
        record.player(),
        record.opponent(),
        record.variant(),
        record.result()
    );
}

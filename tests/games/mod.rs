#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use ai_contest::anyhow::{self, bail, Context};
use ai_contest::prelude::*;

/// How a [`ScriptedEngine`] picks its winner once all rounds are played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The given side always wins.
    Always(Side),
    /// The side with the larger total wins, the player on a tie.
    HigherTotal,
}

/// Plays a fixed number of rounds. Each side scores the sum of its actions.
#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    rule: Rule,
    length: u32,
    fail_on_round: Option<u32>,
    rounds: u32,
    scores: [i64; 2],
}

impl ScriptedEngine {
    pub fn new(rule: Rule, length: u32) -> Self {
        Self {
            rule,
            length,
            fail_on_round: None,
            rounds: 0,
            scores: [0, 0],
        }
    }

    pub fn failing_on(mut self, round: u32) -> Self {
        self.fail_on_round = Some(round);
        self
    }
}

impl GameEngine for ScriptedEngine {
    type Input = u32;
    type Action = i64;

    fn start(&mut self) -> anyhow::Result<()> {
        self.rounds = 0;
        self.scores = [0, 0];
        Ok(())
    }

    fn run(&mut self, player: &[i64], opponent: &[i64]) -> anyhow::Result<()> {
        self.rounds += 1;
        if self.fail_on_round == Some(self.rounds) {
            bail!("illegal move on round {}", self.rounds);
        }
        self.scores[0] += player.iter().sum::<i64>();
        self.scores[1] += opponent.iter().sum::<i64>();
        Ok(())
    }

    fn winner(&self) -> Winner {
        if self.rounds < self.length {
            return Winner::Ongoing;
        }
        match self.rule {
            Rule::Always(Side::Player) => Winner::Player,
            Rule::Always(Side::Opponent) => Winner::Opponent,
            Rule::HigherTotal if self.scores[1] > self.scores[0] => Winner::Opponent,
            Rule::HigherTotal => Winner::Player,
        }
    }

    fn player_score(&self) -> i64 {
        self.scores[0]
    }

    fn opponent_score(&self) -> i64 {
        self.scores[1]
    }

    fn rounds(&self) -> u32 {
        self.rounds
    }

    fn player_input(&self) -> u32 {
        self.rounds
    }

    fn opponent_input(&self) -> u32 {
        self.rounds
    }
}

pub fn variant(name: &str, rule: Rule, length: u32) -> EngineVariant<ScriptedEngine> {
    EngineVariant::new(name, move || -> anyhow::Result<ScriptedEngine> {
        Ok(ScriptedEngine::new(rule, length))
    })
}

pub fn failing_variant(name: &str, round: u32) -> EngineVariant<ScriptedEngine> {
    EngineVariant::new(name, move || -> anyhow::Result<ScriptedEngine> {
        Ok(ScriptedEngine::new(Rule::HigherTotal, round + 1).failing_on(round))
    })
}

/// Hands out one single-round engine per requested outcome, in order.
pub struct Script {
    engines: Mutex<VecDeque<ScriptedEngine>>,
}

impl Script {
    pub fn new(outcomes: impl IntoIterator<Item = Side>) -> Self {
        let engines = outcomes
            .into_iter()
            .map(|side| ScriptedEngine::new(Rule::Always(side), 1))
            .collect();
        Self {
            engines: Mutex::new(engines),
        }
    }
}

impl GameFactory<ScriptedEngine> for Script {
    fn new_game(&self) -> anyhow::Result<ScriptedEngine> {
        self.engines
            .lock()
            .unwrap()
            .pop_front()
            .context("script exhausted")
    }
}

/// Plays `value` every turn, after checking the engine exposed an input.
pub struct Constant {
    value: i64,
    input: InputSource<u32>,
}

impl Strategy<ScriptedEngine> for Constant {
    fn play(&mut self) -> anyhow::Result<Vec<i64>> {
        let _round = self.input.read()?;
        Ok(vec![self.value])
    }
}

pub fn constant(
    config: &StrategyConfig,
    input: InputSource<u32>,
) -> anyhow::Result<Box<dyn Strategy<ScriptedEngine>>> {
    let value = config.get_i64("value").unwrap_or(0);
    Ok(Box::new(Constant { value, input }))
}

pub struct Failing;

impl Strategy<ScriptedEngine> for Failing {
    fn play(&mut self) -> anyhow::Result<Vec<i64>> {
        bail!("no legal move")
    }
}

pub fn failing(
    _config: &StrategyConfig,
    _input: InputSource<u32>,
) -> anyhow::Result<Box<dyn Strategy<ScriptedEngine>>> {
    Ok(Box::new(Failing))
}

pub struct Panicking;

impl Strategy<ScriptedEngine> for Panicking {
    fn play(&mut self) -> anyhow::Result<Vec<i64>> {
        panic!("lost track of the board")
    }
}

pub fn panicking_competitor(name: &str) -> Competitor<ScriptedEngine> {
    Competitor::new(
        StrategyConfig::new(name),
        |_: &StrategyConfig,
         _: InputSource<u32>|
         -> anyhow::Result<Box<dyn Strategy<ScriptedEngine>>> { Ok(Box::new(Panicking)) },
    )
}

pub fn competitor(name: &str, value: i64) -> Competitor<ScriptedEngine> {
    Competitor::new(StrategyConfig::new(name).with_param("value", value), constant)
}

pub fn failing_competitor(name: &str) -> Competitor<ScriptedEngine> {
    Competitor::new(StrategyConfig::new(name), failing)
}

/// Publishes 1, 2, 3, ... every 5ms until stopped.
pub struct Climber;

impl AnytimeStrategy<ScriptedEngine> for Climber {
    fn search(&mut self, stop: &StopToken, best: &OutputSlot<Vec<i64>>) -> anyhow::Result<()> {
        let mut value = 0;
        while !stop.is_stopped() {
            value += 1;
            best.publish(vec![value]);
            thread::sleep(Duration::from_millis(5));
        }
        Ok(())
    }
}

/// Returns on the stop signal without publishing anything.
pub struct Silent;

impl AnytimeStrategy<ScriptedEngine> for Silent {
    fn search(&mut self, stop: &StopToken, _best: &OutputSlot<Vec<i64>>) -> anyhow::Result<()> {
        while !stop.is_stopped() {
            thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    }
}

/// Publishes once, then ignores the stop signal for `nap`.
pub struct Stubborn {
    pub nap: Duration,
}

impl AnytimeStrategy<ScriptedEngine> for Stubborn {
    fn search(&mut self, _stop: &StopToken, best: &OutputSlot<Vec<i64>>) -> anyhow::Result<()> {
        best.publish(vec![1]);
        thread::sleep(self.nap);
        Ok(())
    }
}

/// Iterates while its lap timer predicts one more iteration fits in `budget`.
pub struct Paced {
    pub budget: Duration,
    pub iteration: Duration,
}

impl AnytimeStrategy<ScriptedEngine> for Paced {
    fn search(&mut self, stop: &StopToken, best: &OutputSlot<Vec<i64>>) -> anyhow::Result<()> {
        let mut timer = AdaptiveTimer::start(self.budget);
        let mut iterations = 0;
        while !stop.is_stopped() && !timer.finished(2.0) {
            thread::sleep(self.iteration);
            iterations += 1;
            best.publish(vec![iterations]);
            timer.lap();
        }
        Ok(())
    }
}

/// Competitor whose every turn runs `strategy()` under `budget`.
pub fn time_boxed<S>(
    name: &str,
    strategy: impl Fn() -> S + Send + Sync + 'static,
    budget: Duration,
    executor: TimeBoxedExecutor,
) -> Competitor<ScriptedEngine>
where
    S: AnytimeStrategy<ScriptedEngine>,
{
    Competitor::new(
        StrategyConfig::new(name),
        move |_: &StrategyConfig,
              _: InputSource<u32>|
              -> anyhow::Result<Box<dyn Strategy<ScriptedEngine>>> {
            Ok(Box::new(TimeBoxedStrategy::new(strategy(), budget, executor)))
        },
    )
}

use crate::games::{competitor, failing_competitor, failing_variant, variant, Rule, Script};

use ai_contest::prelude::*;
use time::format_description;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod games;

fn init_stdout_logger() {
    let local_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = tracing_subscriber::fmt::time::OffsetTime::new(
        local_offset,
        format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]").unwrap(),
    );

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_timer(timer)
        .with_test_writer()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn pools() -> (WorkerPool, WorkerPool) {
    (
        WorkerPool::new("game", 3).unwrap(),
        WorkerPool::new("match", 4).unwrap(),
    )
}

fn contest(
    competitors: Vec<Competitor<games::ScriptedEngine>>,
    engines: Vec<EngineVariant<games::ScriptedEngine>>,
    number_of_matches: usize,
) -> Result<Contest<games::ScriptedEngine>> {
    let (game_pool, match_pool) = pools();
    Contest::new(competitors, engines, number_of_matches, game_pool, match_pool)
}

fn victories(result: &ContestResult) -> Vec<(&str, u32)> {
    result
        .classifications()
        .iter()
        .map(|c| (c.name(), c.victory_count()))
        .collect()
}

#[test]
fn player_seat_always_wins() {
    init_stdout_logger();

    let contest = contest(
        vec![competitor("a", 0), competitor("b", 0), competitor("c", 0)],
        vec![variant("player wins", Rule::Always(Side::Player), 2)],
        5,
    )
    .unwrap();
    let result = contest.run().unwrap();

    assert_eq!(victories(&result), vec![("a", 2), ("b", 1), ("c", 0)]);
    assert_eq!(result.winner().map(|c| c.win_rate()), Some(1.0));
    assert_eq!(result.get("b").map(|c| c.win_rate()), Some(0.5));
    assert_eq!(result.get("c").map(|c| c.defeat_count()), Some(2));

    assert_eq!(result.games().len(), 3);
    for game in result.games() {
        assert_eq!(game.result().number_of_matches(), 5);
        assert_eq!(game.result().average_rounds(), 2.0);
        assert_eq!(game.result().outcome(), GameOutcome::Player);
    }
}

#[test]
fn opposite_variants_split_victories() {
    let contest = contest(
        vec![competitor("a", 0), competitor("b", 0)],
        vec![
            variant("player wins", Rule::Always(Side::Player), 1),
            variant("opponent wins", Rule::Always(Side::Opponent), 1),
        ],
        3,
    )
    .unwrap();
    let result = contest.run().unwrap();

    assert_eq!(victories(&result), vec![("a", 1), ("b", 1)]);
    for classification in result.classifications() {
        assert_eq!(classification.games_played(), 2);
        assert_eq!(classification.win_rate(), 0.5);
        assert_eq!(classification.draw_count(), 0);
    }

    let variants: Vec<_> = result.games().iter().map(|g| g.variant()).collect();
    assert_eq!(variants, vec!["player wins", "opponent wins"]);
}

#[test]
fn every_pairing_plays_once_per_variant() {
    let competitors = (0..4).map(|i| competitor(&format!("ai-{i}"), 0)).collect();
    let engines = vec![
        variant("short", Rule::Always(Side::Player), 1),
        variant("long", Rule::Always(Side::Player), 3),
    ];
    let contest = contest(competitors, engines, 2).unwrap();
    assert_eq!(contest.pairings().len(), 12);

    let result = contest.run().unwrap();
    assert_eq!(result.games().len(), 12);

    // first registered always sits in the player seat
    let best = result.winner().unwrap();
    assert_eq!(best.name(), "ai-0");
    assert_eq!(best.victory_count(), 6);
    assert_eq!(best.win_rate(), 1.0);

    for classification in result.classifications() {
        assert_eq!(classification.games_played(), 6);
        assert!(classification.victory_count() <= 6);
    }
    let total: u32 = result.classifications().iter().map(|c| c.victory_count()).sum();
    assert_eq!(total, 12);
}

#[test]
fn score_margin_breaks_ties() {
    let contest = contest(
        vec![competitor("timid", 1), competitor("bold", 5)],
        vec![
            variant("player wins", Rule::Always(Side::Player), 2),
            variant("opponent wins", Rule::Always(Side::Opponent), 2),
        ],
        1,
    )
    .unwrap();
    let result = contest.run().unwrap();

    assert_eq!(victories(&result), vec![("bold", 1), ("timid", 1)]);
    assert_eq!(result.get("bold").map(|c| c.score_margin()), Some(16.0));
    assert_eq!(result.get("timid").map(|c| c.score_margin()), Some(-16.0));
}

#[test]
fn higher_total_wins() {
    let contest = contest(
        vec![competitor("one", 1), competitor("three", 3), competitor("two", 2)],
        vec![variant("race", Rule::HigherTotal, 4)],
        2,
    )
    .unwrap();
    let result = contest.run().unwrap();
    assert_eq!(
        victories(&result),
        vec![("three", 2), ("two", 1), ("one", 0)]
    );
    let first = &result.games()[0];
    assert_eq!((first.player(), first.opponent()), ("one", "three"));
    assert_eq!(first.result().average_player_score(), 4.0);
    assert_eq!(first.result().average_opponent_score(), 12.0);
}

#[test]
fn even_split_is_a_draw() {
    let contest = contest(
        vec![competitor("a", 0), competitor("b", 0)],
        vec![EngineVariant::new(
            "alternating",
            Script::new([Side::Player, Side::Opponent]),
        )],
        2,
    )
    .unwrap();
    let result = contest.run().unwrap();

    assert_eq!(result.games()[0].result().outcome(), GameOutcome::Draw);
    for classification in result.classifications() {
        assert_eq!(classification.victory_count(), 0);
        assert_eq!(classification.draw_count(), 1);
        assert_eq!(classification.defeat_count(), 0);
    }
}

#[test]
fn invalid_contests_are_rejected() {
    let engines = || vec![variant("v", Rule::Always(Side::Player), 1)];

    assert!(matches!(
        contest(vec![], engines(), 5),
        Err(Error::InvalidTournamentSize(0))
    ));
    assert!(matches!(
        contest(vec![competitor("alone", 0)], engines(), 5),
        Err(Error::InvalidTournamentSize(1))
    ));
    assert!(matches!(
        contest(vec![competitor("a", 0), competitor("b", 0)], vec![], 5),
        Err(Error::NoEngineVariants)
    ));
    assert!(matches!(
        contest(vec![competitor("a", 0), competitor("b", 0)], engines(), 0),
        Err(Error::NoMatches)
    ));
}

#[test]
fn failing_strategy_fails_the_contest() {
    let contest = contest(
        vec![failing_competitor("broken"), competitor("b", 0), competitor("c", 0)],
        vec![variant("v", Rule::Always(Side::Player), 3)],
        3,
    )
    .unwrap();

    match contest.run() {
        Err(Error::Strategy { side, source }) => {
            assert_eq!(side, Side::Player);
            assert_eq!(source.to_string(), "no legal move");
        }
        other => panic!("expected a strategy failure, got {other:?}"),
    }
}

#[test]
fn failing_engine_fails_the_contest() {
    let contest = contest(
        vec![competitor("a", 0), competitor("b", 0)],
        vec![
            variant("fine", Rule::Always(Side::Player), 1),
            failing_variant("broken", 2),
        ],
        2,
    )
    .unwrap();

    match contest.run() {
        Err(Error::Engine(source)) => assert_eq!(source.to_string(), "illegal move on round 2"),
        other => panic!("expected an engine failure, got {other:?}"),
    }
}

#[test]
fn from_settings() {
    let settings = Settings::new()
        .with_number_of_matches(4)
        .with_game_threads(2)
        .with_match_threads(2)
        .with_verbose(true);
    settings.validate().unwrap();

    let contest = Contest::from_settings(
        vec![competitor("a", 2), competitor("b", 1)],
        vec![variant("race", Rule::HigherTotal, 3)],
        &settings,
    )
    .unwrap();
    assert_eq!(contest.number_of_matches(), 4);
    assert_eq!(contest.competitors().len(), 2);
    assert_eq!(contest.engines().len(), 1);

    let result = contest.run().unwrap();
    assert_eq!(result.games()[0].result().number_of_matches(), 4);
    assert_eq!(
        result.to_string(),
        "1- a {value=2}: victories=1, draws=0, winRate=1.000, margin=+3.00\n\
         2- b {value=1}: victories=0, draws=0, winRate=0.000, margin=-3.00\n"
    );
}

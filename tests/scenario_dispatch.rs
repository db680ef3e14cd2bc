//! Every level runs from its defaults and from a tagged JSON file.

use kindness::{
    Algorithm, Error, ScenarioInput, ScenarioOutcome,
    scenario::{self, run, run_level},
};

#[test]
fn every_level_runs_with_a_seed() {
    for algorithm in Algorithm::ALL {
        let input = ScenarioInput::defaults(algorithm).with_seed(17);
        let outcome = run(&input).unwrap_or_else(|e| panic!("{algorithm} failed: {e}"));
        assert_eq!(outcome.algorithm(), algorithm);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["algorithm"], algorithm.as_str());
    }
}

#[test]
fn seeded_levels_are_reproducible() {
    for algorithm in [Algorithm::AlphaBeta, Algorithm::HillClimbing, Algorithm::Mdp] {
        let input = ScenarioInput::defaults(algorithm).with_seed(5);
        assert_eq!(run(&input).unwrap(), run(&input).unwrap(), "{algorithm}");
    }
}

#[test]
fn defaults_survive_a_json_round_trip() {
    for algorithm in Algorithm::ALL {
        let input = ScenarioInput::defaults(algorithm);
        let json = serde_json::to_string(&input).unwrap();
        let parsed: ScenarioInput = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, input, "{json}");
    }
}

#[test]
fn tagged_files_pick_their_algorithm() {
    let input: ScenarioInput =
        serde_json::from_str(r#"{"algorithm": "hanoi", "disks": 4}"#).unwrap();
    match run(&input).unwrap() {
        ScenarioOutcome::Hanoi(solution) => assert_eq!(solution.total_moves, 15),
        other => panic!("unexpected outcome {:?}", other.algorithm()),
    }

    let input: ScenarioInput = serde_json::from_str(
        r#"{"algorithm": "astar", "map": ["..#", "..#", "..."], "goals": [{"x": 2, "y": 2}]}"#,
    )
    .unwrap();
    match run(&input).unwrap() {
        ScenarioOutcome::AStar(result) => {
            assert!(result.found());
            assert_eq!(result.cost, 4.0);
        }
        other => panic!("unexpected outcome {:?}", other.algorithm()),
    }
}

#[test]
fn record_errors_surface() {
    assert!(matches!(
        run_level(scenario::Algorithm::MAX_LEVEL + 1),
        Err(Error::InvalidLevel { .. })
    ));
    assert!(ScenarioInput::from_record(Algorithm::Hanoi, r#"{"disks": "three"}"#).is_err());
    let too_many = ScenarioInput::from_record(Algorithm::Hanoi, r#"{"disks": 64}"#).unwrap();
    assert!(matches!(run(&too_many), Err(Error::TooManyDisks { .. })));

    let deep = ScenarioInput::from_record(Algorithm::AlphaBeta, r#"{"random_depth": 60}"#).unwrap();
    assert!(matches!(run(&deep), Err(Error::InvalidConfiguration { .. })));
    let wide = ScenarioInput::from_record(
        Algorithm::AStar,
        r#"{"width": 4294967296, "height": 4294967296}"#,
    )
    .unwrap();
    assert!(matches!(run(&wide), Err(Error::InvalidGrid { .. })));
}

#[test]
fn algorithm_names_parse_back() {
    for algorithm in Algorithm::ALL {
        assert_eq!(algorithm.as_str().parse::<Algorithm>().unwrap(), algorithm);
        assert_eq!(Algorithm::from_level(algorithm.level()).unwrap(), algorithm);
    }
}

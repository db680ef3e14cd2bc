//! Hill climbing on the built-in objectives.

use kindness::{
    Error,
    local_search::{
        HillClimbConfig, HillClimber, Objective, ObjectiveKind, OscillatingObjective,
        ParabolaObjective, StopReason, neighbors,
    },
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn climbs_never_lose_score(
        start in prop::collection::vec(0.0f64..=100.0, 3),
        step in 0.5f64..20.0,
    ) {
        let objective = OscillatingObjective;
        let climber = HillClimber::new(HillClimbConfig::default().with_step_size(step));
        let outcome = climber.climb(&objective, start.clone()).unwrap();

        prop_assert!(outcome.score >= objective.evaluate(&start));
        prop_assert!((objective.evaluate(&outcome.state) - outcome.score).abs() < 1e-12);
        for (value, bounds) in outcome.state.iter().zip(objective.bounds()) {
            prop_assert!(bounds.contains(*value));
        }
        if outcome.reason == StopReason::LocalMaximum {
            for neighbour in neighbors(objective.bounds(), &outcome.state, step) {
                prop_assert!(objective.evaluate(&neighbour) <= outcome.score);
            }
        }
    }
}

#[test]
fn parabola_peak_is_found_from_the_edge() {
    let climber = HillClimber::new(HillClimbConfig::default().with_restarts(0));
    let result = climber.run(&ParabolaObjective, Some(&[0.0])).unwrap();
    assert_eq!(result.best_state, vec![50.0]);
    assert_eq!(result.best_score, 100.0);
    assert_eq!(result.local_maxima, 1);
    assert_eq!(result.climbs[0].iterations, 11);
}

#[test]
fn restarts_keep_the_best_climb() {
    let config = HillClimbConfig::default().with_restarts(6).with_seed(11);
    let objective = ObjectiveKind::Oscillating.objective();
    let result = HillClimber::new(config).run(&*objective, None).unwrap();

    assert_eq!(result.climbs.len(), 7);
    let best = result
        .climbs
        .iter()
        .map(|c| c.score)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(result.best_score, best);
    assert_eq!(
        result.total_iterations,
        result.climbs.iter().map(|c| c.iterations).sum::<usize>()
    );
}

#[test]
fn seeded_runs_are_reproducible() {
    let config = HillClimbConfig::default().with_seed(42);
    let first = HillClimber::new(config).run(&OscillatingObjective, None).unwrap();
    let second = HillClimber::new(config).run(&OscillatingObjective, None).unwrap();
    assert_eq!(first.best_state, second.best_state);
    assert_eq!(first.climbs.len(), second.climbs.len());
}

#[test]
fn iteration_cap_is_reported() {
    let config = HillClimbConfig::default()
        .with_restarts(0)
        .with_step_size(1.0)
        .with_max_iterations(3);
    let result = HillClimber::new(config)
        .run(&ParabolaObjective, Some(&[0.0]))
        .unwrap();
    assert_eq!(result.climbs[0].reason, StopReason::IterationCap);
    assert_eq!(result.best_state, vec![3.0]);
}

#[test]
fn bad_inputs_are_rejected() {
    let climber = HillClimber::new(HillClimbConfig::default());
    assert!(climber.run(&ParabolaObjective, Some(&[150.0])).is_err());
    assert!(climber.run(&ParabolaObjective, Some(&[1.0, 2.0])).is_err());

    let zero_step = HillClimber::new(HillClimbConfig::default().with_step_size(0.0));
    assert!(zero_step.run(&ParabolaObjective, None).is_err());
}

#[test]
fn single_climbs_check_their_start() {
    let climber = HillClimber::new(HillClimbConfig::default());
    for start in [vec![1.0, 2.0], vec![], vec![1.0, 2.0, 3.0, 4.0], vec![1.0, 2.0, 300.0]] {
        assert!(matches!(
            climber.climb(&OscillatingObjective, start),
            Err(Error::InvalidBounds { .. })
        ));
    }
    assert!(neighbors(OscillatingObjective.bounds(), &[1.0], 1.0).len() <= 2);
}

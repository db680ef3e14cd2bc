//! Hill climbing with random restarts over bounded continuous states

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    utils::{argmax, build_rng},
};

/// Closed interval for one state variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// A function to maximize over a box.
pub trait Objective {
    /// Names of the state variables, in order.
    fn variables(&self) -> &[&'static str];

    /// Bounds per variable; same length as [`Objective::variables`].
    fn bounds(&self) -> &[Bounds];

    fn evaluate(&self, state: &[f64]) -> f64;
}

const CUBE: [Bounds; 3] = [Bounds::new(0.0, 100.0); 3];
const LINE: [Bounds; 1] = [Bounds::new(0.0, 100.0)];

/// Three-variable objective with ripples that trap greedy climbs:
/// `0.4f + 0.3c + 0.3p + 5 sin(f/10) + 5 sin(c/10) + 0.05 f c / 100`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OscillatingObjective;

impl Objective for OscillatingObjective {
    fn variables(&self) -> &[&'static str] {
        &["focus", "calmness", "compassion"]
    }

    fn bounds(&self) -> &[Bounds] {
        &CUBE
    }

    fn evaluate(&self, state: &[f64]) -> f64 {
        let (f, c, p) = (state[0], state[1], state[2]);
        0.4 * f + 0.3 * c + 0.3 * p
            + 5.0 * (f / 10.0).sin()
            + 5.0 * (c / 10.0).sin()
            + 0.05 * (f * c / 100.0)
    }
}

/// Single peak `100 - (x - 50)^2 / 25` on [0, 100].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParabolaObjective;

impl Objective for ParabolaObjective {
    fn variables(&self) -> &[&'static str] {
        &["x"]
    }

    fn bounds(&self) -> &[Bounds] {
        &LINE
    }

    fn evaluate(&self, state: &[f64]) -> f64 {
        100.0 - (state[0] - 50.0).powi(2) / 25.0
    }
}

/// Built-in objectives selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    #[default]
    Oscillating,
    Parabola,
}

impl ObjectiveKind {
    pub fn objective(self) -> Box<dyn Objective> {
        match self {
            ObjectiveKind::Oscillating => Box::new(OscillatingObjective),
            ObjectiveKind::Parabola => Box::new(ParabolaObjective),
        }
    }
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveKind::Oscillating => write!(f, "oscillating"),
            ObjectiveKind::Parabola => write!(f, "parabola"),
        }
    }
}

impl FromStr for ObjectiveKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "oscillating" => Ok(ObjectiveKind::Oscillating),
            "parabola" => Ok(ObjectiveKind::Parabola),
            _ => Err(Error::InvalidConfiguration {
                message: format!("unknown objective '{s}' (expected oscillating or parabola)"),
            }),
        }
    }
}

/// Hill climbing settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HillClimbConfig {
    pub step_size: f64,
    /// Extra climbs from random starts after the first one.
    pub restarts: usize,
    /// Iteration cap per climb.
    pub max_iterations: usize,
    pub seed: Option<u64>,
}

impl Default for HillClimbConfig {
    fn default() -> Self {
        Self {
            step_size: 5.0,
            restarts: 4,
            max_iterations: 100,
            seed: None,
        }
    }
}

impl HillClimbConfig {
    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(Error::InvalidConfiguration {
                message: format!("step size must be positive, got {}", self.step_size),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    LocalMaximum,
    IterationCap,
}

/// Result of one climb.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimbOutcome {
    pub start: Vec<f64>,
    pub state: Vec<f64>,
    pub score: f64,
    pub iterations: usize,
    pub reason: StopReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HillClimbResult {
    pub best_state: Vec<f64>,
    pub best_score: f64,
    /// Climbs that ended on a local maximum.
    pub local_maxima: usize,
    pub total_iterations: usize,
    pub climbs: Vec<ClimbOutcome>,
}

/// Greedy ascent with random restarts.
#[derive(Debug, Clone, Default)]
pub struct HillClimber {
    config: HillClimbConfig,
}

impl HillClimber {
    pub fn new(config: HillClimbConfig) -> Self {
        Self { config }
    }

    /// Climb from `start` (or a random state when `None`), then restart from
    /// random states, keeping the best result.
    ///
    /// # Errors
    ///
    /// Invalid step size, or a start state of the wrong length or outside the bounds.
    pub fn run(&self, objective: &dyn Objective, start: Option<&[f64]>) -> Result<HillClimbResult> {
        self.config.validate()?;
        let bounds = objective.bounds();
        if let Some(start) = start {
            check_start(objective, start)?;
        }

        let mut rng = build_rng(self.config.seed);
        let mut climbs = Vec::with_capacity(self.config.restarts + 1);
        for restart in 0..=self.config.restarts {
            let initial = match start {
                Some(state) if restart == 0 => state.to_vec(),
                _ => bounds
                    .iter()
                    .map(|b| rng.random_range(b.lower..=b.upper))
                    .collect(),
            };
            let outcome = self.ascend(objective, initial);
            debug!(
                restart,
                score = outcome.score,
                iterations = outcome.iterations,
                reason = ?outcome.reason,
                "climb finished"
            );
            climbs.push(outcome);
        }

        let (best, _) = argmax(climbs.iter().map(|c| c.score)).ok_or_else(|| {
            Error::InvalidConfiguration {
                message: "no climbs were run".to_string(),
            }
        })?;
        let result = HillClimbResult {
            best_state: climbs[best].state.clone(),
            best_score: climbs[best].score,
            local_maxima: climbs
                .iter()
                .filter(|c| c.reason == StopReason::LocalMaximum)
                .count(),
            total_iterations: climbs.iter().map(|c| c.iterations).sum(),
            climbs,
        };
        info!(
            best_score = result.best_score,
            local_maxima = result.local_maxima,
            total_iterations = result.total_iterations,
            "hill climbing finished"
        );
        Ok(result)
    }

    /// Single greedy ascent: move to the best strictly-improving neighbour
    /// until none exists or the cap is hit.
    ///
    /// # Errors
    ///
    /// Same as [`HillClimber::run`] with an explicit start.
    pub fn climb(&self, objective: &dyn Objective, start: Vec<f64>) -> Result<ClimbOutcome> {
        self.config.validate()?;
        check_start(objective, &start)?;
        Ok(self.ascend(objective, start))
    }

    fn ascend(&self, objective: &dyn Objective, start: Vec<f64>) -> ClimbOutcome {
        let mut current = start.clone();
        let mut score = objective.evaluate(&current);
        for iteration in 1..=self.config.max_iterations {
            let candidates = neighbors(objective.bounds(), &current, self.config.step_size);
            let best = argmax(candidates.iter().map(|n| objective.evaluate(n)));
            match best {
                Some((index, candidate_score)) if candidate_score > score => {
                    current = candidates[index].clone();
                    score = candidate_score;
                }
                _ => {
                    return ClimbOutcome {
                        start,
                        state: current,
                        score,
                        iterations: iteration,
                        reason: StopReason::LocalMaximum,
                    };
                }
            }
        }
        ClimbOutcome {
            start,
            state: current,
            score,
            iterations: self.config.max_iterations,
            reason: StopReason::IterationCap,
        }
    }
}

fn check_start(objective: &dyn Objective, start: &[f64]) -> Result<()> {
    let bounds = objective.bounds();
    if start.len() != bounds.len() {
        return Err(Error::InvalidBounds {
            message: format!(
                "start state has {} values but the objective has {} variables",
                start.len(),
                bounds.len()
            ),
        });
    }
    for ((value, b), name) in start.iter().zip(bounds).zip(objective.variables()) {
        if !b.contains(*value) {
            return Err(Error::InvalidBounds {
                message: format!("{name} = {value} lies outside [{}, {}]", b.lower, b.upper),
            });
        }
    }
    Ok(())
}

/// States one step up and one step down along each variable, clamped to the
/// bounds; moves that clamp back onto the current value are dropped.
pub fn neighbors(bounds: &[Bounds], state: &[f64], step: f64) -> Vec<Vec<f64>> {
    let mut out = Vec::with_capacity(state.len() * 2);
    for (i, (b, &value)) in bounds.iter().zip(state).enumerate() {
        for candidate in [(value + step).min(b.upper), (value - step).max(b.lower)] {
            if candidate != value {
                let mut next = state.to_vec();
                next[i] = candidate;
                out.push(next);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parabola_climb_reaches_peak() {
        let climber = HillClimber::new(HillClimbConfig::default().with_restarts(0));
        let result = climber.run(&ParabolaObjective, Some(&[0.0])).unwrap();
        assert_eq!(result.best_state, vec![50.0]);
        assert_eq!(result.best_score, 100.0);
        assert_eq!(result.climbs[0].iterations, 11);
        assert_eq!(result.local_maxima, 1);
    }

    #[test]
    fn iteration_cap_is_reported() {
        let climber = HillClimber::new(
            HillClimbConfig::default()
                .with_restarts(0)
                .with_max_iterations(3),
        );
        let result = climber.run(&ParabolaObjective, Some(&[0.0])).unwrap();
        assert_eq!(result.climbs[0].reason, StopReason::IterationCap);
        assert_eq!(result.best_state, vec![15.0]);
        assert_eq!(result.local_maxima, 0);
    }

    #[test]
    fn seeded_runs_are_identical() {
        let config = HillClimbConfig::default().with_seed(2024);
        let a = HillClimber::new(config).run(&OscillatingObjective, None).unwrap();
        let b = HillClimber::new(config).run(&OscillatingObjective, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.climbs.len(), 5);
    }

    #[test]
    fn never_worse_than_start() {
        let start = [20.0, 70.0, 40.0];
        let start_score = OscillatingObjective.evaluate(&start);
        let result = HillClimber::new(HillClimbConfig::default().with_seed(1))
            .run(&OscillatingObjective, Some(&start))
            .unwrap();
        assert!(result.best_score >= start_score);
        assert!(result.climbs[0].score >= start_score);
    }

    #[test]
    fn neighbors_respect_bounds() {
        let bounds = [Bounds::new(0.0, 100.0); 2];
        let around_corner = neighbors(&bounds, &[0.0, 98.0], 5.0);
        assert_eq!(around_corner, vec![vec![5.0, 98.0], vec![0.0, 100.0], vec![0.0, 93.0]]);
    }

    #[test]
    fn invalid_start_is_rejected() {
        let climber = HillClimber::default();
        assert!(matches!(
            climber.run(&OscillatingObjective, Some(&[150.0, 0.0, 0.0])),
            Err(Error::InvalidBounds { .. })
        ));
        assert!(matches!(
            climber.run(&OscillatingObjective, Some(&[1.0])),
            Err(Error::InvalidBounds { .. })
        ));
        let bad_step = HillClimber::new(HillClimbConfig::default().with_step_size(0.0));
        assert!(bad_step.run(&ParabolaObjective, None).is_err());
    }
}

//! Bellman value iteration and greedy policy extraction

use std::{collections::BTreeMap, fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::model::{Action, Mdp};
use crate::{
    error::{Error, Result},
    identifiers::{ActionId, StateId},
    utils::argmax,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateMode {
    /// Every state in a sweep reads the previous sweep's values.
    #[default]
    Synchronous,
    /// Updates are visible to later states in the same sweep.
    InPlace,
}

impl UpdateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::Synchronous => "sync",
            UpdateMode::InPlace => "in-place",
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sync" | "synchronous" => Ok(UpdateMode::Synchronous),
            "in-place" | "inplace" | "in_place" | "gauss-seidel" => Ok(UpdateMode::InPlace),
            _ => Err(Error::InvalidConfiguration {
                message: format!("unknown update mode '{s}', expected sync or in-place"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueIterationConfig {
    /// Convergence threshold on the largest per-sweep change.
    pub theta: f64,
    pub max_iterations: usize,
    pub mode: UpdateMode,
}

impl Default for ValueIterationConfig {
    fn default() -> Self {
        Self {
            theta: 0.01,
            max_iterations: 100,
            mode: UpdateMode::Synchronous,
        }
    }
}

impl ValueIterationConfig {
    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_mode(mut self, mode: UpdateMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.theta.is_finite() && self.theta > 0.0) {
            return Err(Error::InvalidConfiguration {
                message: format!("theta must be positive, got {}", self.theta),
            });
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfiguration {
                message: "max_iterations must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Largest value change in one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sweep {
    pub iteration: usize,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueIterationResult {
    pub values: BTreeMap<StateId, f64>,
    /// Greedy action for every non-terminal state.
    pub policy: BTreeMap<StateId, ActionId>,
    pub converged: bool,
    pub iterations: usize,
    pub history: Vec<Sweep>,
}

impl ValueIterationResult {
    pub fn final_delta(&self) -> Option<f64> {
        self.history.last().map(|s| s.delta)
    }

    /// Write the per-sweep deltas as `iteration,delta` CSV.
    pub fn export_history(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for sweep in &self.history {
            writer.serialize(sweep)?;
        }
        writer.flush().map_err(|source| Error::Io {
            operation: format!("write {}", path.display()),
            source,
        })?;
        Ok(())
    }
}

/// Expected return of `action`: Σ P(s'|s,a)·(R(s,a,s') + γ·V(s')).
pub fn q_value(action: &Action, values: &[f64], gamma: f64) -> f64 {
    action
        .transitions
        .iter()
        .fold(0.0, |acc, t| acc + t.probability * (t.reward + gamma * values[t.next]))
}

/// Best action index and its value; the earliest action wins ties.
fn best_action(mdp: &Mdp, state: usize, values: &[f64]) -> Option<(usize, f64)> {
    let gamma = mdp.discount().value();
    argmax(mdp.actions(state).iter().map(|a| q_value(a, values, gamma)))
}

/// Greedy policy with respect to `values` (indexed like [`Mdp::states`]).
pub fn extract_policy(mdp: &Mdp, values: &[f64]) -> BTreeMap<StateId, ActionId> {
    (0..mdp.len())
        .filter(|&s| !mdp.is_terminal(s))
        .filter_map(|s| {
            best_action(mdp, s, values)
                .map(|(a, _)| (mdp.state(s).clone(), mdp.actions(s)[a].id.clone()))
        })
        .collect()
}

/// Run value iteration until the largest change in a sweep drops below
/// `theta` or the sweep cap is hit. Terminal states keep value 0.
pub fn value_iteration(mdp: &Mdp, config: &ValueIterationConfig) -> Result<ValueIterationResult> {
    config.validate()?;

    let mut values = vec![0.0; mdp.len()];
    let mut history = Vec::new();
    let mut converged = false;

    for iteration in 1..=config.max_iterations {
        // In-place sweeps read the values being updated.
        let previous = matches!(config.mode, UpdateMode::Synchronous).then(|| values.clone());
        let mut delta: f64 = 0.0;
        for state in 0..mdp.len() {
            if mdp.is_terminal(state) {
                continue;
            }
            let source = previous.as_ref().unwrap_or(&values);
            let Some((_, best)) = best_action(mdp, state, source) else {
                continue;
            };
            delta = delta.max((best - values[state]).abs());
            values[state] = best;
        }
        debug!(iteration, delta, "value iteration sweep");
        history.push(Sweep { iteration, delta });
        if delta < config.theta {
            converged = true;
            break;
        }
    }

    let iterations = history.len();
    if converged {
        info!(iterations, mode = %config.mode, "value iteration converged");
    } else {
        warn!(
            max_iterations = config.max_iterations,
            theta = config.theta,
            "value iteration did not converge"
        );
    }

    Ok(ValueIterationResult {
        policy: extract_policy(mdp, &values),
        values: mdp.states().iter().cloned().zip(values).collect(),
        converged,
        iterations,
        history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journey() -> Mdp {
        Mdp::volunteer_journey().unwrap()
    }

    #[test]
    fn volunteer_journey_converges_to_the_climbing_policy() {
        let result = value_iteration(&journey(), &ValueIterationConfig::default()).unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 90);
        assert!(result.final_delta().unwrap() < 0.01);
        assert_eq!(result.history[0].delta, 135.0);

        let expected = [
            ("curious", "attend_orientation", 688.447),
            ("learning", "volunteer_once", 776.818),
            ("trying", "continue", 899.343),
            ("committed", "become_leader", 1055.771),
            ("leader", "mentor", 1210.582),
            ("inactive", "rejoin", 626.812),
        ];
        for (state, action, value) in expected {
            assert_eq!(result.policy[state], action);
            assert!((result.values[state] - value).abs() < 1e-3, "{state}");
        }
    }

    #[test]
    fn in_place_updates_converge_sooner() {
        let config = ValueIterationConfig::default().with_mode(UpdateMode::InPlace);
        let in_place = value_iteration(&journey(), &config).unwrap();
        assert!(in_place.converged);
        assert_eq!(in_place.iterations, 83);
        assert!((in_place.values["leader"] - 1210.595).abs() < 1e-3);
    }

    #[test]
    fn reports_non_convergence() {
        let config = ValueIterationConfig::default().with_max_iterations(5);
        let result = value_iteration(&journey(), &config).unwrap();
        assert!(!result.converged);
        assert_eq!(result.iterations, 5);
        assert_eq!(result.history.len(), 5);
    }

    #[test]
    fn terminal_states_stay_at_zero() {
        let mdp = Mdp::from_json(
            r#"{
                "states": ["a", "b", "end"],
                "terminal": ["end"],
                "discount": 0.5,
                "actions": {
                    "a": [{"name": "step", "outcomes": [{"next": "b", "probability": 1.0}]}],
                    "b": [{"name": "finish", "outcomes": [{"next": "end", "probability": 1.0, "reward": 8.0}]}]
                }
            }"#,
        )
        .unwrap();
        let result = value_iteration(&mdp, &ValueIterationConfig::default()).unwrap();
        assert!(result.converged);
        assert_eq!(result.values["end"], 0.0);
        assert_eq!(result.values["b"], 8.0);
        assert_eq!(result.values["a"], 4.0);
        assert!(!result.policy.contains_key("end"));
    }

    #[test]
    fn q_values_rank_actions() {
        let mdp = journey();
        let result = value_iteration(&mdp, &ValueIterationConfig::default()).unwrap();
        let values: Vec<f64> = mdp.states().iter().map(|s| result.values[s]).collect();
        let curious = mdp.state_index("curious").unwrap();
        let q: Vec<f64> = mdp
            .actions(curious)
            .iter()
            .map(|a| q_value(a, &values, 0.9))
            .collect();
        assert!(q[0] > q[2] && q[2] > q[1]);
    }

    #[test]
    fn rejects_bad_config() {
        let config = ValueIterationConfig::default().with_theta(0.0);
        assert!(value_iteration(&journey(), &config).is_err());
        assert!("diagonal".parse::<UpdateMode>().is_err());
        assert_eq!("in-place".parse::<UpdateMode>().unwrap(), UpdateMode::InPlace);
    }
}

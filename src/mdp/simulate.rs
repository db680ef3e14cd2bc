//! Roll out a policy through the model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::model::Mdp;
use crate::{
    error::{Error, Result},
    identifiers::{ActionId, StateId},
    utils::{argmax, build_rng, weighted_sample},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionSampling {
    /// Draw the next state from the transition distribution.
    #[default]
    Stochastic,
    /// Always take the most probable successor (earliest listed on ties).
    MostLikely,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub max_steps: usize,
    pub sampling: TransitionSampling,
    /// Non-terminal states that also end the run once entered.
    pub stop_states: Vec<StateId>,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            sampling: TransitionSampling::Stochastic,
            stop_states: Vec::new(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_sampling(mut self, sampling: TransitionSampling) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_stop_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StateId>,
    {
        self.stop_states = states.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStop {
    Terminal,
    StopState,
    StepLimit,
    /// The policy has no action for the current state.
    NoAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationStep {
    pub state: StateId,
    pub action: ActionId,
    pub next: StateId,
    pub reward: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    pub start: StateId,
    pub steps: Vec<SimulationStep>,
    pub total_reward: f64,
    pub final_state: StateId,
    pub stop: SimulationStop,
}

impl Trajectory {
    /// Visited states, starting with `start`.
    pub fn states(&self) -> Vec<&StateId> {
        std::iter::once(&self.start)
            .chain(self.steps.iter().map(|s| &s.next))
            .collect()
    }
}

/// Follow `policy` from `start`, accumulating rewards, until a terminal or
/// stop state is entered or `max_steps` transitions have been taken.
pub fn simulate(
    mdp: &Mdp,
    policy: &BTreeMap<StateId, ActionId>,
    start: &str,
    config: &SimulationConfig,
) -> Result<Trajectory> {
    for state in &config.stop_states {
        mdp.state_index(state.as_str())?;
    }
    let mut current = mdp.state_index(start)?;
    let mut rng = build_rng(config.seed);
    let mut steps = Vec::new();
    let mut total_reward = 0.0;

    let stop = loop {
        if mdp.is_terminal(current) {
            break SimulationStop::Terminal;
        }
        if steps.len() >= config.max_steps {
            break SimulationStop::StepLimit;
        }
        let state = mdp.state(current);
        let Some(chosen) = policy.get(state) else {
            break SimulationStop::NoAction;
        };
        let action = mdp
            .actions(current)
            .iter()
            .find(|a| a.id == *chosen)
            .ok_or_else(|| Error::InvalidConfiguration {
                message: format!("policy action '{chosen}' is not available in state '{state}'"),
            })?;

        let picked = match config.sampling {
            TransitionSampling::Stochastic => {
                let weighted: Vec<(usize, f64)> =
                    action.transitions.iter().enumerate().map(|(i, t)| (i, t.probability)).collect();
                weighted_sample(&mut rng, &weighted)
            }
            TransitionSampling::MostLikely => {
                argmax(action.transitions.iter().map(|t| t.probability)).map(|(i, _)| i)
            }
        };
        let Some(transition) = picked.and_then(|i| action.transitions.get(i)) else {
            break SimulationStop::NoAction;
        };

        total_reward += transition.reward;
        let next = mdp.state(transition.next).clone();
        debug!(state = %state, action = %chosen, next = %next, reward = transition.reward, "simulation step");
        steps.push(SimulationStep {
            state: state.clone(),
            action: chosen.clone(),
            next: next.clone(),
            reward: transition.reward,
        });
        current = transition.next;

        if config.stop_states.contains(&next) {
            break SimulationStop::StopState;
        }
    };

    info!(steps = steps.len(), total_reward, ?stop, "simulation finished");
    Ok(Trajectory {
        start: mdp.state(mdp.state_index(start)?).clone(),
        steps,
        total_reward,
        final_state: mdp.state(current).clone(),
        stop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp::value_iteration::{ValueIterationConfig, value_iteration};

    fn solved() -> (Mdp, BTreeMap<StateId, ActionId>) {
        let mdp = Mdp::volunteer_journey().unwrap();
        let result = value_iteration(&mdp, &ValueIterationConfig::default()).unwrap();
        (mdp, result.policy)
    }

    #[test]
    fn most_likely_path_climbs_to_leader() {
        let (mdp, policy) = solved();
        let config = SimulationConfig::default()
            .with_sampling(TransitionSampling::MostLikely)
            .with_stop_states(["leader", "inactive"]);
        let trajectory = simulate(&mdp, &policy, "curious", &config).unwrap();
        let states: Vec<&str> = trajectory.states().iter().map(|s| s.as_str()).collect();
        assert_eq!(states, vec!["curious", "learning", "trying", "committed", "leader"]);
        assert_eq!(trajectory.total_reward, 180.0);
        assert_eq!(trajectory.stop, SimulationStop::StopState);
        assert_eq!(trajectory.final_state, "leader");
    }

    #[test]
    fn seeded_runs_repeat() {
        let (mdp, policy) = solved();
        let config = SimulationConfig::default().with_seed(7).with_max_steps(25);
        let a = simulate(&mdp, &policy, "curious", &config).unwrap();
        let b = simulate(&mdp, &policy, "curious", &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.steps.len(), 25);
        assert_eq!(a.stop, SimulationStop::StepLimit);
        let sum: f64 = a.steps.iter().map(|s| s.reward).sum();
        assert_eq!(a.total_reward, sum);
    }

    #[test]
    fn missing_policy_entry_stops_the_run() {
        let (mdp, mut policy) = solved();
        policy.remove("learning");
        let config = SimulationConfig::default().with_sampling(TransitionSampling::MostLikely);
        let trajectory = simulate(&mdp, &policy, "curious", &config).unwrap();
        assert_eq!(trajectory.stop, SimulationStop::NoAction);
        assert_eq!(trajectory.final_state, "learning");
    }

    #[test]
    fn unknown_start_is_an_error() {
        let (mdp, policy) = solved();
        assert!(matches!(
            simulate(&mdp, &policy, "retired", &SimulationConfig::default()),
            Err(Error::UnknownState { .. })
        ));
    }
}

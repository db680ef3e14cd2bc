//! Finite Markov decision process definitions

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    identifiers::{ActionId, StateId},
    types::{Discount, Probability},
};

/// Allowed gap between a distribution's total and 1.
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

fn default_discount() -> f64 {
    0.9
}

/// One possible result of taking an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSpec {
    pub next: StateId,
    pub probability: f64,
    /// R(s, a, s'); unlisted rewards are 0.
    #[serde(default)]
    pub reward: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub name: ActionId,
    pub outcomes: Vec<OutcomeSpec>,
}

/// Serializable MDP description. Actions are listed per state in preference
/// order: ties in value go to the earlier action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdpDefinition {
    pub states: Vec<StateId>,
    #[serde(default)]
    pub terminal: Vec<StateId>,
    #[serde(default = "default_discount")]
    pub discount: f64,
    pub actions: BTreeMap<StateId, Vec<ActionSpec>>,
}

/// A validated transition with the successor resolved to a state index.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: usize,
    pub probability: f64,
    pub reward: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub id: ActionId,
    pub transitions: Vec<Transition>,
}

/// A validated MDP: every referenced state exists, every distribution sums to
/// one and every non-terminal state has at least one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Mdp {
    states: Vec<StateId>,
    index: HashMap<StateId, usize>,
    terminal: Vec<bool>,
    actions: Vec<Vec<Action>>,
    discount: Discount,
}

impl Mdp {
    pub fn from_definition(definition: &MdpDefinition) -> Result<Self> {
        let discount = Discount::new(definition.discount)?;

        let mut index = HashMap::with_capacity(definition.states.len());
        for (i, state) in definition.states.iter().enumerate() {
            if index.insert(state.clone(), i).is_some() {
                return Err(Error::InvalidConfiguration {
                    message: format!("state '{state}' is listed twice"),
                });
            }
        }
        let lookup = |state: &StateId| {
            index.get(state).copied().ok_or_else(|| Error::UnknownState {
                state: state.to_string(),
            })
        };

        let mut terminal = vec![false; definition.states.len()];
        for state in &definition.terminal {
            terminal[lookup(state)?] = true;
        }

        let mut actions = vec![Vec::new(); definition.states.len()];
        for (state, specs) in &definition.actions {
            let from = lookup(state)?;
            if terminal[from] && !specs.is_empty() {
                return Err(Error::InvalidConfiguration {
                    message: format!("terminal state '{state}' cannot have actions"),
                });
            }
            for spec in specs {
                let mut total = 0.0;
                let mut transitions = Vec::with_capacity(spec.outcomes.len());
                for outcome in &spec.outcomes {
                    let probability = Probability::new(outcome.probability)?.value();
                    total += probability;
                    transitions.push(Transition {
                        next: lookup(&outcome.next)?,
                        probability,
                        reward: outcome.reward,
                    });
                }
                if (total - 1.0).abs() > DISTRIBUTION_TOLERANCE {
                    return Err(Error::InvalidDistribution {
                        state: state.to_string(),
                        action: spec.name.to_string(),
                        total,
                    });
                }
                actions[from].push(Action {
                    id: spec.name.clone(),
                    transitions,
                });
            }
        }

        for (i, state) in definition.states.iter().enumerate() {
            if !terminal[i] && actions[i].is_empty() {
                return Err(Error::NoActionsAvailable {
                    state: state.to_string(),
                });
            }
        }

        Ok(Self {
            states: definition.states.clone(),
            index,
            terminal,
            actions,
            discount,
        })
    }

    /// Parse and validate a JSON [`MdpDefinition`].
    pub fn from_json(json: &str) -> Result<Self> {
        let definition: MdpDefinition = serde_json::from_str(json)?;
        Self::from_definition(&definition)
    }

    pub fn to_definition(&self) -> MdpDefinition {
        let actions = self
            .states
            .iter()
            .zip(&self.actions)
            .filter(|(_, actions)| !actions.is_empty())
            .map(|(state, actions)| {
                let specs = actions
                    .iter()
                    .map(|action| ActionSpec {
                        name: action.id.clone(),
                        outcomes: action
                            .transitions
                            .iter()
                            .map(|t| OutcomeSpec {
                                next: self.states[t.next].clone(),
                                probability: t.probability,
                                reward: t.reward,
                            })
                            .collect(),
                    })
                    .collect();
                (state.clone(), specs)
            })
            .collect();
        MdpDefinition {
            states: self.states.clone(),
            terminal: self
                .states
                .iter()
                .zip(&self.terminal)
                .filter(|(_, terminal)| **terminal)
                .map(|(state, _)| state.clone())
                .collect(),
            discount: self.discount.value(),
            actions,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    pub fn state(&self, index: usize) -> &StateId {
        &self.states[index]
    }

    pub fn state_index(&self, state: &str) -> Result<usize> {
        self.index
            .get(state)
            .copied()
            .ok_or_else(|| Error::UnknownState {
                state: state.to_string(),
            })
    }

    pub fn is_terminal(&self, index: usize) -> bool {
        self.terminal[index]
    }

    pub fn actions(&self, index: usize) -> &[Action] {
        &self.actions[index]
    }

    pub fn discount(&self) -> Discount {
        self.discount
    }

    /// Same model with another discount factor.
    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discount = discount;
        self
    }

    /// Six-stage volunteer journey from first curiosity to leadership. No
    /// state is terminal; simulations usually stop at `leader` or `inactive`.
    pub fn volunteer_journey() -> Result<Self> {
        Self::from_definition(&volunteer_journey_definition())
    }
}

impl TryFrom<MdpDefinition> for Mdp {
    type Error = Error;

    fn try_from(definition: MdpDefinition) -> Result<Self> {
        Mdp::from_definition(&definition)
    }
}

type OutcomeRow = (&'static str, f64, f64);

const JOURNEY: &[(&str, &[(&str, &[OutcomeRow])])] = &[
    (
        "curious",
        &[
            (
                "attend_orientation",
                &[("learning", 0.8, 10.0), ("curious", 0.15, 0.0), ("inactive", 0.05, 0.0)],
            ),
            ("ignore", &[("curious", 0.3, 0.0), ("inactive", 0.7, -10.0)]),
            (
                "learn_more",
                &[("curious", 0.5, 0.0), ("learning", 0.4, 5.0), ("inactive", 0.1, 0.0)],
            ),
        ],
    ),
    (
        "learning",
        &[
            (
                "volunteer_once",
                &[("trying", 0.7, 20.0), ("learning", 0.2, 0.0), ("inactive", 0.1, 0.0)],
            ),
            (
                "wait",
                &[("learning", 0.5, 0.0), ("curious", 0.3, 0.0), ("inactive", 0.2, 0.0)],
            ),
            ("leave", &[("inactive", 1.0, -20.0)]),
        ],
    ),
    (
        "trying",
        &[
            (
                "continue",
                &[("committed", 0.6, 50.0), ("trying", 0.3, 0.0), ("inactive", 0.1, 0.0)],
            ),
            (
                "pause",
                &[("trying", 0.4, 0.0), ("curious", 0.3, 0.0), ("inactive", 0.3, 0.0)],
            ),
            ("quit", &[("inactive", 0.9, -30.0), ("curious", 0.1, 0.0)]),
        ],
    ),
    (
        "committed",
        &[
            (
                "become_leader",
                &[("leader", 0.5, 100.0), ("committed", 0.4, 0.0), ("trying", 0.1, 0.0)],
            ),
            (
                "stay_committed",
                &[("committed", 0.8, 40.0), ("leader", 0.1, 0.0), ("trying", 0.1, 0.0)],
            ),
            (
                "reduce",
                &[("trying", 0.5, 0.0), ("committed", 0.3, 0.0), ("inactive", 0.2, 0.0)],
            ),
        ],
    ),
    (
        "leader",
        &[
            ("mentor", &[("leader", 0.9, 150.0), ("committed", 0.1, 0.0)]),
            ("maintain", &[("leader", 0.85, 120.0), ("committed", 0.15, 0.0)]),
        ],
    ),
    (
        "inactive",
        &[(
            "rejoin",
            &[("curious", 0.4, 0.0), ("learning", 0.3, 0.0), ("inactive", 0.3, 0.0)],
        )],
    ),
];

pub fn volunteer_journey_definition() -> MdpDefinition {
    let states = JOURNEY.iter().map(|(s, _)| StateId::from(*s)).collect();
    let actions = JOURNEY
        .iter()
        .map(|(state, actions)| {
            let specs = actions
                .iter()
                .map(|(name, outcomes)| ActionSpec {
                    name: ActionId::from(*name),
                    outcomes: outcomes
                        .iter()
                        .map(|&(next, probability, reward)| OutcomeSpec {
                            next: StateId::from(next),
                            probability,
                            reward,
                        })
                        .collect(),
                })
                .collect();
            (StateId::from(*state), specs)
        })
        .collect();
    MdpDefinition {
        states,
        terminal: Vec::new(),
        discount: default_discount(),
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_json(probability: f64) -> String {
        format!(
            r#"{{
                "states": ["start", "goal"],
                "terminal": ["goal"],
                "actions": {{
                    "start": [{{"name": "go", "outcomes": [
                        {{"next": "goal", "probability": {probability}, "reward": 1.0}},
                        {{"next": "start", "probability": 0.5}}
                    ]}}]
                }}
            }}"#
        )
    }

    #[test]
    fn volunteer_journey_is_valid() {
        let mdp = Mdp::volunteer_journey().unwrap();
        assert_eq!(mdp.len(), 6);
        assert_eq!(mdp.discount().value(), 0.9);
        let curious = mdp.state_index("curious").unwrap();
        let names: Vec<&str> = mdp.actions(curious).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(names, vec!["attend_orientation", "ignore", "learn_more"]);
        assert!((0..mdp.len()).all(|s| !mdp.is_terminal(s)));
    }

    #[test]
    fn parses_json_with_defaults() {
        let mdp = Mdp::from_json(&chain_json(0.5)).unwrap();
        assert_eq!(mdp.discount().value(), 0.9);
        assert!(mdp.is_terminal(1));
        let go = &mdp.actions(0)[0];
        assert_eq!(go.transitions[1].reward, 0.0);
    }

    #[test]
    fn rejects_distributions_that_do_not_sum_to_one() {
        let err = Mdp::from_json(&chain_json(0.4)).unwrap_err();
        assert!(matches!(err, Error::InvalidDistribution { ref action, .. } if action == "go"));
    }

    #[test]
    fn rejects_unknown_states_and_bad_discount() {
        let mut definition = volunteer_journey_definition();
        definition.terminal.push(StateId::from("retired"));
        assert!(matches!(
            Mdp::from_definition(&definition),
            Err(Error::UnknownState { ref state }) if state == "retired"
        ));

        let mut definition = volunteer_journey_definition();
        definition.discount = 1.0;
        assert!(matches!(
            Mdp::from_definition(&definition),
            Err(Error::InvalidDiscount { .. })
        ));
    }

    #[test]
    fn non_terminal_states_need_actions() {
        let mut definition = volunteer_journey_definition();
        definition.actions.remove(&StateId::from("leader"));
        assert!(matches!(
            Mdp::from_definition(&definition),
            Err(Error::NoActionsAvailable { ref state }) if state == "leader"
        ));
    }

    #[test]
    fn definition_round_trips() {
        let mdp = Mdp::volunteer_journey().unwrap();
        let json = serde_json::to_string(&mdp.to_definition()).unwrap();
        assert_eq!(Mdp::from_json(&json).unwrap(), mdp);
    }
}

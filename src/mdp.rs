//! Markov decision processes: models, value iteration and policy rollouts

pub mod model;
pub mod simulate;
pub mod value_iteration;

pub use model::{Action, ActionSpec, Mdp, MdpDefinition, OutcomeSpec, Transition};
pub use simulate::{
    SimulationConfig, SimulationStep, SimulationStop, Trajectory, TransitionSampling, simulate,
};
pub use value_iteration::{
    Sweep, UpdateMode, ValueIterationConfig, ValueIterationResult, extract_policy, q_value,
    value_iteration,
};

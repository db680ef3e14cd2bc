//! MDP command - Value iteration with optional simulation and CSV export

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{config::CommonConfig, output},
    identifiers::StateId,
    mdp::{
        MdpDefinition, SimulationConfig, TransitionSampling, UpdateMode, ValueIterationConfig,
        simulate, value_iteration,
    },
    scenario::{MdpInput, MdpOutcome, ScenarioOutcome},
};

#[derive(Parser, Debug)]
#[command(about = "Solve an MDP by value iteration")]
pub struct MdpArgs {
    /// JSON model definition (defaults to the built-in volunteer journey)
    #[arg(long, short = 'm')]
    pub model: Option<PathBuf>,

    /// Discount factor overriding the model's
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Convergence threshold on the largest value change per sweep
    #[arg(long, default_value_t = 0.01)]
    pub theta: f64,

    /// Maximum number of sweeps
    #[arg(long, default_value_t = 100)]
    pub max_iterations: usize,

    /// Update mode: sync or in-place
    #[arg(long, default_value = "sync")]
    pub mode: String,

    /// Simulate the greedy policy from this state
    #[arg(long)]
    pub simulate: Option<String>,

    /// Maximum simulation steps
    #[arg(long, default_value_t = 10)]
    pub steps: usize,

    /// Always follow the most likely transition instead of sampling
    #[arg(long)]
    pub most_likely: bool,

    /// States that end the simulation (repeatable)
    #[arg(long = "stop")]
    pub stop_states: Vec<String>,

    /// Write the per-sweep delta history to a CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: MdpArgs, common: &CommonConfig) -> Result<()> {
    let model = match &args.model {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let definition: MdpDefinition = serde_json::from_str(&json)
                .with_context(|| format!("invalid MDP model in {}", path.display()))?;
            Some(definition)
        }
        None => None,
    };
    let builtin = model.is_none();

    let input = MdpInput {
        model,
        discount: args.gamma,
        value_iteration: ValueIterationConfig::default()
            .with_theta(args.theta)
            .with_max_iterations(args.max_iterations)
            .with_mode(args.mode.parse::<UpdateMode>()?),
        ..MdpInput::default()
    };
    let mdp = input.model()?;
    let solution = value_iteration(&mdp, &input.value_iteration)?;

    if let Some(path) = &args.export {
        solution
            .export_history(path)
            .with_context(|| format!("failed to export history to {}", path.display()))?;
        eprintln!("Wrote {} sweeps to {}", solution.history.len(), path.display());
    }

    let trajectory = match &args.simulate {
        Some(start) => {
            let stop_states: Vec<StateId> = if args.stop_states.is_empty() && builtin {
                vec!["leader".into(), "inactive".into()]
            } else {
                args.stop_states.iter().map(|s| StateId::from(s.as_str())).collect()
            };
            let sampling = if args.most_likely {
                TransitionSampling::MostLikely
            } else {
                TransitionSampling::Stochastic
            };
            let mut config = SimulationConfig::default()
                .with_max_steps(args.steps)
                .with_sampling(sampling)
                .with_stop_states(stop_states);
            config.seed = common.seed;
            Some(simulate(&mdp, &solution.policy, start, &config)?)
        }
        None => None,
    };

    let outcome = ScenarioOutcome::Mdp(MdpOutcome {
        solution,
        trajectory,
    });
    output::emit(&outcome, common.format)
}

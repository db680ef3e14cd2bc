//! Scenario selection and dispatch
//!
//! Each algorithm is reachable as a numbered level. A scenario is a plain
//! input record for one algorithm; [`run`] solves it and wraps the result in a
//! [`ScenarioOutcome`] tagged with the algorithm name, so both inputs and
//! outcomes serialize as `{"algorithm": "...", ...}`.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    adversarial::{AlphaBeta, AlphaBetaResult, Difficulty, GameTreeNode, SearchConfig},
    bayes::{BayesNet, Evidence, QueryResult},
    csp::{QueensResult, SolutionMode, Sudoku, SudokuResult, queens},
    error::{Error, Result},
    identifiers::StateId,
    local_search::{HillClimbConfig, HillClimbResult, HillClimber, ObjectiveKind},
    logic::{
        Atom, BackwardConfig, ForwardConfig, ForwardResult, KnowledgeBase, ProofResult, Rule,
        RuleBase, backward_chain, forward_chain,
    },
    mdp::{
        Mdp, MdpDefinition, SimulationConfig, Trajectory, ValueIterationConfig,
        ValueIterationResult, simulate, value_iteration,
    },
    pathfinding::{Cell, Grid, Heuristic, PathFinder, PathResult},
    planning::{BlockState, BlocksPlan, HanoiSolution, PegLabels, blocks, hanoi},
    types::Discount,
    utils::build_rng,
};

/// Every algorithm, in level order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[serde(rename = "astar")]
    AStar,
    AlphaBeta,
    Bayes,
    Hanoi,
    NQueens,
    HillClimbing,
    BackwardChaining,
    BlocksWorld,
    ForwardChaining,
    Mdp,
    Sudoku,
}

impl Algorithm {
    pub const ALL: [Algorithm; 11] = [
        Algorithm::AStar,
        Algorithm::AlphaBeta,
        Algorithm::Bayes,
        Algorithm::Hanoi,
        Algorithm::NQueens,
        Algorithm::HillClimbing,
        Algorithm::BackwardChaining,
        Algorithm::BlocksWorld,
        Algorithm::ForwardChaining,
        Algorithm::Mdp,
        Algorithm::Sudoku,
    ];

    pub const MAX_LEVEL: u32 = Self::ALL.len() as u32;

    /// Level numbers start at 1.
    pub fn from_level(level: u32) -> Result<Self> {
        level
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize))
            .copied()
            .ok_or(Error::InvalidLevel {
                level,
                max: Self::MAX_LEVEL,
            })
    }

    pub fn level(self) -> u32 {
        Self::ALL
            .iter()
            .position(|&a| a == self)
            .map_or(0, |i| i as u32 + 1)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::AStar => "astar",
            Algorithm::AlphaBeta => "alpha_beta",
            Algorithm::Bayes => "bayes",
            Algorithm::Hanoi => "hanoi",
            Algorithm::NQueens => "n_queens",
            Algorithm::HillClimbing => "hill_climbing",
            Algorithm::BackwardChaining => "backward_chaining",
            Algorithm::BlocksWorld => "blocks_world",
            Algorithm::ForwardChaining => "forward_chaining",
            Algorithm::Mdp => "mdp",
            Algorithm::Sudoku => "sudoku",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Algorithm::AStar => "A* shortest path on a weighted grid",
            Algorithm::AlphaBeta => "minimax with alpha-beta pruning and teaching moves",
            Algorithm::Bayes => "exact inference in a small Bayesian network",
            Algorithm::Hanoi => "recursive Tower of Hanoi",
            Algorithm::NQueens => "N-Queens by backtracking",
            Algorithm::HillClimbing => "hill climbing with random restarts",
            Algorithm::BackwardChaining => "goal-directed proof over Horn rules",
            Algorithm::BlocksWorld => "goal-stack planning in Blocks World",
            Algorithm::ForwardChaining => "forward chaining to a fixed point",
            Algorithm::Mdp => "MDP value iteration and policy simulation",
            Algorithm::Sudoku => "Sudoku by backtracking",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let alias = match normalized.as_str() {
            "a*" | "a_star" => Some(Algorithm::AStar),
            "alphabeta" | "minimax" => Some(Algorithm::AlphaBeta),
            "bayes_net" | "bayesian" => Some(Algorithm::Bayes),
            "queens" | "nqueens" => Some(Algorithm::NQueens),
            "hill_climb" | "hillclimbing" => Some(Algorithm::HillClimbing),
            "backward" => Some(Algorithm::BackwardChaining),
            "blocks" => Some(Algorithm::BlocksWorld),
            "forward" => Some(Algorithm::ForwardChaining),
            "value_iteration" => Some(Algorithm::Mdp),
            _ => None,
        };
        alias
            .or_else(|| Self::ALL.into_iter().find(|a| a.as_str() == normalized))
            .ok_or_else(|| Error::ParseAlgorithm {
                input: s.to_string(),
                expected: Self::ALL.map(|a| a.as_str()).join(", "),
            })
    }
}

/// An input record that can be solved on its own.
pub trait Scenario {
    type Output: Serialize;

    fn algorithm(&self) -> Algorithm;

    fn solve(&self) -> Result<Self::Output>;
}

/// A cell with a custom step cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellCost {
    pub cell: Cell,
    pub cost: f64,
}

/// Grid search input. `map` (text rows) takes precedence over `codes`, which
/// takes precedence over an open `width` × `height` grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AStarInput {
    pub width: usize,
    pub height: usize,
    pub map: Option<Vec<String>>,
    pub codes: Option<Vec<Vec<u8>>>,
    pub obstacles: Vec<Cell>,
    pub costs: Vec<CellCost>,
    pub start: Cell,
    pub goals: Vec<Cell>,
    pub heuristic: Heuristic,
}

impl Default for AStarInput {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            map: None,
            codes: None,
            obstacles: Vec::new(),
            costs: Vec::new(),
            start: Cell::new(0, 0),
            goals: vec![Cell::new(9, 9)],
            heuristic: Heuristic::default(),
        }
    }
}

impl AStarInput {
    pub fn grid(&self) -> Result<Grid> {
        let mut grid = match (&self.map, &self.codes) {
            (Some(rows), _) => rows.join("\n").parse::<Grid>()?,
            (None, Some(codes)) => Grid::from_codes(codes)?,
            (None, None) => Grid::new(self.width, self.height)?,
        };
        for &cell in &self.obstacles {
            grid.set_obstacle(cell)?;
        }
        for patch in &self.costs {
            grid.set_cost(patch.cell, patch.cost)?;
        }
        Ok(grid)
    }
}

impl Scenario for AStarInput {
    type Output = PathResult;

    fn algorithm(&self) -> Algorithm {
        Algorithm::AStar
    }

    fn solve(&self) -> Result<PathResult> {
        PathFinder::new(self.heuristic).find_path(&self.grid()?, self.start, &self.goals)
    }
}

/// Game tree input. The tree comes from `tree`, else `leaves`, else a seeded
/// random tree of `random_depth`, else the built-in simple tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaBetaInput {
    pub tree: Option<GameTreeNode>,
    pub leaves: Option<Vec<i64>>,
    pub branching: usize,
    pub random_depth: Option<usize>,
    pub depth: Option<usize>,
    pub difficulty: Difficulty,
    pub seed: Option<u64>,
}

impl Default for AlphaBetaInput {
    fn default() -> Self {
        Self {
            tree: None,
            leaves: None,
            branching: 2,
            random_depth: None,
            depth: None,
            difficulty: Difficulty::default(),
            seed: None,
        }
    }
}

impl AlphaBetaInput {
    pub fn tree(&self) -> Result<GameTreeNode> {
        if let Some(tree) = &self.tree {
            return Ok(tree.clone());
        }
        if let Some(leaves) = &self.leaves {
            return GameTreeNode::from_leaves(leaves, self.branching);
        }
        Ok(match self.random_depth {
            Some(depth) => GameTreeNode::random(&mut build_rng(self.seed), depth, self.branching)?,
            None => GameTreeNode::simple(),
        })
    }
}

impl Scenario for AlphaBetaInput {
    type Output = AlphaBetaResult;

    fn algorithm(&self) -> Algorithm {
        Algorithm::AlphaBeta
    }

    fn solve(&self) -> Result<AlphaBetaResult> {
        let mut config = SearchConfig::default().with_difficulty(self.difficulty);
        config.depth = self.depth;
        Ok(AlphaBeta::new(config).search(&self.tree()?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BayesInput {
    /// Observed values; booleans or strings such as `"yes"` and `"low"`.
    pub evidence: BTreeMap<String, serde_json::Value>,
    /// Extra variable whose posterior should be reported.
    pub marginal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marginal {
    pub variable: String,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BayesOutcome {
    pub evidence: Evidence,
    #[serde(flatten)]
    pub query: QueryResult,
    pub marginal: Option<Marginal>,
}

impl Scenario for BayesInput {
    type Output = BayesOutcome;

    fn algorithm(&self) -> Algorithm {
        Algorithm::Bayes
    }

    fn solve(&self) -> Result<BayesOutcome> {
        let net = BayesNet::community_aid();
        let evidence = Evidence::from_json(&self.evidence)?;
        let query = net.query(&evidence)?;
        let marginal = match &self.marginal {
            Some(variable) => Some(Marginal {
                variable: variable.clone(),
                probability: net.marginal(variable, &evidence)?,
            }),
            None => None,
        };
        Ok(BayesOutcome {
            evidence,
            query,
            marginal,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HanoiInput {
    pub disks: u32,
    pub pegs: PegLabels,
}

impl Default for HanoiInput {
    fn default() -> Self {
        Self {
            disks: 3,
            pegs: PegLabels::default(),
        }
    }
}

impl Scenario for HanoiInput {
    type Output = HanoiSolution;

    fn algorithm(&self) -> Algorithm {
        Algorithm::Hanoi
    }

    fn solve(&self) -> Result<HanoiSolution> {
        hanoi::solve(self.disks, &self.pegs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueensInput {
    pub n: usize,
    pub mode: SolutionMode,
}

impl Default for QueensInput {
    fn default() -> Self {
        Self {
            n: 8,
            mode: SolutionMode::First,
        }
    }
}

impl Scenario for QueensInput {
    type Output = QueensResult;

    fn algorithm(&self) -> Algorithm {
        Algorithm::NQueens
    }

    fn solve(&self) -> Result<QueensResult> {
        queens::solve(self.n, self.mode)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HillClimbInput {
    pub objective: ObjectiveKind,
    /// First climb's starting point; later restarts are random.
    pub start: Option<Vec<f64>>,
    pub config: HillClimbConfig,
}

impl Scenario for HillClimbInput {
    type Output = HillClimbResult;

    fn algorithm(&self) -> Algorithm {
        Algorithm::HillClimbing
    }

    fn solve(&self) -> Result<HillClimbResult> {
        let objective = self.objective.objective();
        HillClimber::new(self.config).run(&*objective, self.start.as_deref())
    }
}

fn knowledge_base(rule_base: RuleBase, facts: Option<&[Atom]>, rules: &[Rule]) -> Result<KnowledgeBase> {
    let mut kb = KnowledgeBase::new(rule_base.rules()?);
    for rule in rules {
        kb.add_rule(rule.clone());
    }
    match facts {
        Some(facts) => kb.with_facts(facts.iter().cloned()),
        None => kb.with_facts(rule_base.default_facts()),
    }
}

/// Backward chaining input. Missing facts and goal fall back to the rule
/// base's defaults; `rules` are appended to the built-in ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackwardInput {
    pub rule_base: RuleBase,
    pub facts: Option<Vec<Atom>>,
    pub rules: Vec<Rule>,
    pub goal: Option<Atom>,
    pub max_depth: usize,
}

impl Default for BackwardInput {
    fn default() -> Self {
        Self {
            rule_base: RuleBase::default(),
            facts: None,
            rules: Vec::new(),
            goal: None,
            max_depth: BackwardConfig::default().max_depth,
        }
    }
}

impl Scenario for BackwardInput {
    type Output = ProofResult;

    fn algorithm(&self) -> Algorithm {
        Algorithm::BackwardChaining
    }

    fn solve(&self) -> Result<ProofResult> {
        let kb = knowledge_base(self.rule_base, self.facts.as_deref(), &self.rules)?;
        let goal = self
            .goal
            .clone()
            .unwrap_or_else(|| self.rule_base.default_goal());
        let config = BackwardConfig::default().with_max_depth(self.max_depth);
        Ok(backward_chain(&kb, &goal, config))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardInput {
    pub rule_base: RuleBase,
    pub facts: Option<Vec<Atom>>,
    pub rules: Vec<Rule>,
    pub max_iterations: usize,
}

impl Default for ForwardInput {
    fn default() -> Self {
        Self {
            rule_base: RuleBase::default(),
            facts: None,
            rules: Vec::new(),
            max_iterations: ForwardConfig::default().max_iterations,
        }
    }
}

impl Scenario for ForwardInput {
    type Output = ForwardResult;

    fn algorithm(&self) -> Algorithm {
        Algorithm::ForwardChaining
    }

    fn solve(&self) -> Result<ForwardResult> {
        let kb = knowledge_base(self.rule_base, self.facts.as_deref(), &self.rules)?;
        let config = ForwardConfig::default().with_max_iterations(self.max_iterations);
        Ok(forward_chain(&kb, config))
    }
}

/// Blocks World input; both states default to the built-in problem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlocksInput {
    pub initial: Option<BlockState>,
    pub goal: Option<BlockState>,
}

impl Scenario for BlocksInput {
    type Output = BlocksPlan;

    fn algorithm(&self) -> Algorithm {
        Algorithm::BlocksWorld
    }

    fn solve(&self) -> Result<BlocksPlan> {
        let (default_initial, default_goal) = blocks::default_problem();
        let initial = self.initial.as_ref().unwrap_or(&default_initial);
        let goal = self.goal.as_ref().unwrap_or(&default_goal);
        blocks::plan(initial, goal)
    }
}

/// State where journeys through the built-in model begin.
pub const JOURNEY_START: &str = "curious";

/// MDP input. Without a `model` the built-in volunteer journey is used and,
/// unless told otherwise, simulated from [`JOURNEY_START`] until it reaches
/// `leader` or `inactive`. Custom models are only simulated when `start` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdpInput {
    pub model: Option<MdpDefinition>,
    /// Overrides the model's discount factor.
    pub discount: Option<f64>,
    pub value_iteration: ValueIterationConfig,
    pub start: Option<StateId>,
    pub simulation: Option<SimulationConfig>,
    pub seed: Option<u64>,
}

impl MdpInput {
    pub fn model(&self) -> Result<Mdp> {
        let mdp = match &self.model {
            Some(definition) => Mdp::from_definition(definition)?,
            None => Mdp::volunteer_journey()?,
        };
        Ok(match self.discount {
            Some(discount) => mdp.with_discount(Discount::new(discount)?),
            None => mdp,
        })
    }

    fn simulation_plan(&self) -> Option<(StateId, SimulationConfig)> {
        let builtin = self.model.is_none();
        let start = self
            .start
            .clone()
            .or_else(|| builtin.then(|| StateId::from(JOURNEY_START)))?;
        let mut config = self.simulation.clone().unwrap_or_else(|| {
            let config = SimulationConfig::default().with_max_steps(8);
            if builtin {
                config.with_stop_states(["leader", "inactive"])
            } else {
                config
            }
        });
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Some((start, config))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MdpOutcome {
    #[serde(flatten)]
    pub solution: ValueIterationResult,
    pub trajectory: Option<Trajectory>,
}

impl Scenario for MdpInput {
    type Output = MdpOutcome;

    fn algorithm(&self) -> Algorithm {
        Algorithm::Mdp
    }

    fn solve(&self) -> Result<MdpOutcome> {
        let mdp = self.model()?;
        let solution = value_iteration(&mdp, &self.value_iteration)?;
        let trajectory = match self.simulation_plan() {
            Some((start, config)) => Some(simulate(&mdp, &solution.policy, start.as_str(), &config)?),
            None => None,
        };
        Ok(MdpOutcome {
            solution,
            trajectory,
        })
    }
}

const DEFAULT_SUDOKU: &str = "
    53..7....
    6..195...
    .98....6.
    8...6...3
    4..8.3..1
    7...2...6
    .6....28.
    ...419..5
    ....8..79";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SudokuInput {
    pub puzzle: Sudoku,
}

impl Default for SudokuInput {
    fn default() -> Self {
        let puzzle = DEFAULT_SUDOKU
            .parse()
            .unwrap_or_else(|_| Sudoku::default());
        Self { puzzle }
    }
}

impl Scenario for SudokuInput {
    type Output = SudokuResult;

    fn algorithm(&self) -> Algorithm {
        Algorithm::Sudoku
    }

    fn solve(&self) -> Result<SudokuResult> {
        Ok(self.puzzle.solve())
    }
}

/// A scenario for any algorithm, tagged by algorithm name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum ScenarioInput {
    #[serde(rename = "astar")]
    AStar(AStarInput),
    AlphaBeta(AlphaBetaInput),
    Bayes(BayesInput),
    Hanoi(HanoiInput),
    NQueens(QueensInput),
    HillClimbing(HillClimbInput),
    BackwardChaining(BackwardInput),
    BlocksWorld(BlocksInput),
    ForwardChaining(ForwardInput),
    Mdp(MdpInput),
    Sudoku(SudokuInput),
}

impl ScenarioInput {
    /// The default scenario for `algorithm`.
    pub fn defaults(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::AStar => ScenarioInput::AStar(AStarInput::default()),
            Algorithm::AlphaBeta => ScenarioInput::AlphaBeta(AlphaBetaInput::default()),
            Algorithm::Bayes => ScenarioInput::Bayes(BayesInput::default()),
            Algorithm::Hanoi => ScenarioInput::Hanoi(HanoiInput::default()),
            Algorithm::NQueens => ScenarioInput::NQueens(QueensInput::default()),
            Algorithm::HillClimbing => ScenarioInput::HillClimbing(HillClimbInput::default()),
            Algorithm::BackwardChaining => ScenarioInput::BackwardChaining(BackwardInput::default()),
            Algorithm::BlocksWorld => ScenarioInput::BlocksWorld(BlocksInput::default()),
            Algorithm::ForwardChaining => ScenarioInput::ForwardChaining(ForwardInput::default()),
            Algorithm::Mdp => ScenarioInput::Mdp(MdpInput::default()),
            Algorithm::Sudoku => ScenarioInput::Sudoku(SudokuInput::default()),
        }
    }

    /// Parse an untagged input record for a known algorithm.
    pub fn from_record(algorithm: Algorithm, json: &str) -> Result<Self> {
        Ok(match algorithm {
            Algorithm::AStar => ScenarioInput::AStar(serde_json::from_str(json)?),
            Algorithm::AlphaBeta => ScenarioInput::AlphaBeta(serde_json::from_str(json)?),
            Algorithm::Bayes => ScenarioInput::Bayes(serde_json::from_str(json)?),
            Algorithm::Hanoi => ScenarioInput::Hanoi(serde_json::from_str(json)?),
            Algorithm::NQueens => ScenarioInput::NQueens(serde_json::from_str(json)?),
            Algorithm::HillClimbing => ScenarioInput::HillClimbing(serde_json::from_str(json)?),
            Algorithm::BackwardChaining => {
                ScenarioInput::BackwardChaining(serde_json::from_str(json)?)
            }
            Algorithm::BlocksWorld => ScenarioInput::BlocksWorld(serde_json::from_str(json)?),
            Algorithm::ForwardChaining => {
                ScenarioInput::ForwardChaining(serde_json::from_str(json)?)
            }
            Algorithm::Mdp => ScenarioInput::Mdp(serde_json::from_str(json)?),
            Algorithm::Sudoku => ScenarioInput::Sudoku(serde_json::from_str(json)?),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            ScenarioInput::AStar(input) => input.algorithm(),
            ScenarioInput::AlphaBeta(input) => input.algorithm(),
            ScenarioInput::Bayes(input) => input.algorithm(),
            ScenarioInput::Hanoi(input) => input.algorithm(),
            ScenarioInput::NQueens(input) => input.algorithm(),
            ScenarioInput::HillClimbing(input) => input.algorithm(),
            ScenarioInput::BackwardChaining(input) => input.algorithm(),
            ScenarioInput::BlocksWorld(input) => input.algorithm(),
            ScenarioInput::ForwardChaining(input) => input.algorithm(),
            ScenarioInput::Mdp(input) => input.algorithm(),
            ScenarioInput::Sudoku(input) => input.algorithm(),
        }
    }

    /// Seed every random source the scenario uses. Deterministic scenarios
    /// are returned unchanged.
    pub fn with_seed(mut self, seed: u64) -> Self {
        match &mut self {
            ScenarioInput::AlphaBeta(input) => input.seed = Some(seed),
            ScenarioInput::HillClimbing(input) => input.config.seed = Some(seed),
            ScenarioInput::Mdp(input) => input.seed = Some(seed),
            _ => {}
        }
        self
    }
}

/// Solved scenario, tagged like its input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    #[serde(rename = "astar")]
    AStar(PathResult),
    AlphaBeta(AlphaBetaResult),
    Bayes(BayesOutcome),
    Hanoi(HanoiSolution),
    NQueens(QueensResult),
    HillClimbing(HillClimbResult),
    BackwardChaining(ProofResult),
    BlocksWorld(BlocksPlan),
    ForwardChaining(ForwardResult),
    Mdp(MdpOutcome),
    Sudoku(SudokuResult),
}

impl ScenarioOutcome {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            ScenarioOutcome::AStar(_) => Algorithm::AStar,
            ScenarioOutcome::AlphaBeta(_) => Algorithm::AlphaBeta,
            ScenarioOutcome::Bayes(_) => Algorithm::Bayes,
            ScenarioOutcome::Hanoi(_) => Algorithm::Hanoi,
            ScenarioOutcome::NQueens(_) => Algorithm::NQueens,
            ScenarioOutcome::HillClimbing(_) => Algorithm::HillClimbing,
            ScenarioOutcome::BackwardChaining(_) => Algorithm::BackwardChaining,
            ScenarioOutcome::BlocksWorld(_) => Algorithm::BlocksWorld,
            ScenarioOutcome::ForwardChaining(_) => Algorithm::ForwardChaining,
            ScenarioOutcome::Mdp(_) => Algorithm::Mdp,
            ScenarioOutcome::Sudoku(_) => Algorithm::Sudoku,
        }
    }
}

/// Solve any scenario.
pub fn run(input: &ScenarioInput) -> Result<ScenarioOutcome> {
    info!(algorithm = %input.algorithm(), level = input.algorithm().level(), "running scenario");
    Ok(match input {
        ScenarioInput::AStar(input) => ScenarioOutcome::AStar(input.solve()?),
        ScenarioInput::AlphaBeta(input) => ScenarioOutcome::AlphaBeta(input.solve()?),
        ScenarioInput::Bayes(input) => ScenarioOutcome::Bayes(input.solve()?),
        ScenarioInput::Hanoi(input) => ScenarioOutcome::Hanoi(input.solve()?),
        ScenarioInput::NQueens(input) => ScenarioOutcome::NQueens(input.solve()?),
        ScenarioInput::HillClimbing(input) => ScenarioOutcome::HillClimbing(input.solve()?),
        ScenarioInput::BackwardChaining(input) => {
            ScenarioOutcome::BackwardChaining(input.solve()?)
        }
        ScenarioInput::BlocksWorld(input) => ScenarioOutcome::BlocksWorld(input.solve()?),
        ScenarioInput::ForwardChaining(input) => ScenarioOutcome::ForwardChaining(input.solve()?),
        ScenarioInput::Mdp(input) => ScenarioOutcome::Mdp(input.solve()?),
        ScenarioInput::Sudoku(input) => ScenarioOutcome::Sudoku(input.solve()?),
    })
}

/// Run the default scenario of a level.
pub fn run_level(level: u32) -> Result<ScenarioOutcome> {
    run(&ScenarioInput::defaults(Algorithm::from_level(level)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_algorithms() {
        assert_eq!(Algorithm::from_level(1).unwrap(), Algorithm::AStar);
        assert_eq!(Algorithm::from_level(11).unwrap(), Algorithm::Sudoku);
        for algorithm in Algorithm::ALL {
            assert_eq!(Algorithm::from_level(algorithm.level()).unwrap(), algorithm);
        }
        assert!(matches!(
            Algorithm::from_level(0),
            Err(Error::InvalidLevel { level: 0, max: 11 })
        ));
        assert!(matches!(
            Algorithm::from_level(12),
            Err(Error::InvalidLevel { level: 12, .. })
        ));
    }

    #[test]
    fn algorithm_names_parse_case_insensitively() {
        assert_eq!("A*".parse::<Algorithm>().unwrap(), Algorithm::AStar);
        assert_eq!("Hill-Climbing".parse::<Algorithm>().unwrap(), Algorithm::HillClimbing);
        assert_eq!("N_QUEENS".parse::<Algorithm>().unwrap(), Algorithm::NQueens);
        assert!(matches!(
            "chess".parse::<Algorithm>(),
            Err(Error::ParseAlgorithm { .. })
        ));
    }

    #[test]
    fn default_astar_scenario_crosses_the_grid() {
        let ScenarioOutcome::AStar(result) = run_level(1).unwrap() else {
            panic!("wrong outcome");
        };
        assert_eq!(result.path.len(), 19);
        assert_eq!(result.cost, 18.0);
    }

    #[test]
    fn default_hanoi_scenario_takes_seven_moves() {
        let ScenarioOutcome::Hanoi(solution) = run_level(4).unwrap() else {
            panic!("wrong outcome");
        };
        assert_eq!(solution.total_moves, 7);
    }

    #[test]
    fn tagged_inputs_parse() {
        let input: ScenarioInput =
            serde_json::from_str(r#"{"algorithm": "n_queens", "n": 4, "mode": "all"}"#).unwrap();
        assert_eq!(input.algorithm(), Algorithm::NQueens);
        let ScenarioOutcome::NQueens(result) = run(&input).unwrap() else {
            panic!("wrong outcome");
        };
        assert_eq!(result.solutions.len(), 2);
    }

    #[test]
    fn records_parse_for_a_chosen_algorithm() {
        let input = ScenarioInput::from_record(Algorithm::Hanoi, r#"{"disks": 4}"#).unwrap();
        assert_eq!(
            input,
            ScenarioInput::Hanoi(HanoiInput {
                disks: 4,
                pegs: PegLabels::default()
            })
        );
        assert!(ScenarioInput::from_record(Algorithm::Hanoi, r#"{"disks": "four"}"#).is_err());
    }

    #[test]
    fn builtin_mdp_simulates_the_journey() {
        let input = ScenarioInput::defaults(Algorithm::Mdp).with_seed(3);
        let ScenarioOutcome::Mdp(outcome) = run(&input).unwrap() else {
            panic!("wrong outcome");
        };
        assert!(outcome.solution.converged);
        let trajectory = outcome.trajectory.unwrap();
        assert_eq!(trajectory.start, JOURNEY_START);
        assert!(trajectory.steps.len() <= 8);
    }

    #[test]
    fn default_sudoku_is_solvable() {
        let ScenarioOutcome::Sudoku(result) = run_level(11).unwrap() else {
            panic!("wrong outcome");
        };
        assert!(result.solution.is_some_and(|s| s.is_complete()));
    }

    #[test]
    fn outcomes_serialize_with_algorithm_tag() {
        let outcome = run_level(3).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["algorithm"], "bayes");
        assert!(json["probability"].as_f64().is_some());
    }
}

//! Minimax with alpha-beta pruning and an optional teaching mode
//!
//! In teaching mode the maximizing player deliberately takes its second-best
//! move at selected remaining depths, until a fixed mistake budget is spent.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::tree::GameTreeNode;
use crate::error::{Error, Result};

/// Difficulty presets for teaching mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Up to two mistakes at remaining depths 2 and 1.
    Tutorial,
    /// One mistake at remaining depth 1.
    #[default]
    Learning,
    /// Perfect play.
    Expert,
}

impl Difficulty {
    pub fn teaching_policy(self) -> Option<TeachingPolicy> {
        match self {
            Difficulty::Tutorial => Some(TeachingPolicy::new(vec![2, 1], 2)),
            Difficulty::Learning => Some(TeachingPolicy::new(vec![1], 1)),
            Difficulty::Expert => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Tutorial => "tutorial",
            Difficulty::Learning => "learning",
            Difficulty::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tutorial" => Ok(Difficulty::Tutorial),
            "learning" => Ok(Difficulty::Learning),
            "expert" => Ok(Difficulty::Expert),
            _ => Err(Error::InvalidConfiguration {
                message: format!(
                    "unknown difficulty '{s}' (expected tutorial, learning or expert)"
                ),
            }),
        }
    }
}

/// Where and how often teaching mode may play a sub-optimal move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeachingPolicy {
    /// Remaining search depths at which a substitution may happen.
    pub depths: Vec<usize>,
    /// Maximum number of substitutions per search.
    pub mistake_budget: usize,
}

impl TeachingPolicy {
    pub fn new(depths: Vec<usize>, mistake_budget: usize) -> Self {
        Self {
            depths,
            mistake_budget,
        }
    }
}

/// Search settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchConfig {
    /// Depth limit; `None` searches the whole tree.
    pub depth: Option<usize>,
    /// Teaching mode; `None` disables it.
    pub teaching: Option<TeachingPolicy>,
}

impl SearchConfig {
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_teaching(mut self, teaching: TeachingPolicy) -> Self {
        self.teaching = Some(teaching);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.teaching = difficulty.teaching_policy();
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub nodes_visited: usize,
    /// Siblings skipped by cutoffs; each skipped subtree counts once.
    pub nodes_pruned: usize,
    pub cutoffs: usize,
}

/// A deliberate second-best choice made in teaching mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitution {
    /// Remaining depth at the node where it happened.
    pub depth: usize,
    pub chosen: i64,
    pub optimal: i64,
    /// Index of the child that was played.
    pub child: usize,
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at depth {} chose {} instead of optimal {}",
            self.depth, self.chosen, self.optimal
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlphaBetaResult {
    /// Backed-up value at the root.
    pub value: i64,
    /// Index of the root child that produced `value`; `None` for a leaf root.
    pub best_move: Option<usize>,
    pub stats: SearchStats,
    pub substitutions: Vec<Substitution>,
}

/// Accumulator threaded through one search.
struct SearchTrace<'a> {
    teaching: Option<&'a TeachingPolicy>,
    stats: SearchStats,
    substitutions: Vec<Substitution>,
}

impl SearchTrace<'_> {
    fn wants_mistake(&self, depth: usize) -> bool {
        self.teaching.is_some_and(|policy| {
            policy.depths.contains(&depth) && self.substitutions.len() < policy.mistake_budget
        })
    }
}

/// Alpha-beta searcher.
///
/// ```
/// use kindness::adversarial::{AlphaBeta, GameTreeNode, SearchConfig};
///
/// let result = AlphaBeta::new(SearchConfig::default()).search(&GameTreeNode::simple());
/// assert_eq!(result.value, 8);
/// assert_eq!(result.stats.nodes_pruned, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AlphaBeta {
    config: SearchConfig,
}

impl AlphaBeta {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn search(&self, root: &GameTreeNode) -> AlphaBetaResult {
        let depth = self.config.depth.unwrap_or_else(|| root.height());
        let mut trace = SearchTrace {
            teaching: self.config.teaching.as_ref(),
            stats: SearchStats::default(),
            substitutions: Vec::new(),
        };
        let (value, best_move) = alphabeta(root, depth, i64::MIN, i64::MAX, &mut trace);
        info!(
            value,
            nodes_visited = trace.stats.nodes_visited,
            nodes_pruned = trace.stats.nodes_pruned,
            substitutions = trace.substitutions.len(),
            "alpha-beta search finished"
        );
        AlphaBetaResult {
            value,
            best_move,
            stats: trace.stats,
            substitutions: trace.substitutions,
        }
    }
}

fn alphabeta(
    node: &GameTreeNode,
    depth: usize,
    mut alpha: i64,
    mut beta: i64,
    trace: &mut SearchTrace<'_>,
) -> (i64, Option<usize>) {
    trace.stats.nodes_visited += 1;

    let (player, children) = match node {
        GameTreeNode::Branch {
            player, children, ..
        } if depth > 0 && !children.is_empty() => (*player, children),
        _ => return (node.static_value(), None),
    };

    if player.is_max() && children.len() > 1 && trace.wants_mistake(depth) {
        return teaching_choice(children, depth, trace);
    }

    let mut best: Option<(i64, usize)> = None;
    for (index, child) in children.iter().enumerate() {
        let (value, _) = alphabeta(child, depth - 1, alpha, beta, trace);
        let improves = match best {
            None => true,
            Some((current, _)) if player.is_max() => value > current,
            Some((current, _)) => value < current,
        };
        if improves {
            best = Some((value, index));
        }
        if let Some((current, _)) = best {
            if player.is_max() {
                alpha = alpha.max(current);
            } else {
                beta = beta.min(current);
            }
        }
        if beta <= alpha {
            let skipped = children.len() - index - 1;
            if skipped > 0 {
                trace.stats.nodes_pruned += skipped;
                trace.stats.cutoffs += 1;
                debug!(depth, alpha, beta, skipped, %player, "cutoff");
            }
            break;
        }
    }

    match best {
        Some((value, index)) => (value, Some(index)),
        None => (node.static_value(), None),
    }
}

/// Evaluate every child exactly and play the second best when it differs
/// from the best.
fn teaching_choice(
    children: &[GameTreeNode],
    depth: usize,
    trace: &mut SearchTrace<'_>,
) -> (i64, Option<usize>) {
    let values: Vec<i64> = children
        .iter()
        .map(|child| alphabeta(child, depth - 1, i64::MIN, i64::MAX, trace).0)
        .collect();
    let mut ranked: Vec<usize> = (0..values.len()).collect();
    ranked.sort_by(|a, b| values[*b].cmp(&values[*a]));

    let (best, second) = (ranked[0], ranked[1]);
    // Deeper teaching nodes may have spent the budget meanwhile.
    if values[second] < values[best] && trace.wants_mistake(depth) {
        let substitution = Substitution {
            depth,
            chosen: values[second],
            optimal: values[best],
            child: second,
        };
        debug!(%substitution, "teaching substitution");
        trace.substitutions.push(substitution);
        (values[second], Some(second))
    } else {
        (values[best], Some(best))
    }
}

/// Plain minimax without pruning, for checking [`AlphaBeta`] results.
pub fn minimax(node: &GameTreeNode, depth: Option<usize>) -> i64 {
    fn go(node: &GameTreeNode, depth: usize) -> i64 {
        match node {
            GameTreeNode::Branch {
                player, children, ..
            } if depth > 0 && !children.is_empty() => {
                let values = children.iter().map(|c| go(c, depth - 1));
                if player.is_max() {
                    values.max().unwrap_or_default()
                } else {
                    values.min().unwrap_or_default()
                }
            }
            _ => node.static_value(),
        }
    }
    go(node, depth.unwrap_or_else(|| node.height()))
}

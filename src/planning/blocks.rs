//! Blocks World planning with a goal stack built bottom-up
//!
//! A block is *settled* when it rests where its goal wants it (or anywhere, if
//! it has no goal) and everything beneath it is settled as well. The planner
//! first moves every unsettled block off its tower onto the table, then builds
//! goal towers from the bottom so a settled block is only disturbed when a
//! goal-free block must be cleared off a goal support.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// What a block rests on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Support {
    Table,
    Block(String),
}

impl Support {
    pub fn block(name: impl Into<String>) -> Self {
        Support::Block(name.into())
    }
}

impl From<String> for Support {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("table") {
            Support::Table
        } else {
            Support::Block(value)
        }
    }
}

impl From<&str> for Support {
    fn from(value: &str) -> Self {
        Support::from(value.to_string())
    }
}

impl From<Support> for String {
    fn from(support: Support) -> Self {
        support.to_string()
    }
}

impl fmt::Display for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Support::Table => f.write_str("table"),
            Support::Block(name) => f.write_str(name),
        }
    }
}

/// Block positions keyed by block name.
pub type BlockState = BTreeMap<String, Support>;

/// `move(block, from, to)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMove {
    pub block: String,
    pub from: Support,
    pub to: Support,
}

impl fmt::Display for BlockMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "move {} from {} to {}", self.block, self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlocksPlan {
    pub moves: Vec<BlockMove>,
    pub final_state: BlockState,
}

impl BlocksPlan {
    pub fn steps(&self) -> usize {
        self.moves.len()
    }
}

/// The default exercise: A, B and C on the table, build C on B on A.
pub fn default_problem() -> (BlockState, BlockState) {
    let initial = ["A", "B", "C"]
        .into_iter()
        .map(|b| (b.to_string(), Support::Table))
        .collect();
    let goal = [("A", Support::Table), ("B", Support::block("A")), ("C", Support::block("B"))]
        .into_iter()
        .map(|(b, s)| (b.to_string(), s))
        .collect();
    (initial, goal)
}

fn invalid(message: String) -> Error {
    Error::InvalidBlocks { message }
}

/// Check that supports exist, no block carries two blocks and there are no cycles.
fn validate_arrangement(blocks: &BlockState, arrangement: &BlockState, what: &str) -> Result<()> {
    let mut occupied: BTreeMap<&str, &str> = BTreeMap::new();
    for (block, support) in arrangement {
        if !blocks.contains_key(block) {
            return Err(invalid(format!("{what} mentions unknown block '{block}'")));
        }
        if let Support::Block(below) = support {
            if below == block {
                return Err(invalid(format!("{what}: block '{block}' is on itself")));
            }
            if !blocks.contains_key(below) {
                return Err(invalid(format!(
                    "{what}: block '{block}' rests on unknown block '{below}'"
                )));
            }
            if let Some(other) = occupied.insert(below, block) {
                return Err(invalid(format!(
                    "{what}: blocks '{other}' and '{block}' are both on '{below}'"
                )));
            }
        }
    }
    for start in arrangement.keys() {
        let mut current = start;
        for _ in 0..=arrangement.len() {
            match arrangement.get(current) {
                Some(Support::Block(below)) => current = below,
                _ => break,
            }
            if current == start {
                return Err(invalid(format!("{what}: tower through '{start}' is cyclic")));
            }
        }
    }
    Ok(())
}

struct Planner<'a> {
    state: BlockState,
    goal: &'a BlockState,
    moves: Vec<BlockMove>,
}

impl Planner<'_> {
    fn is_clear(&self, block: &str) -> bool {
        !self
            .state
            .values()
            .any(|s| matches!(s, Support::Block(b) if b == block))
    }

    fn block_on(&self, block: &str) -> Option<&str> {
        self.state.iter().find_map(|(name, s)| match s {
            Support::Block(b) if b == block => Some(name.as_str()),
            _ => None,
        })
    }

    fn is_settled(&self, block: &str) -> bool {
        let mut current = block;
        // Arrangements are acyclic, so walking down terminates.
        loop {
            let Some(support) = self.state.get(current) else {
                return false;
            };
            if let Some(wanted) = self.goal.get(current)
                && wanted != support
            {
                return false;
            }
            match support {
                Support::Table => return true,
                Support::Block(below) => current = below,
            }
        }
    }

    fn apply(&mut self, block: &str, to: Support) {
        let from = self
            .state
            .insert(block.to_string(), to.clone())
            .unwrap_or(Support::Table);
        let mv = BlockMove {
            block: block.to_string(),
            from,
            to,
        };
        debug!(%mv, "planned");
        self.moves.push(mv);
    }

    /// One planning step; `false` once every goal is settled.
    fn step(&mut self) -> Result<bool> {
        let blocks: Vec<String> = self.state.keys().cloned().collect();

        let teardown = blocks.iter().find(|b| {
            !self.is_settled(b) && self.state.get(*b) != Some(&Support::Table) && self.is_clear(b)
        });
        if let Some(block) = teardown.cloned() {
            self.apply(&block, Support::Table);
            return Ok(true);
        }

        if blocks.iter().all(|b| self.is_settled(b)) {
            return Ok(false);
        }

        let build = blocks.iter().find_map(|b| match self.goal.get(b) {
            Some(Support::Block(target)) if !self.is_settled(b) && self.is_settled(target) => {
                Some((b.clone(), target.clone()))
            }
            _ => None,
        });
        let Some((block, target)) = build else {
            return Err(invalid("no applicable move; goal configuration is unreachable".into()));
        };

        // Clear the target tower from the top down before stacking.
        let mut top = target.clone();
        while let Some(above) = self.block_on(&top) {
            top = above.to_string();
        }
        if top == target {
            self.apply(&block, Support::Block(target));
        } else {
            self.apply(&top, Support::Table);
        }
        Ok(true)
    }
}

/// Plan moves from `initial` to a state satisfying every entry of `goal`.
///
/// Blocks missing from `goal` may end up anywhere.
///
/// # Errors
///
/// [`Error::InvalidBlocks`] for unknown blocks, two blocks on one block, or cycles.
pub fn plan(initial: &BlockState, goal: &BlockState) -> Result<BlocksPlan> {
    validate_arrangement(initial, initial, "initial state")?;
    validate_arrangement(initial, goal, "goal")?;

    let mut planner = Planner {
        state: initial.clone(),
        goal,
        moves: Vec::new(),
    };
    let limit = 2 * initial.len() * (initial.len() + 1) + 1;
    while planner.step()? {
        if planner.moves.len() > limit {
            return Err(invalid(format!("plan exceeded {limit} moves")));
        }
    }
    info!(moves = planner.moves.len(), "blocks world plan complete");
    Ok(BlocksPlan {
        moves: planner.moves,
        final_state: planner.state,
    })
}

/// Execute `moves` from `initial`, checking STRIPS preconditions: the block is
/// clear, sits on `from`, and `to` is clear or the table.
pub fn execute(initial: &BlockState, moves: &[BlockMove]) -> Result<BlockState> {
    validate_arrangement(initial, initial, "initial state")?;
    let mut planner = Planner {
        state: initial.clone(),
        goal: &BTreeMap::new(),
        moves: Vec::new(),
    };
    for (index, mv) in moves.iter().enumerate() {
        let fail = |reason: String| Error::IllegalMove { index, reason };
        match planner.state.get(&mv.block) {
            None => return Err(fail(format!("unknown block '{}'", mv.block))),
            Some(at) if *at != mv.from => {
                return Err(fail(format!("{} is on {at}, not {}", mv.block, mv.from)));
            }
            _ => {}
        }
        if !planner.is_clear(&mv.block) {
            return Err(fail(format!("{} is not clear", mv.block)));
        }
        if let Support::Block(target) = &mv.to {
            if target == &mv.block || !planner.state.contains_key(target) {
                return Err(fail(format!("cannot stack {} on {target}", mv.block)));
            }
            if !planner.is_clear(target) {
                return Err(fail(format!("{target} is not clear")));
            }
        }
        planner.apply(&mv.block, mv.to.clone());
    }
    Ok(planner.state)
}

/// True when every goal entry holds in `state`.
pub fn satisfies(state: &BlockState, goal: &BlockState) -> bool {
    goal.iter().all(|(block, support)| state.get(block) == Some(support))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(entries: &[(&str, &str)]) -> BlockState {
        entries
            .iter()
            .map(|(b, s)| (b.to_string(), Support::from(*s)))
            .collect()
    }

    #[test]
    fn default_problem_builds_tower_in_two_moves() {
        let (initial, goal) = default_problem();
        let result = plan(&initial, &goal).unwrap();
        assert_eq!(
            result.moves,
            vec![
                BlockMove { block: "B".into(), from: Support::Table, to: Support::block("A") },
                BlockMove { block: "C".into(), from: Support::Table, to: Support::block("B") },
            ]
        );
        assert!(satisfies(&result.final_state, &goal));
    }

    #[test]
    fn sussman_anomaly_is_solved_optimally() {
        let initial = state(&[("A", "table"), ("B", "table"), ("C", "A")]);
        let goal = state(&[("A", "B"), ("B", "C")]);
        let result = plan(&initial, &goal).unwrap();
        assert_eq!(result.steps(), 3);
        let end = execute(&initial, &result.moves).unwrap();
        assert!(satisfies(&end, &goal));
    }

    #[test]
    fn already_satisfied_goal_needs_no_moves() {
        let initial = state(&[("A", "table"), ("B", "A")]);
        let result = plan(&initial, &state(&[("B", "A")])).unwrap();
        assert!(result.moves.is_empty());
    }

    #[test]
    fn goal_free_block_is_cleared_off_a_support() {
        let initial = state(&[("A", "table"), ("B", "table"), ("D", "A")]);
        let goal = state(&[("B", "A")]);
        let result = plan(&initial, &goal).unwrap();
        let end = execute(&initial, &result.moves).unwrap();
        assert!(satisfies(&end, &goal));
        assert_eq!(end.get("D"), Some(&Support::Table));
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        let two_on_one = state(&[("A", "table"), ("B", "A"), ("C", "A")]);
        assert!(matches!(plan(&two_on_one, &BlockState::new()), Err(Error::InvalidBlocks { .. })));

        let cyclic = state(&[("A", "B"), ("B", "A")]);
        assert!(matches!(plan(&cyclic, &BlockState::new()), Err(Error::InvalidBlocks { .. })));

        let initial = state(&[("A", "table")]);
        assert!(plan(&initial, &state(&[("Z", "table")])).is_err());
        assert!(plan(&initial, &state(&[("A", "Z")])).is_err());
    }

    #[test]
    fn execute_checks_preconditions() {
        let initial = state(&[("A", "table"), ("B", "A")]);
        let blocked = vec![BlockMove { block: "A".into(), from: Support::Table, to: Support::Table }];
        assert!(matches!(execute(&initial, &blocked), Err(Error::IllegalMove { index: 0, .. })));
    }

    #[test]
    fn supports_deserialize_from_strings() {
        let parsed: BlockState = serde_json::from_str(r#"{"A": "table", "B": "A"}"#).unwrap();
        assert_eq!(parsed, state(&[("A", "table"), ("B", "A")]));
    }
}

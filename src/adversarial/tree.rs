//! Game trees for minimax search

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest leaf count a random tree may have.
pub const MAX_RANDOM_LEAVES: usize = 1 << 16;

/// Side to move at an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Player {
    Max,
    Min,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Max => Player::Min,
            Player::Min => Player::Max,
        }
    }

    pub fn is_max(self) -> bool {
        self == Player::Max
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Max => write!(f, "MAX"),
            Player::Min => write!(f, "MIN"),
        }
    }
}

/// A node of a game tree.
///
/// JSON form: `{"leaf": 3}` or
/// `{"branch": {"player": "max", "children": [...]}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameTreeNode {
    Leaf(i64),
    Branch {
        player: Player,
        children: Vec<GameTreeNode>,
        /// Static evaluation used when the search depth runs out here.
        #[serde(default)]
        estimate: i64,
    },
}

impl GameTreeNode {
    pub fn leaf(value: i64) -> Self {
        GameTreeNode::Leaf(value)
    }

    pub fn branch(player: Player, children: Vec<GameTreeNode>) -> Self {
        GameTreeNode::Branch {
            player,
            children,
            estimate: 0,
        }
    }

    /// The fixed two-level tree `MAX(MIN(10, 8), MIN(4, 50))`.
    pub fn simple() -> Self {
        let min = |a, b| GameTreeNode::branch(Player::Min, vec![Self::leaf(a), Self::leaf(b)]);
        GameTreeNode::branch(Player::Max, vec![min(10, 8), min(4, 50)])
    }

    /// Complete tree with `branching` children per node and the given leaves
    /// in left-to-right order. The root is a MAX node and levels alternate.
    ///
    /// # Errors
    ///
    /// `branching` must be at least 2 and `leaves.len()` a power of it.
    pub fn from_leaves(leaves: &[i64], branching: usize) -> Result<Self> {
        if branching < 2 {
            return Err(Error::InvalidConfiguration {
                message: format!("branching factor must be at least 2, got {branching}"),
            });
        }
        let mut height = 0;
        let mut width = 1;
        while width < leaves.len() {
            width *= branching;
            height += 1;
        }
        if leaves.is_empty() || width != leaves.len() {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "{} leaves cannot fill a complete tree with branching factor {branching}",
                    leaves.len()
                ),
            });
        }

        let mut level: Vec<GameTreeNode> = leaves.iter().copied().map(GameTreeNode::leaf).collect();
        for depth in (0..height).rev() {
            let player = if depth % 2 == 0 { Player::Max } else { Player::Min };
            let mut parents = Vec::with_capacity(level.len() / branching);
            let mut children = level.into_iter();
            loop {
                let group: Vec<_> = children.by_ref().take(branching).collect();
                if group.is_empty() {
                    break;
                }
                parents.push(GameTreeNode::branch(player, group));
            }
            level = parents;
        }
        level.pop().ok_or_else(|| Error::InvalidConfiguration {
            message: "empty tree".to_string(),
        })
    }

    /// Random complete tree of the given depth with leaves drawn from `1..=100`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] when `branching^depth` exceeds
    /// [`MAX_RANDOM_LEAVES`].
    pub fn random<R: Rng>(rng: &mut R, depth: usize, branching: usize) -> Result<Self> {
        fn build<R: Rng>(rng: &mut R, depth: usize, branching: usize, player: Player) -> GameTreeNode {
            if depth == 0 {
                return GameTreeNode::leaf(rng.random_range(1..=100));
            }
            let children = (0..branching)
                .map(|_| build(rng, depth - 1, branching, player.opponent()))
                .collect();
            GameTreeNode::branch(player, children)
        }
        let branching = branching.max(1);
        let leaves = u32::try_from(depth)
            .ok()
            .and_then(|d| branching.checked_pow(d))
            .filter(|&n| n <= MAX_RANDOM_LEAVES);
        if leaves.is_none() {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "a random tree of depth {depth} and branching {branching} exceeds {MAX_RANDOM_LEAVES} leaves"
                ),
            });
        }
        Ok(build(rng, depth, branching, Player::Max))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, GameTreeNode::Leaf(_))
    }

    pub fn children(&self) -> &[GameTreeNode] {
        match self {
            GameTreeNode::Leaf(_) => &[],
            GameTreeNode::Branch { children, .. } => children,
        }
    }

    /// Value seen by a search that stops at this node.
    pub fn static_value(&self) -> i64 {
        match self {
            GameTreeNode::Leaf(value) => *value,
            GameTreeNode::Branch { estimate, .. } => *estimate,
        }
    }

    /// Longest root-to-leaf edge count.
    pub fn height(&self) -> usize {
        self.children()
            .iter()
            .map(|c| c.height() + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(GameTreeNode::node_count).sum::<usize>()
    }

    pub fn leaf_values(&self) -> Vec<i64> {
        match self {
            GameTreeNode::Leaf(value) => vec![*value],
            GameTreeNode::Branch { children, .. } => {
                children.iter().flat_map(GameTreeNode::leaf_values).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::build_rng;

    #[test]
    fn simple_tree_shape() {
        let tree = GameTreeNode::simple();
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.node_count(), 7);
        assert_eq!(tree.leaf_values(), vec![10, 8, 4, 50]);
        match &tree {
            GameTreeNode::Branch { player, children, .. } => {
                assert_eq!(*player, Player::Max);
                assert!(matches!(children[0], GameTreeNode::Branch { player: Player::Min, .. }));
            }
            GameTreeNode::Leaf(_) => panic!("root should be a branch"),
        }
    }

    #[test]
    fn from_leaves_rejects_incomplete_trees() {
        assert!(GameTreeNode::from_leaves(&[1, 2, 3], 2).is_err());
        assert!(GameTreeNode::from_leaves(&[], 2).is_err());
        assert!(GameTreeNode::from_leaves(&[1, 2], 1).is_err());
        assert_eq!(GameTreeNode::from_leaves(&[7], 2).unwrap(), GameTreeNode::leaf(7));
        assert_eq!(GameTreeNode::from_leaves(&[1; 9], 3).unwrap().height(), 2);
    }

    #[test]
    fn random_tree_is_seeded() {
        let a = GameTreeNode::random(&mut build_rng(Some(3)), 3, 2).unwrap();
        let b = GameTreeNode::random(&mut build_rng(Some(3)), 3, 2).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.leaf_values().len(), 8);
        assert!(a.leaf_values().iter().all(|v| (1..=100).contains(v)));
    }

    #[test]
    fn random_tree_size_is_capped() {
        let mut rng = build_rng(Some(1));
        for (depth, branching) in [(60, 2), (17, 2), (1, MAX_RANDOM_LEAVES + 1), (usize::MAX, 3)] {
            assert!(matches!(
                GameTreeNode::random(&mut rng, depth, branching),
                Err(Error::InvalidConfiguration { .. })
            ));
        }
        let widest = GameTreeNode::random(&mut rng, 16, 2).unwrap();
        assert_eq!(widest.leaf_values().len(), MAX_RANDOM_LEAVES);
        assert!(GameTreeNode::random(&mut rng, 0, 2).unwrap().is_leaf());
    }

    #[test]
    fn json_form_round_trips() {
        let json = r#"{"branch":{"player":"max","children":[{"leaf":3},{"leaf":-2}]}}"#;
        let tree: GameTreeNode = serde_json::from_str(json).unwrap();
        assert_eq!(tree.leaf_values(), vec![3, -2]);
        assert_eq!(tree.static_value(), 0);
    }
}

//! Alpha-beta search checked against plain minimax.

mod common;

use kindness::adversarial::{
    AlphaBeta, Difficulty, GameTreeNode, Player, SearchConfig, TeachingPolicy, minimax,
};
use proptest::prelude::*;

/// Irregular trees: branch widths 1..=3, depth up to 4, leaves in -50..=50.
fn arb_tree() -> impl Strategy<Value = GameTreeNode> {
    let leaf = (-50i64..=50).prop_map(GameTreeNode::leaf);
    leaf.prop_recursive(4, 64, 3, |inner| {
        prop::collection::vec(inner, 1..=3).prop_map(|children| {
            GameTreeNode::branch(Player::Max, children)
        })
    })
    .prop_map(alternate)
}

/// Re-label players so levels alternate starting with MAX at the root.
fn alternate(node: GameTreeNode) -> GameTreeNode {
    fn relabel(node: GameTreeNode, player: Player) -> GameTreeNode {
        match node {
            GameTreeNode::Leaf(value) => GameTreeNode::Leaf(value),
            GameTreeNode::Branch {
                children, estimate, ..
            } => GameTreeNode::Branch {
                player,
                children: children
                    .into_iter()
                    .map(|c| relabel(c, player.opponent()))
                    .collect(),
                estimate,
            },
        }
    }
    relabel(node, Player::Max)
}

proptest! {
    #[test]
    fn pruning_preserves_the_minimax_value(tree in arb_tree()) {
        let result = AlphaBeta::new(SearchConfig::default()).search(&tree);
        prop_assert_eq!(result.value, common::full_minimax(&tree));
        prop_assert_eq!(result.value, minimax(&tree, None));
        prop_assert!(result.substitutions.is_empty());
        prop_assert!(result.stats.nodes_visited <= tree.node_count());
    }

    #[test]
    fn best_move_achieves_the_root_value(tree in arb_tree()) {
        let result = AlphaBeta::new(SearchConfig::default()).search(&tree);
        match result.best_move {
            Some(index) => {
                prop_assert_eq!(common::full_minimax(&tree.children()[index]), result.value);
            }
            None => prop_assert!(tree.is_leaf()),
        }
    }

    #[test]
    fn teaching_never_beats_perfect_play(
        tree in arb_tree(),
        difficulty in prop_oneof![Just(Difficulty::Tutorial), Just(Difficulty::Learning)],
    ) {
        let config = SearchConfig::default().with_difficulty(difficulty);
        let budget = config.teaching.as_ref().map_or(0, |t| t.mistake_budget);
        let result = AlphaBeta::new(config).search(&tree);

        prop_assert!(result.value <= common::full_minimax(&tree));
        prop_assert!(result.substitutions.len() <= budget);
        for substitution in &result.substitutions {
            prop_assert!(substitution.chosen < substitution.optimal);
        }
    }

    #[test]
    fn depth_limited_search_matches_depth_limited_minimax(
        tree in arb_tree(),
        depth in 0usize..4,
    ) {
        let result = AlphaBeta::new(SearchConfig::default().with_depth(depth)).search(&tree);
        prop_assert_eq!(result.value, minimax(&tree, Some(depth)));
    }
}

#[test]
fn simple_tree_prunes_one_leaf() {
    let tree = GameTreeNode::simple();
    let result = AlphaBeta::new(SearchConfig::default()).search(&tree);
    assert_eq!(result.value, 8);
    assert_eq!(result.best_move, Some(0));
    assert_eq!(result.stats.nodes_pruned, 1);
    assert_eq!(result.stats.cutoffs, 1);
}

#[test]
fn teaching_at_the_root_takes_the_second_best_branch() {
    let tree = GameTreeNode::from_leaves(&[3, 5, 6, 9, 1, 2, 0, -1], 2).unwrap();
    let expert = AlphaBeta::new(SearchConfig::default()).search(&tree);
    assert_eq!(expert.value, 5);

    let config = SearchConfig::default().with_teaching(TeachingPolicy::new(vec![3], 1));
    let taught = AlphaBeta::new(config).search(&tree);
    assert_eq!(taught.substitutions.len(), 1);
    assert_eq!(taught.substitutions[0].optimal, 5);
    assert_eq!(taught.substitutions[0].chosen, 0);
    assert_eq!(taught.best_move, Some(1));
    assert_eq!(taught.value, 0);
}

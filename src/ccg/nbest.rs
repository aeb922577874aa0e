//! N-best extraction (C9): materialising derivation trees from back-pointers.
//!
//! Spec §4.9 describes a lazy k-best hypergraph merge for reconstructing
//! N-best derivations from a chart that keeps only one primary edge per
//! cell. This driver doesn't need that machinery: the goal test in the A*
//! main loop (spec §4.7 step 2) runs *before* `try_admit`, so every edge
//! popped over the full span with a root-admissible category is itself a
//! legitimate, independently-ranked completion — admissibility (P1)
//! already guarantees the agenda pops completions in non-increasing score
//! order (P2, P3). What's left for this module is the second half of
//! C9's job: walking a finished edge's `left_child`/`right_child` chain
//! down to terminals and building the tree a caller actually wants.

use crate::ccg::edge::{Edge, EdgeArena, RuleKind};
use crate::ccg::node::DerivationNode;
use crate::ccg::token::Token;

/// Materialise the derivation rooted at `edge_id` into a `DerivationNode`,
/// recursing through the arena's children until terminals are reached.
pub fn build_tree(arena: &EdgeArena, edge_id: u32, tokens: &[Token]) -> DerivationNode {
    let edge: &Edge = arena.get(edge_id);
    match edge.rule {
        RuleKind::Terminal => DerivationNode::Leaf {
            category: edge.category.clone(),
            surface: tokens[edge.span.0].surface.clone(),
        },
        RuleKind::Unary => {
            let child = edge
                .left_child
                .expect("unary edge must carry its single child");
            DerivationNode::Internal {
                category: edge.category.clone(),
                rule_name: edge.rule_name.clone(),
                children: vec![build_tree(arena, child, tokens)],
            }
        }
        RuleKind::Binary => {
            let left = edge.left_child.expect("binary edge must carry a left child");
            let right = edge
                .right_child
                .expect("binary edge must carry a right child");
            DerivationNode::Internal {
                category: edge.category.clone(),
                rule_name: edge.rule_name.clone(),
                children: vec![build_tree(arena, left, tokens), build_tree(arena, right, tokens)],
            }
        }
    }
}

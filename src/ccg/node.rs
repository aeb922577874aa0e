//! Materialised derivation trees, the output of the N-best extractor (C9).

use std::fmt;
use std::sync::Arc;

use crate::ccg::category::Category;

/// A node in a returned CCG derivation. Leaves carry a surface form;
/// internal nodes carry the rule that combined their children. Spec §3's
/// `Edge` lives only inside the arena during search — this is the
/// caller-facing tree produced once a parse finishes (spec §4.9, §6).
#[derive(Debug, Clone)]
pub enum DerivationNode {
    Leaf {
        category: Arc<Category>,
        surface: String,
    },
    Internal {
        category: Arc<Category>,
        rule_name: String,
        children: Vec<DerivationNode>,
    },
}

impl DerivationNode {
    pub fn category(&self) -> &Category {
        match self {
            DerivationNode::Leaf { category, .. } => category,
            DerivationNode::Internal { category, .. } => category,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, DerivationNode::Leaf { .. })
    }

    /// The leaves of this tree, left to right. Used to check spec §8 P4
    /// (coverage): a returned derivation's leaves must equal the input
    /// sentence in order.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            DerivationNode::Leaf { surface, .. } => out.push(surface.as_str()),
            DerivationNode::Internal { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

impl fmt::Display for DerivationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn go(node: &DerivationNode, indent: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let pad = " ".repeat(indent);
            match node {
                DerivationNode::Leaf { category, surface } => {
                    writeln!(f, "{}{} [{}]", pad, surface, category)
                }
                DerivationNode::Internal {
                    category,
                    rule_name,
                    children,
                } => {
                    writeln!(f, "{}{} [{}]", pad, rule_name, category)?;
                    for child in children {
                        go(child, indent + 2, f)?;
                    }
                    Ok(())
                }
            }
        }
        go(self, 0, f)
    }
}

/// One completed parse: its tree plus the total log-probability the A*
/// driver accumulated for it (the `in_score` of the root edge).
#[derive(Debug, Clone)]
pub struct Derivation {
    pub tree: DerivationNode,
    pub score: f64,
}

//! Partial-tree constraints (C8): user-supplied span/category pins that
//! prune the search space, enforced at admission time (spec §4.8, I5).

use crate::ccg::category::Category;

/// One pinned span, optionally requiring a specific root category over it.
/// `category: None` only requires that the span be a single constituent,
/// without fixing which category it bears.
#[derive(Debug, Clone)]
pub struct PartialConstraint {
    pub span: (usize, usize),
    pub category: Option<Category>,
}

impl PartialConstraint {
    pub fn new(span: (usize, usize), category: Option<Category>) -> Self {
        PartialConstraint { span, category }
    }
}

/// A constraint list checked against candidate edges as they're built.
/// Holds no state beyond the constraints themselves — everything here is
/// local to one span, so checks run in the driver's hot loop without
/// needing chart access (spec §4.8's "strictly local to the span").
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    constraints: Vec<PartialConstraint>,
}

impl ConstraintSet {
    pub fn new(constraints: Vec<PartialConstraint>) -> Self {
        ConstraintSet { constraints }
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Whether an edge over `span` with `category` is consistent with
    /// every constraint:
    /// - a span that crosses a constraint's boundary without equaling it
    ///   is rejected (it could never complete into a legal tree);
    /// - a span that equals a constrained span must carry the pinned
    ///   category, if one was given.
    pub fn admits(&self, span: (usize, usize), category: &Category) -> bool {
        for constraint in &self.constraints {
            if span == constraint.span {
                if let Some(required) = &constraint.category {
                    if !category.alpha_equivalent(required) {
                        return false;
                    }
                }
            } else if spans_cross(span, constraint.span) {
                return false;
            }
        }
        true
    }
}

/// Two spans "cross" when they partially overlap without one containing
/// the other and without being disjoint — i.e. neither is nested inside,
/// equal to, or wholly outside the other.
fn spans_cross(a: (usize, usize), b: (usize, usize)) -> bool {
    let disjoint = a.1 <= b.0 || b.1 <= a.0;
    let nested = (a.0 <= b.0 && b.1 <= a.1) || (b.0 <= a.0 && a.1 <= b.1);
    !disjoint && !nested
}

//! The combinator catalogue: binary and unary rules over categories.
//!
//! Each binary rule is a pure function `(Category, Category) -> Option<Category>`
//! packaged behind a small trait object, ported from the teacher's
//! `CCGRule` design (`src/ccg/rules.rs`) but changed to operate on bare
//! categories rather than parse-tree nodes, since the driver builds edges
//! directly and only needs the resulting category and a rule label.

use crate::ccg::category::Category;

/// A binary combinator: combines a left and right category into a result.
/// `bypass_seen_rules` lets a rule opt out of seen-rules pruning
/// independently of the grammar pack's global `use_seen_rules` toggle —
/// the English remove-disfluency rule is the motivating case, appended to
/// the rule set at runtime rather than attested in training data.
///
/// `Send + Sync` so a `GrammarPack`'s rule set can be shared read-only
/// across the worker threads a batch parse fans out over.
pub trait BinaryCombinator: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, left: &Category, right: &Category) -> Option<Category>;
    fn bypass_seen_rules(&self) -> bool {
        false
    }
    /// Whether the left child is the head for dependency-scoring purposes.
    /// True for every combinator in this catalogue except ones wrapped by
    /// [`HeadFirst`].
    fn head_is_left(&self) -> bool {
        true
    }
}

/// `X/Y Y => X`
pub struct ForwardApplication;

impl BinaryCombinator for ForwardApplication {
    fn name(&self) -> &str {
        ">"
    }

    fn apply(&self, left: &Category, right: &Category) -> Option<Category> {
        if let Category::Forward(x, y) = left {
            if y.unify(right).is_some() {
                return Some((**x).clone());
            }
        }
        None
    }
}

/// `Y X\Y => X`
pub struct BackwardApplication;

impl BinaryCombinator for BackwardApplication {
    fn name(&self) -> &str {
        "<"
    }

    fn apply(&self, left: &Category, right: &Category) -> Option<Category> {
        if let Category::Backward(x, y) = right {
            if y.unify(left).is_some() {
                return Some((**x).clone());
            }
        }
        None
    }

    fn head_is_left(&self) -> bool {
        false
    }
}

/// `X/Y Y/Z => X/Z`
pub struct ForwardComposition;

impl BinaryCombinator for ForwardComposition {
    fn name(&self) -> &str {
        ">B"
    }

    fn apply(&self, left: &Category, right: &Category) -> Option<Category> {
        if let Category::Forward(x, y) = left {
            if let Category::Forward(right_res, right_arg) = right {
                if y.unify(right_res).is_some() {
                    return Some(Category::forward((**x).clone(), (**right_arg).clone()));
                }
            }
        }
        None
    }
}

/// `Y\Z X\Y => X\Z`
pub struct BackwardComposition;

impl BinaryCombinator for BackwardComposition {
    fn name(&self) -> &str {
        "<B"
    }

    fn apply(&self, left: &Category, right: &Category) -> Option<Category> {
        if let Category::Backward(x, y) = right {
            if let Category::Backward(left_res, left_arg) = left {
                if y.unify(left_res).is_some() {
                    return Some(Category::backward((**x).clone(), (**left_arg).clone()));
                }
            }
        }
        None
    }

    fn head_is_left(&self) -> bool {
        false
    }
}

/// Decomposes a slash category into its eventual result and the ordered
/// chain of (is_forward, argument) pairs applied to reach it, stopping
/// after `max_depth` arguments. Generalizes the teacher's
/// `extract_category_chain` (`src/ccg/rules.rs`) so generalized composition
/// can be parameterized by order instead of hardcoded to one level.
fn extract_chain(cat: &Category, max_depth: usize) -> Option<(Category, Vec<(bool, Category)>)> {
    if max_depth == 0 {
        return Some((cat.clone(), Vec::new()));
    }
    match cat {
        Category::Forward(res, arg) => {
            let (base, mut chain) = extract_chain(res, max_depth - 1)?;
            chain.insert(0, (true, (**arg).clone()));
            Some((base, chain))
        }
        Category::Backward(res, arg) => {
            let (base, mut chain) = extract_chain(res, max_depth - 1)?;
            chain.insert(0, (false, (**arg).clone()));
            Some((base, chain))
        }
        _ => Some((cat.clone(), Vec::new())),
    }
}

fn rebuild_chain(base: Category, chain: &[(bool, Category)]) -> Category {
    chain.iter().rev().fold(base, |acc, (is_forward, arg)| {
        if *is_forward {
            Category::forward(acc, arg.clone())
        } else {
            Category::backward(acc, arg.clone())
        }
    })
}

/// `X/Y (Y|Z1)|Z2...|Zn => (X|Z1)|Z2...|Zn` for chains up to `order` deep.
pub struct GeneralizedForwardComposition {
    pub order: usize,
}

impl BinaryCombinator for GeneralizedForwardComposition {
    fn name(&self) -> &str {
        ">Bn"
    }

    fn apply(&self, left: &Category, right: &Category) -> Option<Category> {
        let (x, y) = match left {
            Category::Forward(x, y) => (x, y),
            _ => return None,
        };
        for depth in 1..=self.order {
            if let Some((base, chain)) = extract_chain(right, depth) {
                if chain.iter().all(|(fwd, _)| *fwd) && y.unify(&base).is_some() {
                    return Some(rebuild_chain((**x).clone(), &chain));
                }
            }
        }
        None
    }
}

/// `(Y|Z1)|Z2...|Zn X\Y => (X|Z1)|Z2...|Zn` for chains up to `order` deep.
pub struct GeneralizedBackwardComposition {
    pub order: usize,
}

impl BinaryCombinator for GeneralizedBackwardComposition {
    fn name(&self) -> &str {
        "<Bn"
    }

    fn apply(&self, left: &Category, right: &Category) -> Option<Category> {
        let (x, y) = match right {
            Category::Backward(x, y) => (x, y),
            _ => return None,
        };
        for depth in 1..=self.order {
            if let Some((base, chain)) = extract_chain(left, depth) {
                if chain.iter().all(|(fwd, _)| !*fwd) && y.unify(&base).is_some() {
                    return Some(rebuild_chain((**x).clone(), &chain));
                }
            }
        }
        None
    }

    fn head_is_left(&self) -> bool {
        false
    }
}

/// `(X/Y)/Z Y/Z => X/Z`, the forward substitution combinator.
pub struct ForwardSubstitution;

impl BinaryCombinator for ForwardSubstitution {
    fn name(&self) -> &str {
        ">S"
    }

    fn apply(&self, left: &Category, right: &Category) -> Option<Category> {
        if let Category::Forward(xy, z1) = left {
            if let Category::Forward(x, y) = xy.as_ref() {
                if let Category::Forward(y2, z2) = right {
                    if y.unify(y2).is_some() && z1.unify(z2).is_some() {
                        return Some(Category::forward((**x).clone(), (**z1).clone()));
                    }
                }
            }
        }
        None
    }
}

/// The Φ coordination rule: two alpha-equivalent categories joined by a
/// coordinator collapse to that same category. Lexical conjunctions that
/// carry an explicit `(X\X)/X`-style category need no special combinator —
/// they combine via ordinary application — so this rule only covers bare
/// coordination of identical categories.
pub struct Coordination;

impl BinaryCombinator for Coordination {
    fn name(&self) -> &str {
        "Φ"
    }

    fn apply(&self, left: &Category, right: &Category) -> Option<Category> {
        if left.alpha_equivalent(right) {
            Some(right.clone())
        } else {
            None
        }
    }
}

/// Drops the disfluency/filler reading of a repeated constituent: `X X => X`.
/// Appended to the English rule set at runtime in the original implementation
/// (`headfirst_combinator(remove_disfluency())` in `depccg/__main__.py`),
/// which is why it bypasses seen-rules rather than needing to be attested.
pub struct RemoveDisfluency;

impl BinaryCombinator for RemoveDisfluency {
    fn name(&self) -> &str {
        "disfl"
    }

    fn apply(&self, left: &Category, right: &Category) -> Option<Category> {
        if left.alpha_equivalent(right) {
            Some(right.clone())
        } else {
            None
        }
    }

    fn bypass_seen_rules(&self) -> bool {
        true
    }
}

/// Wraps a combinator so its head is reported on the right child instead of
/// the left, matching head-final languages (Japanese). Ports
/// `headfirst_combinator` from `depccg/__main__.py`.
pub struct HeadFirst<C> {
    inner: C,
}

impl<C> HeadFirst<C> {
    pub fn new(inner: C) -> Self {
        HeadFirst { inner }
    }
}

impl<C: BinaryCombinator> BinaryCombinator for HeadFirst<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn apply(&self, left: &Category, right: &Category) -> Option<Category> {
        self.inner.apply(left, right)
    }

    fn bypass_seen_rules(&self) -> bool {
        self.inner.bypass_seen_rules()
    }

    fn head_is_left(&self) -> bool {
        !self.inner.head_is_left()
    }
}

pub fn headfirst_combinator<C: BinaryCombinator + 'static>(rule: C) -> Box<dyn BinaryCombinator> {
    Box::new(HeadFirst::new(rule))
}

/// `punct / punct`-style results (and their mirror) are never legal,
/// regardless of which rule produced them.
pub fn is_globally_forbidden(result: &Category) -> bool {
    let is_punct = |c: &Category| c.atomic_name() == Some(",");
    match result {
        Category::Forward(x, y) | Category::Backward(x, y) => is_punct(x) && is_punct(y),
        _ => false,
    }
}

/// Type-raising as a unary-rule-table generator: `X => T/(T\X)` and
/// `X => T\(T/X)` for each target `T`. Spec §4.2 describes type-raising as
/// entries appended to the unary rule table rather than a standalone binary
/// rule, so callers fold this into `GrammarPack::unary_rules` at
/// construction time instead of invoking it mid-search.
pub fn type_raising_entries(child: &Category, targets: &[Category]) -> Vec<(Category, &'static str)> {
    let mut entries = Vec::new();
    for t in targets {
        let forward_raised = Category::forward(t.clone(), Category::backward(t.clone(), child.clone()));
        entries.push((forward_raised, ">T"));
        let backward_raised = Category::backward(t.clone(), Category::forward(t.clone(), child.clone()));
        entries.push((backward_raised, "<T"));
    }
    entries
}

/// The combinator set described for English in spec §4.2: application,
/// composition (orders 1-2), substitution, and coordination. Callers that
/// need the disfluency rule append `headfirst_combinator(RemoveDisfluency)`
/// themselves, matching how the original builds its rule list at startup.
pub fn en_default_binary_rules() -> Vec<Box<dyn BinaryCombinator>> {
    vec![
        Box::new(ForwardApplication),
        Box::new(BackwardApplication),
        Box::new(ForwardComposition),
        Box::new(BackwardComposition),
        Box::new(GeneralizedForwardComposition { order: 2 }),
        Box::new(GeneralizedBackwardComposition { order: 2 }),
        Box::new(ForwardSubstitution),
        Box::new(Coordination),
    ]
}

/// The Japanese combinator set: the same core rules, but composition and
/// application default to a head-final reading via [`headfirst_combinator`].
pub fn ja_default_binary_rules() -> Vec<Box<dyn BinaryCombinator>> {
    vec![
        Box::new(ForwardApplication),
        headfirst_combinator(BackwardApplication),
        Box::new(ForwardComposition),
        headfirst_combinator(BackwardComposition),
        Box::new(Coordination),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_application() {
        let rule = ForwardApplication;
        let np = Category::np();
        let n = Category::n();
        let det = Category::forward(np.clone(), n.clone());

        assert_eq!(rule.apply(&det, &n), Some(np));
        assert_eq!(rule.apply(&n, &np), None);
    }

    #[test]
    fn test_backward_application_head_is_right() {
        let rule = BackwardApplication;
        let s = Category::s();
        let np = Category::np();
        let iv = Category::backward(s.clone(), np.clone());

        assert_eq!(rule.apply(&np, &iv), Some(s));
        assert!(!rule.head_is_left());
    }

    #[test]
    fn test_forward_composition() {
        let rule = ForwardComposition;
        let s = Category::s();
        let np = Category::np();
        let vp = Category::backward(s.clone(), np.clone());
        let modal = Category::forward(Category::forward(s.clone(), vp.clone()), np.clone());
        let tv = Category::forward(vp.clone(), np.clone());

        let result = rule.apply(&modal, &tv);
        assert_eq!(
            result,
            Some(Category::forward(
                Category::forward(s, np.clone()),
                np
            ))
        );
    }

    #[test]
    fn test_generalized_forward_composition_order_two() {
        let rule = GeneralizedForwardComposition { order: 2 };
        let s = Category::s();
        let np = Category::np();
        // X/Y where X = S, Y = NP
        let left = Category::forward(s.clone(), np.clone());
        // (Y/NP)/NP = (NP/NP)/NP as a stand-in two-argument function of Y
        let right = Category::forward(Category::forward(np.clone(), np.clone()), np.clone());

        let result = rule.apply(&left, &right);
        assert!(result.is_some());
    }

    #[test]
    fn test_type_raising_entries() {
        let np = Category::np();
        let s = Category::s();
        let entries = type_raising_entries(&np, &[s.clone()]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0.to_string(), "S/(S\\NP)");
        assert_eq!(entries[1].0.to_string(), "S\\(S/NP)");
    }

    #[test]
    fn test_coordination_requires_alpha_equivalent_categories() {
        let rule = Coordination;
        let np = Category::np();
        let n = Category::n();
        assert_eq!(rule.apply(&np, &np), Some(np.clone()));
        assert_eq!(rule.apply(&np, &n), None);
    }

    #[test]
    fn test_remove_disfluency_bypasses_seen_rules() {
        let rule = RemoveDisfluency;
        assert!(rule.bypass_seen_rules());
        let np = Category::np();
        assert_eq!(rule.apply(&np, &np), Some(np));
    }

    #[test]
    fn test_headfirst_flips_head_side() {
        let wrapped = headfirst_combinator(BackwardApplication);
        assert!(wrapped.head_is_left());
        assert_eq!(wrapped.name(), "<");
    }

    #[test]
    fn test_globally_forbidden_punct_punct() {
        let comma = Category::atomic(",");
        let forbidden = Category::forward(comma.clone(), comma);
        assert!(is_globally_forbidden(&forbidden));
        assert!(!is_globally_forbidden(&Category::np()));
    }
}

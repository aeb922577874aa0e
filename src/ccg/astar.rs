//! The A* driver (C7): the main search loop described in spec §4.7.

use std::sync::Arc;

use log::{debug, log_enabled, trace, Level};

use crate::ccg::agenda::{Agenda, AgendaItem};
use crate::ccg::category::{Category, CategoryInterner};
use crate::ccg::chart::{Admission, Chart};
use crate::ccg::constraint::ConstraintSet;
use crate::ccg::combinator::is_globally_forbidden;
use crate::ccg::edge::{Edge, EdgeArena, EdgeId, RuleKind};
use crate::ccg::error::ParseFailure;
use crate::ccg::grammar::GrammarPack;
use crate::ccg::nbest::build_tree;
use crate::ccg::node::Derivation;
use crate::ccg::scorer::ScoreTensors;
use crate::ccg::token::Token;

/// Search configuration, matching spec §6's `Config` record one field at a
/// time. `max_unary_chain` and `root_match_mode` live on [`GrammarPack`]
/// instead of here — chain depth and root-matching are properties of a
/// grammar, shared across every sentence parsed with it, not something a
/// caller varies per call. See `DESIGN.md` for this and the other
/// Open-Question resolutions.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub unary_penalty: f64,
    pub nbest: usize,
    pub pruning_size: usize,
    pub beta: f64,
    pub use_beta: bool,
    pub use_seen_rules: bool,
    pub use_category_dict: bool,
    pub max_length: usize,
    pub max_steps: usize,
    /// Overrides the grammar pack's root-category filter for this parse,
    /// when set. `None` defers to `GrammarPack::root_categories`.
    pub possible_root_cats: Option<Vec<Category>>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            unary_penalty: 0.1,
            nbest: 1,
            pruning_size: 50,
            beta: 1e-5,
            use_beta: true,
            use_seen_rules: true,
            use_category_dict: true,
            max_length: 250,
            max_steps: 10_000_000,
            possible_root_cats: None,
        }
    }
}

/// A finite stand-in for `-infinity` used only inside the outside-bound
/// prefix sums. A position with no surviving category (or an all-`-inf`
/// dependency row) has a true outside contribution of `-infinity`; summing
/// two `-infinity`s and then subtracting one from the total (as the
/// prefix-sum bound does) produces `NaN`, not `-infinity`. Clamping to a
/// very large finite negative number keeps the bound arithmetic free of
/// NaN while still making that position's edges unreachable in practice —
/// spec §9 already asks to "reject [NaN] at ingress"; this keeps a NaN
/// from being *derived* downstream of legal, finite inputs.
const OUTSIDE_SENTINEL: f64 = -1.0e12;

fn finite_or_sentinel(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        OUTSIDE_SENTINEL
    }
}

/// Category indices at position `i` surviving the category-dictionary and
/// beta filters (but not the pruning-size cap) — what spec §4.7 restricts
/// `best_tag[i]` to.
fn dict_beta_candidates(
    grammar: &GrammarPack,
    scores: &ScoreTensors,
    config: &ParserConfig,
    i: usize,
    word: &str,
) -> Vec<usize> {
    let num_cats = scores.num_categories();
    let base: Vec<usize> = if config.use_category_dict {
        match grammar.allowed_categories(word) {
            Some(allowed) => {
                let mut v: Vec<usize> = allowed.iter().copied().collect();
                v.sort_unstable();
                v
            }
            None => (0..num_cats).collect(),
        }
    } else {
        (0..num_cats).collect()
    };

    if !config.use_beta || base.is_empty() {
        return base;
    }

    let max_val = base
        .iter()
        .map(|&c| scores.tag(i, c))
        .fold(f64::NEG_INFINITY, f64::max);
    // Every candidate at this position is `-inf` (spec §8's all-`-inf`
    // boundary case): `threshold` would itself be `-inf`, and `-inf >=
    // -inf` is true, so the filter below would let every disallowed
    // category through instead of none. Nothing survives beta at a
    // position with no finite score.
    if max_val.is_infinite() {
        return Vec::new();
    }
    let threshold = max_val + config.beta.ln();
    base.into_iter().filter(|&c| scores.tag(i, c) >= threshold).collect()
}

/// `dict_beta_candidates` further capped to the top `pruning_size`
/// categories by tag log-probability — the set actually seeded onto the
/// agenda as terminal edges (spec §4.7 "Initialization").
fn init_candidates(
    grammar: &GrammarPack,
    scores: &ScoreTensors,
    config: &ParserConfig,
    i: usize,
    word: &str,
) -> Vec<usize> {
    let mut cands = dict_beta_candidates(grammar, scores, config, i, word);
    cands.sort_by(|&a, &b| {
        scores
            .tag(i, b)
            .partial_cmp(&scores.tag(i, a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    cands.truncate(config.pruning_size.max(1));
    cands
}

/// Per-position `best_tag[i] + best_dep[i]` and their prefix sums, used to
/// compute `out_score_bound(span)` in O(1) (spec §4.7).
struct OutsideBounds {
    prefix: Vec<f64>,
}

impl OutsideBounds {
    fn compute(grammar: &GrammarPack, scores: &ScoreTensors, tokens: &[Token], config: &ParserConfig) -> Self {
        let n = tokens.len();
        let mut prefix = Vec::with_capacity(n + 1);
        prefix.push(0.0);
        for i in 0..n {
            let cands = dict_beta_candidates(grammar, scores, config, i, &tokens[i].surface);
            let best_tag = finite_or_sentinel(
                cands
                    .iter()
                    .map(|&c| scores.tag(i, c))
                    .fold(f64::NEG_INFINITY, f64::max),
            );
            let best_dep = finite_or_sentinel(
                (0..=n)
                    .map(|j| scores.dep(i, j))
                    .fold(f64::NEG_INFINITY, f64::max),
            );
            let prev = prefix[i];
            prefix.push(prev + best_tag + best_dep);
        }
        OutsideBounds { prefix }
    }

    /// The admissible upper bound on everything outside `[i, j)`.
    fn bound(&self, i: usize, j: usize) -> f64 {
        let total = *self.prefix.last().unwrap();
        total - (self.prefix[j] - self.prefix[i])
    }
}

fn root_admissible(grammar: &GrammarPack, config: &ParserConfig, cat: &Category) -> bool {
    match &config.possible_root_cats {
        Some(allowed) => allowed.iter().any(|c| c.alpha_equivalent(cat)),
        None => grammar.is_root_admissible(cat),
    }
}

fn try_binary(
    agenda: &mut Agenda,
    arena: &mut EdgeArena,
    interner: &mut CategoryInterner,
    bounds: &OutsideBounds,
    constraints: &ConstraintSet,
    grammar: &GrammarPack,
    config: &ParserConfig,
    left_id: EdgeId,
    left: &Edge,
    right_id: EdgeId,
    right: &Edge,
) {
    for rule in &grammar.binary_rules {
        let Some(result_cat) = rule.apply(&left.category, &right.category) else {
            continue;
        };
        if is_globally_forbidden(&result_cat) {
            continue;
        }
        if config.use_seen_rules
            && !rule.bypass_seen_rules()
            && !grammar.is_seen(&left.category, &right.category)
        {
            continue;
        }
        let span = (left.span.0, right.span.1);
        if !constraints.admits(span, &result_cat) {
            continue;
        }

        let category = Arc::new(result_cat);
        let cat_idx = interner.intern(&category);
        let in_score = left.in_score + right.in_score;
        let out_bound = bounds.bound(span.0, span.1);
        let head_index = if rule.head_is_left() {
            left.head_index
        } else {
            right.head_index
        };

        let new_edge = Edge {
            span,
            category,
            rule: RuleKind::Binary,
            rule_name: rule.name().to_string(),
            left_child: Some(left_id),
            right_child: Some(right_id),
            in_score,
            out_score_bound: out_bound,
            head_index,
            dep_log_prob_sum: left.dep_log_prob_sum + right.dep_log_prob_sum,
            unary_chain_len: 0,
        };
        let new_id = arena.alloc(new_edge);
        agenda.push(AgendaItem {
            edge_id: new_id,
            priority: in_score + out_bound,
            span_len: span.1 - span.0,
            category_index: cat_idx,
            left_child: Some(left_id),
        });
    }
}

/// Run the A* search for one sentence and return up to `config.nbest`
/// derivations in non-increasing score order (spec §4.7, §8 P2/P3), or a
/// [`ParseFailure`] per spec §6/§7. `NoParse` is `Ok(vec![])`, never an
/// error.
pub fn parse(
    grammar: &GrammarPack,
    scores: &ScoreTensors,
    tokens: &[Token],
    config: &ParserConfig,
    constraints: &ConstraintSet,
) -> Result<Vec<Derivation>, ParseFailure> {
    let n = tokens.len();
    if n > config.max_length {
        return Err(ParseFailure::SentenceTooLong {
            len: n,
            max_length: config.max_length,
        });
    }
    if n == 0 {
        return Ok(Vec::new());
    }
    scores.validate(n, grammar.categories.len())?;

    let bounds = OutsideBounds::compute(grammar, scores, tokens, config);
    let mut interner = CategoryInterner::seeded(&grammar.categories);
    let mut arena = EdgeArena::new();
    let mut chart = Chart::new(n);
    let mut agenda = Agenda::new();

    for i in 0..n {
        let cands = init_candidates(grammar, scores, config, i, &tokens[i].surface);
        let head = scores.head_guess(i);
        for c in cands {
            let category = grammar.categories[c].clone();
            if !constraints.admits((i, i + 1), &category) {
                continue;
            }
            let in_score = scores.tag(i, c) + scores.dep(i, head);
            let out_bound = bounds.bound(i, i + 1);
            let cat_idx = interner.intern(&category);
            let edge = Edge {
                span: (i, i + 1),
                category,
                rule: RuleKind::Terminal,
                rule_name: "terminal".to_string(),
                left_child: None,
                right_child: None,
                in_score,
                out_score_bound: out_bound,
                head_index: i,
                dep_log_prob_sum: scores.dep(i, head),
                unary_chain_len: 0,
            };
            let id = arena.alloc(edge);
            agenda.push(AgendaItem {
                edge_id: id,
                priority: in_score + out_bound,
                span_len: 1,
                category_index: cat_idx,
                left_child: None,
            });
        }
    }

    let mut completions: Vec<Derivation> = Vec::new();

    while let Some(item) = agenda.pop() {
        if agenda.pop_count() > config.max_steps {
            return Err(ParseFailure::BudgetExceeded {
                max_steps: config.max_steps,
            });
        }

        let edge = arena.get(item.edge_id).clone();
        let (i, j) = edge.span;

        if log_enabled!(Level::Trace) {
            trace!(
                "pop #{} span=({},{}) cat={} priority={:.4}",
                agenda.pop_count(),
                i,
                j,
                edge.category,
                item.priority
            );
        }

        if j - i == n && root_admissible(grammar, config, &edge.category) {
            debug!("completion #{} score={:.4} cat={}", completions.len() + 1, edge.in_score, edge.category);
            completions.push(Derivation {
                tree: build_tree(&arena, item.edge_id, tokens),
                score: edge.in_score,
            });
            if completions.len() >= config.nbest.max(1) {
                break;
            }
        }

        let admission = chart.try_admit(i, j, item.edge_id, edge.category.clone(), &arena);
        if admission == Admission::Dominated {
            continue;
        }

        if edge.unary_chain_len < grammar.max_unary_chain {
            for (parent_cat, rule_name) in grammar.unary_parents(&edge.category).to_vec() {
                if !constraints.admits((i, j), &parent_cat) {
                    continue;
                }
                let new_in_score = edge.in_score - config.unary_penalty;
                let out_bound = bounds.bound(i, j);
                let cat_idx = interner.intern(&parent_cat);
                let new_edge = Edge {
                    span: (i, j),
                    category: parent_cat,
                    rule: RuleKind::Unary,
                    rule_name: rule_name.clone(),
                    left_child: Some(item.edge_id),
                    right_child: None,
                    in_score: new_in_score,
                    out_score_bound: out_bound,
                    head_index: edge.head_index,
                    dep_log_prob_sum: edge.dep_log_prob_sum,
                    unary_chain_len: edge.unary_chain_len + 1,
                };
                let new_id = arena.alloc(new_edge);
                agenda.push(AgendaItem {
                    edge_id: new_id,
                    priority: new_in_score + out_bound,
                    span_len: j - i,
                    category_index: cat_idx,
                    left_child: Some(item.edge_id),
                });
            }
        }

        for k in 0..i {
            for f_id in chart.primaries(k, i) {
                let f = arena.get(f_id).clone();
                try_binary(
                    &mut agenda, &mut arena, &mut interner, &bounds, constraints, grammar, config,
                    f_id, &f, item.edge_id, &edge,
                );
            }
        }
        for m in (j + 1)..=n {
            for f_id in chart.primaries(j, m) {
                let f = arena.get(f_id).clone();
                try_binary(
                    &mut agenda, &mut arena, &mut interner, &bounds, constraints, grammar, config,
                    item.edge_id, &edge, f_id, &f,
                );
            }
        }
    }

    Ok(completions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ccg::combinator::en_default_binary_rules;

    fn toy_grammar() -> GrammarPack {
        let np = Category::np();
        let n = Category::n();
        let s = Category::s();
        let det = Category::forward(np.clone(), n.clone());
        let iv = Category::backward(s.clone(), np.clone());
        let mut grammar = GrammarPack::new(
            vec![det.clone(), n.clone(), np.clone(), iv.clone(), s.clone()],
            en_default_binary_rules(),
        );
        grammar.mark_seen(&det, &n);
        grammar.mark_seen(&np, &iv);
        let _ = s;
        grammar.set_root_categories(&[np], crate::ccg::grammar::RootMatchMode::Exact);
        grammar
    }

    #[test]
    fn test_trivial_two_word_sentence() {
        let grammar = toy_grammar();
        let tokens = vec![Token::new("the"), Token::new("cat")];
        // categories: [det=NP/N, N, NP, S\NP, S]
        let tag_log_prob = vec![
            vec![-0.1, -5.0, -5.0, -5.0, -5.0], // "the" -> det
            vec![-5.0, -0.1, -5.0, -5.0, -5.0], // "cat" -> N
        ];
        let dep_log_prob = vec![vec![-0.5, -0.5, -0.1], vec![-0.1, -0.5, -0.5]];
        let scores = ScoreTensors::new(tag_log_prob, dep_log_prob);
        let config = ParserConfig {
            use_seen_rules: true,
            ..Default::default()
        };
        let constraints = ConstraintSet::default();

        let result = parse(&grammar, &scores, &tokens, &config, &constraints).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].tree.leaves(), vec!["the", "cat"]);
    }

    #[test]
    fn test_sentence_too_long() {
        let grammar = toy_grammar();
        let tokens: Vec<Token> = (0..5).map(|i| Token::new(&format!("w{i}"))).collect();
        let scores = ScoreTensors::new(vec![vec![-0.1; 5]; 5], vec![vec![-0.1; 6]; 5]);
        let config = ParserConfig {
            max_length: 3,
            ..Default::default()
        };
        let err = parse(&grammar, &scores, &tokens, &config, &ConstraintSet::default()).unwrap_err();
        assert!(matches!(err, ParseFailure::SentenceTooLong { .. }));
    }

    #[test]
    fn test_budget_exceeded() {
        let grammar = toy_grammar();
        let tokens: Vec<Token> = (0..20).map(|i| Token::new(&format!("w{i}"))).collect();
        let scores = ScoreTensors::new(vec![vec![-0.1; 5]; 20], vec![vec![-0.1; 21]; 20]);
        let config = ParserConfig {
            max_steps: 10,
            use_seen_rules: false,
            ..Default::default()
        };
        let err = parse(&grammar, &scores, &tokens, &config, &ConstraintSet::default()).unwrap_err();
        assert!(matches!(err, ParseFailure::BudgetExceeded { max_steps: 10 }));
    }

    #[test]
    fn test_no_parse_when_seen_rules_blocks_forward_application() {
        let np = Category::np();
        let n = Category::n();
        let det = Category::forward(np.clone(), n.clone());
        // No seen-rules marked: forward application of (NP/N, N) is blocked.
        let grammar = GrammarPack::new(vec![det, n], en_default_binary_rules());
        let tokens = vec![Token::new("the"), Token::new("cat")];
        let scores = ScoreTensors::new(
            vec![vec![-0.1, -5.0], vec![-5.0, -0.1]],
            vec![vec![-0.5, -0.5, -0.1], vec![-0.1, -0.5, -0.5]],
        );
        let config = ParserConfig::default();
        let result = parse(&grammar, &scores, &tokens, &config, &ConstraintSet::default()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_no_parse_when_a_position_is_all_negative_infinity() {
        // Spec §8 boundary case: "All tag_log_prob = -inf at some
        // position: NoParse." With every category scored -inf at
        // position 0, the beta threshold must not degenerate into
        // admitting everything (-inf >= -inf is true, which would let a
        // disallowed category through as a terminal edge).
        let grammar = toy_grammar();
        let tokens = vec![Token::new("the"), Token::new("cat")];
        let scores = ScoreTensors::new(
            vec![vec![f64::NEG_INFINITY; 5], vec![-5.0, -0.1, -5.0, -5.0, -5.0]],
            vec![vec![-0.5, -0.5, -0.1], vec![-0.1, -0.5, -0.5]],
        );
        let config = ParserConfig::default();
        let result = parse(&grammar, &scores, &tokens, &config, &ConstraintSet::default()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_invalid_input_on_shape_mismatch() {
        let grammar = toy_grammar();
        let tokens = vec![Token::new("the")];
        let scores = ScoreTensors::new(vec![vec![-0.1; 5], vec![-0.1; 5]], vec![vec![-0.1; 2]]);
        let err = parse(&grammar, &scores, &tokens, &ParserConfig::default(), &ConstraintSet::default())
            .unwrap_err();
        assert!(matches!(err, ParseFailure::InvalidInput(_)));
    }
}

//! Batch parsing: one [`GrammarPack`] shared read-only across sentences,
//! each parsed independently in its own chart/agenda/arena (spec §5).

use rayon::prelude::*;

use crate::ccg::astar::{self, ParserConfig};
use crate::ccg::constraint::ConstraintSet;
use crate::ccg::error::ParseFailure;
use crate::ccg::grammar::GrammarPack;
use crate::ccg::node::Derivation;
use crate::ccg::scorer::ScoreTensors;
use crate::ccg::token::Token;

/// One sentence's inputs to a batch parse: its tokens, score tensors, and
/// any partial-tree constraints (spec §4.8). Constraints default to empty.
pub struct BatchItem {
    pub tokens: Vec<Token>,
    pub scores: ScoreTensors,
    pub constraints: ConstraintSet,
}

impl BatchItem {
    pub fn new(tokens: Vec<Token>, scores: ScoreTensors) -> Self {
        BatchItem {
            tokens,
            scores,
            constraints: ConstraintSet::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: ConstraintSet) -> Self {
        self.constraints = constraints;
        self
    }
}

/// Parse every item in `batch` against the same `grammar`/`config`,
/// fanning out across threads via rayon. Results come back in the same
/// order as `batch` regardless of which worker finished first — `par_iter`
/// over a slice is an indexed parallel iterator, and collecting into a
/// `Vec` preserves that index order (spec §5: "the output order must match
/// the input order, independent of completion order").
pub fn parse_batch(
    grammar: &GrammarPack,
    config: &ParserConfig,
    batch: &[BatchItem],
) -> Vec<Result<Vec<Derivation>, ParseFailure>> {
    batch
        .par_iter()
        .map(|item| astar::parse(grammar, &item.scores, &item.tokens, config, &item.constraints))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ccg::category::Category;
    use crate::ccg::combinator::en_default_binary_rules;
    use crate::ccg::grammar::RootMatchMode;

    fn toy_grammar() -> GrammarPack {
        let np = Category::np();
        let n = Category::n();
        let det = Category::forward(np.clone(), n.clone());
        let mut grammar = GrammarPack::new(vec![det.clone(), n.clone(), np.clone()], en_default_binary_rules());
        grammar.mark_seen(&det, &n);
        grammar.set_root_categories(&[np], RootMatchMode::Exact);
        grammar
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let grammar = toy_grammar();
        let config = ParserConfig::default();

        let good = BatchItem::new(
            vec![Token::new("the"), Token::new("cat")],
            ScoreTensors::new(
                vec![vec![-0.1, -5.0, -5.0], vec![-5.0, -0.1, -5.0]],
                vec![vec![-0.5, -0.5, -0.1], vec![-0.1, -0.5, -0.5]],
            ),
        );
        let too_long = BatchItem::new(
            vec![Token::new("w"); 300],
            ScoreTensors::new(vec![vec![-0.1, -0.1, -0.1]; 300], vec![vec![-0.1; 301]; 300]),
        );

        let batch = vec![good, too_long];
        let results = parse_batch(&grammar, &config, &batch);

        assert_eq!(results.len(), 2);
        assert!(results[0].as_ref().unwrap().len() == 1);
        assert!(matches!(results[1], Err(ParseFailure::SentenceTooLong { .. })));
    }

    #[test]
    fn test_empty_batch_returns_empty_vec() {
        let grammar = toy_grammar();
        let config = ParserConfig::default();
        let results = parse_batch(&grammar, &config, &[]);
        assert!(results.is_empty());
    }
}

//! The top-level parser facade: binds a [`GrammarPack`] to a
//! [`ParserConfig`] and exposes single-sentence and batch entry points.

use std::path::Path;

use crate::ccg::astar::{self, ParserConfig};
use crate::ccg::batch::{self, BatchItem};
use crate::ccg::combinator::BinaryCombinator;
use crate::ccg::constraint::ConstraintSet;
use crate::ccg::error::{GrammarLoadError, ParseFailure};
use crate::ccg::grammar::GrammarPack;
use crate::ccg::node::Derivation;
use crate::ccg::scorer::ScoreTensors;
use crate::ccg::token::Token;

/// A ready-to-use parser: a grammar pack plus the search configuration
/// every sentence parsed through it uses. Cheap to construct once per
/// process and reuse across an entire batch (spec §5).
pub struct Parser {
    grammar: GrammarPack,
    config: ParserConfig,
}

impl Parser {
    pub fn new(grammar: GrammarPack, config: ParserConfig) -> Self {
        Parser { grammar, config }
    }

    /// Load a grammar pack from `dir`'s flat files (spec §6) and pair it
    /// with `config`.
    pub fn from_dir(
        dir: &Path,
        binary_rules: Vec<Box<dyn BinaryCombinator>>,
        config: ParserConfig,
    ) -> Result<Self, GrammarLoadError> {
        let grammar = GrammarPack::from_dir(dir, binary_rules)?;
        Ok(Parser { grammar, config })
    }

    pub fn grammar(&self) -> &GrammarPack {
        &self.grammar
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse one sentence with no partial-tree constraints.
    pub fn parse(&self, tokens: &[Token], scores: &ScoreTensors) -> Result<Vec<Derivation>, ParseFailure> {
        self.parse_constrained(tokens, scores, &ConstraintSet::default())
    }

    /// Parse one sentence under the given partial-tree constraints
    /// (spec §4.8).
    pub fn parse_constrained(
        &self,
        tokens: &[Token],
        scores: &ScoreTensors,
        constraints: &ConstraintSet,
    ) -> Result<Vec<Derivation>, ParseFailure> {
        astar::parse(&self.grammar, scores, tokens, &self.config, constraints)
    }

    /// Parse a whitespace-tokenized sentence, a convenience wrapper over
    /// [`Token::tokenize_whitespace`] for callers without their own
    /// tokenizer.
    pub fn parse_sentence(&self, sentence: &str, scores: &ScoreTensors) -> Result<Vec<Derivation>, ParseFailure> {
        let tokens = Token::tokenize_whitespace(sentence);
        self.parse(&tokens, scores)
    }

    /// Parse many sentences in parallel, preserving input order (spec §5).
    pub fn parse_batch(&self, batch: &[BatchItem]) -> Vec<Result<Vec<Derivation>, ParseFailure>> {
        batch::parse_batch(&self.grammar, &self.config, batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ccg::category::Category;
    use crate::ccg::combinator::en_default_binary_rules;
    use crate::ccg::grammar::RootMatchMode;

    fn toy_parser() -> Parser {
        let np = Category::np();
        let n = Category::n();
        let det = Category::forward(np.clone(), n.clone());
        let mut grammar = GrammarPack::new(vec![det.clone(), n.clone(), np.clone()], en_default_binary_rules());
        grammar.mark_seen(&det, &n);
        grammar.set_root_categories(&[np], RootMatchMode::Exact);
        Parser::new(grammar, ParserConfig::default())
    }

    #[test]
    fn test_parse_sentence_convenience_wrapper() {
        let parser = toy_parser();
        let scores = ScoreTensors::new(
            vec![vec![-0.1, -5.0, -5.0], vec![-5.0, -0.1, -5.0]],
            vec![vec![-0.5, -0.5, -0.1], vec![-0.1, -0.5, -0.5]],
        );
        let result = parser.parse_sentence("the cat", &scores).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].tree.leaves(), vec!["the", "cat"]);
    }

    #[test]
    fn test_batch_delegates_to_batch_module() {
        let parser = toy_parser();
        let scores = ScoreTensors::new(
            vec![vec![-0.1, -5.0, -5.0], vec![-5.0, -0.1, -5.0]],
            vec![vec![-0.5, -0.5, -0.1], vec![-0.1, -0.5, -0.5]],
        );
        let batch = vec![BatchItem::new(vec![Token::new("the"), Token::new("cat")], scores)];
        let results = parser.parse_batch(&batch);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_ref().unwrap().len(), 1);
    }
}

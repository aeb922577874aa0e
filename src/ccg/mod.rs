//! Combinatory Categorial Grammar (CCG) A*-search chart parser.

pub mod agenda;
pub mod astar;
pub mod batch;
pub mod category;
pub mod chart;
pub mod combinator;
pub mod constraint;
pub mod edge;
pub mod error;
pub mod grammar;
pub mod nbest;
pub mod node;
pub mod parser;
pub mod scorer;
pub mod token;

pub use astar::ParserConfig;
pub use batch::BatchItem;
pub use category::Category;
pub use constraint::{ConstraintSet, PartialConstraint};
pub use error::{GrammarLoadError, ParseFailure};
pub use grammar::GrammarPack;
pub use node::{Derivation, DerivationNode};
pub use combinator::{
    en_default_binary_rules, ja_default_binary_rules, headfirst_combinator, BinaryCombinator,
};
pub use parser::Parser;
pub use scorer::ScoreTensors;
pub use token::Token;

//! # ccg_astar
//!
//! An A*-search chart parser that produces N-best Combinatory Categorial
//! Grammar (CCG) derivations from per-token supertag probabilities and
//! per-pair dependency probabilities.
//!
//! The crate consumes already-materialised probability tensors from an
//! external scorer (a neural supertagger/dependency model) and a
//! language-specific grammar pack (category inventory, seen-rules set,
//! category dictionary, unary-rule table, root-category filter), and
//! searches for the N highest-scoring well-formed derivations under a
//! configurable combinator catalogue. Tokenization, scoring, and surface
//! printing are the caller's responsibility; see [`ccg::scorer`] and
//! [`ccg::token`] for the boundary.

// Primitives shared across the category algebra and grammar pack.
pub mod common;

pub mod ccg;

pub use ccg::{
    BatchItem, Category, ConstraintSet, Derivation, DerivationNode, GrammarPack, GrammarLoadError,
    ParseFailure, Parser, ParserConfig, PartialConstraint, ScoreTensors, Token,
};

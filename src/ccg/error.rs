//! Driver-level and grammar-loading error taxonomy.
//!
//! Category-string syntax errors are `crate::common::error::Error::ParseError`
//! (ported from the category algebra); the variants here cover the A* driver
//! outcomes named in spec §6/§7, which are distinct failure classes with
//! their own recovery semantics (a batch run keeps going past a
//! `ParseFailure`, but an invariant breach is meant to panic).

use thiserror::Error;

/// A per-sentence parse failure. `NoParse` is deliberately *not* a variant
/// here: an agenda that empties out before any goal edge is popped is a
/// valid, successful `Ok(vec![])` result, never an exception (spec §7).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseFailure {
    /// The sentence has more tokens than `max_length` allows.
    #[error("sentence has {len} tokens, exceeding max_length {max_length}")]
    SentenceTooLong { len: usize, max_length: usize },

    /// The agenda pop-counter exceeded `max_steps` before N completions
    /// were found.
    #[error("exceeded max_steps budget of {max_steps} agenda pops")]
    BudgetExceeded { max_steps: usize },

    /// Score tensors did not match the sentence length or category count,
    /// or contained a value outside `(-inf, 0]` or NaN.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Failure to load a grammar pack from disk (spec §6's four flat-file
/// formats).
#[derive(Error, Debug)]
pub enum GrammarLoadError {
    #[error("failed to read grammar file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed line {line} in {path}: {message}")]
    MalformedLine {
        path: String,
        line: usize,
        message: String,
    },

    #[error(transparent)]
    Category(#[from] crate::common::error::Error),
}

//! Shared category-algebra error type.

use thiserror::Error;

/// Failures from the category algebra (spec §4.1: parsing and feature
/// substitution). Unification is not an error case — it returns `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A category string could not be parsed.
    #[error("category parse error: {0}")]
    ParseError(String),
}

/// Result type for category-algebra operations that can fail.
pub type Result<T> = std::result::Result<T, Error>;

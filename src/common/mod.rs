//! Primitives shared by the category algebra and the grammar pack: feature
//! structures/values and the category-parse error type.

pub mod error;
pub mod feature;

pub use error::Error;
pub use feature::{FeatureStructure, FeatureValue};

//! CCG category algebra: parsing, unification, substitution, and interning.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::common::error::Error;
use crate::common::{FeatureStructure, FeatureValue};

/// A CCG syntactic category: atomic (`NP`, `S[dcl]`) or a slash category
/// built out of two subcategories (`NP/N`, `S\NP`).
///
/// Subcategories are held behind `Arc` rather than `Box` so that a
/// [`CategoryInterner`] can hand out cheap clones of shared structure instead
/// of re-allocating a category tree for every edge that mentions it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    /// Atomic categories like `S`, `NP`, `N`, optionally carrying features.
    Atomic(String, FeatureStructure),
    /// Forward slash category (`X/Y`): combines with an argument to its right.
    Forward(Arc<Category>, Arc<Category>),
    /// Backward slash category (`X\Y`): combines with an argument to its left.
    Backward(Arc<Category>, Arc<Category>),
}

// Hash ignores features, matching Eq's stricter structural comparison: two
// categories that differ only in feature values land in the same bucket but
// still compare unequal. This keeps Hash cheap without requiring
// FeatureStructure to carry its own stable hash.
impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Category::Atomic(name, _) => {
                0u8.hash(state);
                name.hash(state);
            }
            Category::Forward(x, y) => {
                1u8.hash(state);
                x.hash(state);
                y.hash(state);
            }
            Category::Backward(x, y) => {
                2u8.hash(state);
                x.hash(state);
                y.hash(state);
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Atomic(name, features) => {
                write!(f, "{}", name)?;
                if !features.features.is_empty() {
                    write!(f, "{}", features)?;
                }
                Ok(())
            }
            Category::Forward(x, y) => {
                if matches!(**x, Category::Atomic(_, _)) {
                    write!(f, "{}/{}", x, y)
                } else {
                    write!(f, "({})/{}", x, y)
                }
            }
            Category::Backward(x, y) => {
                if matches!(**x, Category::Atomic(_, _)) {
                    write!(f, "{}\\{}", x, y)
                } else {
                    write!(f, "({})\\{}", x, y)
                }
            }
        }
    }
}

impl Category {
    /// Create an atomic category with no features.
    pub fn atomic(name: &str) -> Self {
        Category::Atomic(name.to_string(), FeatureStructure::new())
    }

    /// Create an atomic category carrying a feature structure.
    pub fn atomic_with_features(name: &str, features: FeatureStructure) -> Self {
        Category::Atomic(name.to_string(), features)
    }

    /// Create a forward slash category (`X/Y`).
    pub fn forward(left: Category, right: Category) -> Self {
        Category::Forward(Arc::new(left), Arc::new(right))
    }

    /// Create a backward slash category (`X\Y`).
    pub fn backward(left: Category, right: Category) -> Self {
        Category::Backward(Arc::new(left), Arc::new(right))
    }

    pub fn s() -> Self {
        Self::atomic("S")
    }

    pub fn np() -> Self {
        Self::atomic("NP")
    }

    pub fn n() -> Self {
        Self::atomic("N")
    }

    /// The feature structure carried by an atomic category, if any.
    pub fn features(&self) -> Option<&FeatureStructure> {
        match self {
            Category::Atomic(_, features) => Some(features),
            _ => None,
        }
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self, Category::Atomic(_, _))
    }

    /// The bare atomic name (without features), if this category is atomic.
    pub fn atomic_name(&self) -> Option<&str> {
        match self {
            Category::Atomic(name, _) => Some(name),
            _ => None,
        }
    }

    /// Unify this category with another, recursing structurally into
    /// slash categories and deferring to [`FeatureStructure::unify`] at
    /// atomic leaves. Returns `None` (not an error) on failure, per the
    /// category algebra's `unify(a, b) -> Category | ⊥` contract.
    pub fn unify(&self, other: &Category) -> Option<Category> {
        match (self, other) {
            (Category::Atomic(s1, f1), Category::Atomic(s2, f2)) => {
                if s1 != s2 {
                    return None;
                }
                f1.unify(f2).map(|unified| Category::Atomic(s1.clone(), unified))
            }
            (Category::Forward(x1, y1), Category::Forward(x2, y2)) => {
                let x = x1.unify(x2)?;
                let y = y1.unify(y2)?;
                Some(Category::forward(x, y))
            }
            (Category::Backward(x1, y1), Category::Backward(x2, y2)) => {
                let x = x1.unify(x2)?;
                let y = y1.unify(y2)?;
                Some(Category::backward(x, y))
            }
            _ => None,
        }
    }

    /// Replace bound feature variables throughout the category tree.
    pub fn substitute(&self, bindings: &HashMap<String, FeatureValue>) -> Category {
        match self {
            Category::Atomic(name, features) => {
                Category::Atomic(name.clone(), features.substitute(bindings))
            }
            Category::Forward(x, y) => {
                Category::forward(x.substitute(bindings), y.substitute(bindings))
            }
            Category::Backward(x, y) => {
                Category::backward(x.substitute(bindings), y.substitute(bindings))
            }
        }
    }

    /// Structural equality that additionally treats feature variables as
    /// interchangeable: two categories are alpha-equivalent if they are
    /// identical once every feature variable is erased to "unspecified".
    /// This realises the category algebra's "equality modulo
    /// feature-variable renaming" requirement without needing a full
    /// unification pass.
    pub fn alpha_equivalent(&self, other: &Category) -> bool {
        self.erase_variables() == other.erase_variables()
    }

    /// Normalize away feature-variable bindings, leaving everything else
    /// (atomic names, slash structure, concrete feature values) intact.
    /// Two categories are [`Category::alpha_equivalent`] exactly when
    /// their `erase_variables()` results are equal — callers that need a
    /// stable key for "the same category up to feature-variable renaming"
    /// (e.g. the chart's span/category buckets) should key off
    /// `erase_variables().to_string()` rather than the raw `Display`
    /// string, which still shows each variable's own name.
    pub fn erase_variables(&self) -> Category {
        match self {
            Category::Atomic(name, features) => {
                let mut erased = FeatureStructure::new();
                for (k, v) in &features.features {
                    let v = match v {
                        FeatureValue::Variable(_) => FeatureValue::Unspecified,
                        other => other.clone(),
                    };
                    erased.add(k, v);
                }
                Category::Atomic(name.clone(), erased)
            }
            Category::Forward(x, y) => Category::forward(x.erase_variables(), y.erase_variables()),
            Category::Backward(x, y) => Category::backward(x.erase_variables(), y.erase_variables()),
        }
    }

    /// Parse a category string such as `(S[dcl]\NP)/NP` via recursive
    /// descent. Slashes associate to the left when no parentheses are
    /// present (`S\NP/NP` parses as `(S\NP)/NP`), matching the bracketing
    /// convention used in CCGbank-derived grammar files.
    pub fn parse(input: &str) -> Result<Category, Error> {
        let tokens = tokenize(input)?;
        let mut pos = 0;
        let cat = parse_category(&tokens, &mut pos)?;
        if pos != tokens.len() {
            return Err(Error::ParseError(format!(
                "trailing input after category: {}",
                input
            )));
        }
        Ok(cat)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Slash(char),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Tok>, Error> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Tok::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Tok::RParen);
            }
            '[' => {
                chars.next();
                tokens.push(Tok::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Tok::RBracket);
            }
            ',' => {
                chars.next();
                tokens.push(Tok::Comma);
            }
            '/' | '\\' => {
                chars.next();
                tokens.push(Tok::Slash(c));
            }
            _ => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if "()[],/\\ \t".contains(c) {
                        break;
                    }
                    ident.push(c);
                    chars.next();
                }
                if ident.is_empty() {
                    return Err(Error::ParseError(format!(
                        "unexpected character '{}' in category string: {}",
                        c, input
                    )));
                }
                tokens.push(Tok::Ident(ident));
            }
        }
    }
    Ok(tokens)
}

fn parse_category(tokens: &[Tok], pos: &mut usize) -> Result<Category, Error> {
    let mut left = parse_primary(tokens, pos)?;
    while let Some(Tok::Slash(dir)) = tokens.get(*pos) {
        let dir = *dir;
        *pos += 1;
        let right = parse_primary(tokens, pos)?;
        left = if dir == '/' {
            Category::forward(left, right)
        } else {
            Category::backward(left, right)
        };
    }
    Ok(left)
}

fn parse_primary(tokens: &[Tok], pos: &mut usize) -> Result<Category, Error> {
    match tokens.get(*pos) {
        Some(Tok::LParen) => {
            *pos += 1;
            let inner = parse_category(tokens, pos)?;
            match tokens.get(*pos) {
                Some(Tok::RParen) => {
                    *pos += 1;
                    Ok(inner)
                }
                _ => Err(Error::ParseError("unmatched '(' in category string".to_string())),
            }
        }
        Some(Tok::Ident(name)) => {
            let name = name.clone();
            *pos += 1;
            let features = parse_features(tokens, pos)?;
            Ok(Category::Atomic(name, features))
        }
        other => Err(Error::ParseError(format!(
            "expected a category, found {:?}",
            other
        ))),
    }
}

fn parse_features(tokens: &[Tok], pos: &mut usize) -> Result<FeatureStructure, Error> {
    let mut features = FeatureStructure::new();
    if tokens.get(*pos) != Some(&Tok::LBracket) {
        return Ok(features);
    }
    *pos += 1;
    let mut slot = 0;
    loop {
        match tokens.get(*pos) {
            Some(Tok::Ident(value)) => {
                let key = format!("f{}", slot);
                let value = if value.len() == 1 && value.chars().next().unwrap().is_ascii_uppercase() {
                    FeatureValue::Variable(value.clone())
                } else {
                    FeatureValue::Atomic(value.clone())
                };
                features.add(&key, value);
                slot += 1;
                *pos += 1;
            }
            other => {
                return Err(Error::ParseError(format!(
                    "expected a feature value, found {:?}",
                    other
                )))
            }
        }
        match tokens.get(*pos) {
            Some(Tok::Comma) => {
                *pos += 1;
                continue;
            }
            Some(Tok::RBracket) => {
                *pos += 1;
                break;
            }
            other => {
                return Err(Error::ParseError(format!(
                    "expected ',' or ']' in feature bracket, found {:?}",
                    other
                )))
            }
        }
    }
    Ok(features)
}

/// Assigns stable, deterministic integer ids to categories the first time
/// each is seen. Used for agenda tie-breaking (spec §4.7: "lower
/// category-index") and to recover a supertag's column in the scorer's
/// tensors. A parser seeds one of these from the grammar pack's
/// `categories` list so lexicon categories keep the index the scorer
/// expects; any category produced by a combinator during the search gets
/// the next free id, in first-discovered order.
#[derive(Debug, Default)]
pub struct CategoryInterner {
    ids: HashMap<Category, u32>,
    next: u32,
}

impl CategoryInterner {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            next: 0,
        }
    }

    /// Build an interner whose first `seed.len()` ids match the order of
    /// `seed` exactly (so grammar-pack supertag indices remain stable).
    pub fn seeded(seed: &[Arc<Category>]) -> Self {
        let mut interner = Self::new();
        for cat in seed {
            interner.intern(cat);
        }
        interner
    }

    pub fn intern(&mut self, cat: &Category) -> u32 {
        if let Some(&id) = self.ids.get(cat) {
            return id;
        }
        let id = self.next;
        self.next += 1;
        self.ids.insert(cat.clone(), id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display() {
        let np = Category::np();
        let n = Category::n();
        let det = Category::forward(np.clone(), n.clone());

        assert_eq!(np.to_string(), "NP");
        assert_eq!(det.to_string(), "NP/N");

        let s = Category::s();
        let iv = Category::backward(s.clone(), np.clone());
        let tv = Category::backward(iv.clone(), np.clone());

        assert_eq!(iv.to_string(), "S\\NP");
        assert_eq!(tv.to_string(), "(S\\NP)\\NP");
    }

    #[test]
    fn test_parse_roundtrip() {
        let cases = ["S", "NP", "NP/N", "S\\NP", "(S\\NP)/NP", "S\\NP/NP"];
        for case in cases {
            let cat = Category::parse(case).expect("should parse");
            // S\NP/NP should associate left, same as (S\NP)/NP
            if case == "S\\NP/NP" {
                assert_eq!(cat.to_string(), "(S\\NP)/NP");
            } else {
                assert_eq!(cat.to_string(), case);
            }
        }
    }

    #[test]
    fn test_parse_features() {
        let cat = Category::parse("S[dcl]").expect("should parse");
        assert_eq!(cat.to_string(), "S[f0=dcl]");
        match cat {
            Category::Atomic(name, features) => {
                assert_eq!(name, "S");
                assert_eq!(features.get("f0"), Some(&FeatureValue::Atomic("dcl".to_string())));
            }
            _ => panic!("expected atomic category"),
        }
    }

    #[test]
    fn test_parse_error_on_malformed_input() {
        assert!(Category::parse("(S\\NP").is_err());
        assert!(Category::parse("S\\").is_err());
        assert!(Category::parse("").is_err());
    }

    #[test]
    fn test_category_unification() {
        let mut feat1 = FeatureStructure::new();
        feat1.add("num", FeatureValue::Atomic("sg".to_string()));

        let mut feat2 = FeatureStructure::new();
        feat2.add("per", FeatureValue::Atomic("3".to_string()));

        let cat1 = Category::atomic_with_features("NP", feat1);
        let cat2 = Category::atomic_with_features("NP", feat2);

        assert!(cat1.unify(&cat2).is_some());

        let mut feat3 = FeatureStructure::new();
        feat3.add("num", FeatureValue::Atomic("sg".to_string()));
        let cat3 = Category::atomic_with_features("S", feat3);
        assert!(cat1.unify(&cat3).is_none());
    }

    #[test]
    fn test_substitution() {
        let mut features = FeatureStructure::new();
        features.add("f0", FeatureValue::Variable("X".to_string()));
        let cat = Category::forward(Category::s(), Category::atomic_with_features("S", features));

        let mut bindings = HashMap::new();
        bindings.insert("X".to_string(), FeatureValue::Atomic("dcl".to_string()));

        let substituted = cat.substitute(&bindings);
        assert_eq!(substituted.to_string(), "S/S[f0=dcl]");
    }

    #[test]
    fn test_alpha_equivalence() {
        let mut f1 = FeatureStructure::new();
        f1.add("f0", FeatureValue::Variable("X".to_string()));
        let mut f2 = FeatureStructure::new();
        f2.add("f0", FeatureValue::Variable("Y".to_string()));

        let c1 = Category::atomic_with_features("S", f1);
        let c2 = Category::atomic_with_features("S", f2);
        assert!(c1.alpha_equivalent(&c2));
        assert_ne!(c1, c2);
    }

    #[test]
    fn test_interner_is_deterministic_and_seeded() {
        let np = Arc::new(Category::np());
        let n = Arc::new(Category::n());
        let mut interner = CategoryInterner::seeded(&[np.clone(), n.clone()]);

        assert_eq!(interner.intern(&np), 0);
        assert_eq!(interner.intern(&n), 1);

        let s = Category::s();
        let first_s_id = interner.intern(&s);
        assert_eq!(first_s_id, 2);
        assert_eq!(interner.intern(&s), first_s_id);
    }
}

//! Surface tokens passed into the core parser.

/// A single input token. Only `surface` is consulted by the core (for
/// category-dictionary lookups and leaf labels); `pos`, `ne`, and `lemma`
/// flow through untouched for callers that render derivations with their
/// own printers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Token {
    pub surface: String,
    pub pos: Option<String>,
    pub ne: Option<String>,
    pub lemma: Option<String>,
}

impl Token {
    pub fn new(surface: &str) -> Self {
        Token {
            surface: surface.to_string(),
            pos: None,
            ne: None,
            lemma: None,
        }
    }

    pub fn with_pos(mut self, pos: &str) -> Self {
        self.pos = Some(pos.to_string());
        self
    }

    pub fn with_ne(mut self, ne: &str) -> Self {
        self.ne = Some(ne.to_string());
        self
    }

    pub fn with_lemma(mut self, lemma: &str) -> Self {
        self.lemma = Some(lemma.to_string());
        self
    }

    /// Split a whitespace-separated sentence into bare tokens.
    pub fn tokenize_whitespace(sentence: &str) -> Vec<Token> {
        sentence.split_whitespace().map(Token::new).collect()
    }
}

//! Program representation: the validated token stream.
//!
//! A program is built once per load and never mutated afterwards. `eip`
//! indexes into [`Program::tokens`], not into bytes.

use std::collections::HashMap;

use crate::token::Token;

/// A validated token stream with its source-line map and label index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    tokens: Vec<Token>,
    /// 1-based source line of each token.
    lines: Vec<usize>,
    /// Label name to the index of its first declaration.
    labels: HashMap<String, usize>,
}

impl Program {
    /// Create a program from tokens and their source lines.
    ///
    /// `lines` must have one entry per token. When a label is declared more
    /// than once, the first declaration is the jump target.
    pub fn new(tokens: Vec<Token>, lines: Vec<usize>) -> Self {
        debug_assert_eq!(tokens.len(), lines.len());
        let mut labels = HashMap::new();
        for (i, token) in tokens.iter().enumerate() {
            if let Token::Label(name) = token {
                labels.entry(name.clone()).or_insert(i);
            }
        }
        Self {
            tokens,
            lines,
            labels,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Source line of the token at `index`.
    pub fn line_of(&self, index: usize) -> Option<usize> {
        self.lines.get(index).copied()
    }

    /// Token index of the declaration `name:`.
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels.iter().map(|(name, &idx)| (name.as_str(), idx))
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

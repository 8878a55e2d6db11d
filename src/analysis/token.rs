//! Token types produced by text analysis.
//!
//! A [`Token`] carries the normalized term together with the byte span it
//! came from in the original text. Spans are persisted in full-text postings
//! and later drive highlighting, so they always refer to the un-normalized
//! source string.
//!
//! # Examples
//!
//! ```
//! use tessera::analysis::token::Token;
//!
//! let token = Token::new("world", 6, 11);
//! assert_eq!(token.term, "world");
//! assert_eq!(token.span(), (6, 11));
//! ```

use serde::{Deserialize, Serialize};

/// A single term with its source offsets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The normalized term
    pub term: String,

    /// Byte offset where the token starts in the original text
    pub start: usize,

    /// Byte offset where the token ends in the original text (exclusive)
    pub end: usize,
}

impl Token {
    /// Create a new token.
    pub fn new<S: Into<String>>(term: S, start: usize, end: usize) -> Self {
        Token {
            term: term.into(),
            start,
            end,
        }
    }

    /// The `[start, end)` span in the source text.
    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Number of characters in the normalized term.
    pub fn char_len(&self) -> usize {
        self.term.chars().count()
    }
}

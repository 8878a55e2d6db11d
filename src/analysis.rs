//! Text analysis: turning field values and query strings into terms.

pub mod token;
pub mod tokenizer;

pub use token::Token;
pub use tokenizer::{GeneralTokenizer, Tokenizer};

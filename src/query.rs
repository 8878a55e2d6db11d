//! Query trees, their evaluation, and the scored match they produce.

pub mod ast;
pub mod evaluator;
pub mod matching;

pub use ast::{Occur, Query};
pub use evaluator::QueryEvaluator;
pub use matching::{FieldHighlights, Match, TextRange};

//! Relevance scoring for full-text matches.

pub mod bm25;
pub mod weighting;

pub use bm25::{Bm25, ScoringConfig, bm25};
pub use weighting::{LengthRatio, TermWeighting, Uniform};

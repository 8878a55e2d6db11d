//! Partial-credit weights for prefix matches.
//!
//! A full-text query term also matches every indexed term it is a prefix of.
//! The weighting decides how much of the BM25 score such a match keeps.

/// Weight applied to the score of an indexed term matched by a query term.
pub trait TermWeighting: Send + Sync + std::fmt::Debug {
    /// Weight in `[0, 1]` for `matched_term` found by `query_term`.
    fn weight(&self, query_term: &str, matched_term: &str) -> f32;

    /// Get the name of this weighting.
    fn name(&self) -> &'static str;
}

/// Weights a match by `query length / matched length` in characters, so an
/// exact match outranks a longer term that merely starts with the query.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthRatio;

impl TermWeighting for LengthRatio {
    fn weight(&self, query_term: &str, matched_term: &str) -> f32 {
        let matched = matched_term.chars().count();
        if matched == 0 {
            return 1.0;
        }
        let query = query_term.chars().count();
        (query as f32 / matched as f32).min(1.0)
    }

    fn name(&self) -> &'static str {
        "length_ratio"
    }
}

/// Gives every match full credit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uniform;

impl TermWeighting for Uniform {
    fn weight(&self, _query_term: &str, _matched_term: &str) -> f32 {
        1.0
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}

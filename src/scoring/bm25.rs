//! BM25 relevance scoring.

use serde::{Deserialize, Serialize};

/// Configuration for the BM25 scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// K1 parameter for BM25 (term frequency saturation).
    pub k1: f32,

    /// B parameter for BM25 (field length normalization).
    pub b: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig { k1: 1.0, b: 0.75 }
    }
}

/// BM25 scorer over per-field statistics.
///
/// The posting row count returned for a query term (`total_count`) stands in
/// for the collection size, with the matching count fixed at one, so the IDF
/// part grows slowly with the candidate set instead of penalizing common
/// terms. There is no separate IDF factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25 {
    k1: f32,
    b: f32,
}

impl Default for Bm25 {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

impl Bm25 {
    /// Create a scorer with explicit parameters.
    pub fn new(k1: f32, b: f32) -> Self {
        Bm25 { k1, b }
    }

    /// Create a scorer from configuration.
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.k1, config.b)
    }

    /// The term frequency saturation parameter.
    pub fn k1(&self) -> f32 {
        self.k1
    }

    /// The length normalization parameter.
    pub fn b(&self) -> f32 {
        self.b
    }

    /// Score one occurrence set of a term within one field value.
    ///
    /// # Arguments
    ///
    /// * `term_freq` - Occurrences of the term in the value
    /// * `total_count` - Posting rows fetched for the query term
    /// * `field_length` - Length of the value in characters
    /// * `avg_field_length` - Average value length of the field
    ///
    /// # Returns
    ///
    /// A non-negative score; zero when the term does not occur.
    pub fn score(
        &self,
        term_freq: usize,
        total_count: usize,
        field_length: usize,
        avg_field_length: f64,
    ) -> f32 {
        if term_freq == 0 {
            return 0.0;
        }

        let n = total_count.max(1) as f32;
        let matching = 1.0_f32;
        let idf = (1.0 + (n - matching + 0.5) / (matching + 0.5)).ln();

        let length_ratio = if avg_field_length > 0.0 {
            (field_length as f64 / avg_field_length) as f32
        } else {
            1.0
        };

        let tf = term_freq as f32;
        let norm = self.k1 * (1.0 - self.b + self.b * length_ratio);
        idf * (tf * (self.k1 + 1.0)) / (tf + norm)
    }
}

/// Free-function form of [`Bm25::score`] with the default `b`.
pub fn bm25(
    term_freq: usize,
    total_count: usize,
    field_length: usize,
    avg_field_length: f64,
    k1: f32,
) -> f32 {
    Bm25::new(k1, ScoringConfig::default().b).score(
        term_freq,
        total_count,
        field_length,
        avg_field_length,
    )
}

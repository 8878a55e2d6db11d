//! Score and highlight accumulator with a boolean algebra.
//!
//! A [`Match`] maps internal document numbers to a relevance score and keeps,
//! per document, the highlight ranges that produced the score:
//! `doc -> field -> value index -> ranges`. Leaf queries build a `Match`
//! with [`Match::add_score`] and [`Match::add_highlighter`]; composite
//! queries combine them with [`Match::and`], [`Match::or`],
//! [`Match::exclude`] and [`Match::boost`], which never mutate their inputs
//! and never drop highlight data of a document that survives.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::storage::DocNum;

/// A `[start, end)` byte range inside one field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextRange {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl TextRange {
    /// Create a new range.
    pub fn new(start: usize, end: usize) -> Self {
        TextRange { start, end }
    }

    /// Whether the range covers nothing.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl From<(usize, usize)> for TextRange {
    fn from((start, end): (usize, usize)) -> Self {
        TextRange::new(start, end)
    }
}

/// Highlight ranges of one document: field name -> value index -> ranges.
pub type FieldHighlights = BTreeMap<String, BTreeMap<usize, Vec<TextRange>>>;

/// The result of evaluating a query: scored documents plus highlight ranges.
///
/// Iteration follows ascending document number, which is also the tie-break
/// used by [`Match::ranked`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Match {
    scores: BTreeMap<DocNum, f32>,
    highlights: BTreeMap<DocNum, FieldHighlights>,
}

impl Match {
    /// Create an empty match.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of matched documents.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether no document matched.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Whether `id` matched.
    pub fn contains(&self, id: DocNum) -> bool {
        self.scores.contains_key(&id)
    }

    /// Score of `id`, if it matched.
    pub fn score(&self, id: DocNum) -> Option<f32> {
        self.scores.get(&id).copied()
    }

    /// Matched documents in ascending document number.
    pub fn ids(&self) -> impl Iterator<Item = DocNum> + '_ {
        self.scores.keys().copied()
    }

    /// All highlight data of `id`.
    pub fn highlights(&self, id: DocNum) -> Option<&FieldHighlights> {
        self.highlights.get(&id)
    }

    /// Highlight data of `id` for one field, keyed by value index.
    pub fn field_highlights(
        &self,
        id: DocNum,
        field: &str,
    ) -> Option<&BTreeMap<usize, Vec<TextRange>>> {
        self.highlights.get(&id).and_then(|fields| fields.get(field))
    }

    /// Add `delta` to the score of `id`, inserting it if absent.
    pub fn add_score(&mut self, id: DocNum, delta: f32) {
        *self.scores.entry(id).or_insert(0.0) += delta;
    }

    /// Record highlight ranges for one value of a field of `id`.
    ///
    /// Ranges are kept sorted and de-duplicated.
    pub fn add_highlighter<I>(&mut self, id: DocNum, field: &str, index: usize, ranges: I)
    where
        I: IntoIterator<Item = TextRange>,
    {
        let slot = self
            .highlights
            .entry(id)
            .or_default()
            .entry(field.to_string())
            .or_default()
            .entry(index)
            .or_default();
        slot.extend(ranges);
        slot.sort_unstable();
        slot.dedup();
    }

    fn copy_highlights(&mut self, from: &Match, id: DocNum) {
        let Some(fields) = from.highlights.get(&id) else {
            return;
        };
        for (field, values) in fields {
            for (index, ranges) in values {
                self.add_highlighter(id, field, *index, ranges.iter().copied());
            }
        }
    }

    /// Documents present in both; scores are summed.
    pub fn and(&self, other: &Match) -> Match {
        let mut result = Match::new();
        for (&id, &score) in &self.scores {
            if let Some(other_score) = other.score(id) {
                result.add_score(id, score + other_score);
                result.copy_highlights(self, id);
                result.copy_highlights(other, id);
            }
        }
        result
    }

    /// Documents present in either; scores are summed where both have one.
    pub fn or(&self, other: &Match) -> Match {
        let mut result = Match::new();
        for source in [self, other] {
            for (&id, &score) in &source.scores {
                result.add_score(id, score);
                result.copy_highlights(source, id);
            }
        }
        result
    }

    /// Documents of `self` that are absent from `other`.
    pub fn exclude(&self, other: &Match) -> Match {
        self.filter(|id| !other.contains(id))
    }

    /// Multiply every score by `factor`.
    pub fn boost(&self, factor: f32) -> Match {
        Match {
            scores: self.scores.iter().map(|(&id, &score)| (id, score * factor)).collect(),
            highlights: self.highlights.clone(),
        }
    }

    /// Keep only the documents accepted by `predicate`.
    pub fn filter<F>(&self, mut predicate: F) -> Match
    where
        F: FnMut(DocNum) -> bool,
    {
        let mut result = Match::new();
        for (&id, &score) in &self.scores {
            if predicate(id) {
                result.add_score(id, score);
                result.copy_highlights(self, id);
            }
        }
        result
    }

    /// Documents ordered by descending score.
    ///
    /// Equal scores keep ascending document number, i.e. the order in which
    /// documents were first stored.
    pub fn ranked(&self) -> Vec<DocNum> {
        self.ranked_with_scores().into_iter().map(|(id, _)| id).collect()
    }

    /// Like [`Match::ranked`], with scores.
    pub fn ranked_with_scores(&self) -> Vec<(DocNum, f32)> {
        let mut entries: Vec<(DocNum, f32)> = self.scores.iter().map(|(&id, &s)| (id, s)).collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        entries
    }
}

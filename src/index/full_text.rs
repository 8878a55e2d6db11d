//! BM25-scored inverted index for tokenized text fields.
//!
//! Each distinct term of a document writes one posting row whose positions
//! list, per value of the field, the value's length and every span the term
//! occupies. Query tokens match their exact term and every longer term that
//! starts with them; the per-value scores of all query tokens are summed and
//! each document keeps its best-scoring value.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::document::FieldValue;
use crate::error::Result;
use crate::index::key::IndexKey;
use crate::index::posting::{PositionEntry, decode_positions, encode_positions};
use crate::index::stats::FieldStats;
use crate::index::{FullTextSettings, InvertedIndex};
use crate::query::matching::{Match, TextRange};
use crate::storage::{DocNum, IndexStore, KeyRange, PostingRow};

/// Full-text index over one field of one table.
#[derive(Debug)]
pub struct FullTextInvertedIndex {
    table: String,
    field: String,
    settings: FullTextSettings,
}

/// A scored occurrence set of one query token in one field value.
#[derive(Debug)]
struct Scored {
    nid: DocNum,
    value_index: usize,
    score: f32,
    ranges: Vec<TextRange>,
}

#[derive(Debug, Default)]
struct Candidate {
    score: f32,
    ranges: Vec<TextRange>,
}

impl FullTextInvertedIndex {
    /// Create an index for `field` of `table`.
    pub fn new(table: &str, field: &str, settings: FullTextSettings) -> Self {
        FullTextInvertedIndex {
            table: table.to_string(),
            field: field.to_string(),
            settings,
        }
    }

    /// Statistics of the field as currently stored.
    pub fn stats(&self, store: &dyn IndexStore) -> Result<FieldStats> {
        FieldStats::load(store, &self.table, &self.field)
    }

    /// Rows for `term` itself followed by the terms it prefixes.
    fn fetch(&self, store: &dyn IndexStore, term: &str) -> Result<Vec<PostingRow>> {
        let key = IndexKey::for_string(&self.field, term);
        let exact = key.to_bytes();
        let upper = key.succ().to_bytes();

        let mut rows = store.scan_postings(&self.table, &KeyRange::exact(exact.clone()), None)?;
        rows.extend(store.scan_postings(
            &self.table,
            &KeyRange::open(exact, upper),
            Some(self.settings.prefix_scan_limit),
        )?);
        Ok(rows)
    }

    /// Score every row fetched for one query token.
    fn score_token(&self, rows: &[PostingRow], term: &str, avg_length: f64) -> Vec<Scored> {
        let total_count = rows.len();
        let query_len = term.len();
        let mut scored = Vec::new();

        for row in rows {
            let matched_term = match IndexKey::from_bytes(&row.key)
                .and_then(|key| key.as_string().map(str::to_string))
            {
                Ok(matched) => matched,
                Err(e) => {
                    warn!("skipping undecodable posting key in {}.{}: {e}", self.table, self.field);
                    continue;
                }
            };
            let entries = match &row.positions {
                Some(bytes) => match decode_positions(bytes) {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!(
                            "skipping posting of document {} in {}.{}: {e}",
                            row.nid, self.table, self.field
                        );
                        continue;
                    }
                },
                None => vec![PositionEntry::empty()],
            };

            let weight = self.settings.weighting.weight(term, &matched_term);
            for entry in entries {
                let score = self.settings.scorer.score(
                    entry.term_freq(),
                    total_count,
                    entry.value_length,
                    avg_length,
                ) * weight;
                let ranges = entry
                    .ranges
                    .iter()
                    .map(|r| TextRange::new(r.start, (r.start + query_len).min(r.end)))
                    .collect();
                scored.push(Scored {
                    nid: row.nid,
                    value_index: entry.value_index,
                    score,
                    ranges,
                });
            }
        }
        scored
    }
}

/// Rescale scores into `[0, 1]`, with the extremes folded from zero.
fn normalize(scored: &mut [Scored]) {
    let max = scored.iter().fold(0.0_f32, |acc, s| acc.max(s.score));
    let min = scored.iter().fold(0.0_f32, |acc, s| acc.min(s.score));
    if max == min {
        return;
    }
    for s in scored.iter_mut() {
        s.score = (s.score - min) / (max - min);
    }
}

impl InvertedIndex for FullTextInvertedIndex {
    fn table(&self) -> &str {
        &self.table
    }

    fn field(&self) -> &str {
        &self.field
    }

    fn match_term(&self, store: &dyn IndexStore, term: &str) -> Result<Match> {
        let tokens = self.settings.tokenizer.tokenize(term);
        if tokens.is_empty() {
            return Ok(Match::new());
        }
        let avg_length = self.stats(store)?.avg_length;

        let mut candidates: BTreeMap<DocNum, BTreeMap<usize, Candidate>> = BTreeMap::new();
        for token in &tokens {
            let rows = self.fetch(store, &token.term)?;
            let mut scored = self.score_token(&rows, &token.term, avg_length);
            normalize(&mut scored);

            for s in scored {
                let candidate = candidates
                    .entry(s.nid)
                    .or_default()
                    .entry(s.value_index)
                    .or_default();
                candidate.score += s.score;
                candidate.ranges.extend(s.ranges);
            }
        }

        let mut result = Match::new();
        for (nid, values) in candidates {
            // Values iterate in index order, so the lowest index wins ties.
            let mut best: Option<(usize, Candidate)> = None;
            for (index, candidate) in values {
                if best.as_ref().is_none_or(|(_, b)| candidate.score > b.score) {
                    best = Some((index, candidate));
                }
            }
            if let Some((index, candidate)) = best {
                result.add_score(nid, candidate.score);
                result.add_highlighter(nid, &self.field, index, candidate.ranges);
            }
        }

        debug!(
            "{}.{} matched {} documents for {} query tokens",
            self.table,
            self.field,
            result.len(),
            tokens.len()
        );
        Ok(result)
    }

    fn insert(&self, store: &dyn IndexStore, nid: DocNum, values: &[FieldValue]) -> Result<()> {
        let mut postings: BTreeMap<String, Vec<PositionEntry>> = BTreeMap::new();
        let mut total_length = 0;

        for (value_index, value) in values.iter().enumerate() {
            let text = match value {
                FieldValue::Text(text) => text.clone(),
                other => other.to_string(),
            };
            let value_length = text.chars().count();
            total_length += value_length;

            let mut occurrences: BTreeMap<String, Vec<TextRange>> = BTreeMap::new();
            for token in self.settings.tokenizer.tokenize(&text) {
                occurrences
                    .entry(token.term)
                    .or_default()
                    .push(TextRange::new(token.start, token.end));
            }
            for (term, ranges) in occurrences {
                postings.entry(term).or_default().push(PositionEntry {
                    value_index,
                    value_length,
                    ranges,
                });
            }
        }

        debug!(
            "indexing {} terms of {}.{} for document {nid}",
            postings.len(),
            self.table,
            self.field
        );
        for (term, entries) in postings {
            store.put_posting(
                &self.table,
                PostingRow {
                    key: IndexKey::for_string(&self.field, &term).to_bytes(),
                    nid,
                    positions: Some(encode_positions(&entries)?),
                },
            )?;
        }

        let stats = self.stats(store)?.record(values.len(), total_length);
        stats.save(store, &self.table, &self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryIndexStore;

    fn index() -> FullTextInvertedIndex {
        FullTextInvertedIndex::new("doc", "body", FullTextSettings::default())
    }

    fn texts(values: &[&str]) -> Vec<FieldValue> {
        values.iter().map(|v| FieldValue::from(*v)).collect()
    }

    #[test]
    fn test_insert_writes_one_row_per_term() {
        let store = MemoryIndexStore::new();
        let index = index();
        index
            .insert(&store, 1, &texts(&["hello world", "hello again"]))
            .unwrap();
        // hello, world, again
        assert_eq!(store.posting_count(), 3);

        let stats = index.stats(&store).unwrap();
        assert_eq!(stats.count, 2);
        assert!((stats.avg_length - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_and_prefix_match() {
        let store = MemoryIndexStore::new();
        let index = index();
        index.insert(&store, 1, &texts(&["search engine"])).unwrap();
        index.insert(&store, 2, &texts(&["searching"])).unwrap();
        index.insert(&store, 3, &texts(&["unrelated"])).unwrap();

        let hits = index.match_term(&store, "search").unwrap();
        assert_eq!(hits.ranked(), vec![1, 2]);
        assert!(hits.score(1).unwrap() > hits.score(2).unwrap());

        let ranges = hits.field_highlights(2, "body").unwrap();
        assert_eq!(ranges[&0], vec![TextRange::new(0, 6)]);
    }

    #[test]
    fn test_best_value_wins() {
        let store = MemoryIndexStore::new();
        let index = index();
        index
            .insert(&store, 1, &texts(&["nothing here", "rust rust", "rust"]))
            .unwrap();

        let hits = index.match_term(&store, "rust").unwrap();
        let highlights = hits.field_highlights(1, "body").unwrap();
        assert_eq!(highlights.len(), 1);
        assert!(highlights.contains_key(&1));
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let store = MemoryIndexStore::new();
        let index = index();
        index.insert(&store, 1, &texts(&["text"])).unwrap();
        assert!(index.match_term(&store, "  ,. ").unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_positions_are_skipped() {
        let store = MemoryIndexStore::new();
        let index = index();
        index.insert(&store, 1, &texts(&["alpha"])).unwrap();
        store
            .put_posting(
                "doc",
                PostingRow {
                    key: IndexKey::for_string("body", "alpha").to_bytes(),
                    nid: 2,
                    positions: Some(vec![0xFF]),
                },
            )
            .unwrap();

        let hits = index.match_term(&store, "alpha").unwrap();
        assert_eq!(hits.ranked(), vec![1]);
    }

    #[test]
    fn test_posting_without_positions() {
        let store = MemoryIndexStore::new();
        store
            .put_posting(
                "doc",
                PostingRow {
                    key: IndexKey::for_string("body", "bare").to_bytes(),
                    nid: 4,
                    positions: None,
                },
            )
            .unwrap();

        let hits = index().match_term(&store, "bare").unwrap();
        assert_eq!(hits.score(4), Some(0.0));
        assert_eq!(hits.field_highlights(4, "body").map(|h| h.len()), Some(1));
    }

    #[test]
    fn test_normalize_folds_from_zero() {
        let mut scored = vec![
            Scored { nid: 1, value_index: 0, score: 2.0, ranges: vec![] },
            Scored { nid: 2, value_index: 0, score: 1.0, ranges: vec![] },
        ];
        normalize(&mut scored);
        assert_eq!(scored[0].score, 1.0);
        assert_eq!(scored[1].score, 0.5);
    }
}

//! Request and response types of the indexer's search operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::FieldValue;

/// Page request. A missing `limit` falls back to the configured default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    /// Maximum number of entries to return.
    pub limit: Option<usize>,
    /// Number of ranked entries to skip.
    pub skip: usize,
}

impl Pagination {
    /// A page of `limit` entries after skipping `skip`.
    pub fn new(limit: usize, skip: usize) -> Self {
        Pagination {
            limit: Some(limit),
            skip,
        }
    }
}

/// Which field to render highlight snippets for, and with which markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRequest {
    /// Field to highlight.
    pub field: String,
    /// Marker inserted before each matched range.
    pub before: String,
    /// Marker inserted after each matched range.
    pub after: String,
}

impl HighlightRequest {
    /// Highlight `field` with the given markers.
    pub fn new<F, B, A>(field: F, before: B, after: A) -> Self
    where
        F: Into<String>,
        B: Into<String>,
        A: Into<String>,
    {
        HighlightRequest {
            field: field.into(),
            before: before.into(),
            after: after.into(),
        }
    }
}

/// Options of a search, and of the hits of an aggregation bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Stored fields to return with every node.
    pub fields: Vec<String>,
    /// Fields to render highlight snippets for.
    pub highlights: Vec<HighlightRequest>,
    /// Page of ranked results to return.
    pub pagination: Pagination,
}

impl SearchOptions {
    /// Builder-style field selection.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style highlight request.
    pub fn with_highlight(mut self, request: HighlightRequest) -> Self {
        self.highlights.push(request);
        self
    }

    /// Builder-style pagination.
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }
}

/// Where a returned page sits in the full result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    /// Total number of entries.
    pub count: usize,
    /// Page size used.
    pub limit: usize,
    /// Entries skipped.
    pub skip: usize,
    /// Whether entries remain after this page.
    pub has_more: bool,
}

impl PaginationInfo {
    pub(crate) fn new(count: usize, limit: usize, skip: usize) -> Self {
        PaginationInfo {
            count,
            limit,
            skip,
            has_more: count > skip.saturating_add(limit),
        }
    }
}

/// One matched document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchNode {
    /// External document id.
    pub id: String,
    /// Relevance score.
    pub score: f32,
    /// Requested stored fields.
    pub fields: BTreeMap<String, Vec<FieldValue>>,
    /// Rendered snippets per highlighted field, one per matched value.
    pub highlights: BTreeMap<String, Vec<String>>,
}

/// A page of ranked documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Position of the page.
    pub pagination: PaginationInfo,
    /// Documents of the page, best first.
    pub nodes: Vec<SearchNode>,
}

/// Options of an aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateOptions {
    /// When present, every bucket carries a page of its best documents.
    pub hits: Option<SearchOptions>,
    /// Page of buckets to return.
    pub pagination: Pagination,
}

/// Documents sharing one value of the aggregated field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// The shared field value.
    pub key: String,
    /// Number of matched documents with this value.
    pub count: usize,
    /// Score of the best document in the bucket.
    pub score: f32,
    /// Best documents of the bucket, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hits: Option<SearchResult>,
}

/// A page of buckets, in the order their best documents rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Position of the page.
    pub pagination: PaginationInfo,
    /// Buckets of the page.
    pub buckets: Vec<Bucket>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_info() {
        assert!(PaginationInfo::new(25, 10, 10).has_more);
        assert!(!PaginationInfo::new(20, 10, 10).has_more);
        assert!(!PaginationInfo::new(0, 10, 0).has_more);
    }

    #[test]
    fn test_options_from_json() {
        let options: SearchOptions = serde_json::from_str(
            r#"{"fields":["title"],"highlights":[{"field":"title","before":"<b>","after":"</b>"}],"pagination":{"limit":5}}"#,
        )
        .unwrap();
        assert_eq!(options.fields, vec!["title".to_string()]);
        assert_eq!(options.pagination, Pagination { limit: Some(5), skip: 0 });
        assert_eq!(options.highlights[0], HighlightRequest::new("title", "<b>", "</b>"));

        let options: AggregateOptions = serde_json::from_str(r#"{"hits":{}}"#).unwrap();
        assert_eq!(options.hits, Some(SearchOptions::default()));
    }
}

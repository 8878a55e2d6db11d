//! The indexer: document writes and ranked search over an [`IndexStore`].
//!
//! ```
//! use std::sync::Arc;
//!
//! use tessera::config::IndexerConfig;
//! use tessera::document::Document;
//! use tessera::indexer::{Indexer, SearchOptions};
//! use tessera::query::Query;
//! use tessera::schema::{FieldSchema, TableSchema};
//! use tessera::storage::MemoryIndexStore;
//!
//! let schema = TableSchema::new().with_field("content", FieldSchema::full_text()).unwrap();
//! let config = IndexerConfig::default().with_table("doc", schema);
//! let indexer = Indexer::new(Arc::new(MemoryIndexStore::new()), config).unwrap();
//!
//! let doc = Document::builder("d1").add_text("content", "the quick brown fox").build();
//! indexer.insert("doc", &doc).unwrap();
//!
//! let result = indexer
//!     .search("doc", &Query::term("content", "quick"), &SearchOptions::default())
//!     .unwrap();
//! assert_eq!(result.nodes[0].id, "d1");
//! ```

pub mod types;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use ahash::AHashMap;
use log::{debug, warn};

use crate::analysis::Tokenizer;
use crate::config::IndexerConfig;
use crate::document::{Document, FieldValue};
use crate::error::{Result, TesseraError};
use crate::highlight::Highlighter;
use crate::index::{FullTextSettings, open_index};
use crate::query::{Match, Query, QueryEvaluator};
use crate::schema::TableSchema;
use crate::scoring::{Bm25, TermWeighting};
use crate::storage::{DocNum, IndexStore, RecordRow};

pub use types::{
    AggregateOptions, AggregateResult, Bucket, HighlightRequest, Pagination, PaginationInfo,
    SearchNode, SearchOptions, SearchResult,
};

/// Stored fields of one document.
type StoredFields = BTreeMap<String, Vec<FieldValue>>;

/// Writes documents into per-field inverted indexes and answers queries.
#[derive(Debug)]
pub struct Indexer {
    store: Arc<dyn IndexStore>,
    config: IndexerConfig,
    settings: FullTextSettings,
    highlighter: Highlighter,
}

impl Indexer {
    /// Create an indexer over `store`. The configuration is validated first.
    pub fn new(store: Arc<dyn IndexStore>, config: IndexerConfig) -> Result<Self> {
        config.validate()?;
        let settings = FullTextSettings {
            scorer: Bm25::from_config(&config.scoring),
            prefix_scan_limit: config.prefix_scan_limit,
            ..FullTextSettings::default()
        };
        let highlighter = Highlighter::new(config.highlight);
        Ok(Indexer {
            store,
            config,
            settings,
            highlighter,
        })
    }

    /// Replace the tokenizer used for full-text values and query terms.
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.settings.tokenizer = tokenizer;
        self
    }

    /// Replace the partial-credit weighting of prefix matches.
    pub fn with_weighting(mut self, weighting: Arc<dyn TermWeighting>) -> Self {
        self.settings.weighting = weighting;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn IndexStore> {
        &self.store
    }

    /// Store a document and write postings for its indexed fields.
    ///
    /// Re-inserting an id keeps its internal number and overwrites the
    /// postings of its current terms; postings of terms it no longer has
    /// stay until the document is deleted.
    ///
    /// Every field name and value is checked before the first write, so a
    /// rejected document leaves the store untouched.
    pub fn insert(&self, table: &str, document: &Document) -> Result<()> {
        let schema = self.config.table(table)?;
        let mut indexes = Vec::new();
        for (name, values) in &document.fields {
            let field = schema.require(name)?;
            if !field.index {
                continue;
            }
            let index = open_index(table, name, field, &self.settings);
            index.check(values)?;
            indexes.push((index, values));
        }

        let stored: StoredFields = document
            .fields
            .iter()
            .filter(|(name, _)| schema.field(name).is_some_and(|field| field.store))
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect();
        let nid = self
            .store
            .put_record(table, &document.id, bincode::serialize(&stored)?)?;

        for (index, values) in indexes {
            index.insert(&*self.store, nid, values)?;
        }
        debug!(
            "inserted document {} into {table} as {nid} ({} fields)",
            document.id,
            document.fields.len()
        );
        Ok(())
    }

    /// Overwrite a document. Identical to [`Indexer::insert`]; delete the
    /// document first for a clean replace.
    pub fn update(&self, table: &str, document: &Document) -> Result<()> {
        self.insert(table, document)
    }

    /// Remove a document and all of its postings. Returns whether it existed.
    ///
    /// Postings go first, so a failed delete can be retried.
    pub fn delete(&self, table: &str, id: &str) -> Result<bool> {
        let schema = self.config.table(table)?;
        let Some(record) = self.store.find_record(table, id)? else {
            return Ok(false);
        };
        let removed = self.delete_postings(table, schema, record.nid)?;
        self.store.delete_record(table, id)?;
        debug!("deleted document {id} from {table} ({removed} postings)");
        Ok(true)
    }

    fn delete_postings(&self, table: &str, schema: &TableSchema, nid: DocNum) -> Result<usize> {
        let mut removed = 0;
        for (name, field) in schema.fields() {
            removed += open_index(table, name, field, &self.settings).delete(&*self.store, nid)?;
        }
        Ok(removed)
    }

    /// Delete every document matching `query`. Returns the number deleted.
    pub fn delete_by_query(&self, table: &str, query: &Query) -> Result<usize> {
        let matched = self.query(table, query)?;
        let mut deleted = 0;
        for nid in matched.ranked() {
            match self.store.get_record(table, nid)? {
                Some(record) => {
                    if self.delete(table, &record.id)? {
                        deleted += 1;
                    }
                }
                None => {
                    let schema = self.config.table(table)?;
                    let removed = self.delete_postings(table, schema, nid)?;
                    warn!("removed {removed} orphaned postings of {nid} in {table}");
                }
            }
        }
        Ok(deleted)
    }

    /// Fetch the stored fields of a document.
    pub fn get(&self, table: &str, id: &str) -> Result<Option<Document>> {
        self.config.table(table)?;
        self.store
            .find_record(table, id)?
            .map(|record| decode_record(&record))
            .transpose()
    }

    /// Evaluate `query` into a raw scored match.
    pub fn query(&self, table: &str, query: &Query) -> Result<Match> {
        let schema = self.config.table(table)?;
        QueryEvaluator::new(&*self.store, table, schema, &self.settings).evaluate(query)
    }

    /// [`Indexer::query`] that stops between query nodes once `cancel` is set.
    pub fn query_with_cancel(
        &self,
        table: &str,
        query: &Query,
        cancel: &AtomicBool,
    ) -> Result<Match> {
        let schema = self.config.table(table)?;
        QueryEvaluator::new(&*self.store, table, schema, &self.settings)
            .evaluate_with_cancel(query, cancel)
    }

    /// Rank the documents matching `query` and return one page of them.
    pub fn search(
        &self,
        table: &str,
        query: &Query,
        options: &SearchOptions,
    ) -> Result<SearchResult> {
        let schema = self.config.table(table)?;
        check_options(schema, options)?;
        let matched = self.query(table, query)?;
        let ranked = matched.ranked_with_scores();
        debug!("search on {table} matched {} documents", ranked.len());
        self.page(table, &matched, &ranked, options, self.config.default_page_limit)
    }

    /// Group the documents matching `query` by the values of `field`.
    ///
    /// Buckets appear in the order their best document ranks; a document
    /// with several values joins several buckets.
    pub fn aggregate(
        &self,
        table: &str,
        query: &Query,
        field: &str,
        options: &AggregateOptions,
    ) -> Result<AggregateResult> {
        let schema = self.config.table(table)?;
        if !schema.require(field)?.store {
            return Err(TesseraError::schema(format!(
                "cannot aggregate on unstored field {field} of {table}"
            )));
        }
        if let Some(hits) = &options.hits {
            check_options(schema, hits)?;
        }

        let matched = self.query(table, query)?;
        let mut buckets: Vec<(String, Vec<(DocNum, f32)>)> = Vec::new();
        let mut positions: AHashMap<String, usize> = AHashMap::new();
        for (nid, score) in matched.ranked_with_scores() {
            let Some(fields) = self.load_fields(table, nid)? else {
                continue;
            };
            let Some(values) = fields.get(field) else {
                continue;
            };
            let mut keys: Vec<String> = Vec::with_capacity(values.len());
            for value in values {
                let key = value.to_string();
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            for key in keys {
                let slot = *positions.entry(key.clone()).or_insert_with(|| {
                    buckets.push((key, Vec::new()));
                    buckets.len() - 1
                });
                buckets[slot].1.push((nid, score));
            }
        }

        let limit = options.pagination.limit.unwrap_or(self.config.default_page_limit);
        let skip = options.pagination.skip;
        let pagination = PaginationInfo::new(buckets.len(), limit, skip);

        let mut page = Vec::new();
        for (key, docs) in buckets.into_iter().skip(skip).take(limit) {
            let hits = match &options.hits {
                Some(hit_options) => Some(self.page(
                    table,
                    &matched,
                    &docs,
                    hit_options,
                    self.config.default_hits_limit,
                )?),
                None => None,
            };
            page.push(Bucket {
                key,
                count: docs.len(),
                score: docs.first().map_or(0.0, |(_, score)| *score),
                hits,
            });
        }
        debug!("aggregate on {table}.{field} formed {} buckets", pagination.count);
        Ok(AggregateResult {
            pagination,
            buckets: page,
        })
    }

    /// Build the nodes of one page of `ranked`.
    ///
    /// Documents with postings but no record are dropped before paging and
    /// are not counted.
    fn page(
        &self,
        table: &str,
        matched: &Match,
        ranked: &[(DocNum, f32)],
        options: &SearchOptions,
        default_limit: usize,
    ) -> Result<SearchResult> {
        let limit = options.pagination.limit.unwrap_or(default_limit);
        let skip = options.pagination.skip;

        let mut live = Vec::with_capacity(ranked.len());
        for &(nid, score) in ranked {
            match self.store.get_record(table, nid)? {
                Some(record) => live.push((record, score)),
                None => warn!("document {nid} of {table} has postings but no record"),
            }
        }

        let mut nodes = Vec::new();
        for (record, score) in live.iter().skip(skip).take(limit) {
            nodes.push(self.node(table, matched, record, *score, options));
        }
        Ok(SearchResult {
            pagination: PaginationInfo::new(live.len(), limit, skip),
            nodes,
        })
    }

    fn node(
        &self,
        table: &str,
        matched: &Match,
        record: &RecordRow,
        score: f32,
        options: &SearchOptions,
    ) -> SearchNode {
        let nid = record.nid;
        let stored = match bincode::deserialize::<StoredFields>(&record.data) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("document {} of {table} has an unreadable record: {e}", record.id);
                StoredFields::new()
            }
        };

        let fields = options
            .fields
            .iter()
            .filter_map(|name| stored.get(name).map(|values| (name.clone(), values.clone())))
            .collect();

        let mut highlights = BTreeMap::new();
        for request in &options.highlights {
            let (Some(ranges), Some(values)) = (
                matched.field_highlights(nid, &request.field),
                stored.get(&request.field),
            ) else {
                continue;
            };
            let snippets: Vec<String> = ranges
                .iter()
                .filter_map(|(index, ranges)| {
                    let text = values.get(*index)?.to_string();
                    self.highlighter
                        .highlight(&text, ranges, &request.before, &request.after)
                })
                .collect();
            if !snippets.is_empty() {
                highlights.insert(request.field.clone(), snippets);
            }
        }

        SearchNode {
            id: record.id.clone(),
            score,
            fields,
            highlights,
        }
    }

    /// Stored fields of `nid`, skipping unreadable records.
    fn load_fields(&self, table: &str, nid: DocNum) -> Result<Option<StoredFields>> {
        let Some(record) = self.store.get_record(table, nid)? else {
            return Ok(None);
        };
        match bincode::deserialize(&record.data) {
            Ok(fields) => Ok(Some(fields)),
            Err(e) => {
                warn!("document {} of {table} has an unreadable record: {e}", record.id);
                Ok(None)
            }
        }
    }
}

fn check_options(schema: &TableSchema, options: &SearchOptions) -> Result<()> {
    for name in &options.fields {
        schema.require(name)?;
    }
    for request in &options.highlights {
        schema.require(&request.field)?;
    }
    Ok(())
}

fn decode_record(record: &RecordRow) -> Result<Document> {
    let fields: StoredFields = bincode::deserialize(&record.data).map_err(|e| {
        TesseraError::encoding(format!("unreadable record for document {}: {e}", record.id))
    })?;
    Ok(Document {
        id: record.id.clone(),
        fields,
    })
}

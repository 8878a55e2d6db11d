//! In-memory storage implementation for testing and embedding.

use std::collections::BTreeMap;
use std::ops::Bound;

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::error::Result;
use crate::storage::traits::{DocNum, IndexStore, KeyRange, PostingRow, RecordRow};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct PostingKey {
    table: String,
    key: Vec<u8>,
    nid: DocNum,
}

#[derive(Debug, Default)]
struct TableRecords {
    next_nid: DocNum,
    by_id: AHashMap<String, DocNum>,
    rows: BTreeMap<DocNum, (String, Vec<u8>)>,
}

#[derive(Debug, Default)]
struct MemoryState {
    postings: BTreeMap<PostingKey, Option<Vec<u8>>>,
    metadata: AHashMap<String, Vec<u8>>,
    records: AHashMap<String, TableRecords>,
}

/// An ordered in-memory [`IndexStore`].
///
/// Every call takes the lock once, so each scan sees a consistent snapshot.
/// Internal document numbers start at 1 and are never reused within a table.
#[derive(Debug, Default)]
pub struct MemoryIndexStore {
    state: RwLock<MemoryState>,
}

impl MemoryIndexStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of posting rows across all tables.
    pub fn posting_count(&self) -> usize {
        self.state.read().postings.len()
    }

    /// Number of stored documents in `table`.
    pub fn record_count(&self, table: &str) -> usize {
        self.state
            .read()
            .records
            .get(table)
            .map(|records| records.rows.len())
            .unwrap_or(0)
    }

    /// Remove everything.
    pub fn clear(&self) {
        *self.state.write() = MemoryState::default();
    }

    fn scan_start(table: &str, range: &KeyRange) -> PostingKey {
        let key = match &range.lower {
            Bound::Included(key) | Bound::Excluded(key) => key.clone(),
            Bound::Unbounded => Vec::new(),
        };
        PostingKey {
            table: table.to_string(),
            key,
            nid: 0,
        }
    }
}

impl IndexStore for MemoryIndexStore {
    fn scan_postings(
        &self,
        table: &str,
        range: &KeyRange,
        limit: Option<usize>,
    ) -> Result<Vec<PostingRow>> {
        let state = self.state.read();
        let rows = state
            .postings
            .range(Self::scan_start(table, range)..)
            .take_while(|(k, _)| k.table == table && range.below_upper(&k.key))
            .filter(|(k, _)| range.above_lower(&k.key))
            .take(limit.unwrap_or(usize::MAX))
            .map(|(k, positions)| PostingRow {
                key: k.key.clone(),
                nid: k.nid,
                positions: positions.clone(),
            })
            .collect();
        Ok(rows)
    }

    fn put_posting(&self, table: &str, row: PostingRow) -> Result<()> {
        let key = PostingKey {
            table: table.to_string(),
            key: row.key,
            nid: row.nid,
        };
        self.state.write().postings.insert(key, row.positions);
        Ok(())
    }

    fn delete_postings(&self, table: &str, range: &KeyRange, nid: DocNum) -> Result<usize> {
        let mut state = self.state.write();
        let doomed: Vec<PostingKey> = state
            .postings
            .range(Self::scan_start(table, range)..)
            .take_while(|(k, _)| k.table == table && range.below_upper(&k.key))
            .filter(|(k, _)| k.nid == nid && range.above_lower(&k.key))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &doomed {
            state.postings.remove(key);
        }
        Ok(doomed.len())
    }

    fn get_metadata(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.state.read().metadata.get(key).cloned())
    }

    fn put_metadata(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.state.write().metadata.insert(key.to_string(), value);
        Ok(())
    }

    fn get_record(&self, table: &str, nid: DocNum) -> Result<Option<RecordRow>> {
        let state = self.state.read();
        let row = state
            .records
            .get(table)
            .and_then(|records| records.rows.get(&nid))
            .map(|(id, data)| RecordRow {
                nid,
                id: id.clone(),
                data: data.clone(),
            });
        Ok(row)
    }

    fn find_record(&self, table: &str, id: &str) -> Result<Option<RecordRow>> {
        let state = self.state.read();
        let Some(records) = state.records.get(table) else {
            return Ok(None);
        };
        let row = records.by_id.get(id).and_then(|nid| {
            records.rows.get(nid).map(|(id, data)| RecordRow {
                nid: *nid,
                id: id.clone(),
                data: data.clone(),
            })
        });
        Ok(row)
    }

    fn put_record(&self, table: &str, id: &str, data: Vec<u8>) -> Result<DocNum> {
        let mut state = self.state.write();
        let records = state.records.entry(table.to_string()).or_default();
        let nid = match records.by_id.get(id) {
            Some(&nid) => nid,
            None => {
                records.next_nid += 1;
                let nid = records.next_nid;
                records.by_id.insert(id.to_string(), nid);
                nid
            }
        };
        records.rows.insert(nid, (id.to_string(), data));
        Ok(nid)
    }

    fn delete_record(&self, table: &str, id: &str) -> Result<Option<DocNum>> {
        let mut state = self.state.write();
        let Some(records) = state.records.get_mut(table) else {
            return Ok(None);
        };
        let nid = records.by_id.remove(id);
        if let Some(nid) = nid {
            records.rows.remove(&nid);
        }
        Ok(nid)
    }
}

//! Query evaluation against a table's inverted indexes.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use crate::error::{Result, TesseraError};
use crate::index::{FullTextSettings, InvertedIndex, open_index};
use crate::query::ast::{Occur, Query};
use crate::query::matching::Match;
use crate::schema::TableSchema;
use crate::storage::IndexStore;

/// Evaluates query trees for one table.
///
/// Evaluation is a post-order walk that reads the store and carries no
/// state between calls.
#[derive(Debug)]
pub struct QueryEvaluator<'a> {
    store: &'a dyn IndexStore,
    table: &'a str,
    schema: &'a TableSchema,
    settings: &'a FullTextSettings,
}

impl<'a> QueryEvaluator<'a> {
    /// Create an evaluator over `table` with the given schema.
    pub fn new(
        store: &'a dyn IndexStore,
        table: &'a str,
        schema: &'a TableSchema,
        settings: &'a FullTextSettings,
    ) -> Self {
        QueryEvaluator {
            store,
            table,
            schema,
            settings,
        }
    }

    /// Evaluate `query` into a scored match.
    pub fn evaluate(&self, query: &Query) -> Result<Match> {
        self.eval(query, None)
    }

    /// Evaluate `query`, aborting with [`TesseraError::Cancelled`] once
    /// `cancel` is set. The flag is checked before each node.
    pub fn evaluate_with_cancel(&self, query: &Query, cancel: &AtomicBool) -> Result<Match> {
        self.eval(query, Some(cancel))
    }

    fn eval(&self, query: &Query, cancel: Option<&AtomicBool>) -> Result<Match> {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(TesseraError::cancelled(format!("query on table {}", self.table)));
        }

        match query {
            Query::Match { field, term } => self.index(field)?.match_term(self.store, term),
            Query::Exists { field } => self.index(field)?.all(self.store),
            Query::All => self.all(),
            Query::Boolean { occur, queries } => {
                let mut children = Vec::with_capacity(queries.len());
                for child in queries {
                    children.push(self.eval(child, cancel)?);
                }
                self.combine(*occur, children)
            }
            Query::Boost { query, factor } => Ok(self.eval(query, cancel)?.boost(*factor)),
            Query::Unsupported => {
                warn!("unsupported query node on table {}, matching nothing", self.table);
                Ok(Match::new())
            }
        }
    }

    fn combine(&self, occur: Occur, children: Vec<Match>) -> Result<Match> {
        let mut children = children.into_iter();
        let folded = match occur {
            Occur::Must => children.next().map(|first| children.fold(first, |acc, m| acc.and(&m))),
            Occur::Should | Occur::MustNot => {
                children.next().map(|first| children.fold(first, |acc, m| acc.or(&m)))
            }
        };

        match occur {
            Occur::Must | Occur::Should => Ok(folded.unwrap_or_default()),
            Occur::MustNot => {
                let excluded = folded.unwrap_or_default();
                Ok(self.all()?.exclude(&excluded))
            }
        }
    }

    /// Union of every indexed field's documents, scored 1.
    fn all(&self) -> Result<Match> {
        let mut result = Match::new();
        for (name, field) in self.schema.fields() {
            if !field.index {
                continue;
            }
            let index = open_index(self.table, name, field, self.settings);
            for nid in index.all(self.store)?.ids() {
                if !result.contains(nid) {
                    result.add_score(nid, 1.0);
                }
            }
        }
        debug!("table {} holds {} indexed documents", self.table, result.len());
        Ok(result)
    }

    fn index(&self, field: &str) -> Result<Box<dyn InvertedIndex>> {
        let schema = self.schema.require(field)?;
        if !schema.index {
            return Err(TesseraError::schema(format!(
                "field {field} of table {} is not indexed",
                self.table
            )));
        }
        Ok(open_index(self.table, field, schema, self.settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FieldValue;
    use crate::schema::FieldSchema;
    use crate::storage::MemoryIndexStore;

    fn fixture() -> (MemoryIndexStore, TableSchema, FullTextSettings) {
        let store = MemoryIndexStore::new();
        let schema = TableSchema::new()
            .with_field("content", FieldSchema::full_text())
            .unwrap()
            .with_field("tag", FieldSchema::string())
            .unwrap();
        let settings = FullTextSettings::default();

        let docs: [(u64, &str, &str); 3] = [
            (1, "the quick brown fox", "animal"),
            (2, "a quick reply", "mail"),
            (3, "slow and steady", "animal"),
        ];
        for (nid, content, tag) in docs {
            for (field, value) in [("content", content), ("tag", tag)] {
                let index = open_index("doc", field, schema.require(field).unwrap(), &settings);
                index.insert(&store, nid, &[FieldValue::from(value)]).unwrap();
            }
        }
        (store, schema, settings)
    }

    #[test]
    fn test_match_and_boolean() {
        let (store, schema, settings) = fixture();
        let evaluator = QueryEvaluator::new(&store, "doc", &schema, &settings);

        let quick = evaluator.evaluate(&Query::term("content", "quick")).unwrap();
        assert_eq!(quick.len(), 2);

        let both = evaluator
            .evaluate(&Query::must(vec![
                Query::term("content", "quick"),
                Query::term("tag", "animal"),
            ]))
            .unwrap();
        assert_eq!(both.ranked(), vec![1]);

        let either = evaluator
            .evaluate(&Query::should(vec![
                Query::term("tag", "mail"),
                Query::term("content", "steady"),
            ]))
            .unwrap();
        assert_eq!(either.len(), 2);
    }

    #[test]
    fn test_empty_boolean_lists() {
        let (store, schema, settings) = fixture();
        let evaluator = QueryEvaluator::new(&store, "doc", &schema, &settings);

        assert!(evaluator.evaluate(&Query::must(vec![])).unwrap().is_empty());
        assert!(evaluator.evaluate(&Query::should(vec![])).unwrap().is_empty());

        let everything = evaluator.evaluate(&Query::must_not(vec![])).unwrap();
        assert_eq!(everything.ranked(), vec![1, 2, 3]);
        assert!(everything.ids().all(|id| everything.score(id) == Some(1.0)));
    }

    #[test]
    fn test_must_not_excludes() {
        let (store, schema, settings) = fixture();
        let evaluator = QueryEvaluator::new(&store, "doc", &schema, &settings);
        let result = evaluator
            .evaluate(&Query::must_not(vec![Query::term("tag", "animal")]))
            .unwrap();
        assert_eq!(result.ranked(), vec![2]);
    }

    #[test]
    fn test_boost_and_exists() {
        let (store, schema, settings) = fixture();
        let evaluator = QueryEvaluator::new(&store, "doc", &schema, &settings);

        let result = evaluator.evaluate(&Query::exists("tag").boosted(3.0)).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result.score(2), Some(3.0));
    }

    #[test]
    fn test_unknown_field_and_unsupported() {
        let (store, schema, settings) = fixture();
        let evaluator = QueryEvaluator::new(&store, "doc", &schema, &settings);

        assert!(matches!(
            evaluator.evaluate(&Query::term("colour", "red")),
            Err(TesseraError::Schema(_))
        ));
        assert!(evaluator.evaluate(&Query::Unsupported).unwrap().is_empty());
    }

    #[test]
    fn test_cancellation() {
        let (store, schema, settings) = fixture();
        let evaluator = QueryEvaluator::new(&store, "doc", &schema, &settings);
        let cancel = AtomicBool::new(true);
        assert!(matches!(
            evaluator.evaluate_with_cancel(&Query::All, &cancel),
            Err(TesseraError::Cancelled(_))
        ));

        cancel.store(false, Ordering::Relaxed);
        assert_eq!(evaluator.evaluate_with_cancel(&Query::All, &cancel).unwrap().len(), 3);
    }
}

//! Pagination, stored fields, highlights and aggregation.

use std::sync::Arc;

use tessera::indexer::AggregateResult;
use tessera::prelude::*;

fn indexer() -> Result<Indexer> {
    let schema = TableSchema::new()
        .with_field("title", FieldSchema::full_text())?
        .with_field("body", FieldSchema::full_text().stored(false))?
        .with_field("doc_id", FieldSchema::string())?
        .with_field("flavour", FieldSchema::string())?;
    let config = IndexerConfig::default().with_table("block", schema);
    let indexer = Indexer::new(Arc::new(MemoryIndexStore::new()), config)?;

    let blocks = [
        ("b1", "rust search engine", "p1", "paragraph"),
        ("b2", "searching with rust", "p1", "heading"),
        ("b3", "cooking pasta", "p2", "paragraph"),
        ("b4", "rust in the kitchen", "p2", "paragraph"),
        ("b5", "rust", "p3", "list"),
    ];
    for (id, title, doc_id, flavour) in blocks {
        indexer.insert(
            "block",
            &Document::builder(id)
                .add_text("title", title)
                .add_text("body", title)
                .add_text("doc_id", doc_id)
                .add_text("flavour", flavour)
                .build(),
        )?;
    }
    Ok(indexer)
}

#[test]
fn test_pagination() -> Result<()> {
    let indexer = indexer()?;
    let query = Query::term("title", "rust");

    let result = indexer.search("block", &query, &SearchOptions::default())?;
    assert_eq!(result.pagination.count, 4);
    assert_eq!(result.pagination.limit, 10);
    assert!(!result.pagination.has_more);
    assert_eq!(result.nodes.len(), 4);
    assert!(result.nodes.windows(2).all(|w| w[0].score >= w[1].score));

    let options = SearchOptions::default().with_pagination(Pagination::new(2, 1));
    let page = indexer.search("block", &query, &options)?;
    assert_eq!(page.pagination.skip, 1);
    assert!(page.pagination.has_more);
    assert_eq!(page.nodes.len(), 2);
    assert_eq!(page.nodes[0].id, result.nodes[1].id);

    Ok(())
}

#[test]
fn test_stored_fields() -> Result<()> {
    let indexer = indexer()?;
    let options = SearchOptions::default().with_fields(["doc_id", "body"]);
    let result = indexer.search("block", &Query::term("title", "pasta"), &options)?;

    assert_eq!(result.nodes.len(), 1);
    let node = &result.nodes[0];
    assert_eq!(node.id, "b3");
    assert_eq!(node.fields.get("doc_id"), Some(&vec![FieldValue::from("p2")]));
    assert!(!node.fields.contains_key("body"));

    // Unstored fields are still searchable.
    let result = indexer.search("block", &Query::term("body", "pasta"), &SearchOptions::default())?;
    assert_eq!(result.nodes[0].id, "b3");

    let bad = SearchOptions::default().with_fields(["colour"]);
    assert!(matches!(
        indexer.search("block", &Query::All, &bad),
        Err(TesseraError::Schema(_))
    ));

    Ok(())
}

#[test]
fn test_highlights() -> Result<()> {
    let indexer = indexer()?;
    let options =
        SearchOptions::default().with_highlight(HighlightRequest::new("title", "<b>", "</b>"));
    let result = indexer.search("block", &Query::term("title", "search"), &options)?;

    let snippets: Vec<(&str, &Vec<String>)> = result
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), &node.highlights["title"]))
        .collect();
    assert_eq!(
        snippets,
        vec![
            ("b1", &vec!["rust <b>search</b> engine".to_string()]),
            ("b2", &vec!["<b>search</b>ing with rust".to_string()]),
        ]
    );

    // Matches without a highlighted field produce no snippets.
    let result = indexer.search("block", &Query::term("doc_id", "p3"), &options)?;
    assert!(result.nodes[0].highlights.is_empty());

    Ok(())
}

#[test]
fn test_aggregate() -> Result<()> {
    let indexer = indexer()?;
    let options = AggregateOptions {
        hits: Some(SearchOptions::default().with_fields(["flavour"])),
        ..AggregateOptions::default()
    };
    let AggregateResult { pagination, buckets } =
        indexer.aggregate("block", &Query::term("title", "rust"), "doc_id", &options)?;

    assert_eq!(pagination.count, 3);
    let summary: Vec<(&str, usize)> = buckets.iter().map(|b| (b.key.as_str(), b.count)).collect();
    assert!(summary.contains(&("p1", 2)));
    assert!(summary.contains(&("p2", 1)));
    assert!(summary.contains(&("p3", 1)));
    assert!(buckets.windows(2).all(|w| w[0].score >= w[1].score));

    let p1 = buckets.iter().find(|b| b.key == "p1").unwrap();
    let hits = p1.hits.as_ref().unwrap();
    assert_eq!(hits.pagination.count, 2);
    assert_eq!(hits.pagination.limit, 3);
    assert_eq!(hits.nodes.len(), 2);
    assert_eq!(hits.nodes[0].score, p1.score);
    assert!(hits.nodes.iter().all(|node| node.fields.contains_key("flavour")));

    Ok(())
}

#[test]
fn test_aggregate_pagination_without_hits() -> Result<()> {
    let indexer = indexer()?;
    let options = AggregateOptions {
        hits: None,
        pagination: Pagination::new(1, 0),
    };
    let result = indexer.aggregate("block", &Query::All, "flavour", &options)?;

    assert_eq!(result.pagination.count, 3);
    assert!(result.pagination.has_more);
    assert_eq!(result.buckets.len(), 1);
    assert_eq!(result.buckets[0].key, "paragraph");
    assert_eq!(result.buckets[0].count, 3);
    assert!(result.buckets[0].hits.is_none());

    Ok(())
}

#[test]
fn test_missing_records_are_not_counted() -> Result<()> {
    let indexer = indexer()?;
    // Leaves the postings of b1 behind.
    assert!(indexer.store().delete_record("block", "b1")?.is_some());

    let options = SearchOptions::default().with_pagination(Pagination::new(2, 0));
    let result = indexer.search("block", &Query::term("title", "rust"), &options)?;
    assert_eq!(result.pagination.count, 3);
    assert!(result.pagination.has_more);
    assert_eq!(result.nodes.len(), 2);
    assert!(result.nodes.iter().all(|node| node.id != "b1"));

    let options = SearchOptions::default().with_pagination(Pagination::new(2, 2));
    let rest = indexer.search("block", &Query::term("title", "rust"), &options)?;
    assert!(!rest.pagination.has_more);
    assert_eq!(rest.nodes.len(), 1);

    Ok(())
}

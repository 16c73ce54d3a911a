//! Identifier cache pre-seeding
//!
//! Loads every `label -> uid` pair already stored under the external
//! identifier predicate, so re-running an import reuses existing nodes
//! without an upsert per label.

use ingot_core::{GraphStore, IdentifierCache, StoreError, StoreResult};
use serde_json::Value;
use tracing::{debug, info};

fn page_query(xid_predicate: &str, batch_size: usize, after: Option<&str>) -> String {
    let after = after.map(|uid| format!(", after: {uid}")).unwrap_or_default();
    format!(
        "{{ xidmap(func: has({xid_predicate}), first: {batch_size}{after}) {{ {xid_predicate} uid }} }}"
    )
}

/// Page through stored identifiers and add them to `cache`
///
/// Returns the number of identifiers read. Paging stops at the first page
/// shorter than `batch_size`.
pub async fn preseed_identifier_cache(
    store: &dyn GraphStore,
    cache: &mut IdentifierCache,
    xid_predicate: &str,
    batch_size: usize,
) -> StoreResult<usize> {
    let batch_size = batch_size.max(1);
    let mut after: Option<String> = None;
    let mut total = 0;

    loop {
        let data = store
            .query(&page_query(xid_predicate, batch_size, after.as_deref()))
            .await?;
        let nodes = match &data["xidmap"] {
            Value::Array(nodes) => nodes.as_slice(),
            Value::Null => &[],
            other => {
                return Err(StoreError::decode(format!(
                    "xidmap is not a list: {other}"
                )))
            }
        };

        for node in nodes {
            let (Some(label), Some(uid)) = (node[xid_predicate].as_str(), node["uid"].as_str())
            else {
                return Err(StoreError::decode(format!(
                    "xidmap entry without {xid_predicate} or uid: {node}"
                )));
            };
            cache.insert(label, uid);
        }
        total += nodes.len();
        debug!(page = nodes.len(), total, "Read identifier page");

        if nodes.len() < batch_size {
            break;
        }
        after = nodes
            .last()
            .and_then(|node| node["uid"].as_str())
            .map(str::to_string);
    }

    info!(identifiers = total, "Identifier cache pre-seeded");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingot_core::test_support::MockGraphStore;

    #[test]
    fn test_page_query_text() {
        assert_eq!(
            page_query("xid", 10000, None),
            "{ xidmap(func: has(xid), first: 10000) { xid uid } }"
        );
        assert_eq!(
            page_query("ext.id", 2, Some("0x9")),
            "{ xidmap(func: has(ext.id), first: 2, after: 0x9) { ext.id uid } }"
        );
    }

    #[tokio::test]
    async fn test_pages_until_short_page() {
        let store = MockGraphStore::with_identifiers([
            ("_:a", "0x1"),
            ("_:b", "0x2"),
            ("_:c", "0x3"),
            ("_:d", "0x4"),
            ("_:e", "0x5"),
        ]);
        let mut cache = IdentifierCache::new();

        let total = preseed_identifier_cache(&store, &mut cache, "xid", 2)
            .await
            .unwrap();

        assert_eq!(total, 5);
        assert_eq!(cache.get("_:e"), Some("0x5"));
        // pages of 2, 2, 1
        assert_eq!(store.stats().query_count, 3);
        assert!(store.queries()[1].contains("after: 0x2"));
    }

    #[tokio::test]
    async fn test_exact_multiple_needs_one_empty_page() {
        let store = MockGraphStore::with_identifiers([("_:a", "0x1"), ("_:b", "0x2")]);
        let mut cache = IdentifierCache::new();

        let total = preseed_identifier_cache(&store, &mut cache, "xid", 2)
            .await
            .unwrap();

        assert_eq!(total, 2);
        assert_eq!(store.stats().query_count, 2);
    }

    #[tokio::test]
    async fn test_query_failure_propagates() {
        let store = MockGraphStore::new();
        store.fail_next_queries([StoreError::network("refused")]);
        let mut cache = IdentifierCache::new();

        let err = preseed_identifier_cache(&store, &mut cache, "xid", 10)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::network("refused"));
    }
}

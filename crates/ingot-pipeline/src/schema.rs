//! Schema installation

use ingot_core::{GraphStore, StoreResult};
use tracing::info;

/// Schema line for the external identifier predicate
///
/// The exact index backs the upsert lookup; `@upsert` makes concurrent
/// writers of the same label conflict instead of duplicating the node.
pub fn xid_schema(xid_predicate: &str) -> String {
    format!("{xid_predicate}: string @index(exact) @upsert .")
}

/// Declare the external identifier predicate
pub async fn install_xid_schema(store: &dyn GraphStore, xid_predicate: &str) -> StoreResult<()> {
    store.alter(&xid_schema(xid_predicate)).await?;
    info!(predicate = xid_predicate, "Identifier schema installed");
    Ok(())
}

/// Upload a user schema verbatim
pub async fn install_schema(store: &dyn GraphStore, schema: &str) -> StoreResult<()> {
    store.alter(schema).await?;
    info!(bytes = schema.len(), "Schema installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingot_core::test_support::MockGraphStore;

    #[tokio::test]
    async fn test_install_xid_schema() {
        let store = MockGraphStore::new();
        install_xid_schema(&store, "xid").await.unwrap();
        assert_eq!(store.schemas(), vec!["xid: string @index(exact) @upsert ."]);
    }

    #[tokio::test]
    async fn test_install_schema_verbatim() {
        let store = MockGraphStore::new();
        let schema = "name: string @index(term) .\ntype Person { name }";
        install_schema(&store, schema).await.unwrap();
        assert_eq!(store.schemas(), vec![schema]);
    }
}

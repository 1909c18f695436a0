//! In-process document store.
//!
//! Keeps documents in insertion order behind a mutex. Used by tests and by
//! `serve --in-memory`; contents are lost when the process exits.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{DocumentStore, Filter, StoredDocument};
use crate::error::{Error, Result};
use crate::model::RecordId;

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<(String, StoredDocument)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document under a caller-chosen id.
    ///
    /// Lets tests seed records that did not go through the create path,
    /// such as legacy documents without a title.
    pub fn insert_with_id(&self, collection: &str, id: RecordId, body: Value) -> Result<()> {
        self.lock()?.push((
            collection.to_string(),
            StoredDocument { id, body },
        ));
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<(String, StoredDocument)>>> {
        self.documents
            .lock()
            .map_err(|e| Error::StorageUnavailable(format!("memory store poisoned: {e}")))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, document: Value) -> Result<RecordId> {
        let id = RecordId::new();
        self.insert_with_id(collection, id, document)?;
        Ok(id)
    }

    async fn query(
        &self,
        collection: &str,
        filter: Filter,
        limit: Option<i64>,
    ) -> Result<Vec<StoredDocument>> {
        let limit = limit.map_or(usize::MAX, |n| n.max(0) as usize);
        Ok(self
            .lock()?
            .iter()
            .filter(|(c, doc)| c == collection && filter.matches(&doc.id))
            .take(limit)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn database_name(&self) -> Result<String> {
        Ok("memory".to_string())
    }

    async fn list_collections(&self, limit: i64) -> Result<Vec<String>> {
        let names: BTreeSet<String> = self.lock()?.iter().map(|(c, _)| c.clone()).collect();
        Ok(names.into_iter().take(limit.max(0) as usize).collect())
    }
}

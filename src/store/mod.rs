//! Storage collaborator.
//!
//! Work instructions are schemaless documents grouped by collection. The
//! service only needs to insert a document and query documents back; the
//! two diagnostic calls exist for the `/test` endpoint.

pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::model::RecordId;

pub use memory::MemoryStore;

/// Selects documents within a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Every document.
    All,
    /// The document with this id, if any.
    Id(RecordId),
}

impl Filter {
    pub fn matches(&self, id: &RecordId) -> bool {
        match self {
            Filter::All => true,
            Filter::Id(want) => want == id,
        }
    }
}

/// A document as read back from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: RecordId,
    pub body: Value,
}

/// Document storage used by the service.
///
/// Implementations must be safe to share across request handlers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return the id storage assigned it.
    async fn insert(&self, collection: &str, document: Value) -> Result<RecordId>;

    /// Query documents in storage's natural order, optionally capped.
    async fn query(
        &self,
        collection: &str,
        filter: Filter,
        limit: Option<i64>,
    ) -> Result<Vec<StoredDocument>>;

    /// Name of the backing database.
    async fn database_name(&self) -> Result<String>;

    /// Collections that currently hold documents, at most `limit` of them.
    async fn list_collections(&self, limit: i64) -> Result<Vec<String>>;
}

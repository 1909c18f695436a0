//! Document operations over the `documents` table.

use async_trait::async_trait;
use opentelemetry::KeyValue;
use opentelemetry_semantic_conventions::attribute::{DB_COLLECTION_NAME, DB_OPERATION_NAME};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;
use crate::model::RecordId;
use crate::store::{DocumentStore, Filter, StoredDocument};
use crate::telemetry::metrics;

fn record_operation(collection: &str, operation: &'static str) {
    metrics::store_operations().add(
        1,
        &[
            KeyValue::new(DB_COLLECTION_NAME, collection.to_string()),
            KeyValue::new(DB_OPERATION_NAME, operation),
        ],
    );
}

#[async_trait]
impl DocumentStore for super::Db {
    async fn insert(&self, collection: &str, document: Value) -> Result<RecordId> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO documents (id, collection, body, created_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(collection)
        .bind(&document)
        .bind(chrono::Utc::now())
        .execute(self.pool())
        .await?;

        record_operation(collection, "insert");
        tracing::debug!(collection, %id, "document inserted");
        Ok(RecordId(id))
    }

    async fn query(
        &self,
        collection: &str,
        filter: Filter,
        limit: Option<i64>,
    ) -> Result<Vec<StoredDocument>> {
        let id = match filter {
            Filter::All => None,
            Filter::Id(id) => Some(id.0),
        };

        // No ORDER BY: callers get whatever order Postgres yields.
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT id, body FROM documents
             WHERE collection = $1
             AND ($2::uuid IS NULL OR id = $2)
             LIMIT $3",
        )
        .bind(collection)
        .bind(id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        record_operation(collection, "query");
        Ok(rows.into_iter().map(StoredDocument::from).collect())
    }

    async fn database_name(&self) -> Result<String> {
        let row: (String,) = sqlx::query_as("SELECT current_database()")
            .fetch_one(self.pool())
            .await?;
        Ok(row.0)
    }

    async fn list_collections(&self, limit: i64) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT collection FROM documents ORDER BY collection LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}

/// Internal row type for sqlx::FromRow.
#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    body: Value,
}

impl From<DocumentRow> for StoredDocument {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: RecordId(row.id),
            body: row.body,
        }
    }
}

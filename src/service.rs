//! Work instruction operations over a document store.
//!
//! This is where stored documents become response shapes. Documents may
//! predate the create path's validation, so the mapping fills in a missing
//! title with [`UNTITLED`] and missing steps with an empty list.

use std::sync::Arc;
use std::time::Instant;

use opentelemetry::KeyValue;
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::model::*;
use crate::normalize::{is_canonical, normalize_steps};
use crate::store::{DocumentStore, Filter, StoredDocument};
use crate::telemetry::metrics;

/// Create, list and fetch work instructions.
#[derive(Clone)]
pub struct InstructionService {
    store: Arc<dyn DocumentStore>,
}

impl InstructionService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Normalize steps and persist a new instruction.
    #[tracing::instrument(skip_all, fields(steps = new.steps.len()))]
    pub async fn create(&self, new: NewWorkInstruction) -> Result<InstructionSummary> {
        let started = Instant::now();
        let steps = normalize_steps(new.steps);
        debug_assert!(is_canonical(&steps));
        let document = json!({
            "title": new.title,
            "steps": steps,
        });

        let result = self.store.insert(INSTRUCTION_COLLECTION, document).await;
        metrics::instructions_created().add(
            1,
            &[KeyValue::new(
                "result",
                if result.is_ok() { "ok" } else { "error" },
            )],
        );
        metrics::operation_duration_ms().record(
            started.elapsed().as_secs_f64() * 1000.0,
            &[KeyValue::new("operation", "instruction.create")],
        );

        let id = result?;
        tracing::info!(%id, "work instruction created");
        Ok(InstructionSummary {
            id,
            title: new.title,
        })
    }

    /// All instructions as summaries, in storage order.
    #[tracing::instrument(skip_all)]
    pub async fn list(&self) -> Result<Vec<InstructionSummary>> {
        let documents = self
            .store
            .query(INSTRUCTION_COLLECTION, Filter::All, None)
            .await?;
        Ok(documents.iter().map(summary_from_document).collect())
    }

    /// Fetch one instruction with its steps.
    #[tracing::instrument(skip_all, fields(id = %id))]
    pub async fn get(&self, id: RecordId) -> Result<WorkInstruction> {
        let documents = self
            .store
            .query(INSTRUCTION_COLLECTION, Filter::Id(id), Some(1))
            .await?;
        let document = documents
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("work instruction {id}")))?;
        instruction_from_document(document)
    }

    /// Parse `raw` as a record id, then fetch.
    pub async fn get_by_str(&self, raw: &str) -> Result<WorkInstruction> {
        let id: RecordId = raw.parse()?;
        self.get(id).await
    }
}

fn title_of(body: &Value) -> String {
    body.get("title")
        .and_then(Value::as_str)
        .unwrap_or(UNTITLED)
        .to_string()
}

fn summary_from_document(document: &StoredDocument) -> InstructionSummary {
    InstructionSummary {
        id: document.id,
        title: title_of(&document.body),
    }
}

fn instruction_from_document(document: StoredDocument) -> Result<WorkInstruction> {
    let title = title_of(&document.body);
    let steps = match document.body.get("steps") {
        None | Some(Value::Null) => Vec::new(),
        Some(raw) => {
            serde_json::from_value(raw.clone()).map_err(|source| Error::CorruptDocument {
                id: document.id.to_string(),
                source,
            })?
        }
    };
    Ok(WorkInstruction {
        id: document.id,
        title,
        steps,
    })
}

//! Route handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use super::AppState;
use super::diagnostics::{DiagnosticsReport, diagnose};
use crate::error::Result;
use crate::model::{InstructionSummary, RecordId, WorkInstruction};
use crate::validate::parse_new_instruction;

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Work Instructions API running" }))
}

pub async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsReport> {
    Json(diagnose(state.store(), state.env()).await)
}

pub async fn list_instructions(
    State(state): State<AppState>,
) -> Result<Json<Vec<InstructionSummary>>> {
    Ok(Json(state.service()?.list().await?))
}

/// The body is taken raw so validation can report every bad field.
pub async fn create_instruction(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<InstructionSummary>> {
    let new = parse_new_instruction(&body)?;
    Ok(Json(state.service()?.create(new).await?))
}

/// The id is parsed before storage is touched, so a malformed id is a 400
/// even when no database is configured.
pub async fn get_instruction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WorkInstruction>> {
    let id: RecordId = id.parse()?;
    Ok(Json(state.service()?.get(id).await?))
}

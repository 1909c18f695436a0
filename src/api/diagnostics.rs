//! The `/test` diagnostic report.
//!
//! Never fails: storage errors are folded into the report as short status
//! strings. Environment variables are reported by presence only.

use serde::Serialize;

use crate::config::EnvPresence;
use crate::store::DocumentStore;

const MAX_ERROR_CHARS: usize = 50;
const MAX_COLLECTIONS: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticsReport {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

/// First `MAX_ERROR_CHARS` characters of an error message.
fn truncate(message: &str) -> String {
    message.chars().take(MAX_ERROR_CHARS).collect()
}

fn set_or_not(present: bool) -> String {
    let label = if present { "✅ Set" } else { "❌ Not Set" };
    label.to_string()
}

pub async fn diagnose(store: Option<&dyn DocumentStore>, env: EnvPresence) -> DiagnosticsReport {
    let mut report = DiagnosticsReport {
        backend: "✅ Running".to_string(),
        database: "⚠️  Available but not initialized".to_string(),
        database_url: set_or_not(env.database_url),
        database_name: set_or_not(env.database_name),
        connection_status: "Not Connected".to_string(),
        collections: Vec::new(),
    };

    let Some(store) = store else {
        return report;
    };

    if let Err(e) = store.database_name().await {
        tracing::warn!(error = %e, "database diagnostics failed");
        report.database = format!("❌ Error: {}", truncate(&e.to_string()));
        return report;
    }
    report.connection_status = "Connected".to_string();

    match store.list_collections(MAX_COLLECTIONS).await {
        Ok(collections) => {
            report.collections = collections;
            report.database = "✅ Connected & Working".to_string();
        }
        Err(e) => {
            tracing::warn!(error = %e, "listing collections failed");
            report.database = format!("⚠️  Connected but Error: {}", truncate(&e.to_string()));
        }
    }
    report
}

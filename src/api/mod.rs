//! HTTP surface.
//!
//! Handlers stay thin: parse, delegate to [`InstructionService`], shape the
//! response. Errors become responses through the `IntoResponse` impl in
//! [`error`].

pub mod cors;
pub mod diagnostics;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::EnvPresence;
use crate::error::{Error, Result};
use crate::service::InstructionService;
use crate::store::DocumentStore;
use crate::telemetry::http::{make_request_span, record_response};

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    service: Option<InstructionService>,
    env: EnvPresence,
}

impl AppState {
    /// `store` is `None` when no database is configured; CRUD routes then
    /// fail with a server error and `/test` reports the database missing.
    pub fn new(store: Option<Arc<dyn DocumentStore>>, env: EnvPresence) -> Self {
        Self {
            service: store.map(InstructionService::new),
            env,
        }
    }

    pub(crate) fn service(&self) -> Result<&InstructionService> {
        self.service
            .as_ref()
            .ok_or_else(|| Error::StorageUnavailable("no database configured".to_string()))
    }

    pub(crate) fn store(&self) -> Option<&dyn DocumentStore> {
        self.service.as_ref().map(|s| s.store().as_ref())
    }

    pub(crate) fn env(&self) -> EnvPresence {
        self.env
    }
}

/// Build the application router.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/test", get(handlers::diagnostics))
        .route(
            "/api/instructions",
            get(handlers::list_instructions).post(handlers::create_instruction),
        )
        .route("/api/instructions/{id}", get(handlers::get_instruction))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span::<Body>)
                .on_response(record_response::<Body>),
        )
}

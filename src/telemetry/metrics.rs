//! Metric instrument factories for instructions-api.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"instructions-api"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for instructions-api instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("instructions-api")
}

/// Counter: work instructions submitted for creation.
/// Labels: `result` ("ok" | "error").
pub fn instructions_created() -> Counter<u64> {
    meter()
        .u64_counter("instructions.created")
        .with_description("Number of work instructions created")
        .build()
}

/// Counter: document store operations.
/// Labels: `db.collection.name`, `db.operation.name`.
pub fn store_operations() -> Counter<u64> {
    meter()
        .u64_counter("instructions.store.operations")
        .with_description("Number of document store operations")
        .build()
}

/// Histogram: operation duration in milliseconds.
/// Labels: `operation`.
pub fn operation_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("instructions.operation.duration_ms")
        .with_description("Operation duration in milliseconds")
        .with_unit("ms")
        .build()
}

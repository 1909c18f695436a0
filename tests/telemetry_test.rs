//! Integration tests for telemetry initialization and span helpers.

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use std::time::Duration;

#[test]
fn telemetry_initializes_without_endpoint() {
    // A global subscriber can only be set once per process; a second
    // init returning Err is acceptable.
    let config = instructions_api::telemetry::TelemetryConfig {
        endpoint: None,
        service_name: "instructions-test".to_string(),
        log_level: "debug".to_string(),
    };
    if let Ok(guard) = instructions_api::telemetry::init_telemetry(config) {
        assert!(!guard.is_exporting());
        guard.force_flush();
    }
}

#[test]
fn request_span_creates_and_records_status() {
    let request = Request::get("/api/instructions").body(Body::empty()).unwrap();
    let span = instructions_api::telemetry::http::make_request_span(&request);

    let response = Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Body::empty())
        .unwrap();
    instructions_api::telemetry::http::record_response(&response, Duration::from_millis(3), &span);
}

#[test]
fn metric_instruments_build_without_provider() {
    use opentelemetry::KeyValue;
    instructions_api::telemetry::metrics::instructions_created()
        .add(1, &[KeyValue::new("result", "ok")]);
    instructions_api::telemetry::metrics::operation_duration_ms()
        .record(1.5, &[KeyValue::new("operation", "test")]);
}

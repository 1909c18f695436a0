//! # instructions-api
//!
//! Work instructions service: titled documents holding an ordered list of
//! steps, stored in a Postgres-backed document table and served over a
//! small JSON HTTP API.
//!
//! Steps are normalized on the way in (stable sort by `order`, then
//! renumbered from zero), so every stored instruction has gap-free order
//! values matching step position.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod normalize;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod validate;

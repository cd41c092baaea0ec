//! Library exports for the OSINT event-ingestion scripts.
/// Batch clustering pipeline for event deduplication.
pub mod cluster;
/// Environment-variable configuration shared by the binaries.
pub mod config;
/// Text embedding with a multilingual model and a mock fallback.
pub mod embedding;
/// Tracing setup for the worker and CLI scripts.
pub mod logging;
/// SQLite-backed event store.
pub mod store;
/// Language detection and translation to English.
pub mod translate;
/// Embedding vector encoding, padding, and parsing helpers.
pub mod vectors;
/// Queue-driven embedding worker.
pub mod worker;

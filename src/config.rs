//! Environment-variable configuration shared by the binaries.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Environment variable holding the event database location.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Environment variable holding the Redis connection URL.
pub const REDIS_URL_ENV: &str = "REDIS_URL";
/// Environment variable holding the translation backend base URL.
pub const TRANSLATE_URL_ENV: &str = "OSINT_TRANSLATE_URL";
/// Environment variable pointing at the ONNX model directory.
pub const EMBED_MODEL_DIR_ENV: &str = "OSINT_EMBED_MODEL_DIR";

const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
const DEFAULT_TRANSLATE_URL: &str = "http://localhost:5000";

/// Errors raised while resolving configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable was absent or empty.
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
}

/// Connection settings for the vector worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    pub redis_url: String,
}

/// Resolve worker settings. `DATABASE_URL` is required; `REDIS_URL` falls
/// back to a local instance.
pub fn worker_config() -> Result<WorkerConfig, ConfigError> {
    let database_url =
        non_empty_var(DATABASE_URL_ENV).ok_or(ConfigError::MissingVar(DATABASE_URL_ENV))?;
    let redis_url =
        non_empty_var(REDIS_URL_ENV).unwrap_or_else(|| DEFAULT_REDIS_URL.to_string());
    Ok(WorkerConfig {
        database_url,
        redis_url,
    })
}

/// Base URL of the translation backend.
pub fn translate_url() -> String {
    non_empty_var(TRANSLATE_URL_ENV).unwrap_or_else(|| DEFAULT_TRANSLATE_URL.to_string())
}

/// Directory containing `model.onnx` and `tokenizer.json`, when configured.
pub fn embed_model_dir() -> Option<PathBuf> {
    non_empty_var(EMBED_MODEL_DIR_ENV).map(PathBuf::from)
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

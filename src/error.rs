//! Error types for the load generator

use thiserror::Error;

/// Setup failures. Per-request failures never surface here, they are
/// reported as [`crate::dispatcher::SubmitOutcome`] values.
#[derive(Debug, Error)]
pub enum LoadTestError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("logger setup failed: {0}")]
    Logger(String),
}

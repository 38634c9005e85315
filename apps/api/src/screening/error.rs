use serde::Serialize;
use thiserror::Error;

/// Error taxonomy for the screening pipeline.
///
/// `Validation`, `AlreadyRunning` and `NotRunning` are returned synchronously
/// and never change session state. `Transport` and `Schema` only ever surface
/// through a session's `Failed` state.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", content = "detail", rename_all = "snake_case")]
pub enum ScreeningError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("A screening is already running for job '{job_id}'")]
    AlreadyRunning { job_id: String },

    #[error("No screening is running for job '{job_id}'")]
    NotRunning { job_id: String },

    #[error("Scoring service transport error (status {status:?}): {cause}")]
    Transport { status: Option<u16>, cause: String },

    #[error("Scoring response schema error: {0}")]
    Schema(String),
}

impl ScreeningError {
    pub fn validation(message: impl Into<String>) -> Self {
        ScreeningError::Validation(message.into())
    }

    pub fn schema(message: impl Into<String>) -> Self {
        ScreeningError::Schema(message.into())
    }
}

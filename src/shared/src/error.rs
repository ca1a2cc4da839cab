use thiserror::Error;

/// Fatal conditions of a session. Transient outcomes (a nonzero exit code,
/// the user rejecting every suggestion) are not errors and never show up here.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Shell history unavailable: {0}")]
    HistoryUnavailable(String),

    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Suggestion service returned an empty result")]
    OracleEmptyResult,

    #[error("Suggestion service error: {0}")]
    Oracle(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Interaction error: {0}")]
    Interaction(String),
}

impl SessionError {
    /// Finds a `SessionError` anywhere in an `anyhow` chain.
    pub fn find(err: &anyhow::Error) -> Option<&SessionError> {
        err.chain().find_map(|cause| cause.downcast_ref::<SessionError>())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Configuration(format!("JSON error: {}", err))
    }
}

impl From<dialoguer::Error> for SessionError {
    fn from(err: dialoguer::Error) -> Self {
        SessionError::Interaction(err.to_string())
    }
}

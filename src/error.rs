// Typed errors with thiserror. Surface meaningful messages to the host.
// Normal input never errors: ambiguous and stale signals are logged and dropped.

use thiserror::Error;

/// Engine error types.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unrecognized hit-test result: {0}")]
    HitClassification(String),

    #[error("Engine already destroyed")]
    Destroyed,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

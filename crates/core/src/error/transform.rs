/// Unified error type for callers that want a single error
use thiserror::Error;

use super::{RegistryError, SequenceError, SourceError};

/// Default failure type of a step. The engine hands it back untouched.
pub type StepError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Sequence error: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Step failed: {0}")]
    Step(#[from] StepError),
}

/// Result type alias using TransformError
pub type Result<T> = std::result::Result<T, TransformError>;

impl TransformError {
    /// Returns the step failure, if this error carries one
    pub fn into_step_error(self) -> Option<StepError> {
        match self {
            Self::Step(err) => Some(err),
            _ => None,
        }
    }
}

// Conversion from String for convenience
impl From<String> for TransformError {
    fn from(msg: String) -> Self {
        Self::Step(msg.into())
    }
}

// Conversion from &str for convenience
impl From<&str> for TransformError {
    fn from(msg: &str) -> Self {
        Self::Step(msg.into())
    }
}

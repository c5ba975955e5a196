/// Sequence and datasource errors
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Sequence is not positioned on an element")]
    NotPositioned,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Invalid datasource: {0}")]
    InvalidDatasource(String),
}

impl SourceError {
    /// Create an invalid datasource error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidDatasource(msg.into())
    }
}

/// Registry management errors
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Step named \"{0}\" is already present in the registry")]
    DuplicateName(String),

    #[error("Step named \"{0}\" not found in the registry")]
    NotFound(String),

    #[error("Could not generate an unused step name after {attempts} attempts")]
    NamesExhausted { attempts: usize },
}

impl RegistryError {
    /// Create a duplicate name error
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateName(name.into())
    }

    /// Create a not found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Name of the step the error refers to, if any
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::DuplicateName(name) | Self::NotFound(name) => Some(name),
            Self::NamesExhausted { .. } => None,
        }
    }
}

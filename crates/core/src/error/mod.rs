/// Centralized error handling for the transform engine
pub mod registry;
pub mod sequence;
pub mod transform;

pub use registry::RegistryError;
pub use sequence::{SequenceError, SourceError};
pub use transform::{Result, StepError, TransformError};

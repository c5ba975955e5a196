// Pipeline module - step registry, datasources and the lazy sequence

pub mod naming;
pub mod registry;
pub mod sequence;
pub mod source;
pub mod step;

// Re-export core types
pub use naming::*;
pub use registry::*;
pub use sequence::*;
pub use source::*;
pub use step::*;

//! Composable, lazily evaluated transformation pipelines.
//!
//! A [`Registry`](pipeline::Registry) holds an ordered set of named
//! [`Step`](pipeline::Step)s and folds them over an item. A
//! [`Sequence`](pipeline::Sequence) pulls `(key, item)` pairs from a
//! [`Datasource`](pipeline::Datasource) one at a time and runs each through
//! the registry as it is consumed.

pub mod error;
pub mod pipeline;

pub use error::{RegistryError, SequenceError, SourceError, StepError, TransformError};
pub use pipeline::{
    ClosureStep, Datasource, JsonKey, JsonSource, Registry, SeedPolicy, Sequence, SharedRegistry,
    Step,
};

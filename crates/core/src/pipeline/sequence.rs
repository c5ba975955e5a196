// Transforming sequence - lazy adapter driving a datasource through a registry
use super::registry::{SharedRegistry, SharedStep, read_registry, write_registry};
use super::source::{Datasource, VecSource};
use super::step::Step;
use crate::error::{RegistryError, SequenceError, StepError};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Seed handed to the fold of each pulled element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Every element starts from an absent seed
    #[default]
    Fresh,
    /// The last successfully transformed value seeds the next fold.
    ///
    /// An element whose fold failed is skipped: the element after it is
    /// seeded with the value carried before the failure.
    CarryForward,
}

/// Where the sequence currently stands
#[derive(Debug, Clone, PartialEq)]
enum Cursor<K, A> {
    Unstarted,
    Positioned { key: K, value: Option<A> },
    Exhausted,
    /// The last advance hit a failing step
    Failed { carried: Option<A> },
}

/// Lazy sequence of transformed elements.
///
/// Each [`advance`](Sequence::advance) pulls exactly one element from the
/// datasource and folds it through the registry as it is at that moment.
/// Nothing is computed ahead of time, so steps added or removed between
/// two advances apply to the next element only.
pub struct Sequence<D, A, E = StepError>
where
    D: Datasource,
{
    source: D,
    registry: SharedRegistry<D::Item, D::Key, A, E>,
    cursor: Cursor<D::Key, A>,
    seed_policy: SeedPolicy,
}

impl<D, A, E> Sequence<D, A, E>
where
    D: Datasource,
    D::Key: Clone,
    A: Clone,
{
    /// Bind a datasource and a registry. The datasource is rewound.
    pub fn new(mut source: D, registry: SharedRegistry<D::Item, D::Key, A, E>) -> Self {
        source.rewind();
        Self {
            source,
            registry,
            cursor: Cursor::Unstarted,
            seed_policy: SeedPolicy::default(),
        }
    }

    pub fn with_seed_policy(mut self, seed_policy: SeedPolicy) -> Self {
        self.seed_policy = seed_policy;
        self
    }

    pub fn seed_policy(&self) -> SeedPolicy {
        self.seed_policy
    }

    /// Move the cursor before the first element
    pub fn reset(&mut self) {
        debug!("Rewinding sequence");
        self.source.rewind();
        self.cursor = Cursor::Unstarted;
    }

    /// Pull the next element and transform it.
    ///
    /// A step failure is returned unchanged; the datasource has already moved
    /// past the failed element and the sequence is left unpositioned. Under
    /// [`SeedPolicy::CarryForward`] the value carried into the failed element
    /// is kept for the next one.
    pub fn advance(&mut self) -> Result<(), E> {
        if matches!(self.cursor, Cursor::Exhausted) {
            return Ok(());
        }

        let carried = match std::mem::replace(&mut self.cursor, Cursor::Failed { carried: None }) {
            Cursor::Positioned { value, .. } | Cursor::Failed { carried: value } => value,
            Cursor::Unstarted | Cursor::Exhausted => None,
        };
        self.source.advance();

        let (Some(key), Some(item)) = (self.source.key(), self.source.value()) else {
            trace!("Datasource exhausted");
            self.cursor = Cursor::Exhausted;
            return Ok(());
        };

        let (seed, carried) = match self.seed_policy {
            SeedPolicy::CarryForward => (carried.clone(), carried),
            SeedPolicy::Fresh => (None, None),
        };

        let result = read_registry(&self.registry).apply(item, key, seed);
        match result {
            Ok(value) => {
                trace!("Transformed element");
                self.cursor = Cursor::Positioned {
                    key: key.clone(),
                    value,
                };
                Ok(())
            }
            Err(err) => {
                self.cursor = Cursor::Failed { carried };
                Err(err)
            }
        }
    }

    /// True while positioned on a transformed element
    pub fn is_valid(&self) -> bool {
        matches!(self.cursor, Cursor::Positioned { .. })
    }

    pub fn current_key(&self) -> Result<&D::Key, SequenceError> {
        match &self.cursor {
            Cursor::Positioned { key, .. } => Ok(key),
            _ => Err(SequenceError::NotPositioned),
        }
    }

    /// Result of the fold for the current element.
    ///
    /// `None` when the registry was empty and the seed was absent.
    pub fn current_transformed(&self) -> Result<Option<&A>, SequenceError> {
        match &self.cursor {
            Cursor::Positioned { value, .. } => Ok(value.as_ref()),
            _ => Err(SequenceError::NotPositioned),
        }
    }

    /// Untransformed current element, as held by the datasource
    pub fn current_raw(&self) -> Result<&D::Item, SequenceError> {
        if !self.is_valid() {
            return Err(SequenceError::NotPositioned);
        }
        self.source.value().ok_or(SequenceError::NotPositioned)
    }

    /// Bind another datasource; the sequence starts over
    pub fn set_source(&mut self, source: D) {
        debug!("Binding new datasource");
        self.source = source;
        self.reset();
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    pub fn into_source(self) -> D {
        self.source
    }

    /// Bind another registry, used from the next advance on
    pub fn set_registry(&mut self, registry: SharedRegistry<D::Item, D::Key, A, E>) {
        debug!("Binding new registry");
        self.registry = registry;
    }

    pub fn registry(&self) -> &SharedRegistry<D::Item, D::Key, A, E> {
        &self.registry
    }

    pub fn add_step<S>(&self, step: S, name: Option<&str>) -> Result<String, RegistryError>
    where
        S: Step<D::Item, D::Key, A, E> + 'static,
    {
        write_registry(&self.registry).add(step, name)
    }

    pub fn replace_step<S>(&self, step: S, name: &str) -> Result<String, RegistryError>
    where
        S: Step<D::Item, D::Key, A, E> + 'static,
    {
        write_registry(&self.registry).replace(step, name)
    }

    pub fn has_step(&self, name: &str) -> bool {
        read_registry(&self.registry).has(name)
    }

    pub fn remove_step(&self, name: &str) -> Result<(), RegistryError> {
        write_registry(&self.registry).remove(name)
    }

    pub fn clear_steps(&self) {
        write_registry(&self.registry).clear()
    }

    pub fn get_step(
        &self,
        name: &str,
    ) -> Result<SharedStep<D::Item, D::Key, A, E>, RegistryError> {
        read_registry(&self.registry).get(name)
    }

    pub fn list_steps(&self) -> Vec<(String, SharedStep<D::Item, D::Key, A, E>)> {
        read_registry(&self.registry).list()
    }
}

impl<T, A: Clone, E> Sequence<VecSource<T>, A, E> {
    /// Sequence over no elements
    pub fn empty(registry: SharedRegistry<T, usize, A, E>) -> Self {
        Self::new(VecSource::new(Vec::new()), registry)
    }
}

/// Advance-then-read iteration, yielding `(key, transformed)` pairs
impl<D, A, E> Iterator for Sequence<D, A, E>
where
    D: Datasource,
    D::Key: Clone,
    A: Clone,
{
    type Item = Result<(D::Key, Option<A>), E>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(err) = self.advance() {
            return Some(Err(err));
        }
        match &self.cursor {
            Cursor::Positioned { key, value } => Some(Ok((key.clone(), value.clone()))),
            _ => None,
        }
    }
}

impl<D, A, E> fmt::Debug for Sequence<D, A, E>
where
    D: Datasource + fmt::Debug,
    D::Key: fmt::Debug,
    A: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("source", &self.source)
            .field("registry", &Arc::as_ptr(&self.registry))
            .field("cursor", &self.cursor)
            .field("seed_policy", &self.seed_policy)
            .finish()
    }
}

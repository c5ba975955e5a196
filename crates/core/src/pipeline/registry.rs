// Step registry - ordered, uniquely named collection of steps
use super::naming::{MAX_NAME_ATTEMPTS, NameGenerator, SequentialNames};
use super::step::Step;
use crate::error::{RegistryError, StepError};
use indexmap::IndexMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Shared handle to a step, as stored in a registry
pub type SharedStep<I, K, A, E = StepError> = Arc<dyn Step<I, K, A, E>>;

/// Registry behind a lock, shareable between sequences
pub type SharedRegistry<I, K, A, E = StepError> = Arc<RwLock<Registry<I, K, A, E>>>;

/// Ordered registry of named steps.
///
/// Insertion order is the fold order of [`apply`](Registry::apply). `add`
/// appends, `replace` keeps the position, `remove` keeps the relative order
/// of the remaining steps.
pub struct Registry<I, K, A, E = StepError> {
    steps: IndexMap<String, SharedStep<I, K, A, E>>,
    names: Box<dyn NameGenerator>,
}

impl<I, K, A, E> Registry<I, K, A, E> {
    /// Create a new empty registry using sequential auto names
    pub fn new() -> Self {
        Self::with_name_generator(SequentialNames::new())
    }

    /// Create a new empty registry with a custom name generator
    pub fn with_name_generator(names: impl NameGenerator + 'static) -> Self {
        Self {
            steps: IndexMap::new(),
            names: Box::new(names),
        }
    }

    /// Wrap the registry so it can be bound to one or more sequences
    pub fn into_shared(self) -> SharedRegistry<I, K, A, E> {
        Arc::new(RwLock::new(self))
    }

    /// Append a step. Without a name, an unused one is generated.
    ///
    /// Returns the effective name.
    pub fn add<S>(&mut self, step: S, name: Option<&str>) -> Result<String, RegistryError>
    where
        S: Step<I, K, A, E> + 'static,
    {
        self.add_shared(Arc::new(step), name)
    }

    /// Append an already shared step
    pub fn add_shared(
        &mut self,
        step: SharedStep<I, K, A, E>,
        name: Option<&str>,
    ) -> Result<String, RegistryError> {
        let name = match name {
            Some(name) if self.has(name) => return Err(RegistryError::duplicate(name)),
            Some(name) => name.to_string(),
            None => self.unused_name()?,
        };

        self.steps.insert(name.clone(), step);
        debug!(
            "Added step '{}' at position {}",
            name,
            self.steps.len() - 1
        );
        Ok(name)
    }

    /// Overwrite the step registered as `name`, keeping its position
    pub fn replace<S>(&mut self, step: S, name: &str) -> Result<String, RegistryError>
    where
        S: Step<I, K, A, E> + 'static,
    {
        self.replace_shared(Arc::new(step), name)
    }

    pub fn replace_shared(
        &mut self,
        step: SharedStep<I, K, A, E>,
        name: &str,
    ) -> Result<String, RegistryError> {
        let (index, _, slot) = self
            .steps
            .get_full_mut(name)
            .ok_or_else(|| RegistryError::not_found(name))?;
        *slot = step;
        debug!("Replaced step '{}' at position {}", name, index);
        Ok(name.to_string())
    }

    /// Check if a step is registered
    pub fn has(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Remove a step without reordering the others
    pub fn remove(&mut self, name: &str) -> Result<(), RegistryError> {
        let (index, _, _) = self
            .steps
            .shift_remove_full(name)
            .ok_or_else(|| RegistryError::not_found(name))?;
        debug!("Removed step '{}' from position {}", name, index);
        Ok(())
    }

    /// Remove every step
    pub fn clear(&mut self) {
        debug!("Clearing {} steps", self.steps.len());
        self.steps.clear();
    }

    /// Get a step by name
    pub fn get(&self, name: &str) -> Result<SharedStep<I, K, A, E>, RegistryError> {
        self.steps
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(name))
    }

    /// Snapshot of the steps in fold order.
    ///
    /// The returned vector is owned: later changes to the registry do not
    /// show up in it.
    pub fn list(&self) -> Vec<(String, SharedStep<I, K, A, E>)> {
        self.steps
            .iter()
            .map(|(name, step)| (name.clone(), Arc::clone(step)))
            .collect()
    }

    /// Step names in fold order
    pub fn names(&self) -> Vec<String> {
        self.steps.keys().cloned().collect()
    }

    /// Get the number of registered steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Fold every step over `seed` in registration order.
    ///
    /// An empty registry returns `seed` unchanged. The first failing step
    /// aborts the fold and its error is returned as is.
    pub fn apply(&self, item: &I, key: &K, seed: Option<A>) -> Result<Option<A>, E> {
        let mut acc = seed;
        for (name, step) in &self.steps {
            trace!("Applying step '{}'", name);
            acc = Some(step.transform(item, key, acc)?);
        }
        Ok(acc)
    }

    fn unused_name(&mut self) -> Result<String, RegistryError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let candidate = self.names.next_name();
            if !self.has(&candidate) {
                return Ok(candidate);
            }
            trace!("Generated name '{}' already taken, retrying", candidate);
        }
        Err(RegistryError::NamesExhausted {
            attempts: MAX_NAME_ATTEMPTS,
        })
    }
}

impl<I, K, A, E> Default for Registry<I, K, A, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// A registry is itself a step, so whole chains nest inside other chains.
///
/// The inner fold starts from the accumulator handed to it. An empty inner
/// registry given an absent accumulator yields `A::default()`.
impl<I, K, A, E> Step<I, K, A, E> for Registry<I, K, A, E>
where
    A: Default,
{
    fn transform(&self, item: &I, key: &K, acc: Option<A>) -> Result<A, E> {
        Ok(self.apply(item, key, acc)?.unwrap_or_default())
    }
}

/// Nested shared registry, read as it is at the time of each fold.
///
/// A registry must not be nested inside itself.
impl<I, K, A, E> Step<I, K, A, E> for SharedRegistry<I, K, A, E>
where
    A: Default,
{
    fn transform(&self, item: &I, key: &K, acc: Option<A>) -> Result<A, E> {
        read_registry(self).transform(item, key, acc)
    }
}

impl<I, K, A, E> fmt::Debug for Registry<I, K, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("steps", &self.steps.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Read access to a shared registry.
///
/// Mutations complete in a single map operation, so a registry behind a
/// poisoned lock is still consistent and is used as is.
pub fn read_registry<I, K, A, E>(
    registry: &SharedRegistry<I, K, A, E>,
) -> RwLockReadGuard<'_, Registry<I, K, A, E>> {
    registry.read().unwrap_or_else(PoisonError::into_inner)
}

/// Write access to a shared registry, see [`read_registry`]
pub fn write_registry<I, K, A, E>(
    registry: &SharedRegistry<I, K, A, E>,
) -> RwLockWriteGuard<'_, Registry<I, K, A, E>> {
    registry.write().unwrap_or_else(PoisonError::into_inner)
}

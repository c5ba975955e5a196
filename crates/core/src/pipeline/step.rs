// Step contract - one unit of transformation logic
use crate::error::StepError;
use std::fmt;
use std::marker::PhantomData;

/// A single transformation applied during a fold.
///
/// Receives the raw item, its key and the result accumulated by the steps
/// before it (`None` for the first step of a fold) and returns the new
/// accumulated result. Failures are returned to the caller of
/// [`Registry::apply`](super::Registry::apply) exactly as produced.
///
/// If `acc` holds shared state the caller still uses elsewhere, return a
/// new value instead of mutating it.
pub trait Step<I, K, A, E = StepError>: Send + Sync {
    fn transform(&self, item: &I, key: &K, acc: Option<A>) -> Result<A, E>;
}

/// Step backed by a closure
pub struct ClosureStep<F, I, K, A, E = StepError> {
    closure: F,
    _marker: PhantomData<fn(&I, &K, Option<A>) -> Result<A, E>>,
}

impl<F, I, K, A, E> ClosureStep<F, I, K, A, E>
where
    F: Fn(&I, &K, Option<A>) -> Result<A, E> + Send + Sync,
{
    pub fn new(closure: F) -> Self {
        Self {
            closure,
            _marker: PhantomData,
        }
    }

    /// The closure used to transform data
    pub fn closure(&self) -> &F {
        &self.closure
    }

    pub fn into_closure(self) -> F {
        self.closure
    }
}

impl<F, I, K, A, E> Step<I, K, A, E> for ClosureStep<F, I, K, A, E>
where
    F: Fn(&I, &K, Option<A>) -> Result<A, E> + Send + Sync,
{
    fn transform(&self, item: &I, key: &K, acc: Option<A>) -> Result<A, E> {
        (self.closure)(item, key, acc)
    }
}

impl<F, I, K, A, E> fmt::Debug for ClosureStep<F, I, K, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureStep").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_step_forwards_arguments() {
        let step = ClosureStep::new(|item: &i32, key: &usize, acc: Option<i32>| {
            Ok::<_, StepError>(acc.unwrap_or(0) + item * (*key as i32))
        });

        assert_eq!(step.transform(&3, &2, None).unwrap(), 6);
        assert_eq!(step.transform(&3, &2, Some(4)).unwrap(), 10);
    }

    #[test]
    fn test_closure_step_failure_is_returned() {
        let step = ClosureStep::new(|_: &i32, _: &usize, _: Option<i32>| {
            Err::<i32, _>("malformed".to_string())
        });

        assert_eq!(step.transform(&1, &0, None), Err("malformed".to_string()));
    }
}

// Name generation for steps registered without an explicit name
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Prefix used by the built-in generators
pub const AUTO_NAME_PREFIX: &str = "autotransformer_";

/// Upper bound on candidate names tried before `add` gives up
pub const MAX_NAME_ATTEMPTS: usize = 1024;

/// Source of candidate names. The registry retries until a candidate is unused.
pub trait NameGenerator: Send + Sync {
    fn next_name(&mut self) -> String;
}

/// Monotonic counter: `autotransformer_1`, `autotransformer_2`, ...
#[derive(Debug, Clone)]
pub struct SequentialNames {
    prefix: String,
    next: u64,
}

impl SequentialNames {
    pub fn new() -> Self {
        Self::with_prefix(AUTO_NAME_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialNames {
    fn default() -> Self {
        Self::new()
    }
}

impl NameGenerator for SequentialNames {
    fn next_name(&mut self) -> String {
        let name = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        name
    }
}

/// Random four digit suffix in `1111..=9999`
#[derive(Debug, Clone)]
pub struct RandomNames {
    prefix: String,
    rng: StdRng,
}

impl RandomNames {
    /// Generator seeded from the operating system
    pub fn new() -> Self {
        Self {
            prefix: AUTO_NAME_PREFIX.to_string(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator, for tests and reproducible runs
    pub fn from_seed(seed: u64) -> Self {
        Self {
            prefix: AUTO_NAME_PREFIX.to_string(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl Default for RandomNames {
    fn default() -> Self {
        Self::new()
    }
}

impl NameGenerator for RandomNames {
    fn next_name(&mut self) -> String {
        let suffix: u32 = self.rng.gen_range(1111..=9999);
        format!("{}{}", self.prefix, suffix)
    }
}

impl<F> NameGenerator for F
where
    F: FnMut() -> String + Send + Sync,
{
    fn next_name(&mut self) -> String {
        self()
    }
}

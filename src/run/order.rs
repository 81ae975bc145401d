//! Test execution order.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// The order in which a session runs its tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Order {
    /// Registration order: the order the container listed its tests in.
    Registration,
    /// A random permutation.
    ///
    /// With no seed, a fresh one is drawn and logged so the run can be
    /// reproduced.
    Shuffle { seed: Option<u64> },
}

impl Default for Order {
    fn default() -> Self {
        Self::Registration
    }
}

impl Order {
    /// Reorders `tests` in place.
    pub fn apply<T>(&self, tests: &mut [T]) {
        if let Self::Shuffle { seed } = self {
            let seed = seed.unwrap_or_else(rand::random);
            tracing::info!(seed, "shuffling tests");
            tests.shuffle(&mut StdRng::seed_from_u64(seed));
        }
    }
}

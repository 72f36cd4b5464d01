use rand::{SeedableRng, rngs::StdRng, seq::index};

/// Chooses which values of a column the date rule inspects.
pub trait Sampler {
    /// Returns `amount` distinct positions out of `len`, or every position
    /// when `len <= amount`.
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize>;
}

/// Uniform sampling without replacement, backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_os_rng, Self::seeded)
    }
}

impl Sampler for RandomSampler {
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        if len <= amount {
            return (0..len).collect();
        }
        let mut picked = index::sample(&mut self.rng, len, amount).into_vec();
        picked.sort_unstable();
        picked
    }
}

/// Takes the leading values. Useful where the caller wants sampling to be a
/// pure function of the data.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadSampler;

impl Sampler for HeadSampler {
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        (0..len.min(amount)).collect()
    }
}

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::utils::errors::{KernelError, KernelResult};

/// Published seed of the standard generator
pub const STANDARD_SEED: u64 = 149;

///////////
// Enums //
///////////

/// How a random source gets its seed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeedType {
    /// Fixed `STANDARD_SEED`, identical across runs
    Standard,
    /// Wall-clock milliseconds at construction
    Timestamp,
}

/// Parsing the seed type
///
/// ### Params
///
/// * `s` - string defining the seed type
///
/// ### Returns
///
/// The `SeedType`.
pub fn parse_seed_type(s: &str) -> Option<SeedType> {
    match s.to_lowercase().as_str() {
        "standard" => Some(SeedType::Standard),
        "timestamp" => Some(SeedType::Timestamp),
        _ => None,
    }
}

impl FromStr for SeedType {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_seed_type(s).ok_or_else(|| KernelError::UnknownVariant {
            kind: "seed type",
            token: s.to_string(),
        })
    }
}

impl fmt::Display for SeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedType::Standard => write!(f, "standard"),
            SeedType::Timestamp => write!(f, "timestamp"),
        }
    }
}

///////////////////
// Random source //
///////////////////

/// A seeded pseudo-random generator that remembers its seed
///
/// Construct one at the point of use. Timestamp sources in particular are
/// minted fresh by every call to [`SeededRandomSource::timestamp`].
///
/// ### Fields
///
/// * `seed` - The seed the generator started from
/// * `seed_type` - `None` for an explicit caller seed
/// * `rng` - The underlying generator
#[derive(Clone, Debug)]
pub struct SeededRandomSource {
    seed: u64,
    seed_type: Option<SeedType>,
    rng: StdRng,
}

impl SeededRandomSource {
    /// Generator seeded with `STANDARD_SEED`
    pub fn standard() -> Self {
        Self {
            seed: STANDARD_SEED,
            seed_type: Some(SeedType::Standard),
            rng: StdRng::seed_from_u64(STANDARD_SEED),
        }
    }

    /// Generator seeded with the current wall-clock time in milliseconds
    pub fn timestamp() -> Self {
        let seed = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_millis() as u64,
            Err(err) => {
                tracing::warn!(%err, "system clock is before the unix epoch; seeding with 0");
                0
            }
        };
        tracing::debug!(seed, "created timestamp seeded random source");
        Self {
            seed,
            seed_type: Some(SeedType::Timestamp),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded with an explicit value
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            seed_type: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator for a resolved seed type
    pub fn from_seed_type(seed_type: SeedType) -> Self {
        match seed_type {
            SeedType::Standard => Self::standard(),
            SeedType::Timestamp => Self::timestamp(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn seed_type(&self) -> Option<SeedType> {
        self.seed_type
    }
}

impl RngCore for SeededRandomSource {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.rng.fill_bytes(dst)
    }
}

//////////////
// Sampling //
//////////////

/// Draw distinct integers from `[0, population)` by rejection sampling
///
/// ### Params
///
/// * `k` - Number of draws
/// * `population` - Size of the population
/// * `source` - The random source
///
/// ### Returns
///
/// The draws in the order they were accepted. For `k == population` the
/// identity `0..population` is returned without consuming randomness.
/// `InvalidSampleSize` if `k > population`.
pub fn random_sample_without_replacement<R: Rng>(
    k: usize,
    population: usize,
    source: &mut R,
) -> KernelResult<Vec<usize>> {
    if k > population {
        return Err(KernelError::InvalidSampleSize { k, population });
    }
    if k == population {
        tracing::trace!(k, "sample covers the whole population; identity returned");
        return Ok((0..population).collect());
    }

    let mut seen: FxHashSet<usize> = FxHashSet::with_capacity_and_hasher(k, FxBuildHasher);
    let mut res = Vec::with_capacity(k);
    while res.len() < k {
        let candidate = source.random_range(0..population);
        if seen.insert(candidate) {
            res.push(candidate);
        }
    }

    Ok(res)
}

/// Random permutation of `0..n` (Fisher-Yates)
///
/// ### Params
///
/// * `n` - Number of indices
/// * `source` - The random source
///
/// ### Returns
///
/// The shuffled indices.
pub fn shuffled_indices<R: Rng>(n: usize, source: &mut R) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = source.random_range(0..=i);
        indices.swap(i, j);
    }
    indices
}

/// Draw one sample without replacement per permutation, in parallel
///
/// Every permutation owns its generator, seeded with `base_seed + i`, so the
/// result does not depend on how rayon schedules the work.
///
/// ### Params
///
/// * `n_perm` - Number of permutations
/// * `k` - Draws per permutation
/// * `population` - Size of the population
/// * `base_seed` - Seed of the first permutation
///
/// ### Returns
///
/// One vector of draws per permutation.
pub fn draw_permutation_samples(
    n_perm: usize,
    k: usize,
    population: usize,
    base_seed: u64,
) -> KernelResult<Vec<Vec<usize>>> {
    if k > population {
        return Err(KernelError::InvalidSampleSize { k, population });
    }
    tracing::debug!(n_perm, k, population, base_seed, "drawing permutation samples");

    (0..n_perm)
        .into_par_iter()
        .map(|i| {
            let mut source = SeededRandomSource::from_seed(base_seed.wrapping_add(i as u64));
            random_sample_without_replacement(k, population, &mut source)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_distinct_in_range(x: &[usize], n: usize) -> bool {
        let set: FxHashSet<usize> = x.iter().copied().collect();
        set.len() == x.len() && x.iter().all(|&v| v < n)
    }

    #[test]
    fn test_standard_is_reproducible() {
        let mut a = SeededRandomSource::standard();
        let mut b = SeededRandomSource::standard();
        let xa: Vec<u64> = (0..10).map(|_| a.next_u64()).collect();
        let xb: Vec<u64> = (0..10).map(|_| b.next_u64()).collect();
        assert_eq!(xa, xb);
        assert_eq!(a.seed(), STANDARD_SEED);
        assert_eq!(a.seed_type(), Some(SeedType::Standard));
    }

    #[test]
    fn test_timestamp_is_fresh_instance() {
        let mut a = SeededRandomSource::timestamp();
        let mut b = SeededRandomSource::timestamp();
        assert_eq!(a.seed_type(), Some(SeedType::Timestamp));
        assert_eq!(b.seed_type(), Some(SeedType::Timestamp));

        // drawing from one instance leaves the other at its start
        a.next_u64();
        let mut replay = SeededRandomSource::from_seed(b.seed());
        assert_eq!(b.next_u64(), replay.next_u64());
    }

    #[test]
    fn test_sample_identity_short_circuit() {
        let mut source = SeededRandomSource::standard();
        for k in 1..20 {
            let res = random_sample_without_replacement(k, k, &mut source).unwrap();
            assert_eq!(res, (0..k).collect::<Vec<usize>>());
        }
    }

    #[test]
    fn test_sample_distinct_and_reproducible() {
        let mut source_1 = SeededRandomSource::standard();
        let mut source_2 = SeededRandomSource::standard();
        let res_1 = random_sample_without_replacement(50, 200, &mut source_1).unwrap();
        let res_2 = random_sample_without_replacement(50, 200, &mut source_2).unwrap();
        assert_eq!(res_1.len(), 50);
        assert!(is_distinct_in_range(&res_1, 200));
        assert_eq!(res_1, res_2);
    }

    #[test]
    fn test_sample_too_large() {
        let res = random_sample_without_replacement(5, 4, &mut SeededRandomSource::from_seed(1));
        assert_eq!(
            res,
            Err(KernelError::InvalidSampleSize {
                k: 5,
                population: 4
            })
        );
    }

    #[test]
    fn test_sample_zero() {
        let res = random_sample_without_replacement(0, 10, &mut SeededRandomSource::from_seed(3));
        assert_eq!(res, Ok(Vec::new()));
    }

    #[test]
    fn test_shuffled_indices() {
        let mut res = shuffled_indices(30, &mut SeededRandomSource::from_seed(42));
        res.sort_unstable();
        assert_eq!(res, (0..30).collect::<Vec<usize>>());
    }

    #[test]
    fn test_draw_permutation_samples() {
        let a = draw_permutation_samples(16, 5, 40, 123).unwrap();
        let b = draw_permutation_samples(16, 5, 40, 123).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.iter().all(|s| is_distinct_in_range(s, 40)));
        assert!(draw_permutation_samples(2, 41, 40, 1).is_err());
    }

    #[test]
    fn test_seed_type_parse() {
        assert_eq!("Timestamp".parse::<SeedType>().unwrap(), SeedType::Timestamp);
        assert_eq!(SeedType::Standard.to_string(), "standard");
        assert!("clock".parse::<SeedType>().is_err());
    }
}

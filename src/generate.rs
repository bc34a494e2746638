//! Randomized matrix generators with a known expected non-zero count.
//!
//! Three modes:
//! - [`MatrixGenerator::random`]: unconstrained content; the expected count
//!   comes from [`reference_count`](crate::reference_count).
//! - [`MatrixGenerator::with_exact_count`]: exactly `target` planted
//!   non-zero cells; the target is the expected count.
//! - [`MatrixGenerator::statistical`]: NORMAL or UNIFORM samples; the
//!   expected count comes from the reference scan.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Uniform};
use strided_view::StridedArray;

use crate::dtype::{dispatch_element, is_nonzero, Element, ElementType};
use crate::matrix::TypedMatrix;
use crate::{NonZeroError, Result};

// ============================================================================
// Parameters
// ============================================================================

/// How the exact-count mode picks the cells to plant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlantStrategy {
    /// Choose `target` distinct cells up front (prefix of a random
    /// permutation). Always terminates after `target` draws.
    #[default]
    Shuffle,
    /// Pick uniformly random cells, planting only the ones still zero,
    /// until `target` cells are planted. Terminates with probability one;
    /// filling every cell takes O(n log n) picks.
    Rejection,
}

/// Distribution for the statistical mode.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FillDistribution {
    Normal { mean: f64, sigma: f64 },
    Uniform { low: f64, high: f64 },
}

impl FillDistribution {
    /// NORMAL(mean = 0, sigma = 1).
    pub const fn standard_normal() -> Self {
        Self::Normal {
            mean: 0.0,
            sigma: 1.0,
        }
    }

    /// UNIFORM(low = -1, high = 1).
    pub const fn symmetric_uniform() -> Self {
        Self::Uniform {
            low: -1.0,
            high: 1.0,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Normal { .. } => "NORMAL",
            Self::Uniform { .. } => "UNIFORM",
        }
    }

    fn sampler(&self) -> Result<Sampler> {
        match *self {
            Self::Normal { mean, sigma } => {
                if !mean.is_finite() || !sigma.is_finite() || sigma <= 0.0 {
                    return Err(NonZeroError::InvalidDistribution(format!(
                        "normal requires finite mean and sigma > 0, got mean={mean}, sigma={sigma}"
                    )));
                }
                Normal::new(mean, sigma)
                    .map(Sampler::Normal)
                    .map_err(|e| NonZeroError::InvalidDistribution(e.to_string()))
            }
            Self::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low >= high {
                    return Err(NonZeroError::InvalidDistribution(format!(
                        "uniform requires finite low < high, got low={low}, high={high}"
                    )));
                }
                Ok(Sampler::Uniform(Uniform::new(low, high)))
            }
        }
    }
}

impl fmt::Display for FillDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal { mean, sigma } => write!(f, "NORMAL(mean={mean}, sigma={sigma})"),
            Self::Uniform { low, high } => write!(f, "UNIFORM(low={low}, high={high})"),
        }
    }
}

enum Sampler {
    Normal(Normal<f64>),
    Uniform(Uniform<f64>),
}

impl Distribution<f64> for Sampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Sampler::Normal(d) => d.sample(rng),
            Sampler::Uniform(d) => d.sample(rng),
        }
    }
}

// ============================================================================
// Typed fill routines
// ============================================================================

pub(crate) fn random_array<T: Element, R: Rng + ?Sized>(
    rng: &mut R,
    rows: usize,
    cols: usize,
) -> StridedArray<T> {
    StridedArray::from_fn_row_major(&[rows, cols], |_| T::sample_any(rng))
}

pub(crate) fn planted_array<T: Element, R: Rng + ?Sized>(
    rng: &mut R,
    rows: usize,
    cols: usize,
    target: usize,
    strategy: PlantStrategy,
) -> StridedArray<T> {
    let mut array = StridedArray::from_fn_row_major(&[rows, cols], |_| T::zero());
    match strategy {
        PlantStrategy::Shuffle => {
            let cells = rand::seq::index::sample(rng, rows * cols, target);
            for cell in cells.into_iter() {
                array.set(&[cell / cols, cell % cols], T::sample_nonzero(rng));
            }
        }
        PlantStrategy::Rejection => {
            let mut planted = 0usize;
            while planted < target {
                let idx = [rng.gen_range(0..rows), rng.gen_range(0..cols)];
                if !is_nonzero(array.get(&idx)) {
                    array.set(&idx, T::sample_nonzero(rng));
                    planted += 1;
                }
            }
        }
    }
    array
}

pub(crate) fn sampled_array<T: Element, R: Rng + ?Sized>(
    rng: &mut R,
    rows: usize,
    cols: usize,
    distribution: &impl Distribution<f64>,
) -> StridedArray<T> {
    StridedArray::from_fn_row_major(&[rows, cols], |_| T::from_sample(distribution.sample(rng)))
}

fn capacity(rows: usize, cols: usize) -> Result<usize> {
    if rows == 0 || cols == 0 {
        return Err(NonZeroError::InvalidShape {
            dims: vec![rows, cols],
        });
    }
    rows.checked_mul(cols)
        .ok_or_else(|| NonZeroError::InvalidShape {
            dims: vec![rows, cols],
        })
}

// ============================================================================
// MatrixGenerator
// ============================================================================

/// Produces test matrices from one pseudo-random source.
///
/// Every call draws from the same generator, so a sweep seeded once is
/// reproducible end to end.
#[derive(Debug)]
pub struct MatrixGenerator<R = StdRng> {
    rng: R,
    strategy: PlantStrategy,
}

impl MatrixGenerator<StdRng> {
    /// Generator backed by a `StdRng` seeded with `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> MatrixGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            strategy: PlantStrategy::default(),
        }
    }

    /// Use `strategy` for exact-count generation.
    pub fn with_strategy(mut self, strategy: PlantStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> PlantStrategy {
        self.strategy
    }

    /// The underlying random source, for drawing trial parameters.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Matrix with unconstrained content: the full representable range for
    /// integers, `[0, 1)` for floats.
    pub fn random(&mut self, rows: usize, cols: usize, dtype: ElementType) -> Result<TypedMatrix> {
        capacity(rows, cols)?;
        let rng = &mut self.rng;
        Ok(dispatch_element!(dtype, T => {
            T::into_matrix(random_array::<T, R>(rng, rows, cols))
        }))
    }

    /// Matrix with exactly `target` non-zero cells; all other cells are zero.
    pub fn with_exact_count(
        &mut self,
        rows: usize,
        cols: usize,
        dtype: ElementType,
        target: usize,
    ) -> Result<TypedMatrix> {
        let capacity = capacity(rows, cols)?;
        if target > capacity {
            return Err(NonZeroError::TargetOutOfRange { target, capacity });
        }
        let rng = &mut self.rng;
        let strategy = self.strategy;
        Ok(dispatch_element!(dtype, T => {
            T::into_matrix(planted_array::<T, R>(rng, rows, cols, target, strategy))
        }))
    }

    /// Matrix filled with independent samples from `distribution`.
    ///
    /// Integer types round each sample to nearest and saturate into range;
    /// floating types store it directly.
    pub fn statistical(
        &mut self,
        rows: usize,
        cols: usize,
        dtype: ElementType,
        distribution: FillDistribution,
    ) -> Result<TypedMatrix> {
        capacity(rows, cols)?;
        let sampler = distribution.sampler()?;
        let rng = &mut self.rng;
        Ok(dispatch_element!(dtype, T => {
            T::into_matrix(sampled_array::<T, R>(rng, rows, cols, &sampler))
        }))
    }
}

//! Randomized cross-check of the counter against its oracles.
//!
//! A sweep runs every [`GenerationMode`] in turn, `trials` times each, on
//! matrices of random shape and element type. The first disagreement between
//! the counter and the expected count is logged and returned as
//! [`NonZeroError::CountMismatch`]; no further trials run after it.

use std::fmt;

use rand::Rng;
use tracing::{debug, error, trace};

use crate::count::count_nonzero;
use crate::dtype::ElementType;
use crate::generate::{FillDistribution, MatrixGenerator, PlantStrategy};
use crate::matrix::TypedMatrix;
use crate::oracle::reference_count;
use crate::{NonZeroError, Result};

/// Trials per mode when no override is given.
pub const DEFAULT_TRIALS: usize = 1500;

/// Largest row / column count drawn when no override is given.
pub const DEFAULT_MAX_DIM: usize = 100;

/// Seed used when no override is given.
pub const DEFAULT_SEED: u64 = 0x5EED_C0DE;

// ============================================================================
// GenerationMode
// ============================================================================

/// How a trial's matrix and expected count are produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GenerationMode {
    /// Unconstrained content, expected count from the reference scan.
    Random,
    /// Planted content, expected count is the planted target.
    ExactCount,
    /// Distribution samples, expected count from the reference scan.
    Statistical,
}

impl GenerationMode {
    /// Modes in the order a sweep runs them.
    pub const ALL: [GenerationMode; 3] = [Self::Random, Self::ExactCount, Self::Statistical];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Random => "RANDOM",
            Self::ExactCount => "EXACT-COUNT",
            Self::Statistical => "STATISTICAL",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Random => 0,
            Self::ExactCount => 1,
            Self::Statistical => 2,
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// SweepConfig
// ============================================================================

/// Parameters of a sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepConfig {
    /// Trials per generation mode.
    pub trials: usize,
    /// Rows are drawn from `1..=max_rows`.
    pub max_rows: usize,
    /// Columns are drawn from `1..=max_cols`.
    pub max_cols: usize,
    /// Seed for the single random source of the sweep.
    pub seed: u64,
    /// Planting strategy for the exact-count mode.
    pub strategy: PlantStrategy,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            max_rows: DEFAULT_MAX_DIM,
            max_cols: DEFAULT_MAX_DIM,
            seed: DEFAULT_SEED,
            strategy: PlantStrategy::default(),
        }
    }
}

fn env_override<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| NonZeroError::InvalidConfig(format!("{key}={raw:?} is not a valid value"))),
        Err(_) => Ok(None),
    }
}

impl SweepConfig {
    /// Defaults, overridden by `NONZERO_SWEEP_TRIALS`, `NONZERO_SWEEP_SEED`
    /// and `NONZERO_SWEEP_MAX_DIM` when set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(trials) = env_override("NONZERO_SWEEP_TRIALS")? {
            config.trials = trials;
        }
        if let Some(seed) = env_override("NONZERO_SWEEP_SEED")? {
            config.seed = seed;
        }
        if let Some(max_dim) = env_override("NONZERO_SWEEP_MAX_DIM")? {
            config.max_rows = max_dim;
            config.max_cols = max_dim;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_dims(mut self, max_rows: usize, max_cols: usize) -> Self {
        self.max_rows = max_rows;
        self.max_cols = max_cols;
        self
    }

    pub fn with_strategy(mut self, strategy: PlantStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(NonZeroError::InvalidConfig(
                "trials must be at least 1".to_string(),
            ));
        }
        if self.max_rows == 0 || self.max_cols == 0 {
            return Err(NonZeroError::InvalidConfig(format!(
                "max dims must be at least 1, got {}x{}",
                self.max_rows, self.max_cols
            )));
        }
        if self.max_rows.checked_mul(self.max_cols).is_none() {
            return Err(NonZeroError::InvalidConfig(format!(
                "max dims {}x{} overflow the cell count",
                self.max_rows, self.max_cols
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Trials
// ============================================================================

/// Result of one trial: the oracle's answer and the counter's.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialOutcome {
    pub mode: GenerationMode,
    pub trial: usize,
    pub dtype: ElementType,
    pub rows: usize,
    pub cols: usize,
    pub expected: usize,
    pub actual: usize,
}

impl TrialOutcome {
    /// `Ok` when the counts agree, `CountMismatch` otherwise.
    pub fn check(&self) -> Result<()> {
        if self.expected == self.actual {
            return Ok(());
        }
        Err(NonZeroError::CountMismatch {
            mode: self.mode,
            trial: self.trial,
            dtype: self.dtype,
            rows: self.rows,
            cols: self.cols,
            expected: self.expected,
            actual: self.actual,
        })
    }
}

/// Generate one matrix for `mode` and compare `counter` against its oracle.
pub fn run_trial<R, F>(
    generator: &mut MatrixGenerator<R>,
    config: &SweepConfig,
    mode: GenerationMode,
    trial: usize,
    counter: &mut F,
) -> Result<TrialOutcome>
where
    R: Rng,
    F: FnMut(&TypedMatrix) -> usize,
{
    let rng = generator.rng_mut();
    let cols = rng.gen_range(1..=config.max_cols);
    let rows = rng.gen_range(1..=config.max_rows);
    let dtype = ElementType::ALL[rng.gen_range(0..ElementType::ALL.len())];

    let (matrix, expected) = match mode {
        GenerationMode::Random => {
            let m = generator.random(rows, cols, dtype)?;
            let expected = reference_count(&m);
            (m, expected)
        }
        GenerationMode::ExactCount => {
            let target = generator.rng_mut().gen_range(0..=rows * cols);
            let m = generator.with_exact_count(rows, cols, dtype, target)?;
            (m, target)
        }
        GenerationMode::Statistical => {
            let distribution = if generator.rng_mut().gen_bool(0.5) {
                FillDistribution::standard_normal()
            } else {
                FillDistribution::symmetric_uniform()
            };
            let m = generator.statistical(rows, cols, dtype, distribution)?;
            let expected = reference_count(&m);
            (m, expected)
        }
    };

    let actual = counter(&matrix);
    trace!(%mode, trial, %dtype, rows, cols, expected, actual, "trial");
    Ok(TrialOutcome {
        mode,
        trial,
        dtype,
        rows,
        cols,
        expected,
        actual,
    })
}

// ============================================================================
// Sweep
// ============================================================================

/// Totals of a sweep that completed without a mismatch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    trials: [usize; 3],
    per_type: [usize; 7],
    elements_scanned: u64,
}

impl SweepReport {
    fn record(&mut self, outcome: &TrialOutcome) {
        self.trials[outcome.mode.index()] += 1;
        self.per_type[outcome.dtype as usize] += 1;
        self.elements_scanned += (outcome.rows * outcome.cols) as u64;
    }

    /// Trials run in `mode`.
    pub fn trials(&self, mode: GenerationMode) -> usize {
        self.trials[mode.index()]
    }

    /// Trials run on matrices of `dtype`, across all modes.
    pub fn trials_for_type(&self, dtype: ElementType) -> usize {
        self.per_type[dtype as usize]
    }

    pub fn total_trials(&self) -> usize {
        self.trials.iter().sum()
    }

    /// Cells counted across all trials.
    pub fn elements_scanned(&self) -> u64 {
        self.elements_scanned
    }
}

/// Cross-check [`count_nonzero`] against the oracles.
pub fn run_sweep(config: &SweepConfig) -> Result<SweepReport> {
    run_sweep_with(config, count_nonzero)
}

/// Cross-check an arbitrary `counter` against the oracles.
///
/// Stops at the first mismatch.
pub fn run_sweep_with<F>(config: &SweepConfig, mut counter: F) -> Result<SweepReport>
where
    F: FnMut(&TypedMatrix) -> usize,
{
    config.validate()?;
    let mut generator = MatrixGenerator::seeded(config.seed).with_strategy(config.strategy);
    let mut report = SweepReport::default();

    for mode in GenerationMode::ALL {
        debug!(%mode, trials = config.trials, seed = config.seed, "sweep mode started");
        for trial in 0..config.trials {
            let outcome = run_trial(&mut generator, config, mode, trial, &mut counter)?;
            if let Err(err) = outcome.check() {
                error!(
                    %mode,
                    trial,
                    dtype = %outcome.dtype,
                    rows = outcome.rows,
                    cols = outcome.cols,
                    expected = outcome.expected,
                    actual = outcome.actual,
                    "non-zero count mismatch"
                );
                return Err(err);
            }
            report.record(&outcome);
        }
        debug!(%mode, trials = report.trials(mode), "sweep mode finished");
    }

    Ok(report)
}

//! Non-zero counting over dense 2-D matrices of seven numeric element types,
//! with a randomized generator, an independent oracle and a cross-check sweep.
//!
//! # Core Types
//!
//! - [`TypedMatrix`]: Row-major matrix tagged with its [`ElementType`]
//! - [`Element`]: The seven supported scalar types and their tolerance rule
//! - [`MatrixGenerator`]: Seeded generator for the random, exact-count and
//!   statistical modes
//!
//! # Primary API
//!
//! - [`count_nonzero`]: Count non-zero elements of a matrix
//! - [`count_nonzero_view`]: Same over any [`StridedView`] (transposed,
//!   windowed, permuted)
//! - [`reference_count`]: Independent row-by-row scan
//! - [`run_sweep`] / [`run_sweep_with`]: Cross-check a counter across all
//!   modes and types, stopping at the first mismatch
//!
//! Integers are non-zero iff `!= 0`. Floats are non-zero iff `|v| > eps`,
//! with `eps = 1e-8` for `f32` and `1e-16` for `f64`; `|v| == eps` and NaN
//! count as zero.
//!
//! # Example
//!
//! ```rust
//! use strided_nonzero::{count_nonzero, ElementType, MatrixGenerator, TypedMatrix};
//!
//! let m = TypedMatrix::from_vec(1, 3, vec![5e-9f32, 2e-8, 0.0]).unwrap();
//! assert_eq!(count_nonzero(&m), 1);
//!
//! let mut gen = MatrixGenerator::seeded(7);
//! let planted = gen.with_exact_count(10, 10, ElementType::I8, 42).unwrap();
//! assert_eq!(count_nonzero(&planted), 42);
//! ```

mod count;
mod dtype;
mod generate;
mod matrix;
mod oracle;
mod order;
mod sweep;

// ============================================================================
// Error types
// ============================================================================

/// Errors raised by construction, generation and the sweep.
#[derive(Debug, thiserror::Error)]
pub enum NonZeroError {
    /// The counter disagreed with the expected count.
    #[error(
        "{mode} trial {trial}: {dtype} {rows}x{cols} expected {expected} non-zero, counted {actual}"
    )]
    CountMismatch {
        mode: GenerationMode,
        trial: usize,
        dtype: ElementType,
        rows: usize,
        cols: usize,
        expected: usize,
        actual: usize,
    },

    #[error(
        "invalid matrix shape {dims:?}: expected two non-zero dimensions with a representable cell count"
    )]
    InvalidShape { dims: Vec<usize> },

    #[error("target {target} exceeds matrix capacity {capacity}")]
    TargetOutOfRange { target: usize, capacity: usize },

    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("invalid sweep configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Strided(#[from] strided_view::StridedError),
}

/// Result type for non-zero counting operations.
pub type Result<T> = std::result::Result<T, NonZeroError>;

// ============================================================================
// Re-exports
// ============================================================================

pub use count::{count_nonzero, count_nonzero_view};
pub use dtype::{is_nonzero, Element, ElementType, F32_TOLERANCE, F64_TOLERANCE};
pub use generate::{FillDistribution, MatrixGenerator, PlantStrategy};
pub use matrix::TypedMatrix;
pub use oracle::reference_count;
pub use strided_view::{StridedArray, StridedError, StridedView};
pub use sweep::{
    run_sweep, run_sweep_with, run_trial, GenerationMode, SweepConfig, SweepReport, TrialOutcome,
    DEFAULT_MAX_DIM, DEFAULT_SEED, DEFAULT_TRIALS,
};

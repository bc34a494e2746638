//! Owned and borrowed strided array types for dense numeric matrices.
//!
//! The view layer only ever touches dims/strides/offset metadata; element data
//! stays in the owning buffer and is read through safe slice indexing.
//!
//! # Core Types
//!
//! - [`StridedArray`]: Owned strided multidimensional array (row- or column-major)
//! - [`StridedView`]: Borrowed dynamic-rank view over an existing buffer
//!
//! # Metadata Transformations
//!
//! These operate only on dims/strides/offset and never copy the underlying data:
//! - `permute`: Reorder dimensions
//! - `transpose_2d`: Swap the two axes of a matrix
//! - `window_2d`: Rectangular sub-window of a matrix
//!
//! # Example
//!
//! ```rust
//! use strided_view::StridedArray;
//!
//! let a = StridedArray::<i32>::from_fn_row_major(&[2, 3], |idx| (idx[0] * 3 + idx[1]) as i32);
//! let t = a.view().transpose_2d().unwrap();
//! assert_eq!(t.dims(), &[3, 2]);
//! assert_eq!(t.get(&[2, 1]), 5);
//! ```

pub mod view;

pub use view::{col_major_strides, row_major_strides, StridedArray, StridedView};

// ============================================================================
// Error types
// ============================================================================

/// Errors that can occur during strided array operations.
#[derive(Debug, thiserror::Error)]
pub enum StridedError {
    /// Array ranks do not match.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// Invalid axis index for the given array rank.
    #[error("invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// Stride array length doesn't match dimensions.
    #[error("stride and dims length mismatch")]
    StrideLengthMismatch,

    /// Integer overflow while computing array offset, or an offset outside the buffer.
    #[error("offset overflow while computing element offset")]
    OffsetOverflow,

    /// A requested window does not fit inside the parent extent.
    #[error("window {start}..{start}+{len} out of range for axis {axis} of size {dim}")]
    WindowOutOfRange {
        axis: usize,
        start: usize,
        len: usize,
        dim: usize,
    },
}

/// Result type for strided array operations.
pub type Result<T> = std::result::Result<T, StridedError>;

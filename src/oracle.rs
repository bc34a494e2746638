//! Reference scan used as the expected count for the random and statistical
//! modes.
//!
//! Deliberately shares nothing with the counting kernel: it walks logical
//! `(row, col)` indices, and classifies each element with its own per-type
//! comparison instead of [`is_nonzero`](crate::is_nonzero).

use crate::dtype::{F32_TOLERANCE, F64_TOLERANCE};
use crate::matrix::TypedMatrix;

/// Count non-zero elements with a plain row-by-row scan.
pub fn reference_count(matrix: &TypedMatrix) -> usize {
    let mut result = 0usize;
    for i in 0..matrix.rows() {
        for j in 0..matrix.cols() {
            let idx = [i, j];
            let nonzero = match matrix {
                TypedMatrix::U8(a) => a.get(&idx) != 0,
                TypedMatrix::I8(a) => a.get(&idx) != 0,
                TypedMatrix::U16(a) => a.get(&idx) != 0,
                TypedMatrix::I16(a) => a.get(&idx) != 0,
                TypedMatrix::I32(a) => a.get(&idx) != 0,
                TypedMatrix::F32(a) => a.get(&idx).abs() > F32_TOLERANCE,
                TypedMatrix::F64(a) => a.get(&idx).abs() > F64_TOLERANCE,
            };
            if nonzero {
                result += 1;
            }
        }
    }
    result
}

//! The non-zero counting kernel.
//!
//! Contiguous views (any dense layout) are counted as one flat run over the
//! backing slice. Other views are walked with the smallest-stride dimension
//! innermost, one run per outer index.

use strided_view::StridedView;

use crate::dtype::{is_nonzero, Element};
use crate::matrix::TypedMatrix;
use crate::order::compute_order;

/// Element count above which contiguous inputs are split across rayon workers.
#[cfg(feature = "parallel")]
pub(crate) const MINTHREADLENGTH: usize = 1 << 15;

/// Count the elements of `matrix` that are non-zero under its element type's
/// tolerance rule.
///
/// The result is in `0..=rows * cols`; the matrix is only read.
pub fn count_nonzero(matrix: &TypedMatrix) -> usize {
    matrix.count_nonzero()
}

/// Count non-zero elements of any strided view.
///
/// Every element of the view is classified exactly once; elements of the
/// backing buffer outside the view are never read.
pub fn count_nonzero_view<T: Element>(view: &StridedView<'_, T>) -> usize {
    if view.is_empty() {
        return 0;
    }
    if let Some(slice) = view.contiguous_slice() {
        return count_contiguous(slice);
    }
    count_strided(view)
}

#[inline]
fn count_run<T: Element>(run: &[T]) -> usize {
    run.iter().filter(|&&v| is_nonzero(v)).count()
}

fn count_contiguous<T: Element>(slice: &[T]) -> usize {
    #[cfg(feature = "parallel")]
    {
        if slice.len() > MINTHREADLENGTH {
            use rayon::prelude::*;
            let nthreads = rayon::current_num_threads();
            let chunk_size = (slice.len() + nthreads - 1) / nthreads;
            return slice.par_chunks(chunk_size).map(count_run).sum();
        }
    }
    count_run(slice)
}

fn count_strided<T: Element>(view: &StridedView<'_, T>) -> usize {
    let rank = view.ndim();
    if rank == 0 {
        return usize::from(is_nonzero(view.get(&[])));
    }

    let order = compute_order(view.strides());
    let dims: Vec<usize> = order.iter().map(|&d| view.dims()[d]).collect();
    let strides: Vec<isize> = order.iter().map(|&d| view.strides()[d]).collect();

    let (outer_dims, inner_dim) = dims.split_at(rank - 1);
    let (outer_strides, inner_stride) = strides.split_at(rank - 1);
    let inner_len = inner_dim[0];
    let inner_stride = inner_stride[0];
    let outer_total: usize = outer_dims.iter().product();

    let data = view.data();
    let mut idx = vec![0usize; outer_dims.len()];
    let mut base = view.offset();
    let mut count = 0usize;

    for _ in 0..outer_total {
        let mut pos = base;
        for _ in 0..inner_len {
            if is_nonzero(data[pos as usize]) {
                count += 1;
            }
            pos += inner_stride;
        }

        // Odometer over the outer dims, last outer dim fastest.
        for d in (0..outer_dims.len()).rev() {
            idx[d] += 1;
            base += outer_strides[d];
            if idx[d] < outer_dims[d] {
                break;
            }
            base -= outer_strides[d] * outer_dims[d] as isize;
            idx[d] = 0;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use strided_view::StridedArray;

    fn pattern(rows: usize, cols: usize) -> StridedArray<i32> {
        // Non-zero where (i + 2j) % 3 == 0.
        StridedArray::from_fn_row_major(&[rows, cols], |idx| {
            if (idx[0] + 2 * idx[1]) % 3 == 0 {
                (idx[0] * cols + idx[1]) as i32 + 1
            } else {
                0
            }
        })
    }

    fn naive(a: &StridedView<'_, i32>) -> usize {
        let mut n = 0;
        for i in 0..a.dims()[0] {
            for j in 0..a.dims()[1] {
                if a.get(&[i, j]) != 0 {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn test_contiguous_row_major() {
        let a = pattern(7, 9);
        assert_eq!(count_nonzero_view(&a.view()), naive(&a.view()));
    }

    #[test]
    fn test_transposed_view() {
        let a = pattern(5, 8);
        let t = a.view().transpose_2d().unwrap();
        assert_eq!(count_nonzero_view(&t), naive(&a.view()));
    }

    #[test]
    fn test_window_is_counted_by_strided_walk() {
        let a = pattern(10, 12);
        let w = a.view().window_2d(2, 5, 3, 6).unwrap();
        assert!(!w.is_contiguous());
        assert_eq!(count_nonzero_view(&w), naive(&w));
        // Cells outside the window never leak in.
        assert!(count_nonzero_view(&w) < count_nonzero_view(&a.view()));
    }

    #[test]
    fn test_window_of_transpose() {
        let a = pattern(9, 6);
        let w = a.view().transpose_2d().unwrap().window_2d(1, 4, 2, 5).unwrap();
        assert_eq!(count_nonzero_view(&w), naive(&w));
    }

    #[test]
    fn test_negative_stride_view() {
        // Rows reversed: offset at the last row, row stride negative.
        let a = pattern(4, 3);
        let rev = StridedView::new(a.data(), &[4, 3], &[-3, 1], 9).unwrap();
        assert_eq!(rev.get(&[0, 0]), a.get(&[3, 0]));
        assert_eq!(count_nonzero_view(&rev), naive(&a.view()));
    }

    #[test]
    fn test_rank3_view() {
        let a = StridedArray::<u8>::from_fn_row_major(&[3, 4, 5], |idx| (idx[2] % 2) as u8);
        let p = a.view().permute(&[2, 0, 1]).unwrap();
        assert!(p.is_contiguous());
        assert_eq!(count_nonzero_view(&p), 3 * 4 * 2);
        let w = StridedView::new(a.data(), &[3, 2, 5], &[20, 5, 1], 0).unwrap();
        assert!(!w.is_contiguous());
        assert_eq!(count_nonzero_view(&w), 3 * 2 * 2);
    }

    #[test]
    fn test_empty_window_counts_zero() {
        let a = pattern(3, 3);
        let w = a.view().window_2d(1, 0, 0, 3).unwrap();
        assert_eq!(count_nonzero_view(&w), 0);
    }

    #[test]
    fn test_float_tolerance_through_kernel() {
        let a = StridedArray::<f32>::from_fn_row_major(&[2, 2], |idx| match (idx[0], idx[1]) {
            (0, 0) => 5e-9,
            (0, 1) => 2e-8,
            (1, 0) => -1e-8,
            _ => -3.0,
        });
        assert_eq!(count_nonzero_view(&a.view()), 2);
        assert_eq!(count_nonzero_view(&a.view().transpose_2d().unwrap()), 2);
    }

    #[test]
    fn test_count_is_repeatable_and_read_only() {
        let a = pattern(6, 6);
        let before = a.data().to_vec();
        let first = count_nonzero_view(&a.view());
        let second = count_nonzero_view(&a.view());
        assert_eq!(first, second);
        assert_eq!(a.data(), before.as_slice());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_contiguous_matches_sequential() {
        let n = MINTHREADLENGTH * 2 + 17;
        let a = StridedArray::<i16>::from_fn_row_major(&[n, 1], |idx| (idx[0] % 5) as i16);
        assert_eq!(count_nonzero_view(&a.view()), count_run(a.data()));
    }
}

//! Dynamic-rank strided view types.
//!
//! - [`StridedView`]: Immutable dynamic-rank strided view over a borrowed slice
//! - [`StridedArray`]: Owned strided multidimensional array

use std::ops::{Index, IndexMut};
use std::sync::Arc;

use crate::{Result, StridedError};

// ============================================================================
// Validation helpers
// ============================================================================

/// Validate that all accessed offsets stay within `[0, len)`.
fn validate_bounds(len: usize, dims: &[usize], strides: &[isize], offset: isize) -> Result<()> {
    if dims.len() != strides.len() {
        return Err(StridedError::StrideLengthMismatch);
    }
    // Empty array - no access needed
    if dims.iter().any(|&d| d == 0) {
        return Ok(());
    }
    let mut min_offset = offset;
    let mut max_offset = offset;
    for (&dim, &stride) in dims.iter().zip(strides.iter()) {
        if dim > 1 {
            let end = stride
                .checked_mul(dim as isize - 1)
                .ok_or(StridedError::OffsetOverflow)?;
            if end >= 0 {
                max_offset = max_offset
                    .checked_add(end)
                    .ok_or(StridedError::OffsetOverflow)?;
            } else {
                min_offset = min_offset
                    .checked_add(end)
                    .ok_or(StridedError::OffsetOverflow)?;
            }
        }
    }
    if min_offset < 0 || max_offset < 0 {
        return Err(StridedError::OffsetOverflow);
    }
    if max_offset as usize >= len {
        return Err(StridedError::OffsetOverflow);
    }
    Ok(())
}

/// Compute column-major strides (first index varies fastest).
pub fn col_major_strides(dims: &[usize]) -> Vec<isize> {
    let rank = dims.len();
    if rank == 0 {
        return vec![];
    }
    let mut strides = vec![1isize; rank];
    for i in 1..rank {
        strides[i] = strides[i - 1] * dims[i - 1] as isize;
    }
    strides
}

/// Compute row-major strides (last index varies fastest).
pub fn row_major_strides(dims: &[usize]) -> Vec<isize> {
    let rank = dims.len();
    if rank == 0 {
        return vec![];
    }
    let mut strides = vec![1isize; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * dims[i + 1] as isize;
    }
    strides
}

/// Linear buffer offset of `indices`, panicking on out-of-range indices.
#[inline]
fn linear_offset(dims: &[usize], strides: &[isize], offset: isize, indices: &[usize]) -> usize {
    assert_eq!(indices.len(), dims.len(), "wrong number of indices");
    let mut idx = offset;
    for (i, &index) in indices.iter().enumerate() {
        assert!(
            index < dims[i],
            "index {} out of bounds for dim {}",
            index,
            dims[i]
        );
        idx += index as isize * strides[i];
    }
    idx as usize
}

// ============================================================================
// StridedView
// ============================================================================

/// Dynamic-rank immutable strided view.
///
/// Zero-copy transformations (permute, transpose, window) only rewrite the
/// dims/strides/offset triple.
pub struct StridedView<'a, T> {
    data: &'a [T],
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: isize,
}

impl<T> Clone for StridedView<'_, T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

impl<T> std::fmt::Debug for StridedView<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedView")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, T> StridedView<'a, T> {
    /// Create a new immutable strided view from a borrowed slice.
    pub fn new(data: &'a [T], dims: &[usize], strides: &[isize], offset: isize) -> Result<Self> {
        validate_bounds(data.len(), dims, strides, offset)?;
        Ok(Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
        })
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn offset(&self) -> isize {
        self.offset
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&d| d == 0)
    }

    /// The whole backing buffer, including elements outside the view.
    #[inline]
    pub fn data(&self) -> &'a [T] {
        self.data
    }

    /// Permute dimensions.
    pub fn permute(&self, perm: &[usize]) -> Result<StridedView<'a, T>> {
        let rank = self.dims.len();
        if perm.len() != rank {
            return Err(StridedError::RankMismatch(perm.len(), rank));
        }
        let mut seen = vec![false; rank];
        for &p in perm {
            if p >= rank || seen[p] {
                return Err(StridedError::InvalidAxis { axis: p, rank });
            }
            seen[p] = true;
        }
        let new_dims: Vec<usize> = perm.iter().map(|&p| self.dims[p]).collect();
        let new_strides: Vec<isize> = perm.iter().map(|&p| self.strides[p]).collect();
        Ok(StridedView {
            data: self.data,
            dims: Arc::from(new_dims),
            strides: Arc::from(new_strides),
            offset: self.offset,
        })
    }

    /// Transpose a 2D view by swapping its dims and strides.
    pub fn transpose_2d(&self) -> Result<StridedView<'a, T>> {
        if self.dims.len() != 2 {
            return Err(StridedError::RankMismatch(self.dims.len(), 2));
        }
        Ok(StridedView {
            data: self.data,
            dims: Arc::new([self.dims[1], self.dims[0]]),
            strides: Arc::new([self.strides[1], self.strides[0]]),
            offset: self.offset,
        })
    }

    /// Rectangular sub-window `[row_start, row_start + rows) x [col_start, col_start + cols)`
    /// of a 2D view. Strides are inherited, so the window is generally not contiguous.
    pub fn window_2d(
        &self,
        row_start: usize,
        rows: usize,
        col_start: usize,
        cols: usize,
    ) -> Result<StridedView<'a, T>> {
        if self.dims.len() != 2 {
            return Err(StridedError::RankMismatch(self.dims.len(), 2));
        }
        for (axis, &(start, len)) in [(row_start, rows), (col_start, cols)].iter().enumerate() {
            let dim = self.dims[axis];
            let end = start
                .checked_add(len)
                .ok_or(StridedError::OffsetOverflow)?;
            if end > dim {
                return Err(StridedError::WindowOutOfRange {
                    axis,
                    start,
                    len,
                    dim,
                });
            }
        }
        let shift = (row_start as isize)
            .checked_mul(self.strides[0])
            .and_then(|r| {
                (col_start as isize)
                    .checked_mul(self.strides[1])
                    .and_then(|c| r.checked_add(c))
            })
            .ok_or(StridedError::OffsetOverflow)?;
        // An empty window never dereferences, so it keeps the parent offset.
        let offset = if rows == 0 || cols == 0 {
            self.offset
        } else {
            self.offset
                .checked_add(shift)
                .ok_or(StridedError::OffsetOverflow)?
        };
        Ok(StridedView {
            data: self.data,
            dims: Arc::new([rows, cols]),
            strides: self.strides.clone(),
            offset,
        })
    }

    /// Returns the elements of the view as one dense slice when the view
    /// covers a gap-free run of the buffer.
    ///
    /// Any dense layout qualifies (row-major, column-major, or a permutation
    /// of either), so the slice is in memory order, not logical order.
    pub fn contiguous_slice(&self) -> Option<&'a [T]> {
        let mut axes: Vec<(usize, isize)> = self
            .dims
            .iter()
            .zip(self.strides.iter())
            .filter(|&(&d, _)| d > 1)
            .map(|(&d, &s)| (d, s))
            .collect();
        axes.sort_by_key(|&(_, s)| s.unsigned_abs());

        let mut expected = 1isize;
        for (dim, stride) in axes {
            if stride != expected {
                return None;
            }
            expected = expected.checked_mul(dim as isize)?;
        }
        let start = usize::try_from(self.offset).ok()?;
        self.data.get(start..start.checked_add(self.len())?)
    }

    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.contiguous_slice().is_some()
    }
}

impl<T: Copy> StridedView<'_, T> {
    /// Get an element by multi-dimensional index.
    pub fn get(&self, indices: &[usize]) -> T {
        self.data[linear_offset(&self.dims, &self.strides, self.offset, indices)]
    }
}

// ============================================================================
// StridedArray
// ============================================================================

/// Owned strided multidimensional array.
///
/// Supports both row-major (C default) and column-major layouts.
pub struct StridedArray<T> {
    data: Vec<T>,
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: isize,
}

impl<T> std::fmt::Debug for StridedArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedArray")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<T: Clone> Clone for StridedArray<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

impl<T: Clone + Default> StridedArray<T> {
    /// Create a row-major array filled with `T::default()`.
    pub fn row_major(dims: &[usize]) -> Self {
        let total: usize = dims.iter().product();
        Self {
            data: vec![T::default(); total],
            dims: Arc::from(dims),
            strides: Arc::from(row_major_strides(dims)),
            offset: 0,
        }
    }

    /// Create a column-major array filled with `T::default()`.
    pub fn col_major(dims: &[usize]) -> Self {
        let total: usize = dims.iter().product();
        Self {
            data: vec![T::default(); total],
            dims: Arc::from(dims),
            strides: Arc::from(col_major_strides(dims)),
            offset: 0,
        }
    }
}

impl<T> StridedArray<T> {
    /// Create a row-major array with values produced by a function.
    ///
    /// The function is called with indices in row-major iteration order.
    pub fn from_fn_row_major(dims: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Self {
        let total: usize = dims.iter().product();
        let rank = dims.len();
        let mut data = Vec::with_capacity(total);
        let mut idx = vec![0usize; rank];
        for _ in 0..total {
            data.push(f(&idx));
            for d in (0..rank).rev() {
                idx[d] += 1;
                if idx[d] < dims[d] {
                    break;
                }
                idx[d] = 0;
            }
        }
        Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(row_major_strides(dims)),
            offset: 0,
        }
    }

    /// Create a column-major array with values produced by a function.
    ///
    /// The function is called with indices in column-major iteration order.
    pub fn from_fn_col_major(dims: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Self {
        let total: usize = dims.iter().product();
        let rank = dims.len();
        let mut data = Vec::with_capacity(total);
        let mut idx = vec![0usize; rank];
        for _ in 0..total {
            data.push(f(&idx));
            for d in 0..rank {
                idx[d] += 1;
                if idx[d] < dims[d] {
                    break;
                }
                idx[d] = 0;
            }
        }
        Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(col_major_strides(dims)),
            offset: 0,
        }
    }

    /// Create from raw parts.
    pub fn from_parts(
        data: Vec<T>,
        dims: &[usize],
        strides: &[isize],
        offset: isize,
    ) -> Result<Self> {
        validate_bounds(data.len(), dims, strides, offset)?;
        Ok(Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
        })
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&d| d == 0)
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Create an immutable view over this array.
    pub fn view(&self) -> StridedView<'_, T> {
        StridedView {
            data: &self.data,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }

    /// Iterate over all elements in memory order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl<T: Copy> StridedArray<T> {
    /// Get an element by multi-dimensional index.
    pub fn get(&self, indices: &[usize]) -> T {
        self[indices]
    }

    /// Set an element by multi-dimensional index.
    pub fn set(&mut self, indices: &[usize], value: T) {
        self[indices] = value;
    }
}

impl<T> Index<&[usize]> for StridedArray<T> {
    type Output = T;

    fn index(&self, indices: &[usize]) -> &T {
        &self.data[linear_offset(&self.dims, &self.strides, self.offset, indices)]
    }
}

impl<T> IndexMut<&[usize]> for StridedArray<T> {
    fn index_mut(&mut self, indices: &[usize]) -> &mut T {
        let idx = linear_offset(&self.dims, &self.strides, self.offset, indices);
        &mut self.data[idx]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_major_strides() {
        assert_eq!(col_major_strides(&[3, 4]), vec![1, 3]);
        assert_eq!(col_major_strides(&[2, 3, 4]), vec![1, 2, 6]);
    }

    #[test]
    fn test_row_major_strides() {
        assert_eq!(row_major_strides(&[3, 4]), vec![4, 1]);
        assert_eq!(row_major_strides(&[2, 3, 4]), vec![12, 4, 1]);
    }

    #[test]
    fn test_strided_view_new() {
        let data = vec![1u8, 2, 3, 4, 5, 6];
        let view = StridedView::new(&data, &[2, 3], &[3, 1], 0).unwrap();
        assert_eq!(view.ndim(), 2);
        assert_eq!(view.dims(), &[2, 3]);
        assert_eq!(view.strides(), &[3, 1]);
        assert_eq!(view.len(), 6);
    }

    #[test]
    fn test_strided_view_rejects_out_of_bounds() {
        let data = vec![0i16; 5];
        assert!(matches!(
            StridedView::new(&data, &[2, 3], &[3, 1], 0),
            Err(StridedError::OffsetOverflow)
        ));
        assert!(matches!(
            StridedView::new(&data, &[2, 3], &[1], 0),
            Err(StridedError::StrideLengthMismatch)
        ));
    }

    #[test]
    fn test_strided_view_col_major() {
        let data = vec![1, 2, 3, 4, 5, 6];
        let view = StridedView::new(&data, &[2, 3], &[1, 2], 0).unwrap();
        assert_eq!(view.get(&[0, 0]), 1); // data[0]
        assert_eq!(view.get(&[1, 0]), 2); // data[1]
        assert_eq!(view.get(&[0, 1]), 3); // data[2]
        assert_eq!(view.get(&[1, 2]), 6); // data[5]
    }

    #[test]
    fn test_strided_view_permute() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let view = StridedView::new(&data, &[2, 3], &[3, 1], 0).unwrap();
        let perm = view.permute(&[1, 0]).unwrap();
        assert_eq!(perm.dims(), &[3, 2]);
        assert_eq!(perm.strides(), &[1, 3]);
        assert_eq!(perm.get(&[1, 0]), 2.0);
        assert_eq!(perm.get(&[0, 1]), 4.0);

        assert!(matches!(
            view.permute(&[0, 0]),
            Err(StridedError::InvalidAxis { axis: 0, rank: 2 })
        ));
    }

    #[test]
    fn test_strided_view_transpose_2d() {
        let data = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let view = StridedView::new(&data, &[2, 3], &[3, 1], 0).unwrap();
        let t = view.transpose_2d().unwrap();
        assert_eq!(t.dims(), &[3, 2]);
        assert_eq!(t.get(&[0, 0]), 1.0);
        assert_eq!(t.get(&[1, 0]), 2.0);
        assert_eq!(t.get(&[0, 1]), 4.0);

        let flat = StridedView::new(&data, &[6], &[1], 0).unwrap();
        assert!(matches!(
            flat.transpose_2d(),
            Err(StridedError::RankMismatch(1, 2))
        ));
    }

    #[test]
    fn test_window_2d() {
        let a = StridedArray::<i32>::from_fn_row_major(&[4, 5], |idx| (idx[0] * 10 + idx[1]) as i32);
        let w = a.view().window_2d(1, 2, 2, 3).unwrap();
        assert_eq!(w.dims(), &[2, 3]);
        assert_eq!(w.strides(), &[5, 1]);
        assert_eq!(w.get(&[0, 0]), 12);
        assert_eq!(w.get(&[1, 2]), 24);
        assert!(!w.is_contiguous());

        assert!(matches!(
            a.view().window_2d(3, 2, 0, 1),
            Err(StridedError::WindowOutOfRange { axis: 0, .. })
        ));
    }

    #[test]
    fn test_contiguous_slice_layouts() {
        let row = StridedArray::<u8>::row_major(&[3, 4]);
        let col = StridedArray::<u8>::col_major(&[3, 4]);
        assert_eq!(row.view().contiguous_slice().map(|s| s.len()), Some(12));
        assert_eq!(col.view().contiguous_slice().map(|s| s.len()), Some(12));
        assert!(row.view().transpose_2d().unwrap().is_contiguous());

        // A full-width band of rows is still one dense run.
        let band = row.view().window_2d(1, 2, 0, 4).unwrap();
        assert_eq!(band.contiguous_slice().map(|s| s.len()), Some(8));
    }

    #[test]
    fn test_strided_array_row_major() {
        let t = StridedArray::<f64>::from_fn_row_major(&[2, 3], |idx| (idx[0] * 3 + idx[1]) as f64);
        assert_eq!(t.strides(), &[3, 1]);
        assert_eq!(t.get(&[0, 1]), 1.0);
        assert_eq!(t.get(&[1, 0]), 3.0);
        assert_eq!(t.get(&[1, 2]), 5.0);
    }

    #[test]
    fn test_strided_array_col_major() {
        let t = StridedArray::<f64>::from_fn_col_major(&[2, 3], |idx| (idx[0] * 3 + idx[1]) as f64);
        assert_eq!(t.strides(), &[1, 2]);
        assert_eq!(t.data(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
        assert_eq!(t.get(&[1, 2]), 5.0);
    }

    #[test]
    fn test_strided_array_set_and_index() {
        let mut t = StridedArray::<i8>::row_major(&[2, 2]);
        t.set(&[1, 0], -1);
        let idx: &[usize] = &[0, 1];
        t[idx] = 7;
        assert_eq!(t.data(), &[0, 7, -1, 0]);
        let idx: &[usize] = &[1, 0];
        assert_eq!(t[idx], -1);
    }

    #[test]
    fn test_from_parts_validates() {
        assert!(StridedArray::from_parts(vec![0u16; 4], &[2, 2], &[2, 1], 0).is_ok());
        assert!(StridedArray::from_parts(vec![0u16; 4], &[2, 2], &[2, 1], 1).is_err());
    }
}

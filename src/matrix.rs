use strided_view::{row_major_strides, StridedArray};

use crate::count::count_nonzero_view;
use crate::dtype::{dispatch_element, Element, ElementType};
use crate::{NonZeroError, Result};

/// A single-channel 2-D matrix whose element type is chosen at runtime.
///
/// Every variant holds a rank-2 array with at least one row and one column.
pub enum TypedMatrix {
    U8(StridedArray<u8>),
    I8(StridedArray<i8>),
    U16(StridedArray<u16>),
    I16(StridedArray<i16>),
    I32(StridedArray<i32>),
    F32(StridedArray<f32>),
    F64(StridedArray<f64>),
}

/// Evaluate `$body` with `$a` bound to the inner `StridedArray` of any variant.
macro_rules! with_array {
    ($matrix:expr, $a:ident => $body:expr) => {
        match $matrix {
            TypedMatrix::U8($a) => $body,
            TypedMatrix::I8($a) => $body,
            TypedMatrix::U16($a) => $body,
            TypedMatrix::I16($a) => $body,
            TypedMatrix::I32($a) => $body,
            TypedMatrix::F32($a) => $body,
            TypedMatrix::F64($a) => $body,
        }
    };
}

fn check_shape(dims: &[usize]) -> Result<()> {
    let overflows = dims.len() == 2 && dims[0].checked_mul(dims[1]).is_none();
    if dims.len() != 2 || dims.iter().any(|&d| d == 0) || overflows {
        return Err(NonZeroError::InvalidShape {
            dims: dims.to_vec(),
        });
    }
    Ok(())
}

impl TypedMatrix {
    /// Wrap an existing array, checking that it is a non-empty matrix.
    pub fn new<T: Element>(array: StridedArray<T>) -> Result<Self> {
        check_shape(array.dims())?;
        Ok(T::into_matrix(array))
    }

    /// Build a row-major matrix from `rows * cols` values in row order.
    pub fn from_vec<T: Element>(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        let dims = [rows, cols];
        check_shape(&dims)?;
        let array = StridedArray::from_parts(data, &dims, &row_major_strides(&dims), 0)?;
        Ok(T::into_matrix(array))
    }

    /// All-zero row-major matrix of the given type.
    pub fn zeros(dtype: ElementType, rows: usize, cols: usize) -> Result<Self> {
        check_shape(&[rows, cols])?;
        Ok(dispatch_element!(dtype, T => {
            T::into_matrix(StridedArray::<T>::row_major(&[rows, cols]))
        }))
    }

    pub fn dtype(&self) -> ElementType {
        match self {
            TypedMatrix::U8(_) => ElementType::U8,
            TypedMatrix::I8(_) => ElementType::I8,
            TypedMatrix::U16(_) => ElementType::U16,
            TypedMatrix::I16(_) => ElementType::I16,
            TypedMatrix::I32(_) => ElementType::I32,
            TypedMatrix::F32(_) => ElementType::F32,
            TypedMatrix::F64(_) => ElementType::F64,
        }
    }

    pub fn dims(&self) -> &[usize] {
        with_array!(self, a => a.dims())
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.dims()[0]
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.dims()[1]
    }

    /// Number of cells, `rows * cols`.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Always `false`: a matrix has at least one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Borrow the inner array if it holds `T` elements.
    pub fn as_array<T: Element>(&self) -> Option<&StridedArray<T>> {
        T::array_ref(self)
    }

    /// Count the elements that are non-zero under the element type's tolerance rule.
    pub fn count_nonzero(&self) -> usize {
        with_array!(self, a => count_nonzero_view(&a.view()))
    }

    /// Column-major copy with the same logical contents.
    pub fn to_col_major(&self) -> TypedMatrix {
        with_array!(self, a => {
            let src = a.view();
            Element::into_matrix(StridedArray::from_fn_col_major(a.dims(), |idx| src.get(idx)))
        })
    }
}

impl std::fmt::Debug for TypedMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedMatrix")
            .field("dtype", &self.dtype())
            .field("dims", &self.dims())
            .finish()
    }
}

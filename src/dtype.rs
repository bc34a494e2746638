//! Element types supported by the non-zero counter, and the tolerance rule
//! that decides whether a single element counts as non-zero.
//!
//! Integer elements are non-zero iff they differ from zero. Floating elements
//! are non-zero iff their magnitude strictly exceeds the type's tolerance
//! ([`F32_TOLERANCE`], [`F64_TOLERANCE`]); a magnitude equal to the tolerance
//! is zero, and so is NaN.

use std::fmt;

use num_traits::Zero;
use rand::Rng;
use strided_view::StridedArray;

use crate::matrix::TypedMatrix;

/// Magnitudes at or below this are treated as zero for `f32` elements.
pub const F32_TOLERANCE: f32 = 1e-8;

/// Magnitudes at or below this are treated as zero for `f64` elements.
pub const F64_TOLERANCE: f64 = 1e-16;

// ============================================================================
// ElementType
// ============================================================================

/// Runtime tag for the element type of a [`TypedMatrix`].
///
/// Discriminants follow the conventional depth codes (8U=0 .. 64F=6) and are
/// stable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementType {
    /// 8-bit unsigned integer
    U8 = 0,
    /// 8-bit signed integer
    I8 = 1,
    /// 16-bit unsigned integer
    U16 = 2,
    /// 16-bit signed integer
    I16 = 3,
    /// 32-bit signed integer
    I32 = 4,
    /// 32-bit floating point
    F32 = 5,
    /// 64-bit floating point
    F64 = 6,
}

impl ElementType {
    /// Every supported element type, in discriminant order.
    pub const ALL: [ElementType; 7] = [
        Self::U8,
        Self::I8,
        Self::U16,
        Self::I16,
        Self::I32,
        Self::F32,
        Self::F64,
    ];

    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        !matches!(self, Self::U8 | Self::U16)
    }

    /// Zero tolerance for floating types, `None` for integers.
    pub fn tolerance(self) -> Option<f64> {
        match self {
            Self::F32 => Some(f64::from(F32_TOLERANCE)),
            Self::F64 => Some(F64_TOLERANCE),
            _ => None,
        }
    }

    /// Look up a type by its discriminant.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Element trait
// ============================================================================

mod sealed {
    pub trait Sealed {}
}

/// A scalar type that can be stored in a [`TypedMatrix`].
///
/// Sealed: exactly the seven types named by [`ElementType`] implement it, so
/// an unsupported element type is a compile error rather than a runtime one.
pub trait Element:
    Copy + Default + PartialOrd + Zero + Send + Sync + fmt::Debug + 'static + sealed::Sealed
{
    const DTYPE: ElementType;

    /// Values strictly above this bound are non-zero.
    const UPPER_TOLERANCE: Self;

    /// Values strictly below this bound are non-zero.
    const LOWER_TOLERANCE: Self;

    /// Unconstrained value: the full range for integers, `[0, 1)` for floats.
    fn sample_any<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Value that [`is_nonzero`] always accepts.
    fn sample_nonzero<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Encode a real-valued sample: floats store it directly, integers round
    /// to nearest and saturate (NaN becomes zero).
    fn from_sample(sample: f64) -> Self;

    #[doc(hidden)]
    fn into_matrix(array: StridedArray<Self>) -> TypedMatrix;

    #[doc(hidden)]
    fn array_ref(matrix: &TypedMatrix) -> Option<&StridedArray<Self>>;
}

/// The tolerance rule shared by every element type.
///
/// For integers both bounds are zero, which reduces to `value != 0`. For
/// floats the bounds are `±tolerance`, which reduces to `|value| > tolerance`.
#[inline]
pub fn is_nonzero<T: Element>(value: T) -> bool {
    value > T::UPPER_TOLERANCE || value < T::LOWER_TOLERANCE
}

macro_rules! impl_unsigned_element {
    ($($t:ty => $variant:ident),* $(,)?) => {$(
        impl sealed::Sealed for $t {}

        impl Element for $t {
            const DTYPE: ElementType = ElementType::$variant;
            const UPPER_TOLERANCE: Self = 0;
            const LOWER_TOLERANCE: Self = 0;

            #[inline]
            fn sample_any<R: Rng + ?Sized>(rng: &mut R) -> Self {
                rng.gen()
            }

            #[inline]
            fn sample_nonzero<R: Rng + ?Sized>(rng: &mut R) -> Self {
                rng.gen_range(1..=<$t>::MAX)
            }

            #[inline]
            fn from_sample(sample: f64) -> Self {
                // `as` saturates out-of-range floats and maps NaN to 0.
                sample.round() as $t
            }

            fn into_matrix(array: StridedArray<Self>) -> TypedMatrix {
                TypedMatrix::$variant(array)
            }

            fn array_ref(matrix: &TypedMatrix) -> Option<&StridedArray<Self>> {
                match matrix {
                    TypedMatrix::$variant(a) => Some(a),
                    _ => None,
                }
            }
        }
    )*};
}

macro_rules! impl_signed_element {
    ($($t:ty => $variant:ident),* $(,)?) => {$(
        impl sealed::Sealed for $t {}

        impl Element for $t {
            const DTYPE: ElementType = ElementType::$variant;
            const UPPER_TOLERANCE: Self = 0;
            const LOWER_TOLERANCE: Self = 0;

            #[inline]
            fn sample_any<R: Rng + ?Sized>(rng: &mut R) -> Self {
                rng.gen()
            }

            #[inline]
            fn sample_nonzero<R: Rng + ?Sized>(rng: &mut R) -> Self {
                // Uniform over MIN..=MAX minus zero: draw from one value fewer
                // and shift the non-negative half up by one.
                let v = rng.gen_range(<$t>::MIN..<$t>::MAX);
                if v < 0 {
                    v
                } else {
                    v + 1
                }
            }

            #[inline]
            fn from_sample(sample: f64) -> Self {
                sample.round() as $t
            }

            fn into_matrix(array: StridedArray<Self>) -> TypedMatrix {
                TypedMatrix::$variant(array)
            }

            fn array_ref(matrix: &TypedMatrix) -> Option<&StridedArray<Self>> {
                match matrix {
                    TypedMatrix::$variant(a) => Some(a),
                    _ => None,
                }
            }
        }
    )*};
}

macro_rules! impl_float_element {
    ($($t:ty => $variant:ident, $tol:expr),* $(,)?) => {$(
        impl sealed::Sealed for $t {}

        impl Element for $t {
            const DTYPE: ElementType = ElementType::$variant;
            const UPPER_TOLERANCE: Self = $tol;
            const LOWER_TOLERANCE: Self = -$tol;

            #[inline]
            fn sample_any<R: Rng + ?Sized>(rng: &mut R) -> Self {
                rng.gen()
            }

            #[inline]
            fn sample_nonzero<R: Rng + ?Sized>(rng: &mut R) -> Self {
                // `1 - [0, 1)` lies in (0, 1]. The standard sampler works on a
                // 2^-24 (f32) / 2^-53 (f64) grid, so the smallest magnitude
                // still clears the tolerance.
                let magnitude = 1.0 - rng.gen::<$t>();
                debug_assert!(magnitude > $tol);
                if rng.gen::<bool>() {
                    magnitude
                } else {
                    -magnitude
                }
            }

            #[inline]
            fn from_sample(sample: f64) -> Self {
                sample as $t
            }

            fn into_matrix(array: StridedArray<Self>) -> TypedMatrix {
                TypedMatrix::$variant(array)
            }

            fn array_ref(matrix: &TypedMatrix) -> Option<&StridedArray<Self>> {
                match matrix {
                    TypedMatrix::$variant(a) => Some(a),
                    _ => None,
                }
            }
        }
    )*};
}

impl_unsigned_element!(u8 => U8, u16 => U16);
impl_signed_element!(i8 => I8, i16 => I16, i32 => I32);
impl_float_element!(f32 => F32, F32_TOLERANCE, f64 => F64, F64_TOLERANCE);

/// Run `$body` with `$T` bound to the Rust type behind an [`ElementType`].
macro_rules! dispatch_element {
    ($dtype:expr, $T:ident => $body:expr) => {
        match $dtype {
            $crate::dtype::ElementType::U8 => {
                type $T = u8;
                $body
            }
            $crate::dtype::ElementType::I8 => {
                type $T = i8;
                $body
            }
            $crate::dtype::ElementType::U16 => {
                type $T = u16;
                $body
            }
            $crate::dtype::ElementType::I16 => {
                type $T = i16;
                $body
            }
            $crate::dtype::ElementType::I32 => {
                type $T = i32;
                $body
            }
            $crate::dtype::ElementType::F32 => {
                type $T = f32;
                $body
            }
            $crate::dtype::ElementType::F64 => {
                type $T = f64;
                $body
            }
        }
    };
}

pub(crate) use dispatch_element;

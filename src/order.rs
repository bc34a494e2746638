/// Iteration order for a strided walk, outer -> inner.
///
/// Dimensions with larger stride magnitude go outside so the innermost loop
/// touches memory with the smallest step; ties keep the original axis order.
pub(crate) fn compute_order(strides: &[isize]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..strides.len()).collect();
    order.sort_by(|&a, &b| {
        strides[b]
            .unsigned_abs()
            .cmp(&strides[a].unsigned_abs())
            .then_with(|| a.cmp(&b))
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_keeps_order() {
        assert_eq!(compute_order(&[5, 1]), vec![0, 1]);
    }

    #[test]
    fn test_col_major_swaps() {
        assert_eq!(compute_order(&[1, 4]), vec![1, 0]);
    }

    #[test]
    fn test_negative_strides_use_magnitude() {
        assert_eq!(compute_order(&[-1, 6, -3]), vec![1, 2, 0]);
    }

    #[test]
    fn test_ties_are_stable() {
        assert_eq!(compute_order(&[2, 2]), vec![0, 1]);
    }
}

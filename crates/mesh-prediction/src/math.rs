//! Deterministic integer math helpers.

use num_traits::PrimInt;

/// Floor of the square root of |number|, computed with integer Newton steps.
///
/// Deterministic across platforms, unlike a round trip through `f64`.
/// Callers must pass a non-negative value when `T` is signed.
pub fn int_sqrt<T: PrimInt>(number: T) -> T {
    if number <= T::zero() {
        return T::zero();
    }
    let two = T::one() + T::one();
    let four = two + two;

    // Initial estimate: 2^(ceil(bits/2)), always at or above the root.
    let mut act_number = number;
    let mut square_root = T::one();
    while act_number >= two {
        square_root = square_root * two;
        act_number = act_number / four;
    }
    // Newton's iteration converges monotonically from above.
    loop {
        square_root = (square_root + number / square_root) / two;
        if square_root * square_root <= number {
            return square_root;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_sqrt_small_values() {
        let expected = [0u64, 1, 1, 1, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 3, 4];
        for (n, &root) in expected.iter().enumerate() {
            assert_eq!(int_sqrt(n as u64), root, "sqrt({n})");
        }
    }

    #[test]
    fn test_int_sqrt_perfect_squares() {
        for root in [1u64, 2, 10, 255, 65536, 1 << 20] {
            assert_eq!(int_sqrt(root * root), root);
            assert_eq!(int_sqrt(root * root - 1), root - 1);
            assert_eq!(int_sqrt(root * root + 1), root);
        }
    }

    #[test]
    fn test_int_sqrt_large_i64() {
        let n = (1i64 << 62) - 1;
        let root = int_sqrt(n);
        assert!(root * root <= n);
        assert!((root + 1) * (root + 1) > n);
    }

    #[test]
    fn test_int_sqrt_negative_is_zero() {
        assert_eq!(int_sqrt(-5i64), 0);
    }
}

//! Integer square root for the fixed-point layer.

use primitive_types::{U256, U512};

use super::{Ufixed, ONE_RAW};

/// Newton iterations are capped; convergence from the power-of-two seed
/// takes at most ~10 steps on a 512-bit operand.
const MAX_NEWTON_STEPS: usize = 64;

/// `⌊√(raw · 10^18)⌋`, so that the result is again `10^18`-scaled.
pub(crate) fn sqrt_fixed(value: Ufixed) -> Ufixed {
    let scaled = value.raw().full_mul(ONE_RAW);
    let root = isqrt(scaled);
    // √(2^256 · 10^18) < 2^287 would not fit, but the scaled operand is the
    // product of a 256-bit value with 10^18 < 2^60, so the root is < 2^158.
    Ufixed::from_raw(U256::try_from(root).unwrap_or(U256::MAX))
}

/// Floor square root of a 512-bit integer.
///
/// Starts from `2^⌈bits/2⌉ ≥ √n` and descends monotonically; the first
/// non-decreasing step is the floor.
fn isqrt(n: U512) -> U512 {
    if n.is_zero() {
        return U512::zero();
    }
    let mut x = U512::one() << ((n.bits() + 1) / 2);
    for _ in 0..MAX_NEWTON_STEPS {
        let next = (x + n / x) >> 1;
        if next >= x {
            break;
        }
        x = next;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isqrt_small_values() {
        for (n, expected) in [(0u64, 0u64), (1, 1), (2, 1), (3, 1), (4, 2), (8, 2), (9, 3)] {
            assert_eq!(isqrt(U512::from(n)), U512::from(expected));
        }
    }

    #[test]
    fn test_isqrt_large_value_is_floor() {
        // (2^130)^2 = 2^260; check both sides of the square
        let exact = U512::one() << 260;
        let root = U512::one() << 130;
        assert_eq!(isqrt(exact), root);
        assert_eq!(isqrt(exact - 1), root - 1);
        assert_eq!(isqrt(exact + 1), root);
    }

    #[test]
    fn test_sqrt_fixed_two() {
        // √2 = 1.414213562373095048…, floor at 18 decimals
        let root = sqrt_fixed(Ufixed::from_int(2));
        assert_eq!(
            root.raw(),
            primitive_types::U256::from(1_414_213_562_373_095_048u64)
        );
    }
}

//! 18-decimal fixed-point arithmetic on 256-bit integers.
//!
//! Every scalar in the crate is a fixed-point number with decimal scale
//! `10^18`: a raw integer `v` represents the real value `v / 10^18`.
//! [`Ufixed`] is the unsigned variant (σ, k, b, λ, f); [`Ifixed`] is the
//! signed variant (x, μ, derivatives), stored as sign + magnitude so that
//! division truncates toward zero for both signs.
//!
//! Products and quotients widen to 512 bits internally, so `a·b/10^18`
//! never wraps; a result that does not fit back into 256 bits is an
//! [`MathError::Overflow`]. All rounding is toward zero.

mod exp;
mod sqrt;

pub use exp::exp;

use std::cmp::Ordering;
use std::fmt;

use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};

use crate::errors::MathError;

/// Number of decimal places in the fixed-point representation.
pub const DECIMALS: u32 = 18;

/// Raw representation of 1.0 (`10^18`).
pub(crate) const ONE_RAW: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// `floor(a · b / denominator)` with a 512-bit intermediate product.
pub(crate) fn mul_div_raw(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivByZero);
    }
    let wide = a.full_mul(b) / U512::from(denominator);
    U256::try_from(wide).map_err(|_| MathError::Overflow)
}

/// Unsigned 18-decimal fixed-point number.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Ufixed(U256);

impl Ufixed {
    /// The value 0.
    pub const ZERO: Ufixed = Ufixed(U256([0, 0, 0, 0]));
    /// The value 1.0.
    pub const ONE: Ufixed = Ufixed(ONE_RAW);

    /// Wraps a raw `10^18`-scaled integer.
    pub const fn from_raw(raw: U256) -> Self {
        Ufixed(raw)
    }

    /// Converts a whole number (no fractional part).
    pub fn from_int(value: u64) -> Self {
        Ufixed(U256::from(value) * ONE_RAW)
    }

    /// The raw `10^18`-scaled integer.
    pub fn raw(self) -> U256 {
        self.0
    }

    /// Whether the value is exactly zero.
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition.
    pub fn checked_add(self, rhs: Ufixed) -> Result<Ufixed, MathError> {
        self.0
            .checked_add(rhs.0)
            .map(Ufixed)
            .ok_or(MathError::Overflow)
    }

    /// Checked subtraction; underflow below zero is an overflow error.
    pub fn checked_sub(self, rhs: Ufixed) -> Result<Ufixed, MathError> {
        self.0
            .checked_sub(rhs.0)
            .map(Ufixed)
            .ok_or(MathError::Overflow)
    }

    /// Subtraction clamped at zero.
    pub fn saturating_sub(self, rhs: Ufixed) -> Ufixed {
        Ufixed(self.0.saturating_sub(rhs.0))
    }

    /// `|self − rhs|`.
    pub fn abs_diff(self, rhs: Ufixed) -> Ufixed {
        if self.0 >= rhs.0 {
            Ufixed(self.0 - rhs.0)
        } else {
            Ufixed(rhs.0 - self.0)
        }
    }

    /// Fixed-point multiplication, `floor(a·b / 10^18)`.
    pub fn mul(self, rhs: Ufixed) -> Result<Ufixed, MathError> {
        mul_div_raw(self.0, rhs.0, ONE_RAW).map(Ufixed)
    }

    /// Fixed-point division, `floor(a·10^18 / b)`.
    pub fn div(self, rhs: Ufixed) -> Result<Ufixed, MathError> {
        mul_div_raw(self.0, ONE_RAW, rhs.0).map(Ufixed)
    }

    /// `floor(self · numerator / denominator)` in one widened step.
    pub fn mul_div(self, numerator: Ufixed, denominator: Ufixed) -> Result<Ufixed, MathError> {
        mul_div_raw(self.0, numerator.0, denominator.0).map(Ufixed)
    }

    /// Fixed-point square root, `⌊√(raw · 10^18)⌋`.
    pub fn sqrt(self) -> Ufixed {
        sqrt::sqrt_fixed(self)
    }

    /// The smaller of the two values.
    pub fn min(self, rhs: Ufixed) -> Ufixed {
        if self.0 <= rhs.0 {
            self
        } else {
            rhs
        }
    }

    /// The larger of the two values.
    pub fn max(self, rhs: Ufixed) -> Ufixed {
        if self.0 >= rhs.0 {
            self
        } else {
            rhs
        }
    }
}

impl fmt::Display for Ufixed {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / ONE_RAW;
        let frac = self.0 % ONE_RAW;
        if frac.is_zero() {
            return write!(out, "{whole}");
        }
        let digits = format!("{:0>18}", frac.to_string());
        write!(out, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

/// Signed 18-decimal fixed-point number, stored as sign + magnitude.
///
/// There is no negative zero: constructors normalize a zero magnitude to
/// the positive sign, so `Eq` and `Ord` behave as on the number line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ifixed {
    negative: bool,
    magnitude: U256,
}

impl Ifixed {
    /// The value 0.
    pub const ZERO: Ifixed = Ifixed {
        negative: false,
        magnitude: U256([0, 0, 0, 0]),
    };

    /// Builds a signed value from a sign flag and magnitude.
    pub fn new(negative: bool, magnitude: Ufixed) -> Self {
        Ifixed {
            negative: negative && !magnitude.is_zero(),
            magnitude: magnitude.raw(),
        }
    }

    /// Converts a signed whole number.
    pub fn from_int(value: i64) -> Self {
        Ifixed::new(value < 0, Ufixed::from_int(value.unsigned_abs()))
    }

    /// Whether the value is strictly negative.
    pub fn is_negative(self) -> bool {
        self.negative
    }

    /// Whether the value is exactly zero.
    pub fn is_zero(self) -> bool {
        self.magnitude.is_zero()
    }

    /// `|self|` as an unsigned value.
    pub fn abs(self) -> Ufixed {
        Ufixed(self.magnitude)
    }

    /// Sign flip.
    pub fn neg(self) -> Ifixed {
        Ifixed::new(!self.negative, self.abs())
    }

    /// Checked addition.
    pub fn checked_add(self, rhs: Ifixed) -> Result<Ifixed, MathError> {
        if self.negative == rhs.negative {
            let magnitude = self.abs().checked_add(rhs.abs())?;
            Ok(Ifixed::new(self.negative, magnitude))
        } else if self.magnitude >= rhs.magnitude {
            Ok(Ifixed::new(self.negative, self.abs().abs_diff(rhs.abs())))
        } else {
            Ok(Ifixed::new(rhs.negative, self.abs().abs_diff(rhs.abs())))
        }
    }

    /// Checked subtraction.
    pub fn checked_sub(self, rhs: Ifixed) -> Result<Ifixed, MathError> {
        self.checked_add(rhs.neg())
    }

    /// Fixed-point multiplication; truncates toward zero.
    pub fn mul(self, rhs: Ifixed) -> Result<Ifixed, MathError> {
        let magnitude = self.abs().mul(rhs.abs())?;
        Ok(Ifixed::new(self.negative != rhs.negative, magnitude))
    }

    /// Fixed-point division; truncates toward zero.
    pub fn div(self, rhs: Ifixed) -> Result<Ifixed, MathError> {
        let magnitude = self.abs().div(rhs.abs())?;
        Ok(Ifixed::new(self.negative != rhs.negative, magnitude))
    }
}

impl From<Ufixed> for Ifixed {
    fn from(value: Ufixed) -> Self {
        Ifixed {
            negative: false,
            magnitude: value.raw(),
        }
    }
}

impl PartialOrd for Ifixed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ifixed {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.magnitude.cmp(&other.magnitude),
            (true, true) => other.magnitude.cmp(&self.magnitude),
        }
    }
}

impl fmt::Display for Ifixed {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(out, "-")?;
        }
        write!(out, "{}", self.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(v: u128) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_mul_rounds_toward_zero() {
        let a = Ufixed::from_raw(raw(1_500_000_000_000_000_000)); // 1.5
        let b = Ufixed::from_raw(raw(333_333_333_333_333_333)); // ~1/3
        let product = a.mul(b).unwrap();
        assert_eq!(product.raw(), raw(499_999_999_999_999_999));
    }

    #[test]
    fn test_div_by_zero() {
        let err = Ufixed::ONE.div(Ufixed::ZERO).unwrap_err();
        assert_eq!(err, MathError::DivByZero);
    }

    #[test]
    fn test_mul_overflow() {
        let huge = Ufixed::from_raw(U256::MAX);
        assert_eq!(huge.mul(huge).unwrap_err(), MathError::Overflow);
    }

    #[test]
    fn test_mul_div_widens() {
        // (2^200 · 2^100) / 2^200 would wrap without the 512-bit product.
        let a = Ufixed::from_raw(U256::one() << 200);
        let b = Ufixed::from_raw(U256::one() << 100);
        let out = a.mul_div(b, a).unwrap();
        assert_eq!(out.raw(), U256::one() << 100);
    }

    #[test]
    fn test_sqrt_round_trip() {
        for v in [1u64, 2, 3, 7, 100, 1_000_000] {
            let x = Ufixed::from_int(v);
            let root = x.sqrt();
            let back = root.mul(root).unwrap();
            // floor sqrt: back ≤ x, short by at most ~2·root ulps
            assert!(back <= x);
            let gap = x.abs_diff(back).raw();
            let bound = root.raw() / ONE_RAW * 2 + U256::from(2u64);
            assert!(gap <= bound, "gap {gap} exceeds {bound} for input {v}");
        }
    }

    #[test]
    fn test_sqrt_exact_squares() {
        assert_eq!(Ufixed::from_int(4).sqrt(), Ufixed::from_int(2));
        assert_eq!(Ufixed::from_int(9).sqrt(), Ufixed::from_int(3));
        assert_eq!(Ufixed::ZERO.sqrt(), Ufixed::ZERO);
        assert_eq!(Ufixed::ONE.sqrt(), Ufixed::ONE);
    }

    #[test]
    fn test_signed_addition_signs() {
        let three = Ifixed::from_int(3);
        let minus_five = Ifixed::from_int(-5);
        let sum = three.checked_add(minus_five).unwrap();
        assert_eq!(sum, Ifixed::from_int(-2));
        let back = sum.checked_sub(minus_five).unwrap();
        assert_eq!(back, three);
    }

    #[test]
    fn test_signed_no_negative_zero() {
        let zero = Ifixed::new(true, Ufixed::ZERO);
        assert!(!zero.is_negative());
        assert_eq!(zero, Ifixed::ZERO);
        assert_eq!(Ifixed::from_int(2).checked_sub(Ifixed::from_int(2)).unwrap(), Ifixed::ZERO);
    }

    #[test]
    fn test_signed_ordering() {
        let values = [
            Ifixed::from_int(-3),
            Ifixed::from_int(-1),
            Ifixed::ZERO,
            Ifixed::from_int(2),
        ];
        for pair in values.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_signed_division_truncates_toward_zero() {
        let minus_seven = Ifixed::from_int(-7);
        let two = Ifixed::from_int(2);
        let q = minus_seven.div(two).unwrap();
        assert_eq!(q, Ifixed::new(true, Ufixed::from_raw(raw(3_500_000_000_000_000_000))));
        // -1/3 at 18 decimals truncates its magnitude
        let q2 = Ifixed::from_int(-1).div(Ifixed::from_int(3)).unwrap();
        assert_eq!(q2.abs().raw(), raw(333_333_333_333_333_333));
    }

    #[test]
    fn test_display() {
        assert_eq!(Ufixed::from_int(2).to_string(), "2");
        assert_eq!(
            Ufixed::from_raw(raw(1_500_000_000_000_000_000)).to_string(),
            "1.5"
        );
        assert_eq!(Ifixed::from_int(-3).to_string(), "-3");
        assert_eq!(Ufixed::from_raw(raw(1)).to_string(), "0.000000000000000001");
    }

    #[test]
    fn test_serde_round_trip() {
        let x = Ifixed::from_int(-42);
        let json = serde_json::to_string(&x).unwrap();
        let back: Ifixed = serde_json::from_str(&json).unwrap();
        assert_eq!(x, back);
    }
}

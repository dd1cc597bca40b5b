//! Deterministic natural exponential.
//!
//! `exp` is the one transcendental the Gaussian kernel needs, and it must
//! produce bit-identical results everywhere, so it is evaluated entirely in
//! integer arithmetic at an internal scale of `10^27` (nine guard digits
//! beyond the public 18-decimal scale):
//!
//! ```text
//! e^s = e^w · e^r      with |s| = w + r, w ∈ ℕ, r ∈ [0, 1)
//! ```
//!
//! `e^r` comes from a 24-term Taylor series; `e^w` from the binary
//! decomposition of `w` over precomputed `e^(2^i)` constants. Negative
//! arguments use the reciprocal. The guard digits keep the absolute error
//! within 10⁻¹² (in real units) for `|s| ≤ 20`, which is what the solver's
//! convergence tolerance is calibrated against.

use primitive_types::{U256, U512};

use super::{Ifixed, Ufixed, ONE_RAW};
use crate::errors::MathError;

/// Internal scale, `10^27`.
const Q: U256 = U256([11515845246265065472, 54210108, 0, 0]);
/// `10^18 · 10^27`, numerator for the reciprocal branch.
const PQ: U256 = U256([802379605485813760, 16178822382532126880, 2938735, 0]);
/// `10^9`, the guard factor between the two scales.
const GUARD: U256 = U256([1_000_000_000, 0, 0, 0]);
const HALF_GUARD: U256 = U256([500_000_000, 0, 0, 0]);

/// Inputs above +50.0 are rejected; e^50 is near the top of what the
/// 256-bit representation can hold with guard digits.
const MAX_INPUT: U256 = U256([13106511852580896768, 2, 0, 0]);
/// Inputs below −41.0 underflow to zero (e^−41 < 10⁻¹⁷).
const MIN_INPUT: U256 = U256([4106511852580896768, 2, 0, 0]);

const TAYLOR_TERMS: u64 = 24;

/// `e^(2^i) · 10^27`, highest power first.
const POWERS: [(u64, U256); 6] = [
    // e^32
    (32, U256([7087709879526243124, 946023696823713440, 232, 0])),
    // e^16
    (16, U256([11173805948133983114, 481717016564046, 0, 0])),
    // e^8
    (8, U256([17208940253949599357, 161598056281, 0, 0])),
    // e^4
    (4, U256([18100406386828636115, 2959771643, 0, 0])),
    // e^2
    (2, U256([13906887235182840133, 400561533, 0, 0])),
    // e^1
    (1, U256([3544695108858039023, 147358353, 0, 0])),
];

fn mul_q(a: U256, b: U256) -> Result<U256, MathError> {
    let wide = a.full_mul(b) / U512::from(Q);
    U256::try_from(wide).map_err(|_| MathError::Overflow)
}

/// Natural exponential of an 18-decimal fixed-point argument.
///
/// Domain: `[-41, +50]`. Below the domain the result is exactly zero;
/// above it the call fails with [`MathError::ExpInputTooLarge`].
pub fn exp(s: Ifixed) -> Result<Ufixed, MathError> {
    let magnitude = s.abs().raw();
    if s.is_negative() {
        if magnitude > MIN_INPUT {
            return Ok(Ufixed::ZERO);
        }
    } else if magnitude > MAX_INPUT {
        return Err(MathError::ExpInputTooLarge);
    }

    let whole = (magnitude / ONE_RAW).low_u64();
    let frac_q = (magnitude % ONE_RAW) * GUARD;

    // e^r, r ∈ [0, 1), by Taylor series at the guard scale
    let mut term = Q;
    let mut acc = Q;
    for i in 1..=TAYLOR_TERMS {
        term = mul_q(term, frac_q)? / U256::from(i);
        if term.is_zero() {
            break;
        }
        acc = acc + term;
    }

    // e^w by binary decomposition
    let mut result = acc;
    for (bit, factor) in POWERS {
        if whole & bit != 0 {
            result = mul_q(result, factor)?;
        }
    }

    let out = if s.is_negative() {
        (PQ + (result >> 1)) / result
    } else {
        (result + HALF_GUARD) / GUARD
    };
    Ok(Ufixed::from_raw(out))
}

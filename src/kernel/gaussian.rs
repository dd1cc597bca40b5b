//! Scaled-Gaussian evaluation.
//!
//! The market's consensus curve is `f(x) = λ(σ, k) · N(x; μ, σ)` where `N`
//! is the Gaussian density and `λ(σ, k) = k·√(2σ√π)` is chosen so that the
//! L2 norm of `f` over ℝ equals `k`. Alongside `f`, the solver needs the
//! first two derivatives and the boundary relation between `k`, `σ` and the
//! backing `b` that keeps the peak value `f(μ)` payable:
//!
//! ```text
//! σ_min(k, b) = k² / (b²√π)        k_max(σ, b) = b·√(σ√π)
//! ```

use primitive_types::{U256, U512};

use super::consts::{SQRT_2PI, SQRT_PI};
use crate::errors::MathError;
use crate::fixed::{exp, Ifixed, Ufixed, ONE_RAW};

/// L2 scaling factor `λ(σ, k) = k·√(2σ√π)`.
pub fn lambda(sigma: Ufixed, k: Ufixed) -> Result<Ufixed, MathError> {
    let inner = sigma.checked_add(sigma)?.mul(SQRT_PI)?;
    k.mul(inner.sqrt())
}

/// `z² > 82` (so `z²/2 > 41`) makes the exponential underflow to zero.
/// Compared on the 512-bit square so extreme `z` cannot overflow first.
fn exponent_underflows(z: Ufixed) -> bool {
    let cutoff = (U256::from(82u64) * ONE_RAW).full_mul(ONE_RAW);
    z.raw().full_mul(z.raw()) > cutoff
}

/// Scaled-Gaussian value `f(x; μ, σ, k)`. Non-negative by construction;
/// exactly zero once the tail exponent passes the underflow cutoff.
pub fn f(x: Ifixed, mu: Ifixed, sigma: Ufixed, k: Ufixed) -> Result<Ufixed, MathError> {
    let z = x.checked_sub(mu)?.abs().div(sigma)?;
    if exponent_underflows(z) {
        return Ok(Ufixed::ZERO);
    }
    let half_square = z.raw().full_mul(z.raw()) / (U512::from(ONE_RAW) << 1);
    let exponent = U256::try_from(half_square).map_err(|_| MathError::Overflow)?;
    let gauss = exp(Ifixed::new(true, Ufixed::from_raw(exponent)))?;
    let density = gauss.div(sigma.mul(SQRT_2PI)?)?;
    lambda(sigma, k)?.mul(density)
}

/// First derivative `f′(x) = −(x−μ)/σ² · f(x)`.
pub fn f_prime(x: Ifixed, mu: Ifixed, sigma: Ufixed, k: Ufixed) -> Result<Ifixed, MathError> {
    let value = f(x, mu, sigma, k)?;
    let diff = x.checked_sub(mu)?;
    let magnitude = diff.abs().div(sigma.mul(sigma)?)?.mul(value)?;
    Ok(Ifixed::new(!diff.is_negative(), magnitude))
}

/// Second derivative `f″(x) = ((x−μ)²/σ⁴ − 1/σ²) · f(x)`.
pub fn f_second(x: Ifixed, mu: Ifixed, sigma: Ufixed, k: Ufixed) -> Result<Ifixed, MathError> {
    let value = f(x, mu, sigma, k)?;
    let sigma_sq = sigma.mul(sigma)?;
    let diff = x.checked_sub(mu)?.abs();
    let quartic_term = diff.mul(diff)?.div(sigma_sq.mul(sigma_sq)?)?;
    let curvature = Ifixed::from(quartic_term)
        .checked_sub(Ifixed::from(Ufixed::ONE.div(sigma_sq)?))?;
    curvature.mul(Ifixed::from(value))
}

/// Smallest σ the backing can support: `σ_min = k² / (b²√π)`.
pub fn sigma_min(k: Ufixed, backing: Ufixed) -> Result<Ufixed, MathError> {
    k.mul(k)?.div(backing.mul(backing)?.mul(SQRT_PI)?)
}

/// Largest k the backing can support at a given σ: `k_max = b·√(σ√π)`.
pub fn k_max(sigma: Ufixed, backing: Ufixed) -> Result<Ufixed, MathError> {
    backing.mul(sigma.mul(SQRT_PI)?.sqrt())
}

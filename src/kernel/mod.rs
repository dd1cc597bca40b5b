//! Scaled-Gaussian kernel: the consensus curve and its derivatives.

mod consts;
mod gaussian;

pub use consts::{PI, SQRT_2, SQRT_2PI, SQRT_PI};
pub use gaussian::{f, f_prime, f_second, k_max, lambda, sigma_min};

use serde::{Deserialize, Serialize};

use crate::errors::MathError;
use crate::fixed::{Ifixed, Ufixed};

/// Parameters of one scaled Gaussian: mean, width and L2 mass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// Mean of the curve (signed).
    pub mu: Ifixed,
    /// Standard deviation, strictly positive for a usable curve.
    pub sigma: Ufixed,
    /// L2-norm constraint `k`.
    pub k: Ufixed,
}

impl Distribution {
    /// Bundles the three parameters.
    pub fn new(mu: Ifixed, sigma: Ufixed, k: Ufixed) -> Self {
        Distribution { mu, sigma, k }
    }

    /// `f(x)` for this curve.
    pub fn value_at(&self, x: Ifixed) -> Result<Ufixed, MathError> {
        f(x, self.mu, self.sigma, self.k)
    }

    /// `f′(x)` for this curve.
    pub fn slope_at(&self, x: Ifixed) -> Result<Ifixed, MathError> {
        f_prime(x, self.mu, self.sigma, self.k)
    }

    /// `f″(x)` for this curve.
    pub fn curvature_at(&self, x: Ifixed) -> Result<Ifixed, MathError> {
        f_second(x, self.mu, self.sigma, self.k)
    }

    /// The curve's scaling factor λ.
    pub fn lambda(&self) -> Result<Ufixed, MathError> {
        lambda(self.sigma, self.k)
    }

    /// The curve's maximum, `f(μ)`.
    pub fn peak(&self) -> Result<Ufixed, MathError> {
        self.value_at(self.mu)
    }
}

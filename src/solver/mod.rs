//! Maximum-loss search between two consensus curves.
//!
//! A trade moves the market curve from `D_from` to `D_to`; the trader's
//! collateral is the largest value `|g(x)|` of the difference
//! `g(x) = f(x; D_to) − f(x; D_from)` over the real line. The search runs
//! damped Newton on `g′`:
//!
//! ```text
//! x ← x − 0.875 · g′(x)/g″(x)
//! ```
//!
//! with two guards that pin it to the correct extremum. `g` has critical
//! points on both sides of `μ_to`; a naive Newton started near `μ_from`
//! oscillates or lands on the wrong one. The seed is therefore pushed to
//! `μ_to ± σ_to` on the side away from `μ_from`, and iterates are clamped
//! so they never cross `μ_to`. The 0.875 damping controls overshoot where
//! the curvature is small. Running out of iterations is not an error; the
//! best iterate so far is returned with `converged = false`.

mod collateral;

pub use collateral::required_collateral;

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::MathError;
use crate::fixed::{Ifixed, Ufixed};
use crate::kernel::Distribution;
use crate::logging::targets;

/// Newton damping factor, 0.875.
const DAMPING: Ufixed = Ufixed::from_raw(U256([875_000_000_000_000_000, 0, 0, 0]));

/// Curvatures below 10⁻¹⁰ abort the step; the quotient would be garbage.
const CURVATURE_FLOOR: Ufixed = Ufixed::from_raw(U256([100_000_000, 0, 0, 0]));

/// Iteration budget and convergence tolerance for the Newton search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverParams {
    /// Maximum Newton iterations before returning the best iterate.
    pub max_iter: u32,
    /// Convergence tolerance on `|g′(x)|` and on the step size.
    pub tol: Ufixed,
}

impl Default for SolverParams {
    fn default() -> Self {
        SolverParams {
            max_iter: 50,
            // 10⁻⁶
            tol: Ufixed::from_raw(U256([1_000_000_000_000, 0, 0, 0])),
        }
    }
}

/// Result of the maximum-loss search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxLoss {
    /// `max_x |f(x; D_to) − f(x; D_from)|`.
    pub loss: Ufixed,
    /// The argmax.
    pub x_star: Ifixed,
    /// Newton iterations spent.
    pub iterations: u32,
    /// Whether the tolerance was met within the iteration budget.
    pub converged: bool,
}

/// Finds the point maximizing `|f(x; to) − f(x; from)|` and the maximum.
///
/// Both curves are expected to carry the same `k`; the caller constructs
/// them that way. Only arithmetic failures are errors.
pub fn find_max_loss(
    from: &Distribution,
    to: &Distribution,
    hint: Ifixed,
    params: &SolverParams,
) -> Result<MaxLoss, MathError> {
    let mut x = hint;
    if from.mu < to.mu && x <= to.mu {
        x = to.mu.checked_add(Ifixed::from(to.sigma))?;
    } else if from.mu > to.mu && x >= to.mu {
        x = to.mu.checked_sub(Ifixed::from(to.sigma))?;
    }

    let mut iterations = 0;
    let mut converged = false;
    while iterations < params.max_iter {
        iterations += 1;
        let slope = to.slope_at(x)?.checked_sub(from.slope_at(x)?)?;
        if slope.abs() < params.tol {
            converged = true;
            break;
        }
        let curvature = to.curvature_at(x)?.checked_sub(from.curvature_at(x)?)?;
        if curvature.abs() < CURVATURE_FLOOR {
            break;
        }
        let step = slope.div(curvature)?.mul(Ifixed::from(DAMPING))?;
        let mut next = x.checked_sub(step)?;
        if from.mu < to.mu && next < to.mu {
            next = to.mu;
        } else if from.mu > to.mu && next > to.mu {
            next = to.mu;
        }
        let moved = next.checked_sub(x)?.abs();
        x = next;
        if moved < params.tol {
            converged = true;
            break;
        }
        debug!(
            target: targets::SOLVER,
            iteration = iterations,
            x = %x,
            slope = %slope,
            "newton step"
        );
    }

    let loss = to.value_at(x)?.abs_diff(from.value_at(x)?);
    debug!(
        target: targets::SOLVER,
        iterations,
        converged,
        x_star = %x,
        loss = %loss,
        "max-loss search finished"
    );
    Ok(MaxLoss {
        loss,
        x_star: x,
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(raw: u128) -> Ufixed {
        Ufixed::from_raw(U256::from(raw))
    }

    fn sp(raw: i128) -> Ifixed {
        Ifixed::new(raw < 0, fp(raw.unsigned_abs()))
    }

    fn assert_close(got: Ufixed, expected: Ufixed) {
        let gap = got.abs_diff(expected);
        assert!(
            gap.raw() * U256::from(1_000u64) <= expected.raw(),
            "got {got}, expected {expected}"
        );
    }

    fn params() -> SolverParams {
        SolverParams {
            max_iter: 20,
            tol: fp(1_000_000_000_000),
        }
    }

    #[test]
    fn test_upward_move_reference() {
        // (μ 1.5, σ 0.45) → (μ 1.9, σ 0.4), k = 2, hint 2.0
        let from = Distribution::new(sp(1_500_000_000_000_000_000), fp(450_000_000_000_000_000), fp(2_000_000_000_000_000_000));
        let to = Distribution::new(sp(1_900_000_000_000_000_000), fp(400_000_000_000_000_000), fp(2_000_000_000_000_000_000));
        let out = find_max_loss(&from, &to, sp(2_000_000_000_000_000_000), &params()).unwrap();
        assert!(out.converged);
        assert_close(out.loss, fp(1_175_948_000_000_000_000));
        assert_close(out.x_star.abs(), fp(2_108_129_000_000_000_000));
        assert!(!out.x_star.is_negative());
        // the argmax is a critical point of the difference; the step-size
        // stopping rule can leave the slope a hair over tol
        let residual = to
            .slope_at(out.x_star)
            .unwrap()
            .checked_sub(from.slope_at(out.x_star).unwrap())
            .unwrap();
        let slack = params().tol.checked_add(params().tol).unwrap();
        assert!(residual.abs() < slack);
    }

    #[test]
    fn test_downward_move_reference() {
        // (μ 3.2, σ 0.76) → (μ 1.8, σ 0.55), k = 2.7, hint 1.7
        let from = Distribution::new(sp(3_200_000_000_000_000_000), fp(760_000_000_000_000_000), fp(2_700_000_000_000_000_000));
        let to = Distribution::new(sp(1_800_000_000_000_000_000), fp(550_000_000_000_000_000), fp(2_700_000_000_000_000_000));
        let out = find_max_loss(&from, &to, sp(1_700_000_000_000_000_000), &params()).unwrap();
        assert!(out.converged);
        assert_close(out.loss, fp(2_358_084_000_000_000_000));
        assert_close(out.x_star.abs(), fp(1_702_695_000_000_000_000));
    }

    #[test]
    fn test_seed_pushed_past_target_mean() {
        // hint on the wrong side of μ_to still converges to the far lobe
        let from = Distribution::new(sp(1_500_000_000_000_000_000), fp(450_000_000_000_000_000), fp(2_000_000_000_000_000_000));
        let to = Distribution::new(sp(1_900_000_000_000_000_000), fp(400_000_000_000_000_000), fp(2_000_000_000_000_000_000));
        let out = find_max_loss(&from, &to, sp(1_500_000_000_000_000_000), &params()).unwrap();
        assert_close(out.loss, fp(1_175_948_000_000_000_000));
        assert!(out.x_star > to.mu);
    }

    #[test]
    fn test_equal_means_terminates_at_target_mean() {
        // only σ changes: g′(μ) = 0 by symmetry, so the search stops at μ
        // with the positive peak difference
        let from = Distribution::new(sp(1_000_000_000_000_000_000), fp(500_000_000_000_000_000), fp(2_000_000_000_000_000_000));
        let to = Distribution::new(sp(1_000_000_000_000_000_000), fp(250_000_000_000_000_000), fp(2_000_000_000_000_000_000));
        let out = find_max_loss(&from, &to, to.mu, &params()).unwrap();
        assert!(out.converged);
        assert_eq!(out.x_star, to.mu);
        let expected = to
            .peak()
            .unwrap()
            .abs_diff(from.value_at(to.mu).unwrap());
        assert_eq!(out.loss, expected);
        assert!(!out.loss.is_zero());
    }

    #[test]
    fn test_identical_curves_cost_nothing() {
        let d = Distribution::new(sp(1_000_000_000_000_000_000), fp(500_000_000_000_000_000), fp(2_000_000_000_000_000_000));
        let out = find_max_loss(&d, &d, sp(3_000_000_000_000_000_000), &params()).unwrap();
        assert_eq!(out.loss, Ufixed::ZERO);
    }

    #[test]
    fn test_iteration_budget_is_not_an_error() {
        let from = Distribution::new(sp(1_500_000_000_000_000_000), fp(450_000_000_000_000_000), fp(2_000_000_000_000_000_000));
        let to = Distribution::new(sp(1_900_000_000_000_000_000), fp(400_000_000_000_000_000), fp(2_000_000_000_000_000_000));
        let tight = SolverParams {
            max_iter: 2,
            tol: fp(1),
        };
        let out = find_max_loss(&from, &to, sp(2_000_000_000_000_000_000), &tight).unwrap();
        assert!(!out.converged);
        assert_eq!(out.iterations, 2);
    }
}

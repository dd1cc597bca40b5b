//! Collateral pricing for a proposed market move.

use crate::errors::MathError;
use crate::fixed::{Ifixed, Ufixed};
use crate::kernel::Distribution;

use super::{find_max_loss, SolverParams};

/// Prices the collateral for moving the curve from `(μ_from, σ_from)` to
/// `(μ_to, σ_to)` at mass `k`: the worst-case payout differential over all
/// settlement points.
///
/// A zero `hint` is the "no hint" sentinel and is promoted to `μ_to`. The
/// result is zero exactly when the two curves coincide.
pub fn required_collateral(
    mu_from: Ifixed,
    sigma_from: Ufixed,
    mu_to: Ifixed,
    sigma_to: Ufixed,
    k: Ufixed,
    hint: Ifixed,
) -> Result<Ufixed, MathError> {
    let hint = if hint.is_zero() { mu_to } else { hint };
    let from = Distribution::new(mu_from, sigma_from, k);
    let to = Distribution::new(mu_to, sigma_to, k);
    let search = find_max_loss(&from, &to, hint, &SolverParams::default())?;
    Ok(search.loss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;

    fn fp(raw: u128) -> Ufixed {
        Ufixed::from_raw(U256::from(raw))
    }

    fn sp(raw: i128) -> Ifixed {
        Ifixed::new(raw < 0, fp(raw.unsigned_abs()))
    }

    #[test]
    fn test_zero_hint_promotes_to_target_mean() {
        let priced = required_collateral(
            sp(1_500_000_000_000_000_000),
            fp(450_000_000_000_000_000),
            sp(1_900_000_000_000_000_000),
            fp(400_000_000_000_000_000),
            fp(2_000_000_000_000_000_000),
            Ifixed::ZERO,
        )
        .unwrap();
        let expected = fp(1_175_948_000_000_000_000);
        let gap = priced.abs_diff(expected);
        assert!(gap.raw() * U256::from(1_000u64) <= expected.raw());
    }

    #[test]
    fn test_no_move_is_free() {
        let priced = required_collateral(
            sp(1_000_000_000_000_000_000),
            fp(500_000_000_000_000_000),
            sp(1_000_000_000_000_000_000),
            fp(500_000_000_000_000_000),
            fp(2_000_000_000_000_000_000),
            sp(7_000_000_000_000_000_000),
        )
        .unwrap();
        assert_eq!(priced, Ufixed::ZERO);
    }

    #[test]
    fn test_bigger_move_costs_more() {
        let small = required_collateral(
            Ifixed::ZERO,
            Ufixed::ONE,
            sp(500_000_000_000_000_000),
            Ufixed::ONE,
            fp(2_000_000_000_000_000_000),
            Ifixed::ZERO,
        )
        .unwrap();
        let large = required_collateral(
            Ifixed::ZERO,
            Ufixed::ONE,
            sp(2_000_000_000_000_000_000),
            Ufixed::ONE,
            fp(2_000_000_000_000_000_000),
            Ifixed::ZERO,
        )
        .unwrap();
        assert!(large > small);
        assert!(!small.is_zero());
    }
}

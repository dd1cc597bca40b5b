//! Positions: claims on the market redeemable at settlement.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::MathError;
use crate::fixed::{Ifixed, Ufixed};
use crate::kernel::Distribution;

/// Opaque per-market position identifier.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PositionId(pub u64);

impl fmt::Display for PositionId {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(out, "#{}", self.0)
    }
}

/// A claim on the market.
///
/// LPs own a curve outright and redeem its value at the outcome. Traders
/// own the difference between the curve they installed and the one they
/// replaced, plus their posted collateral back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Position {
    /// Liquidity provision: a curve backed by posted capital.
    Lp {
        /// The curve this capital backs. For liquidity added after
        /// initialization, `shape.k` is the k increment the deposit bought.
        shape: Distribution,
        /// Capital posted.
        collateral: Ufixed,
    },
    /// A market move from `prev_shape` to `shape` at shared mass `k`.
    Trader {
        /// The curve installed by the trade.
        shape: Distribution,
        /// The curve it replaced.
        prev_shape: Distribution,
        /// Worst-case loss escrowed at trade time.
        collateral: Ufixed,
    },
}

impl Position {
    /// Capital escrowed with this position.
    pub fn collateral(&self) -> Ufixed {
        match self {
            Position::Lp { collateral, .. } => *collateral,
            Position::Trader { collateral, .. } => *collateral,
        }
    }

    /// Settlement payout at outcome `x`.
    pub fn payout_at(&self, x: Ifixed) -> Result<Ufixed, MathError> {
        match self {
            Position::Lp { shape, .. } => shape.value_at(x),
            Position::Trader {
                shape,
                prev_shape,
                collateral,
            } => shape
                .value_at(x)?
                .abs_diff(prev_shape.value_at(x)?)
                .checked_add(*collateral),
        }
    }
}

/// A position together with its owner and claim status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Opaque identity of the holder; never inspected by the kernel.
    pub owner: super::Holder,
    /// The claim itself.
    pub position: Position,
    /// Set once the position has been claimed; claims are one-shot.
    pub settled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;

    fn fp(raw: u128) -> Ufixed {
        Ufixed::from_raw(U256::from(raw))
    }

    #[test]
    fn test_lp_payout_is_curve_value() {
        let shape = Distribution::new(Ifixed::from_int(10), Ufixed::from_int(2), Ufixed::from_int(5));
        let position = Position::Lp {
            shape,
            collateral: Ufixed::from_int(50),
        };
        let x = Ifixed::from_int(11);
        assert_eq!(
            position.payout_at(x).unwrap(),
            shape.value_at(x).unwrap()
        );
    }

    #[test]
    fn test_trader_payout_adds_collateral_back() {
        let prev = Distribution::new(Ifixed::from_int(10), Ufixed::from_int(2), Ufixed::from_int(5));
        let shape = Distribution::new(Ifixed::from_int(12), Ufixed::from_int(2), Ufixed::from_int(5));
        let collateral = fp(1_250_000_000_000_000_000);
        let position = Position::Trader {
            shape,
            prev_shape: prev,
            collateral,
        };
        let x = Ifixed::from_int(13);
        let expected = shape
            .value_at(x)
            .unwrap()
            .abs_diff(prev.value_at(x).unwrap())
            .checked_add(collateral)
            .unwrap();
        assert_eq!(position.payout_at(x).unwrap(), expected);
        // far in the tail both curves vanish and only collateral remains
        let far = Ifixed::from_int(1000);
        assert_eq!(position.payout_at(far).unwrap(), collateral);
    }
}

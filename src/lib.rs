//! Distribution prediction market core.
//!
//! A distribution market lets traders and liquidity providers express
//! beliefs about where a continuous outcome will settle, not which discrete
//! outcome will occur. The market's state is a scaled Gaussian curve
//! `f(x) = λ(σ, k)·N(x; μ, σ)` whose L2 norm is pinned to `k`; trading
//! means moving `(μ, σ)`, and every participant is paid the value of the
//! curve they own at the realized outcome.
//!
//! # Layers
//!
//! - [`fixed`]: deterministic 18-decimal fixed-point arithmetic on 256-bit
//!   integers, including `exp` and `sqrt`. Everything above is bit-identical
//!   across platforms because everything below is integer math.
//! - [`kernel`]: the scaled-Gaussian curve (`λ`, `f`, `f′`, `f″`) and the
//!   `σ_min`/`k_max` backing constraint.
//! - [`solver`]: damped-Newton search for the worst-case payout
//!   differential between two curves, which prices trade collateral.
//! - [`market`]: the state machine (initialize, trade, settle, claim)
//!   holding positions and LP shares.
//! - [`codec`]: 256-bit word adapters for host IO.
//!
//! # Example
//!
//! ```
//! use distribution_market::{Holder, Ifixed, Market, MarketMetadata, Ufixed};
//!
//! let lp = Holder::from_low_u64_be(1);
//! let oracle = Holder::from_low_u64_be(2);
//! let trader = Holder::from_low_u64_be(3);
//!
//! let mut market = Market::new(MarketMetadata::default());
//! market
//!     .initialize(
//!         lp,
//!         oracle,
//!         Ifixed::from_int(100), // μ
//!         Ufixed::from_int(10),  // σ
//!         Ufixed::from_int(100), // k
//!         Ufixed::from_int(50),  // backing
//!     )
//!     .unwrap();
//!
//! let receipt = market
//!     .trade(trader, Ifixed::from_int(105), Ufixed::from_int(8), Ufixed::from_int(50))
//!     .unwrap();
//!
//! market.settle(oracle, Ifixed::from_int(104)).unwrap();
//! let payout = market.claim(trader, receipt.position_id).unwrap();
//! assert!(payout >= receipt.collateral);
//! ```
//!
//! The core is pure and embeddable: no IO, no global state, no
//! configuration surface. Hosts serialize writers externally and install
//! their own `tracing` subscriber (see [`logging`]).

#![deny(unreachable_pub)]
#![warn(missing_docs)]

pub mod codec;
pub mod errors;
pub mod fixed;
pub mod kernel;
pub mod logging;
pub mod market;
pub mod solver;

pub use errors::{CodecError, MarketError, MathError};
pub use fixed::{exp, Ifixed, Ufixed};
pub use kernel::{f, f_prime, f_second, k_max, lambda, sigma_min, Distribution};
pub use market::{
    Holder, LiquidityReceipt, Market, MarketMetadata, Position, PositionId, PositionRecord,
    TradeReceipt,
};
pub use solver::{find_max_loss, required_collateral, MaxLoss, SolverParams};

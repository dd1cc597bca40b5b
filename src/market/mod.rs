//! Market state machine: initialize → trade* → settle → claim.
//!
//! The market is an owned value with three phases. While open, traders
//! reshape the consensus curve against priced collateral and LPs scale the
//! curve's mass by adding backing. Settlement freezes the outcome `x_final`;
//! afterwards positions redeem one-shot payouts and LP shares claim the
//! residual backing pro rata.
//!
//! The struct holds no locks and performs no IO; a host that mutates it
//! from several writers must serialize them externally. Every entry point
//! is atomic: validation and pricing happen before the first field is
//! touched, so an `Err` leaves the state exactly as it was.

mod position;

pub use position::{Position, PositionId, PositionRecord};

use std::collections::BTreeMap;

use primitive_types::H160;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::MarketError;
use crate::fixed::{Ifixed, Ufixed};
use crate::kernel::{sigma_min, Distribution};
use crate::logging::targets;
use crate::solver::required_collateral;

/// Opaque 20-byte holder identity. The kernel never inspects it.
pub type Holder = H160;

/// Lifecycle phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Phase {
    #[default]
    Uninitialized,
    Open,
    Settled,
}

/// Human-readable market description, stored verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketMetadata {
    /// Short market title.
    pub title: String,
    /// What the market is about.
    pub description: String,
    /// How the outcome will be determined.
    pub resolution_criteria: String,
}

/// Receipt for an accepted trade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReceipt {
    /// The trader position that was opened.
    pub position_id: PositionId,
    /// Collateral actually escrowed (the priced worst-case loss).
    pub collateral: Ufixed,
}

/// Receipt for a liquidity deposit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityReceipt {
    /// The LP position that was opened.
    pub position_id: PositionId,
    /// LP shares minted to the depositor.
    pub shares_minted: Ufixed,
    /// The k increment the deposit bought.
    pub k_delta: Ufixed,
}

/// A distribution prediction market.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    phase: Phase,
    metadata: MarketMetadata,
    oracle: Holder,
    mu: Ifixed,
    sigma: Ufixed,
    k: Ufixed,
    backing: Ufixed,
    x_final: Option<Ifixed>,
    positions: BTreeMap<PositionId, PositionRecord>,
    next_position_id: u64,
    shares: BTreeMap<Holder, Ufixed>,
    total_shares: Ufixed,
}

impl Market {
    /// Creates an uninitialized market shell.
    pub fn new(metadata: MarketMetadata) -> Self {
        Market {
            phase: Phase::Uninitialized,
            metadata,
            oracle: Holder::zero(),
            mu: Ifixed::ZERO,
            sigma: Ufixed::ZERO,
            k: Ufixed::ZERO,
            backing: Ufixed::ZERO,
            x_final: None,
            positions: BTreeMap::new(),
            next_position_id: 0,
            shares: BTreeMap::new(),
            total_shares: Ufixed::ZERO,
        }
    }

    fn ensure_open(&self) -> Result<(), MarketError> {
        match self.phase {
            Phase::Open => Ok(()),
            Phase::Uninitialized => Err(MarketError::MarketNotInitialized),
            Phase::Settled => Err(MarketError::MarketAlreadySettled),
        }
    }

    fn ensure_settled(&self) -> Result<Ifixed, MarketError> {
        match self.phase {
            Phase::Settled => Ok(self.x_final.unwrap_or(Ifixed::ZERO)),
            Phase::Uninitialized => Err(MarketError::MarketNotInitialized),
            Phase::Open => Err(MarketError::MarketNotSettled),
        }
    }

    fn check_sigma_floor(&self, sigma: Ufixed) -> Result<(), MarketError> {
        let minimum = sigma_min(self.k, self.backing)?;
        if sigma < minimum {
            return Err(MarketError::SigmaBelowMinimum { sigma, minimum });
        }
        Ok(())
    }

    fn insert_position(&mut self, owner: Holder, position: Position) -> PositionId {
        let id = PositionId(self.next_position_id);
        self.next_position_id += 1;
        self.positions.insert(
            id,
            PositionRecord {
                owner,
                position,
                settled: false,
            },
        );
        id
    }

    /// Opens the market with an initial curve and backing.
    ///
    /// Requires `σ ≥ σ_min(k, b)`. The caller becomes the first LP: it
    /// receives a position owning the initial curve and `b` LP shares.
    /// `oracle` is the only identity later allowed to settle.
    pub fn initialize(
        &mut self,
        caller: Holder,
        oracle: Holder,
        mu: Ifixed,
        sigma: Ufixed,
        k: Ufixed,
        backing: Ufixed,
    ) -> Result<PositionId, MarketError> {
        if self.phase != Phase::Uninitialized {
            return Err(MarketError::MarketAlreadyInitialized);
        }
        for (name, value) in [("sigma", sigma), ("k", k), ("backing", backing)] {
            if value.is_zero() {
                return Err(MarketError::NonPositiveParameter { name });
            }
        }
        let minimum = sigma_min(k, backing)?;
        if sigma < minimum {
            return Err(MarketError::SigmaBelowMinimum { sigma, minimum });
        }

        self.phase = Phase::Open;
        self.oracle = oracle;
        self.mu = mu;
        self.sigma = sigma;
        self.k = k;
        self.backing = backing;
        let id = self.insert_position(
            caller,
            Position::Lp {
                shape: Distribution::new(mu, sigma, k),
                collateral: backing,
            },
        );
        self.shares.insert(caller, backing);
        self.total_shares = backing;
        info!(
            target: targets::MARKET,
            mu = %mu,
            sigma = %sigma,
            k = %k,
            backing = %backing,
            "market initialized"
        );
        Ok(id)
    }

    /// Reshapes the consensus curve to `(μ′, σ′)` against priced collateral.
    ///
    /// The required collateral is the worst-case payout differential between
    /// the new curve and the current one; the trade is rejected if it
    /// exceeds `max_collateral`.
    pub fn trade(
        &mut self,
        caller: Holder,
        mu: Ifixed,
        sigma: Ufixed,
        max_collateral: Ufixed,
    ) -> Result<TradeReceipt, MarketError> {
        self.ensure_open()?;
        self.check_sigma_floor(sigma)?;
        let collateral =
            required_collateral(self.mu, self.sigma, mu, sigma, self.k, mu)?;
        if collateral > max_collateral {
            return Err(MarketError::InsufficientCollateral {
                required: collateral,
                limit: max_collateral,
            });
        }

        let prev_shape = Distribution::new(self.mu, self.sigma, self.k);
        let shape = Distribution::new(mu, sigma, self.k);
        let id = self.insert_position(
            caller,
            Position::Trader {
                shape,
                prev_shape,
                collateral,
            },
        );
        self.mu = mu;
        self.sigma = sigma;
        info!(
            target: targets::MARKET,
            position = %id,
            mu = %mu,
            sigma = %sigma,
            collateral = %collateral,
            "trade accepted"
        );
        Ok(TradeReceipt {
            position_id: id,
            collateral,
        })
    }

    /// Deposits `amount` of additional backing.
    ///
    /// Scales the curve's mass proportionally, `k′ = k·(b+Δb)/b`, mints
    /// shares pro rata, and opens an LP position owning the k increment at
    /// the current curve. The σ floor is unchanged by construction since
    /// `k` and `b` scale together.
    pub fn add_liquidity(
        &mut self,
        caller: Holder,
        amount: Ufixed,
    ) -> Result<LiquidityReceipt, MarketError> {
        self.ensure_open()?;
        if amount.is_zero() {
            return Err(MarketError::NonPositiveParameter { name: "amount" });
        }
        let new_backing = self.backing.checked_add(amount)?;
        let new_k = self.k.mul_div(new_backing, self.backing)?;
        let shares_minted = self.total_shares.mul_div(amount, self.backing)?;
        let k_delta = new_k.saturating_sub(self.k);
        let new_balance = self.shares_of(caller).checked_add(shares_minted)?;
        let new_total = self.total_shares.checked_add(shares_minted)?;

        // every fallible step is done; commit
        let id = self.insert_position(
            caller,
            Position::Lp {
                shape: Distribution::new(self.mu, self.sigma, k_delta),
                collateral: amount,
            },
        );
        self.backing = new_backing;
        self.k = new_k;
        self.shares.insert(caller, new_balance);
        self.total_shares = new_total;
        info!(
            target: targets::MARKET,
            position = %id,
            amount = %amount,
            k = %new_k,
            backing = %new_backing,
            "liquidity added"
        );
        Ok(LiquidityReceipt {
            position_id: id,
            shares_minted,
            k_delta,
        })
    }

    /// Freezes the outcome. Only the oracle named at initialization may call.
    pub fn settle(&mut self, caller: Holder, x_final: Ifixed) -> Result<(), MarketError> {
        self.ensure_open()?;
        if caller != self.oracle {
            return Err(MarketError::NotOracle);
        }
        self.phase = Phase::Settled;
        self.x_final = Some(x_final);
        info!(target: targets::MARKET, x_final = %x_final, "market settled");
        Ok(())
    }

    /// Redeems a position at the frozen outcome. One-shot per position.
    ///
    /// Returns the payout owed to the caller; moving actual funds is the
    /// host's concern.
    pub fn claim(&mut self, caller: Holder, id: PositionId) -> Result<Ufixed, MarketError> {
        let x_final = self.ensure_settled()?;
        let record = self
            .positions
            .get_mut(&id)
            .ok_or(MarketError::PositionNotFound)?;
        if record.owner != caller {
            return Err(MarketError::NotPositionOwner);
        }
        if record.settled {
            return Err(MarketError::PositionAlreadySettled);
        }
        let payout = record.position.payout_at(x_final)?;
        record.settled = true;
        info!(target: targets::MARKET, position = %id, payout = %payout, "position claimed");
        Ok(payout)
    }

    /// Burns the caller's LP shares against the residual backing.
    ///
    /// The residual is `max(0, b − f(x_final))`, the backing the final
    /// curve does not pay out, split pro rata by share count.
    pub fn claim_lp_shares(&mut self, caller: Holder) -> Result<Ufixed, MarketError> {
        let x_final = self.ensure_settled()?;
        let balance = match self.shares.get(&caller) {
            Some(balance) if !balance.is_zero() => *balance,
            _ => return Ok(Ufixed::ZERO),
        };
        let final_value = Distribution::new(self.mu, self.sigma, self.k).value_at(x_final)?;
        let residual = self.backing.saturating_sub(final_value);
        let payout = balance.mul_div(residual, self.total_shares)?;
        self.shares.remove(&caller);
        self.total_shares = self.total_shares.saturating_sub(balance);
        info!(
            target: targets::MARKET,
            shares = %balance,
            payout = %payout,
            "lp shares burned"
        );
        Ok(payout)
    }

    /// Current consensus curve value at `x`.
    pub fn consensus_at(&self, x: Ifixed) -> Result<Ufixed, MarketError> {
        if self.phase == Phase::Uninitialized {
            return Err(MarketError::MarketNotInitialized);
        }
        Ok(self.distribution().value_at(x)?)
    }

    /// The current consensus curve.
    pub fn distribution(&self) -> Distribution {
        Distribution::new(self.mu, self.sigma, self.k)
    }

    /// The curve's current maximum, `f(μ)`.
    pub fn peak(&self) -> Result<Ufixed, MarketError> {
        Ok(self.distribution().peak()?)
    }

    /// Total backing held by the market.
    pub fn backing(&self) -> Ufixed {
        self.backing
    }

    /// Frozen outcome, once settled.
    pub fn x_final(&self) -> Option<Ifixed> {
        self.x_final
    }

    /// Whether the market is accepting trades.
    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    /// Whether the market has settled.
    pub fn is_settled(&self) -> bool {
        self.phase == Phase::Settled
    }

    /// Market description.
    pub fn metadata(&self) -> &MarketMetadata {
        &self.metadata
    }

    /// Looks up a position.
    pub fn position(&self, id: PositionId) -> Option<&PositionRecord> {
        self.positions.get(&id)
    }

    /// All position ids owned by `holder`, in creation order.
    pub fn positions_of(&self, holder: Holder) -> Vec<PositionId> {
        self.positions
            .iter()
            .filter(|(_, record)| record.owner == holder)
            .map(|(id, _)| *id)
            .collect()
    }

    /// LP share balance of `holder`.
    pub fn shares_of(&self, holder: Holder) -> Ufixed {
        self.shares.get(&holder).copied().unwrap_or(Ufixed::ZERO)
    }

    /// Total LP shares outstanding.
    pub fn total_shares(&self) -> Ufixed {
        self.total_shares
    }
}

use thiserror::Error;

use crate::fixed::Ufixed;

/// Arithmetic failures in the fixed-point layer.
///
/// The kernel never masks these; they propagate unchanged through every
/// caller up to the market entry points.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Division with a zero denominator (σ = 0 inputs end up here).
    #[error("division by zero")]
    DivByZero,
    /// A product or quotient does not fit in 256 bits at the 18-decimal scale.
    #[error("arithmetic overflow")]
    Overflow,
    /// `exp` input above +50.0; the result would exceed the representable range.
    #[error("exp input too large")]
    ExpInputTooLarge,
}

/// Validation and phase errors raised by the market state machine.
///
/// Every variant is rejected atomically: no state change has happened when
/// one of these is returned. Arithmetic errors wrap via [`MathError`] and
/// indicate bad caller input rather than a recoverable condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// An underlying fixed-point operation failed.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Proposed σ violates the backing constraint σ ≥ k²/(b²√π).
    #[error("sigma {sigma} below minimum {minimum}")]
    SigmaBelowMinimum { sigma: Ufixed, minimum: Ufixed },

    /// `initialize` called twice.
    #[error("market already initialized")]
    MarketAlreadyInitialized,

    /// Operation requires an initialized market.
    #[error("market not initialized")]
    MarketNotInitialized,

    /// Operation requires the open phase but the market is settled.
    #[error("market already settled")]
    MarketAlreadySettled,

    /// Claims require a settled market.
    #[error("market not settled")]
    MarketNotSettled,

    /// Priced collateral exceeds the caller's stated maximum.
    #[error("required collateral {required} exceeds limit {limit}")]
    InsufficientCollateral { required: Ufixed, limit: Ufixed },

    /// Only the oracle named at initialization may settle.
    #[error("caller is not the settlement oracle")]
    NotOracle,

    /// No position with the given id.
    #[error("position not found")]
    PositionNotFound,

    /// Caller does not own the position it is claiming.
    #[error("caller is not the position owner")]
    NotPositionOwner,

    /// The position has already been claimed.
    #[error("position already settled")]
    PositionAlreadySettled,

    /// A quantity that must be strictly positive was zero.
    #[error("parameter {name} must be positive")]
    NonPositiveParameter { name: &'static str },
}

/// Failures in the ABI boundary adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The byte payload did not decode against the expected parameter types.
    #[error("abi decoding failed: {0}")]
    InvalidAbi(String),
    /// A decoded token had an unexpected type.
    #[error("unexpected token type")]
    UnexpectedToken,
}

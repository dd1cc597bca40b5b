//! Boundary adapters: 256-bit words in, 256-bit words out.
//!
//! Hosts exchange numbers with the core as 256-bit integers at the
//! 18-decimal scale: unsigned words for σ, k, b and values of `f`;
//! two's-complement words for x, μ and derivatives. This module maps the
//! crate's fixed-point types onto that contract and provides ABI codecs
//! for the common payloads.

use ethabi::{decode, encode, ParamType, Token};
use primitive_types::U256;

use crate::errors::CodecError;
use crate::fixed::{Ifixed, Ufixed};
use crate::kernel::Distribution;
use crate::market::Market;

/// Signed fixed-point → two's-complement 256-bit word.
pub fn to_twos_complement(value: Ifixed) -> U256 {
    let magnitude = value.abs().raw();
    if value.is_negative() {
        (!magnitude).overflowing_add(U256::one()).0
    } else {
        magnitude
    }
}

/// Two's-complement 256-bit word → signed fixed-point.
pub fn from_twos_complement(word: U256) -> Ifixed {
    if word.bit(255) {
        let magnitude = (!word).overflowing_add(U256::one()).0;
        Ifixed::new(true, Ufixed::from_raw(magnitude))
    } else {
        Ifixed::new(false, Ufixed::from_raw(word))
    }
}

fn uint_at(tokens: &[Token], index: usize) -> Result<Ufixed, CodecError> {
    tokens
        .get(index)
        .cloned()
        .and_then(Token::into_uint)
        .map(Ufixed::from_raw)
        .ok_or(CodecError::UnexpectedToken)
}

fn int_at(tokens: &[Token], index: usize) -> Result<Ifixed, CodecError> {
    tokens
        .get(index)
        .cloned()
        .and_then(Token::into_int)
        .map(from_twos_complement)
        .ok_or(CodecError::UnexpectedToken)
}

/// Encodes `(μ, σ, k)` as `(int256, uint256, uint256)`.
pub fn encode_distribution(distribution: &Distribution) -> Vec<u8> {
    encode(&[
        Token::Int(to_twos_complement(distribution.mu)),
        Token::Uint(distribution.sigma.raw()),
        Token::Uint(distribution.k.raw()),
    ])
}

/// Decodes `(int256, uint256, uint256)` into `(μ, σ, k)`.
pub fn decode_distribution(payload: &[u8]) -> Result<Distribution, CodecError> {
    let tokens = decode(
        &[ParamType::Int(256), ParamType::Uint(256), ParamType::Uint(256)],
        payload,
    )
    .map_err(|err| CodecError::InvalidAbi(err.to_string()))?;
    Ok(Distribution::new(
        int_at(&tokens, 0)?,
        uint_at(&tokens, 1)?,
        uint_at(&tokens, 2)?,
    ))
}

/// Decodes a trade request `(int256 μ′, uint256 σ′, uint256 max_collateral)`.
pub fn decode_trade_request(payload: &[u8]) -> Result<(Ifixed, Ufixed, Ufixed), CodecError> {
    let tokens = decode(
        &[ParamType::Int(256), ParamType::Uint(256), ParamType::Uint(256)],
        payload,
    )
    .map_err(|err| CodecError::InvalidAbi(err.to_string()))?;
    Ok((int_at(&tokens, 0)?, uint_at(&tokens, 1)?, uint_at(&tokens, 2)?))
}

/// Encodes the observable market state:
/// `(int256 μ, uint256 σ, uint256 k, uint256 b, uint256 totalShares, uint256 peak)`.
///
/// The peak is the current `f(μ)`; an uninitialized market encodes zeros.
pub fn encode_market_state(market: &Market) -> Vec<u8> {
    let curve = market.distribution();
    let peak = market.peak().unwrap_or(Ufixed::ZERO);
    encode(&[
        Token::Int(to_twos_complement(curve.mu)),
        Token::Uint(curve.sigma.raw()),
        Token::Uint(curve.k.raw()),
        Token::Uint(market.backing().raw()),
        Token::Uint(market.total_shares().raw()),
        Token::Uint(peak.raw()),
    ])
}

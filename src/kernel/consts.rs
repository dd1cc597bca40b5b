//! Mathematical constants, precomputed to the full 18-decimal precision.

use primitive_types::U256;

use crate::fixed::Ufixed;

/// π
pub const PI: Ufixed = Ufixed::from_raw(U256([3_141_592_653_589_793_238, 0, 0, 0]));

/// √π
pub const SQRT_PI: Ufixed = Ufixed::from_raw(U256([1_772_453_850_905_516_027, 0, 0, 0]));

/// √2
pub const SQRT_2: Ufixed = Ufixed::from_raw(U256([1_414_213_562_373_095_048, 0, 0, 0]));

/// √(2π)
pub const SQRT_2PI: Ufixed = Ufixed::from_raw(U256([2_506_628_274_631_000_502, 0, 0, 0]));

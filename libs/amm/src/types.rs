//! Data model shared by every quote path
//!
//! Everything here is an immutable snapshot constructed by the caller per
//! request. Amounts are native token units unless a field says otherwise.

use crate::fixed_point::pow10;
use curve_config::protocol::{FEE_DENOMINATOR, WORKING_DECIMALS};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

/// Reserves of the pool oriented along the trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReserves {
    pub reserve_in: BigUint,
    pub reserve_out: BigUint,
}

impl PoolReserves {
    pub fn new(reserve_in: impl Into<BigUint>, reserve_out: impl Into<BigUint>) -> Self {
        Self {
            reserve_in: reserve_in.into(),
            reserve_out: reserve_out.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reserve_in.is_zero() || self.reserve_out.is_zero()
    }

    /// Same reserves viewed from the opposite trade direction
    pub fn flipped(&self) -> Self {
        Self {
            reserve_in: self.reserve_out.clone(),
            reserve_out: self.reserve_in.clone(),
        }
    }
}

/// Power-of-ten scale from a token's native decimals to 18-decimal precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrecisionMultiplier {
    exponent: u32,
}

impl PrecisionMultiplier {
    /// Multiplier of 1, for 18-decimal tokens
    pub const ONE: Self = Self { exponent: 0 };

    /// Multiplier for a token with `decimals` native decimals
    ///
    /// Returns `None` for tokens with more than 18 decimals, which cannot be
    /// normalized by multiplication.
    pub fn from_decimals(decimals: u8) -> Option<Self> {
        WORKING_DECIMALS.checked_sub(decimals).map(|gap| Self {
            exponent: u32::from(gap),
        })
    }

    /// Multiplier from its raw value, which must be a power of ten
    pub fn from_value(value: &BigUint) -> Option<Self> {
        if value.is_zero() {
            return None;
        }
        let ten = BigUint::from(10u32);
        let mut remaining = value.clone();
        let mut exponent = 0u32;
        while !remaining.is_one() {
            if !(&remaining % &ten).is_zero() {
                return None;
            }
            remaining /= &ten;
            exponent += 1;
        }
        Some(Self { exponent })
    }

    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    pub fn value(&self) -> BigUint {
        pow10(self.exponent)
    }

    /// `raw * multiplier`
    pub fn normalize(&self, raw: &BigUint) -> BigUint {
        raw * self.value()
    }
}

impl Default for PrecisionMultiplier {
    fn default() -> Self {
        Self::ONE
    }
}

/// StableSwap curve parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableCurveParams {
    /// Amplification coefficient; the configured default applies when unset
    pub amplification: Option<BigUint>,
}

impl StableCurveParams {
    pub fn with_amplification(a: impl Into<BigUint>) -> Self {
        Self {
            amplification: Some(a.into()),
        }
    }
}

/// Crypto-curve parameters as stored by the pool contract
///
/// `amplification` is the contract's `ANN` (already multiplied by
/// `N^N * A_MULTIPLIER`). Every field must be present and non-zero for the
/// pool to be priced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoCurveParams {
    pub amplification: Option<BigUint>,
    pub gamma: Option<BigUint>,
    pub invariant_last: Option<BigUint>,
    pub price_scale: Option<BigUint>,
    pub future_params_time: Option<u64>,
    pub total_supply: Option<BigUint>,
    pub virtual_price: Option<BigUint>,
}

/// Crypto-curve parameters with presence verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCryptoParams {
    pub amplification: BigUint,
    pub gamma: BigUint,
    pub invariant_last: BigUint,
    pub price_scale: BigUint,
    pub future_params_time: u64,
    pub total_supply: BigUint,
    pub virtual_price: BigUint,
}

impl CryptoCurveParams {
    /// All parameters present and non-zero, or `None`
    pub fn resolve(&self) -> Option<ResolvedCryptoParams> {
        fn non_zero(value: &Option<BigUint>) -> Option<BigUint> {
            value.as_ref().filter(|v| !v.is_zero()).cloned()
        }

        Some(ResolvedCryptoParams {
            amplification: non_zero(&self.amplification)?,
            gamma: non_zero(&self.gamma)?,
            invariant_last: non_zero(&self.invariant_last)?,
            price_scale: non_zero(&self.price_scale)?,
            future_params_time: self.future_params_time.filter(|t| *t != 0)?,
            total_supply: non_zero(&self.total_supply)?,
            virtual_price: non_zero(&self.virtual_price)?,
        })
    }
}

/// Dynamic fee band; fees in parts per 100000
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBand {
    /// Fee curvature (WAD scaled)
    pub gamma: BigUint,
    pub min_fee: u32,
    pub max_fee: u32,
}

impl FeeBand {
    /// Validated band, `None` unless `min_fee <= max_fee <= 100000`
    pub fn new(gamma: impl Into<BigUint>, min_fee: u32, max_fee: u32) -> Option<Self> {
        let band = Self {
            gamma: gamma.into(),
            min_fee,
            max_fee,
        };
        band.is_valid().then_some(band)
    }

    /// Flat fee band as used by stable pools
    pub fn flat(fee: u32) -> Option<Self> {
        Self::new(BigUint::zero(), fee, fee)
    }

    pub fn is_valid(&self) -> bool {
        self.min_fee <= self.max_fee && self.max_fee <= FEE_DENOMINATOR
    }
}

/// Direction of a two-token swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SwapDirection {
    /// Token 0 in, token 1 out (`swap0For1`)
    #[default]
    ZeroForOne,
    /// Token 1 in, token 0 out
    OneForZero,
}

impl SwapDirection {
    pub fn is_zero_for_one(&self) -> bool {
        matches!(self, SwapDirection::ZeroForOne)
    }

    pub fn from_swap_0_for_1(swap_0_for_1: bool) -> Self {
        if swap_0_for_1 {
            SwapDirection::ZeroForOne
        } else {
            SwapDirection::OneForZero
        }
    }
}

/// One quote to compute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest<P> {
    pub amount_in: BigUint,
    pub reserves: PoolReserves,
    pub multiplier_in: PrecisionMultiplier,
    pub multiplier_out: PrecisionMultiplier,
    pub fee_band: FeeBand,
    pub params: P,
    /// Only consulted by the crypto curve
    pub direction: SwapDirection,
    /// Treat values past the 256/128-bit ceilings as hard failures
    pub check_overflow: bool,
}

impl<P> QuoteRequest<P> {
    /// Request with unit multipliers, a zero fee band and overflow checking on
    pub fn new(amount_in: impl Into<BigUint>, reserves: PoolReserves, params: P) -> Self {
        Self {
            amount_in: amount_in.into(),
            reserves,
            multiplier_in: PrecisionMultiplier::ONE,
            multiplier_out: PrecisionMultiplier::ONE,
            fee_band: FeeBand {
                gamma: BigUint::zero(),
                min_fee: 0,
                max_fee: 0,
            },
            params,
            direction: SwapDirection::ZeroForOne,
            check_overflow: true,
        }
    }

    pub fn with_multipliers(
        mut self,
        multiplier_in: PrecisionMultiplier,
        multiplier_out: PrecisionMultiplier,
    ) -> Self {
        self.multiplier_in = multiplier_in;
        self.multiplier_out = multiplier_out;
        self
    }

    pub fn with_fee_band(mut self, fee_band: FeeBand) -> Self {
        self.fee_band = fee_band;
        self
    }

    pub fn with_direction(mut self, direction: SwapDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_check_overflow(mut self, check_overflow: bool) -> Self {
        self.check_overflow = check_overflow;
        self
    }
}

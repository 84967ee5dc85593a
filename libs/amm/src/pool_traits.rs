//! Pool snapshot types behind a unified curve-pool interface

use crate::error::Result;
use crate::fixed_point::FixedPoint;
use crate::price_tweak::{normalized_balances, trade_price, PostTradeInput, PriceOracleState};
use crate::quote::{QuoteEngine, QuoteOutcome};
use crate::types::{
    CryptoCurveParams, FeeBand, PoolReserves, PrecisionMultiplier, QuoteRequest,
    StableCurveParams, SwapDirection,
};
use num_bigint::BigUint;
use num_traits::CheckedSub;
use serde::{Deserialize, Serialize};

/// Curve family of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolType {
    StableSwap,
    CryptoSwap,
}

/// Unified pool interface for routing across curve families
pub trait CurvePool {
    fn pool_type(&self) -> PoolType;

    /// Native reserves of token 0 and token 1
    fn reserves(&self) -> (&BigUint, &BigUint);

    fn fee_band(&self) -> &FeeBand;

    /// Quote `amount_in` of the direction's input token at unix time `now`
    fn quote(
        &self,
        engine: &QuoteEngine,
        amount_in: &BigUint,
        direction: SwapDirection,
        now: u64,
    ) -> Result<QuoteOutcome>;
}

/// Token-indexed reserves and multipliers oriented along a trade
fn orient(
    reserve0: &BigUint,
    reserve1: &BigUint,
    multiplier0: PrecisionMultiplier,
    multiplier1: PrecisionMultiplier,
    direction: SwapDirection,
) -> (PoolReserves, PrecisionMultiplier, PrecisionMultiplier) {
    match direction {
        SwapDirection::ZeroForOne => (
            PoolReserves::new(reserve0.clone(), reserve1.clone()),
            multiplier0,
            multiplier1,
        ),
        SwapDirection::OneForZero => (
            PoolReserves::new(reserve1.clone(), reserve0.clone()),
            multiplier1,
            multiplier0,
        ),
    }
}

/// Snapshot of a two-token StableSwap pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StablePool {
    pub reserve0: BigUint,
    pub reserve1: BigUint,
    pub multiplier0: PrecisionMultiplier,
    pub multiplier1: PrecisionMultiplier,
    pub params: StableCurveParams,
    pub fee_band: FeeBand,
    pub check_overflow: bool,
}

impl StablePool {
    pub fn request(&self, amount_in: &BigUint, direction: SwapDirection) -> QuoteRequest<StableCurveParams> {
        let (reserves, multiplier_in, multiplier_out) = orient(
            &self.reserve0,
            &self.reserve1,
            self.multiplier0,
            self.multiplier1,
            direction,
        );
        QuoteRequest::new(amount_in.clone(), reserves, self.params.clone())
            .with_multipliers(multiplier_in, multiplier_out)
            .with_fee_band(self.fee_band.clone())
            .with_direction(direction)
            .with_check_overflow(self.check_overflow)
    }
}

impl CurvePool for StablePool {
    fn pool_type(&self) -> PoolType {
        PoolType::StableSwap
    }

    fn reserves(&self) -> (&BigUint, &BigUint) {
        (&self.reserve0, &self.reserve1)
    }

    fn fee_band(&self) -> &FeeBand {
        &self.fee_band
    }

    fn quote(
        &self,
        engine: &QuoteEngine,
        amount_in: &BigUint,
        direction: SwapDirection,
        _now: u64,
    ) -> Result<QuoteOutcome> {
        engine.quote_stable(&self.request(amount_in, direction))
    }
}

/// Snapshot of a two-token crypto (Aqua) pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoPool {
    pub reserve0: BigUint,
    pub reserve1: BigUint,
    pub multiplier0: PrecisionMultiplier,
    pub multiplier1: PrecisionMultiplier,
    pub params: CryptoCurveParams,
    pub fee_band: FeeBand,
    pub check_overflow: bool,
}

impl CryptoPool {
    pub fn request(&self, amount_in: &BigUint, direction: SwapDirection) -> QuoteRequest<CryptoCurveParams> {
        let (reserves, multiplier_in, multiplier_out) = orient(
            &self.reserve0,
            &self.reserve1,
            self.multiplier0,
            self.multiplier1,
            direction,
        );
        QuoteRequest::new(amount_in.clone(), reserves, self.params.clone())
            .with_multipliers(multiplier_in, multiplier_out)
            .with_fee_band(self.fee_band.clone())
            .with_direction(direction)
            .with_check_overflow(self.check_overflow)
    }

    /// Post-trade estimation input for a swap of `amount_in` that paid out `amount_out`
    ///
    /// `None` if the price scale is unknown or the output exceeds the reserve.
    pub fn post_trade_input(
        &self,
        oracle: PriceOracleState,
        amount_in: &BigUint,
        amount_out: &BigUint,
        direction: SwapDirection,
    ) -> Option<PostTradeInput> {
        let price_scale = self.params.price_scale.as_ref()?;
        let (reserve0, reserve1) = match direction {
            SwapDirection::ZeroForOne => (
                &self.reserve0 + amount_in,
                self.reserve1.checked_sub(amount_out)?,
            ),
            SwapDirection::OneForZero => (
                self.reserve0.checked_sub(amount_out)?,
                &self.reserve1 + amount_in,
            ),
        };
        let (xp0, xp1) = normalized_balances(
            &reserve0,
            &reserve1,
            self.multiplier0,
            self.multiplier1,
            price_scale,
            FixedPoint::unchecked(),
        )
        .ok()?;

        let (multiplier_in, multiplier_out) = match direction {
            SwapDirection::ZeroForOne => (self.multiplier0, self.multiplier1),
            SwapDirection::OneForZero => (self.multiplier1, self.multiplier0),
        };

        Some(PostTradeInput {
            params: self.params.clone(),
            oracle,
            xp0,
            xp1,
            last_price: trade_price(amount_in, amount_out, direction, multiplier_in, multiplier_out),
            check_overflow: self.check_overflow,
        })
    }
}

impl CurvePool for CryptoPool {
    fn pool_type(&self) -> PoolType {
        PoolType::CryptoSwap
    }

    fn reserves(&self) -> (&BigUint, &BigUint) {
        (&self.reserve0, &self.reserve1)
    }

    fn fee_band(&self) -> &FeeBand {
        &self.fee_band
    }

    fn quote(
        &self,
        engine: &QuoteEngine,
        amount_in: &BigUint,
        direction: SwapDirection,
        now: u64,
    ) -> Result<QuoteOutcome> {
        engine.quote_crypto(&self.request(amount_in, direction), now)
    }
}

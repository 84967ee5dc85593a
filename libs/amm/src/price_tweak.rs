//! Post-trade state estimation for crypto pools
//!
//! After every swap the pool contract updates its EMA price oracle, records
//! the last traded price and, when it has accumulated enough profit, moves
//! its price scale toward the oracle. This module reproduces that update
//! (the contract's `tweak_price`) without mutating anything, so a caller
//! simulating a sequence of trades can roll a snapshot forward.

use crate::crypto_math::CryptoMath;
use crate::error::{SolverResult, Unpriceable};
use crate::fixed_point::{FixedPoint, WAD};
use crate::param_ramp::is_ramping;
use crate::types::{CryptoCurveParams, PrecisionMultiplier, SwapDirection};
use curve_config::protocol::{price_adjustment, N_COINS};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Oracle and profit-tracking state of a crypto pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOracleState {
    /// EMA price of token 1 in token 0 (WAD)
    pub price_oracle: BigUint,
    /// Price of the most recent trade (WAD)
    pub last_prices: BigUint,
    pub last_prices_timestamp: u64,
    /// EMA half-life in seconds
    pub ma_half_time: BigUint,
    pub xcp_profit: BigUint,
    pub allowed_extra_profit: BigUint,
    pub adjustment_step: BigUint,
    pub not_adjusted: bool,
}

/// Everything needed to estimate one post-trade update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTradeInput {
    pub params: CryptoCurveParams,
    pub oracle: PriceOracleState,
    /// Normalized post-trade balance of token 0
    pub xp0: BigUint,
    /// Normalized post-trade balance of token 1, in token-0 terms
    pub xp1: BigUint,
    /// Price of the trade (see [`trade_price`]); zero to use the marginal price
    pub last_price: BigUint,
    pub check_overflow: bool,
}

/// Pool state after the contract's post-trade update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTradeEstimate {
    pub price_oracle: BigUint,
    pub last_prices: BigUint,
    pub last_prices_timestamp: u64,
    pub price_scale: BigUint,
    pub invariant: BigUint,
    pub virtual_price: BigUint,
    pub xcp_profit: BigUint,
    pub not_adjusted: bool,
    /// Whether the price scale moved
    pub price_scale_adjusted: bool,
}

/// Price of token 1 in token 0 implied by a trade, WAD scaled
///
/// Zero when either leg is too small to carry a meaningful price.
pub fn trade_price(
    amount_in: &BigUint,
    amount_out: &BigUint,
    direction: SwapDirection,
    multiplier_in: PrecisionMultiplier,
    multiplier_out: PrecisionMultiplier,
) -> BigUint {
    let floor = BigUint::from(price_adjustment::MIN_PRICED_TRADE);
    if *amount_in <= floor || *amount_out <= floor {
        return BigUint::zero();
    }

    let dx = multiplier_in.normalize(amount_in);
    let dy = multiplier_out.normalize(amount_out);
    match direction {
        SwapDirection::ZeroForOne => dx * &*WAD / dy,
        SwapDirection::OneForZero => dy * &*WAD / dx,
    }
}

/// Normalized balances `(xp0, xp1)` from native reserves of token 0 and 1
pub fn normalized_balances(
    reserve0: &BigUint,
    reserve1: &BigUint,
    multiplier0: PrecisionMultiplier,
    multiplier1: PrecisionMultiplier,
    price_scale: &BigUint,
    fp: FixedPoint,
) -> SolverResult<(BigUint, BigUint)> {
    let xp0 = fp.mul(reserve0, &multiplier0.value())?;
    let xp1 = fp.mul(&fp.mul(reserve1, price_scale)?, &multiplier1.value())?;
    Ok((xp0, fp.div(&xp1, &WAD, "WAD")?))
}

/// Virtual price of the balanced point of invariant `d` at `price_scale`
fn balanced_virtual_price(
    d: &BigUint,
    price_scale: &BigUint,
    total_supply: &BigUint,
    fp: FixedPoint,
) -> SolverResult<BigUint> {
    let n = BigUint::from(N_COINS);
    let x0 = d / &n;
    let x1 = fp.mul_div(d, &WAD, &(&n * price_scale), "N * price_scale")?;
    let xcp = CryptoMath::geometric_mean(&x0, &x1);
    fp.mul_div(&WAD, &xcp, total_supply, "total_supply")
}

/// Estimate the post-trade pool update at unix time `now`
pub fn estimate(math: &CryptoMath, input: &PostTradeInput, now: u64) -> SolverResult<PostTradeEstimate> {
    let params = input
        .params
        .resolve()
        .ok_or(Unpriceable::IncompleteParameters)?;
    let fp = FixedPoint::new(input.check_overflow);
    let oracle = &input.oracle;
    let (ann, gamma) = (&params.amplification, &params.gamma);
    let price_scale = &params.price_scale;

    let mut price_oracle = oracle.price_oracle.clone();
    let mut last_prices_timestamp = oracle.last_prices_timestamp;
    if last_prices_timestamp < now {
        let elapsed = BigUint::from(now - last_prices_timestamp);
        let power = fp.mul_div(&elapsed, &WAD, &oracle.ma_half_time, "ma_half_time")?;
        let alpha = math.halfpow(&power)?;
        let decayed = fp.mul(&oracle.last_prices, &(&*WAD - &alpha))?;
        price_oracle = fp.add(&decayed, &fp.mul(&price_oracle, &alpha)?)? / &*WAD;
        last_prices_timestamp = now;
    }

    let d_unadjusted = math.compute_generic_invariant(ann, gamma, &input.xp0, &input.xp1, fp)?;

    let last_prices = if input.last_price.is_zero() {
        // Marginal price from a small probe trade
        let dx_price = &input.xp0 / BigUint::from(price_adjustment::PRICE_PROBE_DIVISOR);
        let probed = fp.add(&input.xp0, &dx_price)?;
        let y = math.solve_for_y(ann, gamma, &probed, &input.xp1, &d_unadjusted, 1, fp)?;
        let dy = fp.sub(&input.xp1, &y, "xp1 - y")?;
        fp.mul_div(price_scale, &dx_price, &dy, "probe output")?
    } else {
        input.last_price.clone()
    };

    let old_virtual_price = &params.virtual_price;
    let virtual_price = balanced_virtual_price(&d_unadjusted, price_scale, &params.total_supply, fp)?;
    let xcp_profit = fp.mul_div(&oracle.xcp_profit, &virtual_price, old_virtual_price, "virtual_price")?;
    if virtual_price < *old_virtual_price && !is_ramping(&params, now) {
        return Err(Unpriceable::VirtualPriceLoss.into());
    }

    let two = BigUint::from(2u32);
    let mut not_adjusted = oracle.not_adjusted;
    // 2 * vp - 1e18 > xcp_profit + 2 * allowed_extra_profit
    if fp.mul(&virtual_price, &two)? > &*WAD + &xcp_profit + &oracle.allowed_extra_profit * &two {
        not_adjusted = true;
    }

    let unadjusted = |not_adjusted: bool| PostTradeEstimate {
        price_oracle: price_oracle.clone(),
        last_prices: last_prices.clone(),
        last_prices_timestamp,
        price_scale: price_scale.clone(),
        invariant: d_unadjusted.clone(),
        virtual_price: virtual_price.clone(),
        xcp_profit: xcp_profit.clone(),
        not_adjusted,
        price_scale_adjusted: false,
    };

    if !not_adjusted {
        return Ok(unadjusted(false));
    }

    let ratio = fp.mul_div(&price_oracle, &WAD, price_scale, "price_scale")?;
    let deviation = FixedPoint::abs_diff(&ratio, &WAD);
    let step = &oracle.adjustment_step;
    let norm = fp.mul(&deviation, &deviation)?;
    if norm <= fp.mul(step, step)? {
        return Ok(unadjusted(true));
    }

    let norm = math.sqrt_int(&(norm / &*WAD))?;
    let numerator = fp.add(
        &fp.mul(price_scale, &fp.sub(&norm, step, "norm - adjustment_step")?)?,
        &fp.mul(step, &price_oracle)?,
    )?;
    let new_scale = fp.div(&numerator, &norm, "norm")?;

    let xp1 = fp.mul_div(&input.xp1, &new_scale, price_scale, "price_scale")?;
    let d = math.compute_generic_invariant(ann, gamma, &input.xp0, &xp1, fp)?;
    let adjusted_virtual_price = balanced_virtual_price(&d, &new_scale, &params.total_supply, fp)?;

    if adjusted_virtual_price > *WAD
        && fp.mul(&adjusted_virtual_price, &two)? > &*WAD + &xcp_profit
    {
        trace!(%new_scale, old_scale = %price_scale, "price scale adjusted");
        return Ok(PostTradeEstimate {
            price_oracle,
            last_prices,
            last_prices_timestamp,
            price_scale: new_scale,
            invariant: d,
            virtual_price: adjusted_virtual_price,
            xcp_profit,
            not_adjusted: true,
            price_scale_adjusted: true,
        });
    }

    Ok(unadjusted(false))
}

//! Quote facade
//!
//! Entry points an aggregator calls per pool and per trade. Inputs are
//! normalized to 18-decimal working precision, handed to the curve solvers,
//! and the result is de-normalized back to the output token's native units.
//!
//! Internal failures are split in two: [`QuoteError`](crate::error::QuoteError)
//! is returned as `Err`, every [`Unpriceable`] state becomes
//! [`QuoteOutcome::Unpriceable`] so the caller sees a zero output for that
//! pool and moves on.

use crate::crypto_math::CryptoMath;
use crate::dynamic_fee::compute_fee;
use crate::error::{Ceiling, Result, SolverError, SolverResult, Unpriceable};
use crate::fixed_point::{FixedPoint, WAD};
use crate::param_ramp::{resolve_invariant, InvariantSource};
use crate::price_tweak::{self, PostTradeEstimate, PostTradeInput};
use crate::stable_math::StableMath;
use crate::types::{CryptoCurveParams, QuoteRequest, StableCurveParams, SwapDirection};
use curve_config::protocol::FEE_DENOMINATOR;
use curve_config::SolverConfig;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a priced quote was derived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteDiagnostics {
    /// Invariant `D` the output balance was solved against
    pub invariant: BigUint,
    /// Origin of a crypto-pool invariant; `None` on the stable path, which
    /// always derives `D` from the reserves
    pub invariant_source: Option<InvariantSource>,
    /// Solved normalized balance of the output token after the trade
    pub post_trade_balance: BigUint,
    /// Output before the output-side fee, native units
    pub gross_amount_out: BigUint,
    /// Fee rate applied, parts per 100000
    pub fee_rate: u32,
    /// Fee charged; input-token units for stable pools, output-token units
    /// for crypto pools
    pub fee_amount: BigUint,
}

/// Result of a single quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum QuoteOutcome {
    Priced {
        amount_out: BigUint,
        diagnostics: QuoteDiagnostics,
    },
    Unpriceable(Unpriceable),
}

impl QuoteOutcome {
    /// Output amount, zero when the pool could not be priced
    pub fn amount_out(&self) -> BigUint {
        match self {
            QuoteOutcome::Priced { amount_out, .. } => amount_out.clone(),
            QuoteOutcome::Unpriceable(_) => BigUint::zero(),
        }
    }

    pub fn is_priced(&self) -> bool {
        matches!(self, QuoteOutcome::Priced { .. })
    }

    pub fn diagnostics(&self) -> Option<&QuoteDiagnostics> {
        match self {
            QuoteOutcome::Priced { diagnostics, .. } => Some(diagnostics),
            QuoteOutcome::Unpriceable(_) => None,
        }
    }

    pub fn unpriceable_reason(&self) -> Option<Unpriceable> {
        match self {
            QuoteOutcome::Priced { .. } => None,
            QuoteOutcome::Unpriceable(reason) => Some(*reason),
        }
    }
}

/// Fold solver failures into the public channels
fn settle(pool_kind: &'static str, result: SolverResult<QuoteOutcome>) -> Result<QuoteOutcome> {
    match result {
        Ok(outcome) => {
            if let QuoteOutcome::Unpriceable(reason) = &outcome {
                debug!(pool_kind, %reason, "pool cannot be priced");
            }
            Ok(outcome)
        }
        Err(SolverError::Unpriceable(reason)) => {
            debug!(pool_kind, %reason, "pool cannot be priced");
            Ok(QuoteOutcome::Unpriceable(reason))
        }
        Err(SolverError::Fatal(err)) => Err(err),
    }
}

/// Swap-quote engine for StableSwap and crypto curves
///
/// Holds only immutable configuration; one engine can be shared across
/// threads and pools.
#[derive(Debug, Clone, Default)]
pub struct QuoteEngine {
    config: SolverConfig,
    stable: StableMath,
    crypto: CryptoMath,
}

impl QuoteEngine {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            stable: StableMath::from_config(&config),
            crypto: CryptoMath::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn crypto_math(&self) -> &CryptoMath {
        &self.crypto
    }

    /// Quote a StableSwap pool
    ///
    /// The flat swap fee is the band's `max_fee`, taken from the input.
    pub fn quote_stable(&self, request: &QuoteRequest<StableCurveParams>) -> Result<QuoteOutcome> {
        settle("stable", self.price_stable(request))
    }

    /// Quote a crypto (Aqua) pool at unix time `now`
    pub fn quote_crypto(
        &self,
        request: &QuoteRequest<CryptoCurveParams>,
        now: u64,
    ) -> Result<QuoteOutcome> {
        settle("crypto", self.price_crypto(request, now))
    }

    /// Stable quote as a bare amount, zero when unpriceable
    pub fn amount_out_stable(&self, request: &QuoteRequest<StableCurveParams>) -> Result<BigUint> {
        Ok(self.quote_stable(request)?.amount_out())
    }

    /// Crypto quote as a bare amount, zero when unpriceable
    pub fn amount_out_crypto(
        &self,
        request: &QuoteRequest<CryptoCurveParams>,
        now: u64,
    ) -> Result<BigUint> {
        Ok(self.quote_crypto(request, now)?.amount_out())
    }

    /// Estimate the crypto pool's oracle and price-scale update after a trade
    ///
    /// Returns `Ok(None)` when the post-trade state cannot be estimated.
    pub fn estimate_post_trade_state(
        &self,
        input: &PostTradeInput,
        now: u64,
    ) -> Result<Option<PostTradeEstimate>> {
        match price_tweak::estimate(&self.crypto, input, now) {
            Ok(estimate) => Ok(Some(estimate)),
            Err(SolverError::Unpriceable(reason)) => {
                debug!(%reason, "post-trade state cannot be estimated");
                Ok(None)
            }
            Err(SolverError::Fatal(err)) => Err(err),
        }
    }

    fn price_stable(&self, request: &QuoteRequest<StableCurveParams>) -> SolverResult<QuoteOutcome> {
        if request.amount_in.is_zero() {
            return Ok(QuoteOutcome::Unpriceable(Unpriceable::ZeroAmountIn));
        }
        if request.reserves.is_empty() {
            return Ok(QuoteOutcome::Unpriceable(Unpriceable::EmptyReserve));
        }
        if !request.fee_band.is_valid() {
            return Ok(QuoteOutcome::Unpriceable(Unpriceable::InvalidFeeBand));
        }

        let fp = FixedPoint::new(request.check_overflow);
        let amplification = request
            .params
            .amplification
            .clone()
            .unwrap_or_else(|| BigUint::from(self.config.default_stable_amplification));

        let multiplier_in = request.multiplier_in.value();
        let multiplier_out = request.multiplier_out.value();
        let normalized_in = fp.mul(&request.reserves.reserve_in, &multiplier_in)?;
        let normalized_out = fp.mul(&request.reserves.reserve_out, &multiplier_out)?;
        fp.ensure_within(&normalized_in, Ceiling::U128)?;
        fp.ensure_within(&normalized_out, Ceiling::U128)?;

        let fee_rate = request.fee_band.max_fee;
        let fee_amount = fp.mul_div(
            &request.amount_in,
            &BigUint::from(fee_rate),
            &BigUint::from(FEE_DENOMINATOR),
            "fee denominator",
        )?;
        let fee_deducted = fp.sub(&request.amount_in, &fee_amount, "amountIn - fee")?;

        let d = self
            .stable
            .compute_invariant(&amplification, &normalized_in, &normalized_out, fp)?;
        let x = fp.add(&normalized_in, &fp.mul(&fee_deducted, &multiplier_in)?)?;
        let y = self.stable.solve_for_balance(&amplification, &x, &d, fp)?;

        if &y + 1u32 >= normalized_out {
            return Ok(QuoteOutcome::Unpriceable(Unpriceable::NegligibleTrade));
        }
        let dy = normalized_out - &y - 1u32;
        let amount_out = fp.div(&dy, &multiplier_out, "output multiplier")?;

        Ok(QuoteOutcome::Priced {
            amount_out: amount_out.clone(),
            diagnostics: QuoteDiagnostics {
                invariant: d,
                invariant_source: None,
                post_trade_balance: y,
                gross_amount_out: amount_out,
                fee_rate,
                fee_amount,
            },
        })
    }

    fn price_crypto(
        &self,
        request: &QuoteRequest<CryptoCurveParams>,
        now: u64,
    ) -> SolverResult<QuoteOutcome> {
        if request.amount_in.is_zero() {
            return Ok(QuoteOutcome::Unpriceable(Unpriceable::ZeroAmountIn));
        }
        if request.reserves.is_empty() {
            return Ok(QuoteOutcome::Unpriceable(Unpriceable::EmptyReserve));
        }
        let Some(params) = request.params.resolve() else {
            debug!(params = ?request.params, "incomplete crypto curve parameters");
            return Ok(QuoteOutcome::Unpriceable(Unpriceable::IncompleteParameters));
        };
        if !request.fee_band.is_valid() {
            return Ok(QuoteOutcome::Unpriceable(Unpriceable::InvalidFeeBand));
        }

        let fp = FixedPoint::new(request.check_overflow);
        let balance_in = fp.add(&request.reserves.reserve_in, &request.amount_in)?;
        fp.ensure_within(&balance_in, Ceiling::U128)?;

        let multiplier_in = request.multiplier_in.value();
        let multiplier_out = request.multiplier_out.value();
        let zero_for_one = request.direction.is_zero_for_one();

        // Token 1 is quoted in token 0 through the price scale
        let scale = |amount: &BigUint, multiplier: &BigUint| -> SolverResult<BigUint> {
            let v = fp.mul(&fp.mul(amount, &params.price_scale)?, multiplier)?;
            fp.div(&v, &WAD, "WAD")
        };
        let plain = |amount: &BigUint, multiplier: &BigUint| fp.mul(amount, multiplier);

        let (xp_in, xp_out, pre_in) = if zero_for_one {
            (
                plain(&balance_in, &multiplier_in)?,
                scale(&request.reserves.reserve_out, &multiplier_out)?,
                plain(&request.reserves.reserve_in, &multiplier_in)?,
            )
        } else {
            (
                scale(&balance_in, &multiplier_in)?,
                plain(&request.reserves.reserve_out, &multiplier_out)?,
                scale(&request.reserves.reserve_in, &multiplier_in)?,
            )
        };

        let (pre_xp0, pre_xp1) = order(request.direction, &pre_in, &xp_out);
        let (d, source) = resolve_invariant(&self.crypto, &params, pre_xp0, pre_xp1, now, fp)?;

        let (x0, x1) = order(request.direction, &xp_in, &xp_out);
        let out_index = if zero_for_one { 1 } else { 0 };
        let y = self
            .crypto
            .solve_for_y(&params.amplification, &params.gamma, x0, x1, &d, out_index, fp)?;

        let y_out = fp.sub(&xp_out, &y, "xpOut - y")?;
        if y_out <= BigUint::one() {
            return Ok(QuoteOutcome::Unpriceable(Unpriceable::NegligibleTrade));
        }
        let y_out_floor = y_out - 1u32;

        let gross_amount_out = if zero_for_one {
            let denominator = fp.mul(&params.price_scale, &multiplier_out)?;
            fp.mul_div(&y_out_floor, &WAD, &denominator, "priceScale * multOut")?
        } else {
            fp.div(&y_out_floor, &multiplier_out, "output multiplier")?
        };

        let (fee_xp0, fee_xp1) = order(request.direction, &xp_in, &y);
        let fee_rate = compute_fee(&request.fee_band, fee_xp0, fee_xp1, fp)?;
        let fee_amount = fp.mul_div(
            &gross_amount_out,
            &BigUint::from(fee_rate),
            &BigUint::from(FEE_DENOMINATOR),
            "fee denominator",
        )?;

        if fee_amount >= gross_amount_out {
            return Ok(QuoteOutcome::Unpriceable(Unpriceable::NegligibleTrade));
        }
        let amount_out = &gross_amount_out - &fee_amount;

        Ok(QuoteOutcome::Priced {
            amount_out,
            diagnostics: QuoteDiagnostics {
                invariant: d,
                invariant_source: Some(source),
                post_trade_balance: y,
                gross_amount_out,
                fee_rate,
                fee_amount,
            },
        })
    }
}

/// Place input-side and output-side values at their token indices
fn order<'a>(
    direction: SwapDirection,
    input_side: &'a BigUint,
    output_side: &'a BigUint,
) -> (&'a BigUint, &'a BigUint) {
    match direction {
        SwapDirection::ZeroForOne => (input_side, output_side),
        SwapDirection::OneForZero => (output_side, input_side),
    }
}

//! Invariant selection while crypto-pool parameters are ramping
//!
//! Between a parameter change and `future_params_time` the contract's cached
//! `D` no longer matches the curve, so quotes recompute it from the
//! pre-trade balances.

use crate::crypto_math::CryptoMath;
use crate::error::SolverResult;
use crate::fixed_point::FixedPoint;
use crate::types::ResolvedCryptoParams;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Where the invariant used by a quote came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvariantSource {
    /// The contract's stored `D`
    Cached,
    /// Recomputed with `newton_D` because a ramp is in progress
    Recomputed,
}

/// Whether the pool is still inside a parameter ramp at `now`
pub fn is_ramping(params: &ResolvedCryptoParams, now: u64) -> bool {
    params.future_params_time > now
}

/// Invariant for a quote at `now`, from pre-trade normalized balances
/// `xp0` (token 0) and `xp1` (token 1)
pub fn resolve_invariant(
    math: &CryptoMath,
    params: &ResolvedCryptoParams,
    xp0: &BigUint,
    xp1: &BigUint,
    now: u64,
    fp: FixedPoint,
) -> SolverResult<(BigUint, InvariantSource)> {
    if !is_ramping(params, now) {
        return Ok((params.invariant_last.clone(), InvariantSource::Cached));
    }

    trace!(
        future_params_time = params.future_params_time,
        now,
        "parameter ramp active, recomputing invariant"
    );
    let d = math.compute_generic_invariant(&params.amplification, &params.gamma, xp0, xp1, fp)?;
    Ok((d, InvariantSource::Recomputed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(future_params_time: u64) -> ResolvedCryptoParams {
        ResolvedCryptoParams {
            amplification: BigUint::from(4_000_000u32),
            gamma: BigUint::from(1_450_000_000_000_000u64),
            invariant_last: BigUint::from(18_973_521_177_677_971_086u128),
            price_scale: BigUint::from(54_451_990_779_514_461u64),
            future_params_time,
            total_supply: BigUint::from(37_758_794_556_622_160_853u128),
            virtual_price: BigUint::from(1_076_695_600_534_779_561u64),
        }
    }

    #[test]
    fn test_cached_invariant_after_ramp() {
        let math = CryptoMath::default();
        let xp = BigUint::from(1u32);
        let (d, source) = resolve_invariant(&math, &params(1_000), &xp, &xp, 1_000, FixedPoint::checked()).unwrap();
        assert_eq!(source, InvariantSource::Cached);
        assert_eq!(d, BigUint::from(18_973_521_177_677_971_086u128));
    }

    #[test]
    fn test_recomputed_invariant_during_ramp() {
        let math = CryptoMath::default();
        let (d, source) = resolve_invariant(
            &math,
            &params(2_000),
            &BigUint::from(8_466_391_136_317_679_557u128),
            &BigUint::from(10_531_459_265_502_951_057u128),
            1_999,
            FixedPoint::checked(),
        )
        .unwrap();
        assert_eq!(source, InvariantSource::Recomputed);
        assert_eq!(d, BigUint::from(18_973_521_177_677_971_082u128));
    }
}

//! Imbalance-dependent swap fee for crypto pools
//!
//! The fee slides from `min_fee` at perfect balance towards `max_fee` as the
//! pool drifts, with `gamma` setting how fast.

use crate::error::SolverResult;
use crate::fixed_point::{FixedPoint, WAD};
use crate::types::FeeBand;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

/// Fee rate (parts per 100000) for normalized balances `xp0`, `xp1`
///
/// Always within `[band.min_fee, band.max_fee]`: an empty pool charges
/// `max_fee`, and a zero-gamma band at perfect balance charges `min_fee`.
pub fn compute_fee(
    band: &FeeBand,
    xp0: &BigUint,
    xp1: &BigUint,
    fp: FixedPoint,
) -> SolverResult<u32> {
    let f = fp.add(xp0, xp1)?;
    if f.is_zero() {
        return Ok(band.max_fee);
    }

    // 4e18 * xp0 / f * xp1 / f never exceeds 1e18
    let four_wad = &*WAD * 4u32;
    let imbalance = fp.mul_div(&fp.mul_div(&four_wad, xp0, &f, "xp0 + xp1")?, xp1, &f, "xp0 + xp1")?;
    let denominator = fp.sub(&fp.add(&band.gamma, &WAD)?, &imbalance, "fee denominator")?;

    let ratio = if denominator.is_zero() {
        WAD.clone()
    } else {
        fp.mul_div(&band.gamma, &WAD, &denominator, "fee denominator")?
    };
    let ratio = ratio.min(WAD.clone());

    let weighted = fp.add(
        &fp.mul(&BigUint::from(band.min_fee), &ratio)?,
        &fp.mul(&BigUint::from(band.max_fee), &(&*WAD - &ratio))?,
    )?;
    let fee = (weighted / &*WAD).to_u32().unwrap_or(band.max_fee);

    Ok(fee.clamp(band.min_fee, band.max_fee))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band() -> FeeBand {
        FeeBand::new(230_000_000_000_000u64, 800, 1000).unwrap()
    }

    fn big(v: u128) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_balanced_pool_charges_min_fee() {
        let fee = compute_fee(&band(), &WAD, &WAD, FixedPoint::checked()).unwrap();
        assert_eq!(fee, 800);
    }

    #[test]
    fn test_imbalanced_pool_approaches_max_fee() {
        let fp = FixedPoint::checked();
        assert_eq!(compute_fee(&band(), &WAD, &big(1), fp).unwrap(), 999);
        assert_eq!(compute_fee(&band(), &WAD, &BigUint::zero(), fp).unwrap(), 999);
    }

    #[test]
    fn test_golden_post_trade_fee() {
        let fee = compute_fee(
            &band(),
            &big(9_466_391_136_317_679_557),
            &big(9_507_130_260_328_564_097),
            FixedPoint::checked(),
        )
        .unwrap();
        assert_eq!(fee, 803);
    }

    #[test]
    fn test_empty_pool_charges_max_fee() {
        let fee = compute_fee(&band(), &BigUint::zero(), &BigUint::zero(), FixedPoint::checked()).unwrap();
        assert_eq!(fee, 1000);
    }

    #[test]
    fn test_zero_gamma_at_balance_charges_min_fee() {
        let band = FeeBand::new(0u32, 30, 90).unwrap();
        let fee = compute_fee(&band, &WAD, &WAD, FixedPoint::checked()).unwrap();
        assert_eq!(fee, 30);

        // Off balance a zero gamma gives no discount
        let fee = compute_fee(&band, &WAD, &big(3 * 10u128.pow(18)), FixedPoint::checked()).unwrap();
        assert_eq!(fee, 90);
    }
}

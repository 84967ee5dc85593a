//! StableSwap invariant math for two-asset pools
//!
//! Reproduces the stable pool contract's integer arithmetic exactly,
//! including the order of every truncating division. Both Newton loops are
//! best-effort: when the loop limit is exhausted the last iterate is
//! returned rather than an error.

use crate::error::SolverResult;
use crate::fixed_point::FixedPoint;
use curve_config::SolverConfig;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use tracing::trace;

/// StableSwap Newton solvers
#[derive(Debug, Clone, Copy)]
pub struct StableMath {
    max_iterations: usize,
}

impl Default for StableMath {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

impl StableMath {
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            max_iterations: config.stable_loop_limit,
        }
    }

    /// Compute the invariant `D` from precision-normalized balances
    ///
    /// # Arguments
    /// * `a` - Amplification coefficient
    /// * `x0`, `x1` - Normalized balances
    /// * `fp` - Arithmetic context; with checking on, `D^2`, `D^3 / x0` and
    ///   the Newton numerator must fit 256 bits
    pub fn compute_invariant(
        &self,
        a: &BigUint,
        x0: &BigUint,
        x1: &BigUint,
        fp: FixedPoint,
    ) -> SolverResult<BigUint> {
        let s = x0 + x1;
        if s.is_zero() {
            return Ok(BigUint::zero());
        }

        let two = BigUint::from(2u32);
        let three = BigUint::from(3u32);
        let four = BigUint::from(4u32);
        let n_a = a * &two;
        let n_a_minus_one = fp.sub(&n_a, &BigUint::one(), "2A - 1")?;

        let mut d = s.clone();
        for _ in 0..self.max_iterations {
            let d_sq = fp.mul(&d, &d)?;
            let d2 = fp.mul(&fp.div(&d_sq, x0, "D^2 / x0")?, &d)?;
            let d_p = fp.div(&fp.div(&d2, x1, "D^3 / x1")?, &four, "D_P")?;
            let d_prev = d.clone();

            let d0 = fp.mul(&fp.add(&(&n_a * &s), &(&d_p * &two))?, &d)?;
            let denominator = fp.add(&(&n_a_minus_one * &d), &(&d_p * &three))?;
            d = fp.div(&d0, &denominator, "invariant denominator")?;

            if FixedPoint::abs_diff(&d, &d_prev) <= BigUint::one() {
                return Ok(d);
            }
        }

        trace!(iterations = self.max_iterations, "stable invariant did not converge");
        Ok(d)
    }

    /// Solve for the complementary balance `y` given balance `x` and invariant `d`
    pub fn solve_for_balance(
        &self,
        a: &BigUint,
        x: &BigUint,
        d: &BigUint,
        fp: FixedPoint,
    ) -> SolverResult<BigUint> {
        let two = BigUint::from(2u32);
        let n_a = a * &two;

        // c = D^2 / (2x) * D / (2nA)
        let c = fp.div(&fp.mul(d, d)?, &(x * &two), "2x")?;
        let c = fp.div(&fp.mul(&c, d)?, &(&n_a * &two), "2nA")?;
        // b = D / nA + x
        let b = fp.add(&fp.div(d, &n_a, "nA")?, x)?;

        let mut y = d.clone();
        for _ in 0..self.max_iterations {
            let y_prev = y.clone();
            let numerator = fp.add(&fp.mul(&y, &y)?, &c)?;
            let denominator = fp.sub(&fp.add(&(&y * &two), &b)?, d, "2y + b - D")?;
            y = fp.div(&numerator, &denominator, "getY denominator")?;

            if FixedPoint::abs_diff(&y, &y_prev) <= BigUint::one() {
                return Ok(y);
            }
        }

        trace!(iterations = self.max_iterations, "stable getY did not converge");
        Ok(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{QuoteError, SolverError, Unpriceable};

    fn big(v: u128) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_balanced_pool_invariant_is_sum() {
        let math = StableMath::default();
        let x = big(1_000_000_000_000_000_000_000);
        let d = math
            .compute_invariant(&big(1000), &x, &x, FixedPoint::checked())
            .unwrap();
        assert_eq!(d, big(2_000_000_000_000_000_000_000));
    }

    #[test]
    fn test_imbalanced_pool_invariant() {
        let math = StableMath::default();
        let d = math
            .compute_invariant(
                &big(80),
                &big(8_079_308_863_505_801_735_196),
                &big(1_771_167_531_000_000_000_000),
                FixedPoint::checked(),
            )
            .unwrap();
        assert_eq!(d, big(9_808_736_368_044_464_020_147));
    }

    #[test]
    fn test_empty_pool_invariant_is_zero() {
        let d = StableMath::default()
            .compute_invariant(&big(100), &BigUint::zero(), &BigUint::zero(), FixedPoint::checked())
            .unwrap();
        assert!(d.is_zero());
    }

    #[test]
    fn test_one_sided_pool_divides_by_zero() {
        let err = StableMath::default()
            .compute_invariant(&big(100), &big(1_000), &BigUint::zero(), FixedPoint::checked())
            .unwrap_err();
        assert!(matches!(
            err,
            SolverError::Fatal(QuoteError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_zero_amplification_is_unpriceable() {
        let err = StableMath::default()
            .compute_invariant(&BigUint::zero(), &big(1_000), &big(1_000), FixedPoint::checked())
            .unwrap_err();
        assert_eq!(err, SolverError::Unpriceable(Unpriceable::Underflow("2A - 1")));
    }

    #[test]
    fn test_solve_recovers_balance() {
        let math = StableMath::default();
        let a = big(100);
        let x0 = big(1_000_000_000_000_000_000_000);
        let x1 = big(2_000_000_000_000_000_000_000);
        let d = math.compute_invariant(&a, &x0, &x1, FixedPoint::checked()).unwrap();
        let y = math.solve_for_balance(&a, &x0, &d, FixedPoint::checked()).unwrap();
        assert_eq!(y, x1);
    }

    #[test]
    fn test_truncated_loop_returns_last_iterate() {
        let math = StableMath { max_iterations: 1 };
        let x0 = big(8_079_308_863_505_801_735_196);
        let x1 = big(1_771_167_531_000_000_000_000);
        let d = math
            .compute_invariant(&big(80), &x0, &x1, FixedPoint::checked())
            .unwrap();
        // One Newton step from D0 = x0 + x1, not the converged value
        assert_ne!(d, big(9_808_736_368_044_464_020_147));
        assert!(d > BigUint::zero());
    }

    #[test]
    fn test_huge_balances_overflow_only_when_checked() {
        let math = StableMath::default();
        let x = BigUint::one() << 130u32;

        let err = math
            .compute_invariant(&big(100), &x, &x, FixedPoint::checked())
            .unwrap_err();
        assert!(matches!(err, SolverError::Fatal(QuoteError::Overflow { .. })));

        let d = math
            .compute_invariant(&big(100), &x, &x, FixedPoint::unchecked())
            .unwrap();
        assert_eq!(d, BigUint::one() << 131u32);
    }
}

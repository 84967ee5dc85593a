//! Adaptive crypto-curve math (Curve v2 / Aqua style, two coins)
//!
//! The invariant is solved in the transformed coordinate `K0`, the product
//! of balances relative to `(D/N)^N`. Unlike the StableSwap loops these
//! solvers refuse to expose a guess they are not confident in: values
//! outside the contract's safety bounds and exhausted loops are reported as
//! [`Unpriceable`] rather than returned.

use crate::error::{SolverResult, Unpriceable};
use crate::fixed_point::{FixedPoint, WAD};
use curve_config::protocol::{crypto_bounds, price_adjustment, A_MULTIPLIER, N_COINS};
use curve_config::SolverConfig;
use num_bigint::BigUint;
use num_traits::Zero;
use std::cmp::max;
use tracing::trace;

/// Crypto-curve Newton solvers and the fixed-point helpers they share
#[derive(Debug, Clone, Copy)]
pub struct CryptoMath {
    max_iterations: usize,
    sqrt_iterations: usize,
    halfpow_precision: u64,
}

impl Default for CryptoMath {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

/// `|gamma + 1e18 - K0| + 1`
fn shifted_gap(gamma: &BigUint, k0: &BigUint) -> BigUint {
    let g = gamma + &*WAD;
    FixedPoint::abs_diff(&g, k0) + 1u32
}

fn big(v: u128) -> BigUint {
    BigUint::from(v)
}

impl CryptoMath {
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            max_iterations: config.crypto_loop_limit,
            sqrt_iterations: config.sqrt_loop_limit,
            halfpow_precision: config.halfpow_precision,
        }
    }

    /// `1e18 * D / gamma * g1k0 / gamma * g1k0 * A_MULTIPLIER / ANN`
    fn mul1(
        fp: FixedPoint,
        ann: &BigUint,
        gamma: &BigUint,
        d: &BigUint,
        g1k0: &BigUint,
    ) -> SolverResult<BigUint> {
        let a_multiplier = BigUint::from(A_MULTIPLIER);
        let v = fp.mul_div(&WAD, d, gamma, "gamma")?;
        let v = fp.mul_div(&v, g1k0, gamma, "gamma")?;
        let v = fp.mul(&fp.mul(&v, g1k0)?, &a_multiplier)?;
        fp.div(&v, ann, "ANN")
    }

    /// Compute the invariant from normalized balances (`newton_D`)
    ///
    /// Used when pool parameters are mid-ramp and the cached `D` is stale.
    pub fn compute_generic_invariant(
        &self,
        ann: &BigUint,
        gamma: &BigUint,
        xp0: &BigUint,
        xp1: &BigUint,
        fp: FixedPoint,
    ) -> SolverResult<BigUint> {
        let n = BigUint::from(N_COINS);
        let (hi, lo) = if xp0 >= xp1 { (xp0, xp1) } else { (xp1, xp0) };

        if *hi < big(crypto_bounds::MIN_LARGEST_BALANCE)
            || *hi > big(crypto_bounds::MAX_LARGEST_BALANCE)
        {
            return Err(Unpriceable::UnsafeBalances.into());
        }
        if fp.mul_div(lo, &WAD, hi, "x[0]")? < big(crypto_bounds::MIN_BALANCE_RATIO) {
            return Err(Unpriceable::UnsafeBalances.into());
        }

        let balances = [hi, lo];
        let s = fp.add(hi, lo)?;
        let mut d = &n * fp.mul(hi, lo)?.sqrt();

        let two_wad_n = &*WAD * 2u32 * &n;
        let divisor = big(crypto_bounds::CONVERGENCE_DIVISOR);
        let floor = big(crypto_bounds::INVARIANT_CONVERGENCE_FLOOR);

        for _ in 0..self.max_iterations {
            let d_prev = d.clone();

            let mut k0 = WAD.clone();
            for x in balances {
                k0 = fp.mul_div(&fp.mul(&k0, x)?, &n, &d, "D")?;
            }

            let g1k0 = shifted_gap(gamma, &k0);
            let mul1 = Self::mul1(fp, ann, gamma, &d, &g1k0)?;
            let mul2 = fp.mul_div(&two_wad_n, &k0, &g1k0, "g1k0")?;

            // neg_fprime = S + S * mul2 / 1e18 + mul1 * N / K0 - mul2 * D / 1e18
            let neg_fprime = fp.add(&s, &fp.mul_div(&s, &mul2, &WAD, "WAD")?)?;
            let neg_fprime = fp.add(&neg_fprime, &fp.mul_div(&mul1, &n, &k0, "K0")?)?;
            let neg_fprime = fp.sub(
                &neg_fprime,
                &fp.mul_div(&mul2, &d, &WAD, "WAD")?,
                "neg_fprime",
            )?;

            let d_plus = fp.mul_div(&d, &fp.add(&neg_fprime, &s)?, &neg_fprime, "neg_fprime")?;
            let mut d_minus = fp.mul_div(&d, &d, &neg_fprime, "neg_fprime")?;

            let step = fp.div(&mul1, &neg_fprime, "neg_fprime")?;
            let step = fp.mul_div(&d, &step, &WAD, "WAD")?;
            if *WAD > k0 {
                let correction = fp.mul_div(&step, &(&*WAD - &k0), &k0, "K0")?;
                d_minus = fp.add(&d_minus, &correction)?;
            } else {
                let correction = fp.mul_div(&step, &(&k0 - &*WAD), &k0, "K0")?;
                d_minus = fp.sub(&d_minus, &correction, "D_minus")?;
            }

            d = if d_plus > d_minus {
                d_plus - d_minus
            } else {
                (d_minus - d_plus) / 2u32
            };

            let diff = FixedPoint::abs_diff(&d, &d_prev);
            if diff * &divisor < max(floor.clone(), d.clone()) {
                for x in balances {
                    let frac = fp.mul_div(x, &WAD, &d, "D")?;
                    if frac < big(crypto_bounds::MIN_BALANCE_FRACTION)
                        || frac > big(crypto_bounds::MAX_BALANCE_FRACTION)
                    {
                        return Err(Unpriceable::UnsafeBalances.into());
                    }
                }
                return Ok(d);
            }
        }

        trace!(iterations = self.max_iterations, "newton_D did not converge");
        Err(Unpriceable::NotConverged.into())
    }

    /// Solve for balance `i` given the other balance and the invariant (`newton_y`)
    ///
    /// # Arguments
    /// * `x0`, `x1` - Normalized balances; the entry at index `i` is ignored
    /// * `d` - Invariant, must lie in `[1e17, 1e33]`
    /// * `i` - Index of the unknown balance (0 or 1)
    #[allow(clippy::too_many_arguments)]
    pub fn solve_for_y(
        &self,
        ann: &BigUint,
        gamma: &BigUint,
        x0: &BigUint,
        x1: &BigUint,
        d: &BigUint,
        i: usize,
        fp: FixedPoint,
    ) -> SolverResult<BigUint> {
        if *d < big(crypto_bounds::MIN_INVARIANT) || *d > big(crypto_bounds::MAX_INVARIANT) {
            return Err(Unpriceable::InvariantOutOfRange.into());
        }

        let n = BigUint::from(N_COINS);
        let x_j = if i == 0 { x1 } else { x0 };

        let mut y = fp.div(&fp.mul(d, d)?, &fp.mul(x_j, &(&n * &n))?, "x_j")?;
        let k0_i = fp.mul_div(&fp.mul(&WAD, &n)?, x_j, d, "D")?;
        if k0_i < big(crypto_bounds::MIN_K0) || k0_i > big(crypto_bounds::MAX_K0) {
            return Err(Unpriceable::UnsafeBalances.into());
        }

        let divisor = big(crypto_bounds::CONVERGENCE_DIVISOR);
        let convergence_limit = max(
            max(x_j / &divisor, d / &divisor),
            big(crypto_bounds::CONVERGENCE_FLOOR),
        );
        let two_wad = &*WAD * 2u32;

        for _ in 0..self.max_iterations {
            let y_prev = y.clone();

            let k0 = fp.mul_div(&fp.mul(&k0_i, &y)?, &n, d, "D")?;
            let s = fp.add(x_j, &y)?;

            let g1k0 = shifted_gap(gamma, &k0);
            let mul1 = Self::mul1(fp, ann, gamma, d, &g1k0)?;
            let mul2 = fp.add(&WAD, &fp.mul_div(&two_wad, &k0, &g1k0, "g1k0")?)?;

            let yfprime = fp.add(&fp.mul(&WAD, &y)?, &fp.mul(&s, &mul2)?)?;
            let yfprime = fp.add(&yfprime, &mul1)?;
            let dyfprime = fp.mul(d, &mul2)?;

            // Overshoot: the derivative numerator would go negative, bisect instead
            if yfprime < dyfprime {
                y = &y_prev / 2u32;
                continue;
            }
            let yfprime = yfprime - dyfprime;
            let fprime = fp.div(&yfprime, &y, "y")?;

            let y_minus = fp.div(&mul1, &fprime, "fprime")?;
            let y_plus = fp.div(&fp.add(&yfprime, &fp.mul(&WAD, d)?)?, &fprime, "fprime")?;
            let y_plus = fp.add(&y_plus, &fp.mul_div(&y_minus, &WAD, &k0, "K0")?)?;
            let y_minus = fp.add(&y_minus, &fp.mul_div(&WAD, &s, &fprime, "fprime")?)?;

            y = if y_plus < y_minus {
                &y_prev / 2u32
            } else {
                y_plus - y_minus
            };

            let diff = FixedPoint::abs_diff(&y, &y_prev);
            if diff < max(convergence_limit.clone(), &y / &divisor) {
                let frac = fp.mul_div(&y, &WAD, d, "D")?;
                if frac < big(crypto_bounds::MIN_BALANCE_FRACTION)
                    || frac > big(crypto_bounds::MAX_BALANCE_FRACTION)
                {
                    return Err(Unpriceable::SolutionOutOfRange.into());
                }
                return Ok(y);
            }
        }

        trace!(iterations = self.max_iterations, "newton_y did not converge");
        Err(Unpriceable::NotConverged.into())
    }

    /// `sqrt(x0 * x1)`, floored
    pub fn geometric_mean(x0: &BigUint, x1: &BigUint) -> BigUint {
        (x0 * x1).sqrt()
    }

    /// Square root of a WAD-scaled value, WAD-scaled (`sqrt(x * 1e18)`)
    pub fn sqrt_int(&self, x: &BigUint) -> SolverResult<BigUint> {
        if x.is_zero() {
            return Ok(BigUint::zero());
        }

        let mut z = (x + &*WAD) / 2u32;
        let mut y = x.clone();
        for _ in 0..self.sqrt_iterations {
            if z == y {
                return Ok(y);
            }
            y = z;
            z = ((x * &*WAD) / &y + &y) / 2u32;
        }

        Err(Unpriceable::NotConverged.into())
    }

    /// `0.5 ^ (power / 1e18)`, WAD-scaled
    ///
    /// The integer part is an exact shift; the fractional part is a binomial
    /// series truncated once a term falls below the configured precision.
    pub fn halfpow(&self, power: &BigUint) -> SolverResult<BigUint> {
        let intpow = power / &*WAD;
        let otherpow = power - &intpow * &*WAD;
        if intpow > BigUint::from(price_adjustment::HALFPOW_MAX_INTEGER_POWER) {
            return Ok(BigUint::zero());
        }

        // intpow <= 59 here
        let shift = u32::try_from(&intpow).unwrap_or(price_adjustment::HALFPOW_MAX_INTEGER_POWER);
        let result = &*WAD >> shift;
        if otherpow.is_zero() {
            return Ok(result);
        }

        let precision = BigUint::from(self.halfpow_precision);
        let x = &*WAD / 2u32;
        let mut term = WAD.clone();
        let mut sum = WAD.clone();
        let mut neg = false;

        for i in 1..256u32 {
            let k = BigUint::from(i) * &*WAD;
            let mut c = &k - &*WAD;
            if otherpow > c {
                c = &otherpow - &c;
                neg = !neg;
            } else {
                c -= &otherpow;
            }
            term = &term * (&c * &x / &*WAD) / &k;
            if neg {
                if term > sum {
                    return Err(Unpriceable::Underflow("halfpow series").into());
                }
                sum -= &term;
            } else {
                sum += &term;
            }
            if term < precision {
                return Ok(&result * &sum / &*WAD);
            }
        }

        Err(Unpriceable::NotConverged.into())
    }
}

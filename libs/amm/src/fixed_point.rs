//! Overflow-checked unsigned integer arithmetic with EVM semantics
//!
//! Values are arbitrary-precision [`BigUint`]s so products of two 256-bit
//! words never lose bits. Ceilings are enforced manually: with checking on,
//! any product or sum above `2^256 - 1` is a reported overflow instead of a
//! silent wraparound. Division truncates toward zero like the EVM `DIV`
//! opcode, and neither a zero divisor nor a negative difference can panic.

use crate::error::{Ceiling, QuoteError, SolverResult, Unpriceable};
use curve_config::protocol::WAD as WAD_U128;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;

/// 1e18 as a big integer
pub static WAD: Lazy<BigUint> = Lazy::new(|| BigUint::from(WAD_U128));

/// `2^128 - 1`
pub static U128_MAX: Lazy<BigUint> = Lazy::new(|| BigUint::from(u128::MAX));

/// `2^256 - 1`
pub static U256_MAX: Lazy<BigUint> = Lazy::new(|| (BigUint::one() << 256u32) - BigUint::one());

/// `10^exp`
pub fn pow10(exp: u32) -> BigUint {
    BigUint::from(10u32).pow(exp)
}

impl Ceiling {
    /// Largest value allowed under this ceiling
    pub fn limit(&self) -> &'static BigUint {
        match self {
            Ceiling::U128 => &U128_MAX,
            Ceiling::U256 => &U256_MAX,
        }
    }
}

/// Integer arithmetic context for one quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedPoint {
    check_overflow: bool,
}

impl FixedPoint {
    pub const fn new(check_overflow: bool) -> Self {
        Self { check_overflow }
    }

    /// Every checked value must fit its ceiling
    pub const fn checked() -> Self {
        Self::new(true)
    }

    /// Best-effort estimation: ceilings are not enforced
    pub const fn unchecked() -> Self {
        Self::new(false)
    }

    pub fn checks_overflow(&self) -> bool {
        self.check_overflow
    }

    /// Fail with [`QuoteError::Overflow`] if checking is on and `value` exceeds `ceiling`
    pub fn ensure_within(&self, value: &BigUint, ceiling: Ceiling) -> Result<(), QuoteError> {
        if self.check_overflow && value > ceiling.limit() {
            return Err(QuoteError::Overflow {
                value: value.clone(),
                ceiling,
            });
        }
        Ok(())
    }

    pub fn add(&self, a: &BigUint, b: &BigUint) -> SolverResult<BigUint> {
        let sum = a + b;
        self.ensure_within(&sum, Ceiling::U256)?;
        Ok(sum)
    }

    /// `a - b`; a negative result is a contract revert, reported as unpriceable
    pub fn sub(&self, a: &BigUint, b: &BigUint, context: &'static str) -> SolverResult<BigUint> {
        if a < b {
            return Err(Unpriceable::Underflow(context).into());
        }
        Ok(a - b)
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> SolverResult<BigUint> {
        let product = a * b;
        self.ensure_within(&product, Ceiling::U256)?;
        Ok(product)
    }

    /// Truncating division
    pub fn div(&self, a: &BigUint, b: &BigUint, context: &'static str) -> SolverResult<BigUint> {
        if b.is_zero() {
            return Err(QuoteError::DivisionByZero { context }.into());
        }
        Ok(a / b)
    }

    /// `a * b / c` with both steps checked
    pub fn mul_div(
        &self,
        a: &BigUint,
        b: &BigUint,
        c: &BigUint,
        context: &'static str,
    ) -> SolverResult<BigUint> {
        let product = self.mul(a, b)?;
        self.div(&product, c, context)
    }

    /// `|a - b|`
    pub fn abs_diff(a: &BigUint, b: &BigUint) -> BigUint {
        if a > b {
            a - b
        } else {
            b - a
        }
    }
}

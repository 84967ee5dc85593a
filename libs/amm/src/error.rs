//! Error types for curve quoting
//!
//! Two channels exist. [`QuoteError`] is fatal to a single quote and is the
//! only thing the public quote functions return as `Err`. [`Unpriceable`]
//! describes pool states the formulas cannot safely price; those travel in
//! the `Ok` channel as a zero-output outcome so one bad pool never aborts a
//! caller's wider routing computation.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Integer ceiling an intermediate value was checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ceiling {
    /// `2^128 - 1`, used for balance-scale values
    U128,
    /// `2^256 - 1`, the EVM word
    U256,
}

impl fmt::Display for Ceiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ceiling::U128 => write!(f, "2^128-1"),
            Ceiling::U256 => write!(f, "2^256-1"),
        }
    }
}

/// Errors fatal to a single quote
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuoteError {
    /// Intermediate or final value exceeded the configured integer ceiling
    #[error("Overflow: value {value} exceeds ceiling {ceiling}")]
    Overflow { value: BigUint, ceiling: Ceiling },

    /// Degenerate reserve state produced a zero divisor
    #[error("Division by zero in {context}")]
    DivisionByZero { context: &'static str },
}

/// Reasons a pool cannot currently be priced
///
/// All of these collapse to a zero output in the compatibility wrappers.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Unpriceable {
    /// Input amount was zero
    #[error("input amount is zero")]
    ZeroAmountIn,

    /// One side of the pool holds no liquidity
    #[error("pool reserve is empty")]
    EmptyReserve,

    /// Crypto-curve parameters absent or zero
    #[error("incomplete curve parameters")]
    IncompleteParameters,

    /// Fee band violates `min_fee <= max_fee <= 100000`
    #[error("invalid fee band")]
    InvalidFeeBand,

    /// Invariant outside the range the crypto solver is safe in
    #[error("invariant outside the safe range")]
    InvariantOutOfRange,

    /// Known balance outside the range the crypto solver is safe in
    #[error("balances outside the safe range")]
    UnsafeBalances,

    /// Converged balance is implausible relative to the invariant
    #[error("solved balance outside the safe range")]
    SolutionOutOfRange,

    /// Crypto-curve Newton iteration exhausted its loop limit
    #[error("solver did not converge")]
    NotConverged,

    /// A subtraction the contract would revert on went negative
    #[error("arithmetic underflow in {0}")]
    Underflow(&'static str),

    /// Output delta at or below the curve's one-unit floor
    #[error("trade too small to produce output")]
    NegligibleTrade,

    /// Virtual price would drop outside a parameter ramp
    #[error("virtual price loss")]
    VirtualPriceLoss,
}

/// Internal solver failure: either fatal or a reason to return zero
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error(transparent)]
    Fatal(#[from] QuoteError),

    #[error("cannot price: {0}")]
    Unpriceable(#[from] Unpriceable),
}

pub type Result<T, E = QuoteError> = std::result::Result<T, E>;

/// Result type of every solver-level operation
pub type SolverResult<T> = std::result::Result<T, SolverError>;

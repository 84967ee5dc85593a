//! Protocol constants for the stable and crypto curve contracts
//!
//! These values are fixed by the on-chain contracts being reproduced, so they
//! live here rather than in [`SolverConfig`](crate::SolverConfig).

/// 18-decimal fixed-point unit (1e18)
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Working precision every balance is normalized to
pub const WORKING_DECIMALS: u8 = 18;

/// Fees are expressed in parts per hundred thousand
pub const FEE_DENOMINATOR: u32 = 100_000;

/// Number of coins in every supported pool
pub const N_COINS: u32 = 2;

/// Amplification precision used by the crypto curve (`ANN = A * N^N * A_MULTIPLIER`)
pub const A_MULTIPLIER: u64 = 10_000;

/// Safety bounds enforced by the crypto-curve Newton solvers
pub mod crypto_bounds {
    /// Smallest invariant `newton_y` accepts (1e17)
    pub const MIN_INVARIANT: u128 = 100_000_000_000_000_000;

    /// Largest invariant `newton_y` accepts (1e33)
    pub const MAX_INVARIANT: u128 = 1_000_000_000_000_000_000_000_000_000_000_000;

    /// Lower bound of `K0_i = 1e18 * N * x_j / D` (2e16)
    pub const MIN_K0: u128 = 20_000_000_000_000_000;

    /// Upper bound of `K0_i` (2e20)
    pub const MAX_K0: u128 = 200_000_000_000_000_000_000;

    /// Lower bound of a converged balance relative to D, `x * 1e18 / D` (1e16)
    pub const MIN_BALANCE_FRACTION: u128 = 10_000_000_000_000_000;

    /// Upper bound of a converged balance relative to D (1e20)
    pub const MAX_BALANCE_FRACTION: u128 = 100_000_000_000_000_000_000;

    /// Smallest largest-balance `newton_D` accepts (1e9)
    pub const MIN_LARGEST_BALANCE: u128 = 1_000_000_000;

    /// Largest largest-balance `newton_D` accepts (1e33)
    pub const MAX_LARGEST_BALANCE: u128 = 1_000_000_000_000_000_000_000_000_000_000_000;

    /// Minimum `x[1] * 1e18 / x[0]` accepted by `newton_D` (1e11)
    pub const MIN_BALANCE_RATIO: u128 = 100_000_000_000;

    /// Relative convergence divisor (1e14)
    pub const CONVERGENCE_DIVISOR: u128 = 100_000_000_000_000;

    /// Absolute convergence floor for `newton_y`
    pub const CONVERGENCE_FLOOR: u128 = 100;

    /// Absolute convergence floor for `newton_D` (1e16)
    pub const INVARIANT_CONVERGENCE_FLOOR: u128 = 10_000_000_000_000_000;
}

/// Constants used when estimating the post-trade price adjustment
pub mod price_adjustment {
    /// Marginal price probe size: `xp0 / 1e6`
    pub const PRICE_PROBE_DIVISOR: u128 = 1_000_000;

    /// Trades at or below this size (native units) do not set the last price
    pub const MIN_PRICED_TRADE: u128 = 100_000;

    /// `halfpow` returns zero once the integer exponent exceeds this
    pub const HALFPOW_MAX_INTEGER_POWER: u32 = 59;
}

//! # Curve AMM Library - Bit-Exact Curve Quote Engine
//!
//! ## Purpose
//!
//! Integer reproduction of the swap math of StableSwap and adaptive crypto
//! (Aqua / Curve v2 style) pools. Given a pool snapshot and a trade, the
//! engine returns exactly the output the pool contract would pay, without
//! executing anything on-chain.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Reserve snapshots and curve parameters decoded by exchange adapters
//! - **Output Destinations**: Route finders and aggregators comparing pools
//! - **Protocol Support**: SyncSwap stable pools, SyncSwap Aqua pools
//! - **Precision**: Native token units in and out, 18-decimal working precision inside
//! - **Validation**: Optional 256/128-bit ceiling checks on every intermediate
//!
//! ## Architecture Role
//!
//! The curve solvers have no closed form, so every quote runs bounded Newton
//! iterations over big integers. Pools the formulas cannot safely price come
//! back as [`QuoteOutcome::Unpriceable`] instead of an error so a single
//! degenerate pool never aborts a wider routing computation.
//!
//! See [`architecture_diagram()`] for visual representation of the data flow.
//!
//! ## Example
//!
//! ```rust
//! use curve_amm::{FeeBand, PoolReserves, QuoteEngine, QuoteRequest, StableCurveParams};
//!
//! let engine = QuoteEngine::default();
//! let request = QuoteRequest::new(
//!     1_000_000_000_000_000_000u128,
//!     PoolReserves::new(1_000_000_000_000_000_000_000u128, 1_000_000_000_000_000_000_000u128),
//!     StableCurveParams::with_amplification(1000u32),
//! )
//! .with_fee_band(FeeBand::flat(100).unwrap());
//!
//! let out = engine.amount_out_stable(&request).unwrap();
//! assert_eq!(out.to_string(), "998999002996005985");
//! ```

pub mod crypto_math;
pub mod dynamic_fee;
pub mod error;
pub mod fixed_point;
pub mod param_ramp;
pub mod pool_traits;
pub mod price_tweak;
pub mod quote;
pub mod stable_math;
pub mod types;

pub use crypto_math::CryptoMath;
pub use dynamic_fee::compute_fee;
pub use error::{Ceiling, QuoteError, SolverError, Unpriceable};
pub use fixed_point::FixedPoint;
pub use param_ramp::InvariantSource;
pub use pool_traits::{CryptoPool, CurvePool, PoolType, StablePool};
pub use price_tweak::{PostTradeEstimate, PostTradeInput, PriceOracleState};
pub use quote::{QuoteDiagnostics, QuoteEngine, QuoteOutcome};
pub use stable_math::StableMath;
pub use types::{
    CryptoCurveParams, FeeBand, PoolReserves, PrecisionMultiplier, QuoteRequest,
    StableCurveParams, SwapDirection,
};

/// Common types for curve calculations
pub use num_bigint::BigUint;

/// Architecture diagram showing quote data flow and component relationships
#[cfg_attr(doc, aquamarine::aquamarine)]
/// ```mermaid
/// graph LR
///     subgraph Input["📊 Pool Snapshot"]
///         RS[Reserves]
///         PM[Precision Multipliers]
///         CP[Curve Params]
///         FB[Fee Band]
///     end
///
///     subgraph Facade["🧭 Quote Facade"]
///         NZ[Normalize]
///         DN[De-normalize]
///     end
///
///     subgraph Solvers["🧮 Curve Solvers"]
///         SM[StableSwap D / getY]
///         PR[Parameter Ramp]
///         CM[newton_D / newton_y]
///         DF[Dynamic Fee]
///     end
///
///     subgraph Output["🎯 Outcome"]
///         PQ[Priced + Diagnostics]
///         UP[Unpriceable]
///         PT[Post-Trade Estimate]
///     end
///
///     RS --> NZ
///     PM --> NZ
///     CP --> PR
///     FB --> DF
///
///     NZ --> SM
///     NZ --> PR
///     PR --> CM
///     CM --> DF
///
///     SM --> DN
///     DF --> DN
///     DN --> PQ
///     CM -.unsafe state.-> UP
///     CM --> PT
///
///     style Input fill:#e1f5fe
///     style Facade fill:#fff3e0
///     style Solvers fill:#f3e5f5
///     style Output fill:#e8f5e9
/// ```
pub fn architecture_diagram() {
    // This function exists solely for documentation purposes
    // The diagram is rendered by aquamarine in rustdoc
}

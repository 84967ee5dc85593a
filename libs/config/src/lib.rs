//! # Curve Quote Configuration
//!
//! Centralized configuration and protocol constants for the curve quote
//! engine, so solver defaults are never scattered across the codebase as
//! process-wide mutable state.
//!
//! ## Features
//!
//! - **Protocol Constants**: WAD precision, fee denominator, amplification
//!   multiplier and the crypto-curve safety bounds
//! - **Solver Configuration**: Default amplification and loop limits as a
//!   single immutable [`SolverConfig`]
//! - **Layered Loading**: TOML file, environment-specific override file and
//!   `CURVE_` environment variables
//!
//! ## Usage
//!
//! ```rust
//! use curve_config::{protocol, SolverConfig};
//!
//! let config = SolverConfig::default();
//! assert_eq!(config.default_stable_amplification, 1000);
//! assert_eq!(protocol::FEE_DENOMINATOR, 100_000);
//! ```

pub mod protocol;
pub mod solver_config;

// Re-export commonly used types
pub use protocol::*;
pub use solver_config::{load_solver_config, SolverConfig};

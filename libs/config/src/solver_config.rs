//! Solver Configuration Module
//!
//! Provides the immutable [`SolverConfig`] injected into the quote engine and
//! loading from TOML files with environment-specific overrides.

use anyhow::{ensure, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default location of the solver configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/solver.toml";

/// Tunables for the curve solvers
///
/// Loop limits bound every Newton iteration; they double as the per-call
/// timeout since no solver loop can run past them.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SolverConfig {
    /// Amplification used when a stable pool does not report `A`
    pub default_stable_amplification: u64,

    /// Iteration cap for the StableSwap invariant and `getY` loops
    pub stable_loop_limit: usize,

    /// Iteration cap for the crypto-curve `newton_D` / `newton_y` loops
    pub crypto_loop_limit: usize,

    /// Iteration cap for the scaled integer square root
    pub sqrt_loop_limit: usize,

    /// Series truncation threshold for `halfpow` (WAD scaled)
    pub halfpow_precision: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            default_stable_amplification: 1000,
            stable_loop_limit: 256,
            crypto_loop_limit: 255,
            sqrt_loop_limit: 256,
            halfpow_precision: 10_000_000_000,
        }
    }
}

impl SolverConfig {
    /// Load configuration from files with environment overrides
    ///
    /// Layers, lowest priority first: built-in defaults, the base file
    /// (optional), `config/environments/<env>.toml`, then `CURVE_*`
    /// environment variables.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));

        let defaults =
            Config::try_from(&Self::default()).context("Failed to serialize default config")?;
        let mut builder = Config::builder().add_source(defaults);

        if base.exists() {
            debug!("Loading solver config: {:?}", base);
            builder = builder.add_source(File::from(base).required(true));
        } else {
            info!("Solver config {:?} not found, using defaults", base);
        }

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = PathBuf::from("config/environments").join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (CURVE_ prefix)
        builder = builder.add_source(
            Environment::with_prefix("CURVE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from TOML text, filling omitted fields with defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse solver config")?;
        config.validate()?;
        Ok(config)
    }

    /// Render this configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).context("Failed to render solver config")
    }

    /// Reject settings the solvers cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.default_stable_amplification > 0,
            "default_stable_amplification must be positive"
        );
        ensure!(self.stable_loop_limit > 0, "stable_loop_limit must be positive");
        ensure!(self.crypto_loop_limit > 0, "crypto_loop_limit must be positive");
        ensure!(self.sqrt_loop_limit > 0, "sqrt_loop_limit must be positive");
        ensure!(self.halfpow_precision > 0, "halfpow_precision must be positive");
        Ok(())
    }
}

/// Convenience function to load configuration from a path that may contain
/// `~` or `$VAR` references
pub fn load_solver_config(path: Option<&str>, environment: Option<&str>) -> Result<SolverConfig> {
    let expanded = match path {
        Some(raw) => Some(PathBuf::from(
            shellexpand::full(raw)
                .context("Failed to expand solver config path")?
                .as_ref(),
        )),
        None => None,
    };
    SolverConfig::load(expanded.as_deref(), environment)
}

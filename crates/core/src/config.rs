//! Run configuration
//!
//! [`RelayConfig`] is the fully resolved configuration for one relay run.
//! It can be loaded from a JSON file; missing fields fall back to the same
//! defaults the CLI flags document. The CLI merges explicit flags on top of
//! whatever the file provided.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ConfigError, Endpoint, NoiseParams, ParseError, RelayMode};

/// Resolved configuration for one relay process run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Endpoint A address.
    pub host_a: Endpoint,

    /// Endpoint B address.
    pub host_b: Endpoint,

    /// Seed for the pseudorandom generator that adds noise to stream A->B.
    #[serde(default = "default_seed_ab")]
    pub seed_ab: u64,

    /// Seed for the pseudorandom generator that adds noise to stream B->A.
    #[serde(default = "default_seed_ba")]
    pub seed_ba: u64,

    /// Probability that a byte is injected with an error.
    #[serde(default = "default_error_rate")]
    pub error_rate: f64,

    /// Probability that an injected error deletes the byte.
    #[serde(default = "default_deletion_chance")]
    pub deletion_chance: f64,

    /// Concurrency strategy.
    #[serde(default)]
    pub mode: RelayMode,

    /// Plain-text dump of relayed traffic.
    #[serde(default)]
    pub text_dump: bool,

    /// Hexadecimal dump of relayed traffic.
    #[serde(default)]
    pub hex_dump: bool,

    /// Log verbosity: 0 = off, 1 = error, 2 = warn, 3 = info, 4+ = debug.
    #[serde(default = "default_verbosity")]
    pub verbosity: u8,
}

fn default_seed_ab() -> u64 {
    12345
}

fn default_seed_ba() -> u64 {
    23456
}

fn default_error_rate() -> f64 {
    0.002
}

fn default_deletion_chance() -> f64 {
    0.2
}

fn default_verbosity() -> u8 {
    1
}

impl RelayConfig {
    /// Create a configuration with default tuning for the given endpoints.
    pub fn new(host_a: Endpoint, host_b: Endpoint) -> Self {
        Self {
            host_a,
            host_b,
            seed_ab: default_seed_ab(),
            seed_ba: default_seed_ba(),
            error_rate: default_error_rate(),
            deletion_chance: default_deletion_chance(),
            mode: RelayMode::default(),
            text_dump: false,
            hex_dump: false,
            verbosity: default_verbosity(),
        }
    }

    /// Load a configuration from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: RelayConfig =
            serde_json::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Validate value ranges (the rates; endpoints validate at parse time).
    pub fn validate(&self) -> Result<(), ParseError> {
        NoiseParams::new(self.error_rate, self.deletion_chance)?;
        Ok(())
    }

    /// The corruption rates as validated parameters.
    pub fn noise_params(&self) -> Result<NoiseParams, ParseError> {
        NoiseParams::new(self.error_rate, self.deletion_chance)
    }
}

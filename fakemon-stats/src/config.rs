//! Generator settings: chain length, stat granularity and seed.
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::stat::MAX_STAGES;

/// Coarsest stat granularity the generator accepts.
pub const MAX_STAT_INCREMENT: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "GeneratorConfig::default_num_stages")]
    pub num_stages: u8,
    #[serde(default = "GeneratorConfig::default_stat_increment")]
    pub stat_increment: u32,
    /// Fixed seed for reproducible runs; `None` lets the host pick one.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl GeneratorConfig {
    const fn default_num_stages() -> u8 {
        3
    }

    const fn default_stat_increment() -> u32 {
        5
    }

    /// Load and validate configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or validation fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check chain length and increment bounds.
    ///
    /// # Errors
    ///
    /// Returns the first violated bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_stages == 0 || self.num_stages > MAX_STAGES {
            return Err(ConfigError::StageCountOutOfRange {
                value: self.num_stages,
                max: MAX_STAGES,
            });
        }
        if self.stat_increment == 0 {
            return Err(ConfigError::ZeroIncrement);
        }
        if self.stat_increment > MAX_STAT_INCREMENT {
            return Err(ConfigError::IncrementOutOfRange {
                value: self.stat_increment,
                max: MAX_STAT_INCREMENT,
            });
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_stages: Self::default_num_stages(),
            stat_increment: Self::default_stat_increment(),
            seed: None,
        }
    }
}

use lendmon_chain::OracleConfig;
use lendmon_positions::{ConcentrationConfig, HealthFactorConfig};
use serde::Deserialize;

/// Top-level service configuration, one section per monitoring family.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub oracle: OracleConfig,
    pub health_factor: HealthFactorConfig,
    pub concentration: ConcentrationConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads the config file, falling back to the documented defaults
    /// when it is missing or malformed.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path, error = %e, "could not load config, using defaults");
                Self::default()
            }
        }
    }
}

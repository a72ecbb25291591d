use crate::model::Params;
use crate::policy::Policy;
use crate::utils::check_num;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Model parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Intrinsic growth rate per step.
    pub growth_rate: f64,
    /// Carrying capacity of the stock.
    pub carrying_capacity: f64,
    /// Revenue per unit harvested.
    pub price: f64,
    /// Magnitude of the growth noise.
    pub volatility: f64,
}

/// Initial condition parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    /// Stock size at the start of every episode.
    pub population: f64,
    /// Seed of the random number generators (operating system entropy if absent).
    pub seed: Option<u64>,
}

/// Output parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Number of episodes written per episodes file.
    pub episodes_per_file: usize,
    /// Number of steps between rendered rows (0 disables rendering).
    pub steps_per_render: usize,
}

/// Simulation configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub init: InitConfig,
    pub policy: Policy,
    pub output: OutputConfig,
}

impl Config {
    /// Load a [`Config`] from a TOML file and validate it.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::parse(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    /// Episode parameters described by this configuration.
    pub fn params(&self) -> Params {
        Params {
            init_population: self.init.population,
            growth_rate: self.model.growth_rate,
            carrying_capacity: self.model.carrying_capacity,
            price: self.model.price,
            volatility: self.model.volatility,
        }
    }

    fn validate(&self) -> Result<()> {
        self.params().validate().context("invalid model parameters")?;
        self.policy.validate().context("invalid policy")?;

        check_num(self.output.episodes_per_file, 1..100_000)
            .context("invalid number of episodes per file")?;
        check_num(self.output.steps_per_render, 0..10_000)
            .context("invalid number of steps per render")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[model]
growth_rate = 0.1
carrying_capacity = 1.0
price = 2.0
volatility = 0.05

[init]
population = 0.75
seed = 42

[policy]
kind = "threshold"
target = 0.5

[output]
episodes_per_file = 8
steps_per_render = 100
"#;

    #[test]
    fn parses_full_config() {
        let cfg = Config::parse(CONFIG).unwrap();
        assert_eq!(cfg.init.seed, Some(42));
        assert_eq!(cfg.policy, Policy::Threshold { target: 0.5 });
        assert_eq!(cfg.output.episodes_per_file, 8);

        let params = cfg.params();
        assert_eq!(params.init_population, 0.75);
        assert_eq!(params.price, 2.0);
        assert_eq!(params.volatility, 0.05);
    }

    #[test]
    fn seed_is_optional() {
        let contents = CONFIG.replace("seed = 42\n", "");
        let cfg = Config::parse(&contents).unwrap();
        assert_eq!(cfg.init.seed, None);
    }

    #[test]
    fn parses_fixed_policy() {
        let contents = CONFIG.replace("kind = \"threshold\"\ntarget = 0.5", "kind = \"fixed\"\naction = 1");
        let cfg = Config::parse(&contents).unwrap();
        assert_eq!(cfg.policy, Policy::Fixed { action: 1 });
    }

    #[test]
    fn rejects_negative_volatility() {
        let contents = CONFIG.replace("volatility = 0.05", "volatility = -0.05");
        let err = Config::parse(&contents).unwrap_err();
        assert!(format!("{err:#}").contains("invalid volatility"));
    }

    #[test]
    fn rejects_zero_episodes() {
        let contents = CONFIG.replace("episodes_per_file = 8", "episodes_per_file = 0");
        assert!(Config::parse(&contents).is_err());
    }

    #[test]
    fn rejects_missing_section() {
        let contents = CONFIG.replace("[policy]\nkind = \"threshold\"\ntarget = 0.5\n", "");
        assert!(Config::parse(&contents).is_err());
    }
}

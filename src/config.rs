use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Initial population parameters.
    pub init: InitConfig,
    /// Per-agent rule parameters.
    pub model: ModelConfig,
    /// Run length and random seed.
    pub output: OutputConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitConfig {
    /// Number of agents.
    pub n_agents: usize,

    /// Grid width.
    pub width: usize,
    /// Grid height.
    pub height: usize,

    /// Probability of starting out infected.
    pub initial_infection: f64,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            n_agents: 100,
            width: 10,
            height: 10,
            initial_infection: 0.05,
        }
    }
}

/// Parameters shared by every agent of a run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Probability of infecting a cellmate on contact.
    pub transmissibility: f64,
    /// Probability of moving each step.
    pub level_of_movement: f64,
    /// Mean length of disease in steps.
    pub mean_length_of_disease: f64,

    /// Multiplier on the transmission probability of a vaccinated infector.
    pub risk_factor: f64,

    /// Local pro-vaccine peer factor (accepted but not applied).
    pub local_pro_factor: f64,
    /// Local anti-vaccine peer factor (accepted but not applied).
    pub local_anti_factor: f64,

    /// Propensity multiplier applied while prevalence is above the threshold.
    pub global_pro_factor: f64,
    /// Prevalence above which the global pro-vaccine factor applies.
    pub global_pro_factor_threshold: f64,

    /// How prevalence is observed during a round.
    pub prevalence: PrevalenceMode,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            transmissibility: 0.25,
            level_of_movement: 0.9,
            mean_length_of_disease: 7.0,
            risk_factor: 0.4,
            local_pro_factor: 1.01,
            local_anti_factor: 0.99,
            global_pro_factor: 1.01,
            global_pro_factor_threshold: 0.5,
            prevalence: PrevalenceMode::RoundStart,
        }
    }
}

/// Source of the prevalence seen by the vaccination feedback.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrevalenceMode {
    /// Snapshot taken once before the round starts.
    #[default]
    RoundStart,
    /// Recomputed from the live population before every agent step.
    Live,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Number of steps to simulate.
    pub n_steps: usize,
    /// Random seed (drawn from the OS when absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            n_steps: 100,
            seed: None,
        }
    }
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded; missing keys take their default values.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    /// Serialize the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }

    pub fn validate(&self) -> Result<()> {
        let init = &self.init;
        check_num(init.n_agents, 1..=10_000).context("invalid number of agents")?;
        check_num(init.width, 1..=1_000).context("invalid grid width")?;
        check_num(init.height, 1..=1_000).context("invalid grid height")?;
        check_num(init.initial_infection, 0.0..=1.0)
            .context("invalid initial infection probability")?;

        let model = &self.model;
        check_num(model.transmissibility, 0.0..=1.0).context("invalid transmissibility")?;
        check_num(model.level_of_movement, 0.0..=1.0).context("invalid level of movement")?;
        check_num(model.mean_length_of_disease, 1.0..=1_000.0)
            .context("invalid mean length of disease")?;
        check_num(model.risk_factor, 0.0..=1.0).context("invalid risk factor")?;
        check_num(model.local_pro_factor, 0.0..=2.0).context("invalid local pro-vaccine factor")?;
        check_num(model.local_anti_factor, 0.0..=2.0)
            .context("invalid local anti-vaccine factor")?;
        check_num(model.global_pro_factor, 1.0..=2.0)
            .context("invalid global pro-vaccine factor")?;
        check_num(model.global_pro_factor_threshold, 0.0..=1.0)
            .context("invalid global pro-vaccine factor threshold")?;

        check_num(self.output.n_steps, 1..=1_000_000).context("invalid number of steps")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

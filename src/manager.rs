use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::Serialize;
use std::path::Path;
use vaxsim::analysis::Analyzer;
use vaxsim::collector::Record;
use vaxsim::config::Config;
use vaxsim::engine::Engine;

/// Builds and runs simulations for the command line.
pub struct Manager {
    cfg: Config,
}

#[derive(Serialize)]
struct History<'a> {
    records: &'a [Record],
}

impl Manager {
    /// Load the configuration from `file`, or use the defaults.
    pub fn new(file: Option<&Path>, seed: Option<u64>, n_steps: Option<usize>) -> Result<Self> {
        let mut cfg = match file {
            Some(file) => {
                Config::from_file(file).with_context(|| format!("failed to load {file:?}"))?
            }
            None => Config::default(),
        };

        if seed.is_some() {
            cfg.output.seed = seed;
        }
        if let Some(n_steps) = n_steps {
            cfg.output.n_steps = n_steps;
        }
        cfg.validate().context("invalid command line overrides")?;
        log::info!("{cfg:#?}");

        Ok(Self { cfg })
    }

    /// Simulate and return the full history as TOML.
    pub fn run_simulation(&self) -> Result<String> {
        let engine = self.simulate().context("failed to simulate")?;
        let history = History {
            records: engine.collector().history(),
        };
        toml::to_string_pretty(&history).context("failed to serialize history")
    }

    /// Simulate and return the summary report as TOML.
    pub fn run_analysis(&self) -> Result<String> {
        let engine = self.simulate().context("failed to simulate")?;
        let mut analyzer = Analyzer::new();
        analyzer.add_records(engine.collector().history());
        let report = analyzer.report().context("failed to build report")?;
        toml::to_string_pretty(&report).context("failed to serialize report")
    }

    /// Return the effective configuration as TOML.
    pub fn config_toml(&self) -> Result<String> {
        self.cfg.to_toml()
    }

    fn simulate(&self) -> Result<Engine> {
        let rng = match self.cfg.output.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng().context("failed to seed rng")?,
        };

        let mut engine = Engine::new(&self.cfg, rng).context("failed to construct engine")?;
        engine.run(self.cfg.output.n_steps);

        Ok(engine)
    }
}

//! Application configuration.
//!
//! Input and output paths come from, in increasing priority: built-in
//! defaults, environment variables (a `.env` file is loaded first when
//! present), then command line overrides.

use std::path::PathBuf;

use crate::error::{PipelineError, PipelineResult};

/// Raw Eurostat extract.
pub const DEFAULT_INPUT_PATH: &str = "data/eu_life_expectancy_raw.tsv";

/// Cleaned Portuguese series.
pub const DEFAULT_OUTPUT_PATH: &str = "data/pt_life_expectancy.csv";

/// Environment variable overriding the input path.
pub const INPUT_ENV: &str = "LIFE_EXPECTANCY_INPUT";

/// Environment variable overriding the output path.
pub const OUTPUT_ENV: &str = "LIFE_EXPECTANCY_OUTPUT";

/// File locations for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment (after loading `.env`).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        let defaults = Self::default();

        Self {
            input_path: get(INPUT_ENV).unwrap_or(defaults.input_path),
            output_path: get(OUTPUT_ENV).unwrap_or(defaults.output_path),
        }
    }

    /// Apply command line overrides.
    pub fn with_overrides(mut self, input: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        if let Some(input) = input {
            self.input_path = input;
        }
        if let Some(output) = output {
            self.output_path = output;
        }
        self
    }

    /// Reject a run that would overwrite its own input.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.input_path == self.output_path {
            return Err(PipelineError::Config(format!(
                "output path '{}' is the input file",
                self.output_path.display()
            )));
        }
        Ok(())
    }
}

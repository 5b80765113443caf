//! Layered runtime settings.
//!
//! Sources, lowest priority first: built-in defaults, an optional TOML file,
//! `LINEWATCH_*` environment variables. Command-line flags are applied on top
//! by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::sim::{SimulationParams, Thresholds};

/// Environment variable prefix, e.g. `LINEWATCH_LINE_COUNT=12`.
pub const ENV_PREFIX: &str = "LINEWATCH";

/// Upper bound on simulated lines.
pub const MAX_LINE_COUNT: usize = 1000;
/// Upper bound on the tick interval: one day.
pub const MAX_TICK_INTERVAL_MS: u64 = 24 * 60 * 60 * 1000;

/// Runtime settings for the simulator and dashboard.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub line_count: usize,
    pub tick_interval_ms: u64,
    pub history_len: usize,
    pub log_capacity: usize,
    pub threshold_min: f64,
    pub threshold_max: f64,
    /// Volts added or removed per threshold key press.
    pub threshold_step: f64,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let params = SimulationParams::default();
        Self {
            line_count: params.line_count,
            tick_interval_ms: 1500,
            history_len: params.history_len,
            log_capacity: params.log_capacity,
            threshold_min: params.thresholds.min,
            threshold_max: params.thresholds.max,
            threshold_step: 5.0,
            seed: None,
            log_file: None,
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus the environment.
    ///
    /// The result is not validated; callers apply their own overrides first
    /// and then call [`validate`](Self::validate).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("failed to read configuration")?;

        config.try_deserialize().context("invalid configuration values")
    }

    /// Reject settings the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_LINE_COUNT).contains(&self.line_count) {
            anyhow::bail!("line_count must be between 1 and {}", MAX_LINE_COUNT);
        }
        if !(1..=MAX_TICK_INTERVAL_MS).contains(&self.tick_interval_ms) {
            anyhow::bail!("tick_interval_ms must be between 1 and {}", MAX_TICK_INTERVAL_MS);
        }
        if !(self.threshold_step.is_finite() && self.threshold_step > 0.0) {
            anyhow::bail!("threshold_step must be a positive number");
        }
        self.thresholds()?;
        Ok(())
    }

    pub fn thresholds(&self) -> Result<Thresholds> {
        Ok(Thresholds::new(self.threshold_min, self.threshold_max)?)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Simulation sizing derived from these settings.
    pub fn simulation_params(&self) -> Result<SimulationParams> {
        Ok(SimulationParams {
            line_count: self.line_count,
            history_len: self.history_len,
            log_capacity: self.log_capacity,
            thresholds: self.thresholds()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_simulation_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.line_count, 8);
        assert_eq!(settings.tick_interval(), Duration::from_millis(1500));
        assert_eq!(settings.history_len, 30);
        assert_eq!(settings.log_capacity, 100);
        assert_eq!(settings.thresholds().unwrap(), Thresholds::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn load_reads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "line_count = 4\nthreshold_min = 190.0\nseed = 99").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.line_count, 4);
        assert_eq!(settings.threshold_min, 190.0);
        assert_eq!(settings.threshold_max, 260.0);
        assert_eq!(settings.seed, Some(99));
    }

    #[test]
    fn inverted_file_thresholds_can_be_overridden() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "threshold_min = 300.0\nthreshold_max = 200.0").unwrap();

        let mut settings = Settings::load(Some(file.path())).unwrap();
        assert!(settings.validate().is_err());

        settings.threshold_min = 190.0;
        settings.threshold_max = 250.0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn oversized_values_are_invalid() {
        let huge_interval = Settings {
            tick_interval_ms: 1_000_000_000_000_000,
            ..Settings::default()
        };
        assert!(huge_interval.validate().is_err());

        let too_many_lines = Settings {
            line_count: MAX_LINE_COUNT + 1,
            ..Settings::default()
        };
        assert!(too_many_lines.validate().is_err());

        let at_limits = Settings {
            line_count: MAX_LINE_COUNT,
            tick_interval_ms: MAX_TICK_INTERVAL_MS,
            ..Settings::default()
        };
        assert!(at_limits.validate().is_ok());
    }

    #[test]
    fn load_missing_file_fails() {
        let missing = Path::new("/nonexistent/linewatch.toml");
        assert!(Settings::load(Some(missing)).is_err());
    }

    #[test]
    fn zero_lines_is_invalid() {
        let settings = Settings {
            line_count: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}

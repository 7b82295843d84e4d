//! Dashboard Configuration
//! Sample data sizes, reference levels and window settings, loadable from JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Settings for sample data generation, chart constants and the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Seed for the sample table and coordinates. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub periods: usize,
    pub start_year: i32,
    pub start_month: u32,
    pub coordinate_count: usize,
    pub threshold: f64,
    pub next_hundred: f64,
    pub noise_std: f64,
    /// Fixed seed used by the noise, GPS warning and bearing charts.
    pub chart_seed: u64,
    pub dark_mode: bool,
    pub window_width: f32,
    pub window_height: f32,
    pub export_width: u32,
    pub export_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            seed: None,
            periods: 100,
            start_year: 2020,
            start_month: 1,
            coordinate_count: 100,
            threshold: 1000.0,
            next_hundred: 2000.0,
            noise_std: 10_000_000.0,
            chart_seed: 42,
            dark_mode: false,
            window_width: 1400.0,
            window_height: 900.0,
            export_width: 1200,
            export_height: 700,
        }
    }
}

impl DashboardConfig {
    /// Load a config file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.periods == 0 {
            return Err(ConfigError::Invalid("periods must be positive".to_string()));
        }
        if !(1..=12).contains(&self.start_month) {
            return Err(ConfigError::Invalid(format!(
                "start_month must be 1..=12, got {}",
                self.start_month
            )));
        }
        if self.noise_std.is_nan() || self.noise_std < 0.0 {
            return Err(ConfigError::Invalid(
                "noise_std must be non-negative".to_string(),
            ));
        }
        if self.export_width == 0 || self.export_height == 0 {
            return Err(ConfigError::Invalid(
                "export size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_demo_constants() {
        let config = DashboardConfig::default();
        assert_eq!(config.periods, 100);
        assert_eq!(config.threshold, 1000.0);
        assert_eq!(config.next_hundred, 2000.0);
        assert_eq!(config.chart_seed, 42);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "seed": 7, "periods": 24 }}"#).unwrap();

        let config = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.periods, 24);
        assert_eq!(config.coordinate_count, 100);
    }

    #[test]
    fn rejects_bad_start_month() {
        let config = DashboardConfig {
            start_month: 13,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            DashboardConfig::load(file.path()),
            Err(ConfigError::Json(_))
        ));
    }
}

//! Calibration settings
//!
//! Defaults mirror the constants the calibrator has always used; a TOML file
//! and a handful of environment variables can override them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::anomaly::DEFAULT_WINDOW;
use crate::error::{CalibratorError, Result};

pub const DEFAULT_DENSE_LOCATION: usize = 1000;
pub const DEFAULT_MIN_LOCATION: f64 = 0.1;
pub const DEFAULT_MAX_LOCATION: f64 = 0.9;
pub const DEFAULT_NUM_LOCATIONS: usize = 20;
pub const DEFAULT_IMAGE_FOLDER: &str = "images/";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalibratorConfig {
    /// Half-width of the local-mean window
    #[serde(default = "default_window")]
    pub window: usize,

    /// Size of the dense candidate grid
    #[serde(default = "default_dense_locations")]
    pub dense_locations: usize,

    #[serde(default = "default_min_location")]
    pub min_location: f64,

    #[serde(default = "default_max_location")]
    pub max_location: f64,

    /// Rows per generated dataset
    #[serde(default = "default_num_locations")]
    pub num_locations: usize,

    /// Fixed threshold; drawn at random when absent
    #[serde(default)]
    pub threshold: Option<f64>,

    /// RNG seed; OS entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_image_folder")]
    pub image_folder: PathBuf,

    /// CSV column holding the signal
    #[serde(default = "default_value_column")]
    pub value_column: String,

    #[serde(default)]
    pub datetime_column: Option<String>,
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_dense_locations() -> usize {
    DEFAULT_DENSE_LOCATION
}

fn default_min_location() -> f64 {
    DEFAULT_MIN_LOCATION
}

fn default_max_location() -> f64 {
    DEFAULT_MAX_LOCATION
}

fn default_num_locations() -> usize {
    DEFAULT_NUM_LOCATIONS
}

fn default_image_folder() -> PathBuf {
    PathBuf::from(DEFAULT_IMAGE_FOLDER)
}

fn default_value_column() -> String {
    "y".to_string()
}

impl Default for CalibratorConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            dense_locations: default_dense_locations(),
            min_location: default_min_location(),
            max_location: default_max_location(),
            num_locations: default_num_locations(),
            threshold: None,
            seed: None,
            image_folder: default_image_folder(),
            value_column: default_value_column(),
            datetime_column: None,
        }
    }
}

impl CalibratorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply `CALIBRATOR_SEED`, `CALIBRATOR_WINDOW` and `CALIBRATOR_IMAGE_FOLDER`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(seed) = std::env::var("CALIBRATOR_SEED") {
            let seed = seed.trim().parse::<u64>().map_err(|_| {
                CalibratorError::InvalidConfig(format!("CALIBRATOR_SEED={seed:?} is not a u64"))
            })?;
            self.seed = Some(seed);
        }
        if let Ok(window) = std::env::var("CALIBRATOR_WINDOW") {
            self.window = window.trim().parse::<usize>().map_err(|_| {
                CalibratorError::InvalidConfig(format!("CALIBRATOR_WINDOW={window:?} is not a usize"))
            })?;
        }
        if let Ok(folder) = std::env::var("CALIBRATOR_IMAGE_FOLDER") {
            self.image_folder = PathBuf::from(folder);
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(CalibratorError::InvalidConfig("window must be positive".into()));
        }
        if self.dense_locations == 0 {
            return Err(CalibratorError::InvalidConfig(
                "dense_locations must be positive".into(),
            ));
        }
        validate_location_range(self.min_location, self.max_location)?;
        if let Some(t) = self.threshold {
            if !t.is_finite() {
                return Err(CalibratorError::InvalidConfig(format!(
                    "threshold must be finite, got {t}"
                )));
            }
        }
        Ok(())
    }
}

pub fn validate_location_range(min: f64, max: f64) -> Result<()> {
    let ok = (0.0..=1.0).contains(&min) && (0.0..=1.0).contains(&max) && min <= max;
    if ok {
        Ok(())
    } else {
        Err(CalibratorError::InvalidLocationRange { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let c = CalibratorConfig::default();
        assert_eq!(c.window, 50);
        assert_eq!(c.dense_locations, 1000);
        assert_eq!(c.min_location, 0.1);
        assert_eq!(c.max_location, 0.9);
        assert_eq!(c.value_column, "y");
        assert!(c.threshold.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let c = CalibratorConfig::from_toml_str("window = 5\nseed = 7\n").unwrap();
        assert_eq!(c.window, 5);
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.dense_locations, DEFAULT_DENSE_LOCATION);
        assert_eq!(c.image_folder, PathBuf::from("images/"));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = CalibratorConfig::from_toml_str("min_location = 0.8\nmax_location = 0.2\n")
            .unwrap_err();
        assert!(matches!(err, CalibratorError::InvalidLocationRange { .. }));
    }

    #[test]
    fn zero_window_is_rejected() {
        let c = CalibratorConfig { window: 0, ..Default::default() };
        assert!(matches!(c.validate(), Err(CalibratorError::InvalidConfig(_))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            CalibratorConfig::from_toml_str("window = \"wide\""),
            Err(CalibratorError::ConfigParse(_))
        ));
    }
}

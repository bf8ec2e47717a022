//! Artifact locations
//!
//! The library only ever receives an [`EstimatorConfig`]; reading the
//! environment is left to the binary via [`EstimatorConfig::from_env`].

use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_MODEL_FILE: &str = "crop_yield_model.json";
pub const DEFAULT_SCALER_FILE: &str = "scaler.json";
pub const DEFAULT_DATASET_FILE: &str = "processed_crop_yield.csv";

/// Paths to the three startup artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimatorConfig {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub dataset_path: PathBuf,
}

impl EstimatorConfig {
    /// Default file names inside `dir`
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model_path: dir.join(DEFAULT_MODEL_FILE),
            scaler_path: dir.join(DEFAULT_SCALER_FILE),
            dataset_path: dir.join(DEFAULT_DATASET_FILE),
        }
    }

    /// Configuration from environment variables
    ///
    /// - `CROP_YIELD_DATA_DIR` (default `data`)
    /// - `CROP_YIELD_MODEL`, `CROP_YIELD_SCALER`, `CROP_YIELD_DATASET`
    ///   override individual artifact paths
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup("CROP_YIELD_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let mut config = Self::from_dir(data_dir);

        if let Some(path) = lookup("CROP_YIELD_MODEL") {
            config.model_path = path.into();
        }
        if let Some(path) = lookup("CROP_YIELD_SCALER") {
            config.scaler_path = path.into();
        }
        if let Some(path) = lookup("CROP_YIELD_DATASET") {
            config.dataset_path = path.into();
        }

        config
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::from_dir(DEFAULT_DATA_DIR)
    }
}

//! Startup error model.
//!
//! Everything in here is fatal: the predictor refuses to serve requests
//! until the model, scaler and reference dataset load cleanly and agree on
//! feature order. Per-request problems (bad numeric input) are not errors,
//! see [`crate::assembler::InputWarning`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type used by the loading and validation layer
pub type StartupResult<T> = Result<T, StartupError>;

/// Fatal configuration or data error detected before serving requests
#[derive(Debug, Error)]
pub enum StartupError {
    /// An artifact file could not be read
    #[error("missing artifact {path:?}: {source}")]
    MissingArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact file was read but could not be decoded
    #[error("corrupt artifact {path:?}: {source}")]
    CorruptArtifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The reference dataset has no usable rows
    #[error("no reference data in {0}")]
    NoReferenceData(String),

    /// A feature column is too large to average in f64
    #[error("reference column '{column}' overflows when averaged")]
    ReferenceOverflow { column: String },

    /// A required column is absent from the reference dataset
    #[error("reference dataset is missing column '{column}' (available: {available:?})")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// Scaler or model feature order disagrees with the expected feature order
    #[error("{artifact} feature order mismatch: expected {expected:?}, found {found:?}")]
    FeatureOrderMismatch {
        artifact: &'static str,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// The regression model is structurally unusable
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// The scaling transform is structurally unusable
    #[error("invalid scaler: {0}")]
    InvalidScaler(String),

    /// Dataframe operation failed while loading the reference dataset
    #[error("reference dataset error: {0}")]
    Data(#[from] polars::error::PolarsError),
}

impl StartupError {
    pub fn invalid_model(msg: impl Into<String>) -> Self {
        Self::InvalidModel(msg.into())
    }

    pub fn invalid_scaler(msg: impl Into<String>) -> Self {
        Self::InvalidScaler(msg.into())
    }
}

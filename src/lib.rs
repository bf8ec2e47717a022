//! Crop Yield Estimator
//!
//! Single-session yield estimation for a field described by crop, region and
//! soil plus up to five optional agronomic metrics.
//!
//! Pipeline:
//! - `data/`: reference dataset loading with Polars
//! - `defaults/`: per-context feature means with global fallback
//! - `assembler/`: user overrides merged with defaults, with provenance
//! - `estimator/`: fitted scaler + pre-trained regression model
//! - `advisory/`: fixed threshold rules producing suggestions
//! - `report/`: structured output and Markdown/HTML/JSON export
//!
//! `predictor` wires everything together behind [`YieldPredictor`].

pub mod advisory;
pub mod assembler;
pub mod config;
pub mod data;
pub mod defaults;
pub mod error;
pub mod estimator;
pub mod features;
pub mod logging;
pub mod predictor;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use advisory::{advise, AdviceCategory, Suggestion};
pub use assembler::{assemble, AssembledFeature, InputWarning, Provenance, RawInputs};
pub use config::EstimatorConfig;
pub use data::{ContextOptions, FieldContext, HistoricalRecord, ReferenceStore};
pub use defaults::{ContextDefaults, DefaultResolver, DefaultSource};
pub use error::{StartupError, StartupResult};
pub use estimator::{FeatureScaler, RegressionModel, Regressor, YieldEstimator};
pub use features::{FeatureKey, FeatureVector};
pub use predictor::{FieldRequest, YieldPredictor};
pub use report::{ReportFormat, YieldReport};

//! Yield Estimator
//!
//! Pairs the fitted feature scaler with the pre-trained regression model.
//! Both are loaded from JSON artifacts once at startup and checked against
//! the fixed feature order; after that, prediction is a pure function of the
//! assembled feature vector: scale, then infer.

pub mod model;
pub mod scaler;

pub use model::{ForestModel, LinearModel, RegressionModel, RegressionTree, Regressor};
pub use scaler::FeatureScaler;

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::error::{StartupError, StartupResult};
use crate::features::{FeatureKey, FeatureVector};

/// Read and decode a JSON artifact
pub fn read_json_artifact<T: DeserializeOwned>(path: &Path) -> StartupResult<T> {
    let contents = fs::read_to_string(path).map_err(|source| StartupError::MissingArtifact {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| StartupError::CorruptArtifact {
        path: path.to_path_buf(),
        source,
    })
}

/// Scaler + regression model, validated as a pair
#[derive(Debug)]
pub struct YieldEstimator {
    scaler: FeatureScaler,
    model: Box<dyn Regressor>,
}

impl YieldEstimator {
    /// Assemble an estimator from already-loaded parts
    ///
    /// # Errors
    /// Fails when either part is structurally invalid or its feature order
    /// differs from [`FeatureKey::ALL`].
    pub fn new(scaler: FeatureScaler, model: impl Regressor + 'static) -> StartupResult<Self> {
        scaler.validate()?;
        model.validate()?;

        check_feature_order("scaler", scaler.feature_names())?;
        check_feature_order("model", model.feature_names())?;

        Ok(Self {
            scaler,
            model: Box::new(model),
        })
    }

    /// Load both artifacts from JSON files
    pub fn load(model_path: &Path, scaler_path: &Path) -> StartupResult<Self> {
        let scaler: FeatureScaler = read_json_artifact(scaler_path)?;
        tracing::info!(path = %scaler_path.display(), "Loaded feature scaler");

        let model: RegressionModel = read_json_artifact(model_path)?;
        tracing::info!(path = %model_path.display(), kind = model_kind(&model), "Loaded regression model");

        Self::new(scaler, model)
    }

    /// Scale then infer; the two steps always run in this order
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        let scaled = self.scaler.transform(features.as_array());
        self.model.predict(&scaled)
    }

    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }
}

fn model_kind(model: &RegressionModel) -> &'static str {
    match model {
        RegressionModel::Linear(_) => "linear",
        RegressionModel::Forest(m) if m.trees.len() == 1 => "tree",
        RegressionModel::Forest(_) => "forest",
    }
}

fn check_feature_order(artifact: &'static str, found: &[String]) -> StartupResult<()> {
    let expected = FeatureKey::column_names();
    if found != expected.as_slice() {
        return Err(StartupError::FeatureOrderMismatch {
            artifact,
            expected,
            found: found.to_vec(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn standard_scaler(names: Vec<String>) -> FeatureScaler {
        FeatureScaler::Standard {
            feature_names: names,
            mean: vec![0.0, 500.0, 25.0, 0.5, 15.0],
            scale: vec![0.01, 100.0, 5.0, 0.1, 5.0],
        }
    }

    fn linear(names: Vec<String>) -> RegressionModel {
        RegressionModel::Linear(LinearModel {
            feature_names: names,
            coefficients: vec![0.1, 0.5, -0.3, 0.2, -0.1],
            intercept: 3.0,
        })
    }

    /// Returns the scaled Rain_Sum it was given
    #[derive(Debug)]
    struct EchoRainfall;

    impl Regressor for EchoRainfall {
        fn feature_names(&self) -> &[String] {
            static NAMES: std::sync::OnceLock<Vec<String>> = std::sync::OnceLock::new();
            NAMES.get_or_init(FeatureKey::column_names)
        }

        fn predict(&self, features: &[f64]) -> f64 {
            features[1]
        }
    }

    #[test]
    fn test_predict_scales_before_inference() {
        let estimator =
            YieldEstimator::new(standard_scaler(FeatureKey::column_names()), EchoRainfall).unwrap();
        let features = FeatureVector::new([0.02, 700.0, 25.0, 0.5, 15.0]);
        // Rain_Sum 700 standardizes to (700 - 500) / 100
        assert_relative_eq!(estimator.predict(&features), 2.0);
    }

    #[test]
    fn test_linear_prediction() {
        let names = FeatureKey::column_names();
        let estimator = YieldEstimator::new(standard_scaler(names.clone()), linear(names)).unwrap();
        let features = FeatureVector::new([0.0, 500.0, 25.0, 0.5, 15.0]);
        assert_relative_eq!(estimator.predict(&features), 3.0);
    }

    #[test]
    fn test_scaler_order_mismatch_is_fatal() {
        let mut names = FeatureKey::column_names();
        names.swap(0, 1);
        let err = YieldEstimator::new(standard_scaler(names), linear(FeatureKey::column_names()))
            .unwrap_err();
        assert!(matches!(
            err,
            StartupError::FeatureOrderMismatch { artifact: "scaler", .. }
        ));
    }

    #[test]
    fn test_model_order_mismatch_is_fatal() {
        let mut names = FeatureKey::column_names();
        names.reverse();
        let err = YieldEstimator::new(standard_scaler(FeatureKey::column_names()), linear(names))
            .unwrap_err();
        assert!(matches!(
            err,
            StartupError::FeatureOrderMismatch { artifact: "model", .. }
        ));
    }

    #[test]
    fn test_missing_artifact() {
        let err = read_json_artifact::<FeatureScaler>(Path::new("no/such/scaler.json")).unwrap_err();
        assert!(matches!(err, StartupError::MissingArtifact { .. }));
    }
}

//! Feature Scaling
//!
//! The fitted transform applied to the assembled vector before inference.
//! Parameters come from the training run and are loaded from JSON; nothing
//! is refit here.

use serde::{Deserialize, Serialize};

use crate::error::{StartupError, StartupResult};

fn default_feature_range() -> [f64; 2] {
    [0.0, 1.0]
}

/// Fitted scaling transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureScaler {
    /// `(x - mean) / scale`
    Standard {
        feature_names: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    /// `(x - min) / (max - min)` mapped into `feature_range`
    MinMax {
        feature_names: Vec<String>,
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "default_feature_range")]
        feature_range: [f64; 2],
    },
}

impl FeatureScaler {
    pub fn feature_names(&self) -> &[String] {
        match self {
            FeatureScaler::Standard { feature_names, .. }
            | FeatureScaler::MinMax { feature_names, .. } => feature_names,
        }
    }

    /// Check parameter shapes and values
    pub fn validate(&self) -> StartupResult<()> {
        let n = self.feature_names().len();
        let (a, b, names) = match self {
            FeatureScaler::Standard { mean, scale, .. } => (mean, scale, ("mean", "scale")),
            FeatureScaler::MinMax {
                data_min,
                data_max,
                feature_range,
                ..
            } => {
                if !(feature_range[0] < feature_range[1]) {
                    return Err(StartupError::invalid_scaler(format!(
                        "feature_range {:?} is not increasing",
                        feature_range
                    )));
                }
                (data_min, data_max, ("data_min", "data_max"))
            }
        };

        for (len, label) in [(a.len(), names.0), (b.len(), names.1)] {
            if len != n {
                return Err(StartupError::invalid_scaler(format!(
                    "{} has {} entries for {} features",
                    label, len, n
                )));
            }
        }

        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(StartupError::invalid_scaler("non-finite parameter"));
        }

        Ok(())
    }

    /// Apply the transform; `features` must match the fitted width
    pub fn transform(&self, features: &[f64]) -> Vec<f64> {
        match self {
            FeatureScaler::Standard { mean, scale, .. } => features
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| (x - m) / non_zero(*s))
                .collect(),
            FeatureScaler::MinMax {
                data_min,
                data_max,
                feature_range: [lo, hi],
                ..
            } => features
                .iter()
                .zip(data_min.iter().zip(data_max))
                .map(|(x, (min, max))| (x - min) / non_zero(max - min) * (hi - lo) + lo)
                .collect(),
        }
    }
}

/// Constant features were fitted with zero spread; leave them unscaled.
#[inline]
fn non_zero(spread: f64) -> f64 {
    if spread == 0.0 {
        1.0
    } else {
        spread
    }
}

//! Regression Models
//!
//! Inference-only representations of the pre-trained yield model. Two JSON
//! shapes are understood: a linear model and a random forest whose trees are
//! stored as flat node arrays (the layout tree learners export). Anything
//! else can be plugged in through [`Regressor`].

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::error::{StartupError, StartupResult};

/// Marker for a missing child in flat tree arrays
pub const LEAF: i64 = -1;

/// Opaque pre-trained regression model
pub trait Regressor: Debug + Send + Sync {
    /// Input columns in the order the model was trained on
    fn feature_names(&self) -> &[String];

    /// Predict from an already-scaled feature row
    fn predict(&self, features: &[f64]) -> f64;

    /// Structural checks run once at startup
    fn validate(&self) -> StartupResult<()> {
        Ok(())
    }
}

/// Serialized model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear(LinearModel),
    Forest(ForestModel),
}

impl Regressor for RegressionModel {
    fn feature_names(&self) -> &[String] {
        match self {
            RegressionModel::Linear(m) => &m.feature_names,
            RegressionModel::Forest(m) => &m.feature_names,
        }
    }

    fn predict(&self, features: &[f64]) -> f64 {
        match self {
            RegressionModel::Linear(m) => m.predict(features),
            RegressionModel::Forest(m) => m.predict(features),
        }
    }

    fn validate(&self) -> StartupResult<()> {
        match self {
            RegressionModel::Linear(m) => m.validate(),
            RegressionModel::Forest(m) => m.validate(),
        }
    }
}

/// `intercept + Σ coefficient_i × x_i`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    fn validate(&self) -> StartupResult<()> {
        if self.coefficients.len() != self.feature_names.len() {
            return Err(StartupError::invalid_model(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.feature_names.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(StartupError::invalid_model("non-finite linear parameter"));
        }
        Ok(())
    }
}

/// Mean of independent regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub feature_names: Vec<String>,
    pub trees: Vec<RegressionTree>,
}

impl ForestModel {
    pub fn predict(&self, features: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        total / self.trees.len() as f64
    }

    fn validate(&self) -> StartupResult<()> {
        if self.trees.is_empty() {
            return Err(StartupError::invalid_model("forest has no trees"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_names.len())
                .map_err(|msg| StartupError::invalid_model(format!("tree {}: {}", i, msg)))?;
        }
        Ok(())
    }
}

/// Binary regression tree in flat array form
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise samples with
/// `x[feature[i]] <= threshold[i]` go to `children_left[i]`, the rest to
/// `children_right[i]`. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl RegressionTree {
    pub fn node_count(&self) -> usize {
        self.value.len()
    }

    /// Walk from the root to a leaf
    ///
    /// Relies on [`RegressionTree::validate`]: every child index points
    /// forward, so the walk always terminates.
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left == LEAF {
                return self.value[node];
            }
            node = if features[self.feature[node] as usize] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("empty tree".to_string());
        }
        let lengths = [
            self.children_left.len(),
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(format!("node arrays disagree in length ({:?} vs {})", lengths, n));
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(format!("node {} has exactly one child", i));
                }
                if !self.value[i].is_finite() {
                    return Err(format!("leaf {} has non-finite value", i));
                }
                continue;
            }

            for child in [left, right] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(format!("node {} has invalid child index {}", i, child));
                }
            }
            let feature = self.feature[i];
            if feature < 0 || feature >= n_features as i64 {
                return Err(format!("node {} splits on unknown feature {}", i, feature));
            }
            if self.threshold[i].is_nan() {
                return Err(format!("node {} has NaN threshold", i));
            }
        }

        Ok(())
    }
}

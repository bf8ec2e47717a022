//! Feature Keys
//!
//! The five numeric agronomic features, in the positional order the
//! estimator was trained with. Everything downstream (defaults, assembled
//! inputs, scaler, model) indexes by [`FeatureKey`] so the order lives in
//! exactly one place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Numeric feature of a field observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureKey {
    #[serde(rename = "NDVI_Trend")]
    NdviTrend,
    #[serde(rename = "Rain_Sum")]
    RainSum,
    #[serde(rename = "Temp_Avg")]
    TempAvg,
    #[serde(rename = "NDVI_Mean")]
    NdviMean,
    #[serde(rename = "NDVI_PeakWeek")]
    NdviPeakWeek,
}

impl FeatureKey {
    pub const COUNT: usize = 5;

    /// All keys in estimator column order.
    pub const ALL: [FeatureKey; FeatureKey::COUNT] = [
        FeatureKey::NdviTrend,
        FeatureKey::RainSum,
        FeatureKey::TempAvg,
        FeatureKey::NdviMean,
        FeatureKey::NdviPeakWeek,
    ];

    /// Column name in the reference dataset and in artifact `feature_names`.
    pub fn column(&self) -> &'static str {
        match self {
            FeatureKey::NdviTrend => "NDVI_Trend",
            FeatureKey::RainSum => "Rain_Sum",
            FeatureKey::TempAvg => "Temp_Avg",
            FeatureKey::NdviMean => "NDVI_Mean",
            FeatureKey::NdviPeakWeek => "NDVI_PeakWeek",
        }
    }

    /// Plain-language description shown next to the input field.
    pub fn description(&self) -> &'static str {
        match self {
            FeatureKey::NdviTrend => "Vegetation growth rate",
            FeatureKey::RainSum => "Total rainfall during season (mm)",
            FeatureKey::TempAvg => "Average temperature (°C)",
            FeatureKey::NdviMean => "General plant health",
            FeatureKey::NdviPeakWeek => "Week of best NDVI (crop growth)",
        }
    }

    /// Position in the estimator input vector.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.column() == name)
    }

    /// Column names in estimator order.
    pub fn column_names() -> Vec<String> {
        Self::ALL.iter().map(|k| k.column().to_string()).collect()
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One value per [`FeatureKey`], stored in estimator order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FeatureKey::COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FeatureKey::COUNT]) -> Self {
        Self(values)
    }

    /// Build by evaluating `f` for every key.
    pub fn from_fn(mut f: impl FnMut(FeatureKey) -> f64) -> Self {
        Self(FeatureKey::ALL.map(&mut f))
    }

    pub fn get(&self, key: FeatureKey) -> f64 {
        self.0[key.index()]
    }

    pub fn as_array(&self) -> &[f64; FeatureKey::COUNT] {
        &self.0
    }

    /// Iterate `(key, value)` pairs in estimator order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, f64)> + '_ {
        FeatureKey::ALL.into_iter().map(move |k| (k, self.0[k.index()]))
    }

    /// Copy with every value rounded to 2 decimal places.
    pub fn rounded(&self) -> Self {
        Self(self.0.map(round2))
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Index<FeatureKey> for FeatureVector {
    type Output = f64;

    fn index(&self, key: FeatureKey) -> &f64 {
        &self.0[key.index()]
    }
}

impl IndexMut<FeatureKey> for FeatureVector {
    fn index_mut(&mut self, key: FeatureKey) -> &mut f64 {
        &mut self.0[key.index()]
    }
}

/// Round to 2 decimal places, ties to even on the exact binary value
///
/// `value * 100.0` can itself round onto a tie (0.005 becomes exactly 0.5);
/// the fused residual tells which side of the tie the exact product lies on.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        // Magnitudes this large have no fractional digits
        return value;
    }

    let rounded = if (scaled - scaled.trunc()).abs() == 0.5 {
        let residual = value.mul_add(100.0, -scaled);
        if residual > 0.0 {
            scaled.ceil()
        } else if residual < 0.0 {
            scaled.floor()
        } else {
            scaled.round_ties_even()
        }
    } else {
        scaled.round()
    };

    rounded / 100.0
}

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::advisory::Suggestion;
use crate::assembler::{AssembledFeature, InputWarning, Provenance};
use crate::data::FieldContext;
use crate::defaults::DefaultSource;
use crate::features::FeatureKey;

/// Unit of every yield estimate
pub const YIELD_UNIT: &str = "tons/hectare";

/// Complete result of one prediction request
#[derive(Debug, Clone, Serialize)]
pub struct YieldReport {
    pub context: FieldContext,
    pub default_source: DefaultSource,
    pub features: Vec<FeatureRow>,
    pub predicted_yield: f64,
    pub unit: String,
    pub warnings: Vec<InputWarning>,
    pub suggestions: Vec<Suggestion>,
    pub generated_at: DateTime<Utc>,
}

impl YieldReport {
    pub fn new(
        context: FieldContext,
        default_source: DefaultSource,
        features: Vec<FeatureRow>,
        predicted_yield: f64,
        warnings: Vec<InputWarning>,
        suggestions: Vec<Suggestion>,
    ) -> Self {
        Self {
            context,
            default_source,
            features,
            predicted_yield,
            unit: YIELD_UNIT.to_string(),
            warnings,
            suggestions,
            generated_at: Utc::now(),
        }
    }

    pub fn feature(&self, key: FeatureKey) -> Option<&FeatureRow> {
        self.features.iter().find(|row| row.key == key)
    }
}

/// One feature line of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub key: FeatureKey,
    pub description: String,
    pub value: f64,
    pub default: f64,
    pub provenance: Provenance,
}

impl FeatureRow {
    pub fn new(key: FeatureKey, feature: &AssembledFeature) -> Self {
        Self {
            key,
            description: key.description().to_string(),
            value: feature.value,
            default: feature.default,
            provenance: feature.provenance,
        }
    }
}

//! Context Default Resolution
//!
//! For a (crop, region, soil) context, computes the mean of every numeric
//! feature over the historical rows with that exact context. A context with
//! no matching rows falls back to the means over the whole table. The store
//! is guaranteed non-empty at construction, so every resolution is fully
//! populated and finite.

use serde::Serialize;

use crate::data::{FieldContext, HistoricalRecord, ReferenceStore};
use crate::features::{FeatureKey, FeatureVector};

/// Where a set of defaults was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultSource {
    /// Mean over rows matching the context
    ContextMatch,
    /// No row matched; mean over the entire reference table
    GlobalFallback,
}

/// Per-feature defaults for one context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextDefaults {
    pub values: FeatureVector,
    pub source: DefaultSource,
    /// Number of rows the means were taken over
    pub sample_size: usize,
}

impl ContextDefaults {
    pub fn get(&self, key: FeatureKey) -> f64 {
        self.values[key]
    }

    /// Defaults as offered to the user (2 decimal places)
    pub fn rounded(&self) -> FeatureVector {
        self.values.rounded()
    }
}

/// Resolves context defaults against a shared reference store
#[derive(Debug, Clone, Copy)]
pub struct DefaultResolver<'a> {
    store: &'a ReferenceStore,
}

impl<'a> DefaultResolver<'a> {
    pub fn new(store: &'a ReferenceStore) -> Self {
        Self { store }
    }

    /// Mean of each feature over rows matching `context`, else over all rows
    pub fn resolve(&self, context: &FieldContext) -> ContextDefaults {
        let matched: Vec<&HistoricalRecord> = self.store.matching(context).collect();

        if matched.is_empty() {
            tracing::debug!(%context, "No matching reference rows, using global means");
            return self.global();
        }

        tracing::debug!(%context, rows = matched.len(), "Resolved context defaults");
        ContextDefaults {
            values: feature_means(&matched),
            source: DefaultSource::ContextMatch,
            sample_size: matched.len(),
        }
    }

    /// Means over the entire reference table
    pub fn global(&self) -> ContextDefaults {
        let all: Vec<&HistoricalRecord> = self.store.records().iter().collect();
        ContextDefaults {
            values: feature_means(&all),
            source: DefaultSource::GlobalFallback,
            sample_size: all.len(),
        }
    }
}

/// Arithmetic mean per feature; callers guarantee `rows` is non-empty
fn feature_means(rows: &[&HistoricalRecord]) -> FeatureVector {
    let n = rows.len() as f64;
    FeatureVector::from_fn(|key| rows.iter().map(|r| r.features[key]).sum::<f64>() / n)
}

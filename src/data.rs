//! Reference Data Loading
//!
//! Loads the historical field observations used for context default lookup.
//! The table is read once with Polars (CSV or Parquet), cast to the expected
//! column types, cleaned of incomplete rows and materialized into immutable
//! [`HistoricalRecord`]s. Nothing mutates the store after construction.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use crate::error::{StartupError, StartupResult};
use crate::features::{FeatureKey, FeatureVector};
use crate::utils::materialize_with_columns;

pub const CROP_COLUMN: &str = "Crop";
pub const REGION_COLUMN: &str = "Region";
pub const SOIL_COLUMN: &str = "Soil";

/// Categorical context selecting a historical subset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldContext {
    pub crop: String,
    pub region: String,
    pub soil: String,
}

impl FieldContext {
    pub fn new(crop: impl Into<String>, region: impl Into<String>, soil: impl Into<String>) -> Self {
        Self {
            crop: crop.into(),
            region: region.into(),
            soil: soil.into(),
        }
    }
}

impl fmt::Display for FieldContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.crop, self.region, self.soil)
    }
}

/// One row of the reference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub context: FieldContext,
    pub features: FeatureVector,
}

impl HistoricalRecord {
    pub fn new(context: FieldContext, features: FeatureVector) -> Self {
        Self { context, features }
    }

    /// Case-sensitive equality on crop, region and soil
    pub fn matches(&self, context: &FieldContext) -> bool {
        self.context == *context
    }
}

/// Sorted distinct context values observed in the reference table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextOptions {
    pub crops: Vec<String>,
    pub regions: Vec<String>,
    pub soils: Vec<String>,
}

impl ContextOptions {
    fn from_records(records: &[HistoricalRecord]) -> Self {
        let mut crops = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut soils = BTreeSet::new();

        for record in records {
            crops.insert(record.context.crop.clone());
            regions.insert(record.context.region.clone());
            soils.insert(record.context.soil.clone());
        }

        Self {
            crops: crops.into_iter().collect(),
            regions: regions.into_iter().collect(),
            soils: soils.into_iter().collect(),
        }
    }

    /// True when every part of `context` was observed in the dataset.
    ///
    /// The observed values need not co-occur in a single row; unseen
    /// combinations fall back to global defaults.
    pub fn contains(&self, context: &FieldContext) -> bool {
        self.crops.contains(&context.crop)
            && self.regions.contains(&context.region)
            && self.soils.contains(&context.soil)
    }
}

/// Read-only in-memory table of historical observations
#[derive(Debug, Clone)]
pub struct ReferenceStore {
    records: Vec<HistoricalRecord>,
    options: ContextOptions,
}

impl ReferenceStore {
    /// Load the reference dataset from CSV or Parquet (by file extension)
    ///
    /// # Errors
    /// Fails when the file is missing, unreadable, lacks a required column
    /// or has no complete rows.
    pub fn load(path: &Path) -> StartupResult<Self> {
        std::fs::metadata(path).map_err(|source| StartupError::MissingArtifact {
            path: path.to_path_buf(),
            source,
        })?;

        let is_parquet = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));

        let df = if is_parquet {
            LazyFrame::scan_parquet(path, Default::default())?.collect()?
        } else {
            CsvReadOptions::default()
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(path.to_path_buf()))?
                .finish()?
        };

        let store = Self::from_dataframe(&df, &path.display().to_string())?;

        tracing::info!(
            path = %path.display(),
            rows = store.len(),
            crops = store.options.crops.len(),
            regions = store.options.regions.len(),
            soils = store.options.soils.len(),
            "Loaded reference dataset"
        );

        Ok(store)
    }

    /// Build the store from an already-loaded frame
    ///
    /// `source` names the data origin for error messages.
    pub fn from_dataframe(df: &DataFrame, source: &str) -> StartupResult<Self> {
        let mut columns: Vec<(&str, DataType)> = vec![
            (CROP_COLUMN, DataType::String),
            (REGION_COLUMN, DataType::String),
            (SOIL_COLUMN, DataType::String),
        ];
        columns.extend(FeatureKey::ALL.iter().map(|k| (k.column(), DataType::Float64)));

        let cleaned = materialize_with_columns(df, &columns)?;

        let dropped = df.height() - cleaned.height();
        if dropped > 0 {
            tracing::warn!(source, dropped, "Dropped incomplete reference rows");
        }

        let crops = cleaned.column(CROP_COLUMN)?.str()?;
        let regions = cleaned.column(REGION_COLUMN)?.str()?;
        let soils = cleaned.column(SOIL_COLUMN)?.str()?;
        let features = FeatureKey::ALL
            .iter()
            .map(|k| cleaned.column(k.column()).and_then(|c| c.f64()))
            .collect::<PolarsResult<Vec<_>>>()?;

        let mut records = Vec::with_capacity(cleaned.height());
        'rows: for idx in 0..cleaned.height() {
            let (Some(crop), Some(region), Some(soil)) =
                (crops.get(idx), regions.get(idx), soils.get(idx))
            else {
                continue;
            };

            let mut values = FeatureVector::new([0.0; FeatureKey::COUNT]);
            for key in FeatureKey::ALL {
                match features[key.index()].get(idx) {
                    Some(v) => values[key] = v,
                    None => continue 'rows,
                }
            }

            records.push(HistoricalRecord::new(
                FieldContext::new(crop, region, soil),
                values,
            ));
        }

        if records.is_empty() {
            return Err(StartupError::NoReferenceData(source.to_string()));
        }

        Self::from_valid_records(records)
    }

    /// Build the store from in-memory records
    ///
    /// # Errors
    /// [`StartupError::NoReferenceData`] when `records` is empty or a record
    /// carries a non-finite feature, [`StartupError::ReferenceOverflow`] when
    /// a feature column cannot be averaged in f64.
    pub fn from_records(records: Vec<HistoricalRecord>) -> StartupResult<Self> {
        if records.is_empty() {
            return Err(StartupError::NoReferenceData("in-memory records".to_string()));
        }
        if let Some(bad) = records.iter().find(|r| !r.features.is_finite()) {
            return Err(StartupError::NoReferenceData(format!(
                "in-memory records (non-finite feature for {})",
                bad.context
            )));
        }
        Self::from_valid_records(records)
    }

    /// Finish construction from non-empty, finite records
    ///
    /// The absolute column sum bounds every subset sum, so if it is finite
    /// every context mean is finite too.
    fn from_valid_records(records: Vec<HistoricalRecord>) -> StartupResult<Self> {
        for key in FeatureKey::ALL {
            let magnitude: f64 = records.iter().map(|r| r.features[key].abs()).sum();
            if !magnitude.is_finite() {
                return Err(StartupError::ReferenceOverflow {
                    column: key.column().to_string(),
                });
            }
        }

        let options = ContextOptions::from_records(&records);
        Ok(Self { records, options })
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    /// Rows whose context matches exactly
    pub fn matching<'a>(
        &'a self,
        context: &'a FieldContext,
    ) -> impl Iterator<Item = &'a HistoricalRecord> + 'a {
        self.records.iter().filter(move |r| r.matches(context))
    }

    pub fn context_options(&self) -> &ContextOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// False for every constructed store
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

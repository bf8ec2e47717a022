//! Yield Predictor - main coordinator for one estimation session
//!
//! Owns the reference store and the estimator, both injected (or loaded)
//! once and read-only afterwards. Each request runs the full pipeline:
//! resolve defaults → assemble inputs → predict yield, and independently
//! assembled inputs → advice.

use crate::advisory::advise;
use crate::assembler::{assemble, RawInputs};
use crate::config::EstimatorConfig;
use crate::data::{ContextOptions, FieldContext, ReferenceStore};
use crate::defaults::{ContextDefaults, DefaultResolver};
use crate::error::{StartupError, StartupResult};
use crate::estimator::YieldEstimator;
use crate::report::{FeatureRow, YieldReport};

/// One user submission
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRequest {
    pub context: FieldContext,
    pub inputs: RawInputs,
}

impl FieldRequest {
    pub fn new(context: FieldContext, inputs: RawInputs) -> Self {
        Self { context, inputs }
    }
}

/// Main yield predictor
#[derive(Debug)]
pub struct YieldPredictor {
    store: ReferenceStore,
    estimator: YieldEstimator,
}

impl YieldPredictor {
    /// Load every artifact named in `config` and validate them together
    pub fn new(config: &EstimatorConfig) -> StartupResult<Self> {
        tracing::info!("Initializing yield predictor");

        let estimator = YieldEstimator::load(&config.model_path, &config.scaler_path)?;
        let store = ReferenceStore::load(&config.dataset_path)?;

        Self::from_parts(store, estimator)
    }

    /// Wire already-loaded components together
    ///
    /// Runs one probe inference over the global default vector; a non-finite
    /// result means the model cannot be served.
    pub fn from_parts(store: ReferenceStore, estimator: YieldEstimator) -> StartupResult<Self> {
        let probe_input = DefaultResolver::new(&store).global().values;
        let probe = estimator.predict(&probe_input);
        if !probe.is_finite() {
            return Err(StartupError::invalid_model(format!(
                "probe prediction over global defaults is {}",
                probe
            )));
        }

        tracing::info!(
            records = store.len(),
            probe_yield = probe,
            "Yield predictor ready"
        );

        Ok(Self { store, estimator })
    }

    /// Selectable crops, regions and soils
    pub fn context_options(&self) -> &ContextOptions {
        self.store.context_options()
    }

    /// Defaults offered for a context before the user types anything
    pub fn defaults(&self, context: &FieldContext) -> ContextDefaults {
        DefaultResolver::new(&self.store).resolve(context)
    }

    /// Run the full pipeline for one submission
    pub fn predict(&self, request: &FieldRequest) -> YieldReport {
        let defaults = self.defaults(&request.context);
        let assembly = assemble(&request.inputs, &defaults);

        let values = assembly.features.values();
        let predicted_yield = self.estimator.predict(&values);
        let suggestions = advise(&values);

        tracing::info!(
            context = %request.context,
            user_provided = assembly.features.user_provided_count(),
            warnings = assembly.warnings.len(),
            predicted_yield,
            "Prediction complete"
        );

        let features = assembly
            .features
            .iter()
            .map(|(key, feature)| FeatureRow::new(key, feature))
            .collect();

        YieldReport::new(
            request.context.clone(),
            defaults.source,
            features,
            predicted_yield,
            assembly.warnings,
            suggestions,
        )
    }

    pub fn store(&self) -> &ReferenceStore {
        &self.store
    }

    pub fn estimator(&self) -> &YieldEstimator {
        &self.estimator
    }
}

//! Pipeline Integration Tests
//!
//! Loads the fixture artifacts in tests/fixtures the same way the binary
//! does and runs complete requests: resolve → assemble → predict → advise.

use approx::assert_relative_eq;
use crop_yield_estimator::{
    AdviceCategory, DefaultSource, EstimatorConfig, FeatureKey, FieldContext, FieldRequest,
    Provenance, RawInputs, ReportFormat, StartupError, YieldPredictor, YieldReport,
};
use std::path::PathBuf;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn predictor() -> YieldPredictor {
    YieldPredictor::new(&EstimatorConfig::from_dir(fixtures())).expect("fixture artifacts load")
}

fn wheat() -> FieldContext {
    FieldContext::new("Wheat", "North", "Loam")
}

// ============================================================================
// Startup
// ============================================================================

#[test]
fn test_loads_and_cleans_reference_data() {
    let predictor = predictor();
    // The Maize/North/Loam row has no NDVI_Trend and is dropped
    assert_eq!(predictor.store().len(), 6);

    let options = predictor.context_options();
    assert_eq!(options.crops, vec!["Maize", "Rice", "Wheat"]);
    assert_eq!(options.regions, vec!["East", "North", "South"]);
    assert_eq!(options.soils, vec!["Clay", "Loam", "Sandy", "Silt"]);
}

#[test]
fn test_misordered_scaler_is_fatal() {
    let mut config = EstimatorConfig::from_dir(fixtures());
    config.scaler_path = fixtures().join("scaler_misordered.json");

    let err = YieldPredictor::new(&config).unwrap_err();
    assert!(matches!(
        err,
        StartupError::FeatureOrderMismatch { artifact: "scaler", .. }
    ));
}

#[test]
fn test_corrupt_model_is_fatal() {
    let mut config = EstimatorConfig::from_dir(fixtures());
    config.model_path = fixtures().join("model_corrupt.json");

    let err = YieldPredictor::new(&config).unwrap_err();
    assert!(matches!(err, StartupError::CorruptArtifact { .. }));
}

#[test]
fn test_missing_model_is_fatal() {
    let mut config = EstimatorConfig::from_dir(fixtures());
    config.model_path = fixtures().join("no_such_model.json");

    let err = YieldPredictor::new(&config).unwrap_err();
    assert!(matches!(err, StartupError::MissingArtifact { .. }));
}

#[test]
fn test_empty_reference_dataset_is_fatal() {
    let mut config = EstimatorConfig::from_dir(fixtures());
    config.dataset_path = fixtures().join("empty.csv");

    let err = YieldPredictor::new(&config).unwrap_err();
    assert!(matches!(err, StartupError::NoReferenceData(_)));
}

#[test]
fn test_infinite_reference_cells_are_dropped() {
    let mut config = EstimatorConfig::from_dir(fixtures());
    config.dataset_path = fixtures().join("infinite_rain.csv");
    let predictor = YieldPredictor::new(&config).unwrap();

    assert_eq!(predictor.store().len(), 2);

    let defaults = predictor.defaults(&wheat());
    assert!(defaults.values.is_finite());
    assert_relative_eq!(defaults.get(FeatureKey::RainSum), 500.0);

    let report = predictor.predict(&FieldRequest::new(wheat(), RawInputs::new()));
    assert!(report.features.iter().all(|row| row.value.is_finite()));
    assert!(report.predicted_yield.is_finite());
}

// ============================================================================
// Requests
// ============================================================================

#[test]
fn test_blank_form_uses_context_defaults() {
    let predictor = predictor();
    let report = predictor.predict(&FieldRequest::new(wheat(), RawInputs::new()));

    assert_eq!(report.default_source, DefaultSource::ContextMatch);
    for row in &report.features {
        assert_eq!(row.provenance, Provenance::DefaultUsed);
        assert_relative_eq!(row.value, row.default);
    }

    let rain = report.feature(FeatureKey::RainSum).unwrap();
    assert_relative_eq!(rain.value, 400.0);

    // Rain_Sum of exactly 400 does not count as low rainfall
    assert_eq!(report.suggestions.len(), 1);
    assert_eq!(report.suggestions[0].category, AdviceCategory::AllOptimal);

    // Tree 1: scaled rainfall -0.67 -> 2.0; tree 2: scaled trend 1.0 -> 3.6
    assert_relative_eq!(report.predicted_yield, 2.8, epsilon = 1e-9);
    assert_eq!(report.unit, "tons/hectare");
}

#[test]
fn test_defaults_round_trip_through_assembly() {
    let predictor = predictor();
    let defaults = predictor.defaults(&wheat());
    let report = predictor.predict(&FieldRequest::new(wheat(), RawInputs::new()));

    for (key, value) in defaults.rounded().iter() {
        assert_relative_eq!(report.feature(key).unwrap().value, value);
    }
}

#[test]
fn test_overrides_and_invalid_input() {
    let predictor = predictor();
    let inputs = RawInputs::new()
        .with(FeatureKey::TempAvg, " 24 ")
        .with(FeatureKey::NdviMean, "very healthy");
    let context = FieldContext::new("Rice", "South", "Clay");
    let report = predictor.predict(&FieldRequest::new(context, inputs));

    let temp = report.feature(FeatureKey::TempAvg).unwrap();
    assert_eq!(temp.provenance, Provenance::UserProvided);
    assert_relative_eq!(temp.value, 24.0);

    let mean = report.feature(FeatureKey::NdviMean).unwrap();
    assert_eq!(mean.provenance, Provenance::DefaultUsed);
    assert_relative_eq!(mean.value, 0.7);

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].feature, FeatureKey::NdviMean);
    assert_eq!(
        report.warnings[0].to_string(),
        "Invalid value for NDVI_Mean. Default (0.7) will be used."
    );

    // Tree 1: high rainfall, cool temp -> 4.2; tree 2: trend 0.01 below the
    // scaler mean -> 2.6
    assert_relative_eq!(report.predicted_yield, 3.4, epsilon = 1e-9);

    // The 0.005 trend default is offered as 0.01, which is not < 0.01
    let trend = report.feature(FeatureKey::NdviTrend).unwrap();
    assert_relative_eq!(trend.value, 0.01);
    assert_eq!(categories(&report), vec![AdviceCategory::LatePeakGrowth]);
}

#[test]
fn test_slow_trend_override_fires_advice() {
    let predictor = predictor();
    let inputs = RawInputs::new().with(FeatureKey::NdviTrend, "0.005");
    let context = FieldContext::new("Rice", "South", "Clay");
    let report = predictor.predict(&FieldRequest::new(context, inputs));

    assert_eq!(
        categories(&report),
        vec![AdviceCategory::SlowVegetationGrowth, AdviceCategory::LatePeakGrowth]
    );
}

fn categories(report: &YieldReport) -> Vec<AdviceCategory> {
    report.suggestions.iter().map(|s| s.category).collect()
}

#[test]
fn test_unknown_context_falls_back_to_global_means() {
    let predictor = predictor();
    let context = FieldContext::new("Barley", "West", "Peat");
    assert!(!predictor.context_options().contains(&context));

    let report = predictor.predict(&FieldRequest::new(context, RawInputs::new()));
    assert_eq!(report.default_source, DefaultSource::GlobalFallback);
    assert_relative_eq!(report.feature(FeatureKey::RainSum).unwrap().value, 700.0);
    assert!(report.predicted_yield.is_finite());
}

#[test]
fn test_export_documents() {
    let predictor = predictor();
    let report = predictor.predict(&FieldRequest::new(wheat(), RawInputs::new()));

    let dir = std::env::temp_dir().join(format!("crop_yield_export_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    for name in ["report.md", "report.html", "report.json"] {
        let path = dir.join(name);
        let format = ReportFormat::from_path(&path).unwrap();
        std::fs::write(&path, format.render(&report).unwrap()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Wheat"), "{name}");
        assert!(written.contains("2.8"), "{name}");
    }

    std::fs::remove_dir_all(&dir).ok();
}

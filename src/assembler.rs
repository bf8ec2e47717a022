//! Input Assembly
//!
//! Merges optional free-text overrides with resolved context defaults into
//! the ordered feature vector used by both the estimator and the advisory
//! rules. Provenance is decided purely by the raw input: blank or
//! unparseable means the default was used, anything that parses to a finite
//! number is user provided, even when it equals the default.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::defaults::ContextDefaults;
use crate::features::{FeatureKey, FeatureVector};

/// Origin of an assembled feature value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    UserProvided,
    DefaultUsed,
}

impl Provenance {
    pub fn display_text(&self) -> &'static str {
        match self {
            Provenance::UserProvided => "User Provided",
            Provenance::DefaultUsed => "Default",
        }
    }
}

/// A resolved value plus where it came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssembledFeature {
    pub value: f64,
    pub provenance: Provenance,
    /// Rounded default that was on offer for this field
    pub default: f64,
}

impl AssembledFeature {
    pub fn is_default(&self) -> bool {
        self.provenance == Provenance::DefaultUsed
    }
}

/// Raw optional text per feature, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputs {
    values: [Option<String>; FeatureKey::COUNT],
}

impl RawInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, key: FeatureKey, raw: impl Into<String>) -> Self {
        self.set(key, raw);
        self
    }

    pub fn set(&mut self, key: FeatureKey, raw: impl Into<String>) {
        self.values[key.index()] = Some(raw.into());
    }

    pub fn get(&self, key: FeatureKey) -> Option<&str> {
        self.values[key.index()].as_deref()
    }
}

/// User-visible notice that an override was rejected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputWarning {
    pub feature: FeatureKey,
    /// The offending text, trimmed
    pub raw: String,
    /// Default substituted in its place
    pub substituted: f64,
}

impl fmt::Display for InputWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid value for {}. Default ({}) will be used.",
            self.feature, self.substituted
        )
    }
}

/// One assembled feature per key, in estimator order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledFeatures {
    features: [AssembledFeature; FeatureKey::COUNT],
}

impl AssembledFeatures {
    pub fn get(&self, key: FeatureKey) -> &AssembledFeature {
        &self.features[key.index()]
    }

    /// Values in estimator order
    pub fn values(&self) -> FeatureVector {
        FeatureVector::new(self.features.map(|f| f.value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, &AssembledFeature)> + '_ {
        FeatureKey::ALL.into_iter().map(move |k| (k, &self.features[k.index()]))
    }

    pub fn user_provided_count(&self) -> usize {
        self.features.iter().filter(|f| !f.is_default()).count()
    }
}

/// Result of assembling one request
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub features: AssembledFeatures,
    pub warnings: Vec<InputWarning>,
}

/// Merge raw overrides with context defaults
pub fn assemble(raw: &RawInputs, defaults: &ContextDefaults) -> Assembly {
    let rounded = defaults.rounded();
    let mut warnings = Vec::new();

    let features = FeatureKey::ALL.map(|key| {
        let default = rounded[key];
        let fallback = AssembledFeature {
            value: default,
            provenance: Provenance::DefaultUsed,
            default,
        };

        let Some(text) = raw.get(key).map(str::trim).filter(|t| !t.is_empty()) else {
            return fallback;
        };

        match parse_finite(text) {
            Some(value) => AssembledFeature {
                value,
                provenance: Provenance::UserProvided,
                default,
            },
            None => {
                tracing::warn!(feature = %key, input = text, default, "Invalid numeric input, using default");
                warnings.push(InputWarning {
                    feature: key,
                    raw: text.to_string(),
                    substituted: default,
                });
                fallback
            }
        }
    });

    Assembly {
        features: AssembledFeatures { features },
        warnings,
    }
}

/// Parse a finite float; `NaN` and infinities count as malformed
///
/// A single `_` between two digits is accepted as a digit separator
/// (`1_000`).
fn parse_finite(text: &str) -> Option<f64> {
    let stripped;
    let text = if text.contains('_') {
        let bytes = text.as_bytes();
        let separators_ok = bytes.iter().enumerate().all(|(i, &b)| {
            b != b'_'
                || (i > 0
                    && i + 1 < bytes.len()
                    && bytes[i - 1].is_ascii_digit()
                    && bytes[i + 1].is_ascii_digit())
        });
        if !separators_ok {
            return None;
        }
        stripped = text.replace('_', "");
        stripped.as_str()
    } else {
        text
    };

    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::DefaultSource;
    use approx::assert_relative_eq;

    fn defaults() -> ContextDefaults {
        ContextDefaults {
            values: FeatureVector::new([0.03456, 400.0, 27.456, 0.55, 15.004]),
            source: DefaultSource::ContextMatch,
            sample_size: 2,
        }
    }

    #[test]
    fn test_blank_inputs_use_rounded_defaults() {
        let raw = RawInputs::new()
            .with(FeatureKey::TempAvg, "   ")
            .with(FeatureKey::NdviMean, "");
        let assembly = assemble(&raw, &defaults());

        assert!(assembly.warnings.is_empty());
        for (key, feature) in assembly.features.iter() {
            assert_eq!(feature.provenance, Provenance::DefaultUsed, "{key}");
            assert_relative_eq!(feature.value, defaults().rounded()[key]);
        }
        assert_relative_eq!(assembly.features.get(FeatureKey::NdviTrend).value, 0.03);
        assert_relative_eq!(assembly.features.get(FeatureKey::TempAvg).value, 27.46);
        assert_eq!(assembly.features.user_provided_count(), 0);
    }

    #[test]
    fn test_parsed_values_are_not_rounded() {
        let raw = RawInputs::new()
            .with(FeatureKey::NdviTrend, " 0.004567 ")
            .with(FeatureKey::RainSum, "1e3");
        let assembly = assemble(&raw, &defaults());

        let trend = assembly.features.get(FeatureKey::NdviTrend);
        assert_eq!(trend.provenance, Provenance::UserProvided);
        assert_eq!(trend.value, 0.004567);

        let rain = assembly.features.get(FeatureKey::RainSum);
        assert_eq!(rain.provenance, Provenance::UserProvided);
        assert_eq!(rain.value, 1000.0);
        assert_eq!(assembly.features.user_provided_count(), 2);
    }

    #[test]
    fn test_value_equal_to_default_is_still_user_provided() {
        let raw = RawInputs::new().with(FeatureKey::RainSum, "400");
        let assembly = assemble(&raw, &defaults());

        let rain = assembly.features.get(FeatureKey::RainSum);
        assert_eq!(rain.value, rain.default);
        assert_eq!(rain.provenance, Provenance::UserProvided);
    }

    #[test]
    fn test_malformed_input_warns_once_and_falls_back() {
        let rounded = defaults().rounded();

        for key in FeatureKey::ALL {
            for bad in ["abc", "12,5", "NaN", "inf", "-infinity", "1.2.3", "1__0", "_5"] {
                let raw = RawInputs::new().with(key, bad);
                let assembly = assemble(&raw, &defaults());

                let feature = assembly.features.get(key);
                assert_eq!(feature.provenance, Provenance::DefaultUsed, "{key} {bad:?}");
                assert_eq!(feature.value, rounded[key], "{key} {bad:?}");

                assert_eq!(assembly.warnings.len(), 1, "{key} {bad:?}");
                let warning = &assembly.warnings[0];
                assert_eq!(warning.feature, key);
                assert_eq!(warning.raw, bad);
                assert_eq!(warning.substituted, rounded[key]);
                assert_eq!(
                    warning.to_string(),
                    format!("Invalid value for {}. Default ({}) will be used.", key, rounded[key])
                );
            }
        }

        let raw = RawInputs::new().with(FeatureKey::TempAvg, "warm");
        let assembly = assemble(&raw, &defaults());
        assert_eq!(
            assembly.warnings[0].to_string(),
            "Invalid value for Temp_Avg. Default (27.46) will be used."
        );
    }

    #[test]
    fn test_digit_separators() {
        let raw = RawInputs::new()
            .with(FeatureKey::RainSum, "1_250")
            .with(FeatureKey::NdviTrend, "0.000_5");
        let assembly = assemble(&raw, &defaults());

        assert!(assembly.warnings.is_empty());
        assert_eq!(assembly.features.get(FeatureKey::RainSum).value, 1250.0);
        assert_eq!(assembly.features.get(FeatureKey::NdviTrend).value, 0.0005);
        assert_eq!(parse_finite("1_"), None);
        assert_eq!(parse_finite("1._5"), None);
    }

    #[test]
    fn test_every_value_is_finite() {
        let raw = RawInputs::new()
            .with(FeatureKey::NdviTrend, "-0.5")
            .with(FeatureKey::RainSum, "nan")
            .with(FeatureKey::NdviPeakWeek, "21");
        let assembly = assemble(&raw, &defaults());
        assert!(assembly.features.values().is_finite());
        assert_eq!(assembly.warnings.len(), 1);
    }
}

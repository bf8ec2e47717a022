//! Agronomic Advice
//!
//! Fixed threshold rules evaluated against the assembled feature values.
//! Rules are independent: any subset may fire, and suggestions come back in
//! rule declaration order. When nothing fires a single "all optimal" message
//! is returned, so the advice list is never empty.

use serde::{Deserialize, Serialize};

use crate::features::{FeatureKey, FeatureVector};

/// What a suggestion is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceCategory {
    SlowVegetationGrowth,
    LowRainfall,
    HighTemperature,
    LatePeakGrowth,
    AllOptimal,
}

/// Strict comparison against a fixed threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// Fires when value < limit
    Below(f64),
    /// Fires when value > limit
    Above(f64),
}

impl Threshold {
    pub fn is_triggered(&self, value: f64) -> bool {
        match *self {
            Threshold::Below(limit) => value < limit,
            Threshold::Above(limit) => value > limit,
        }
    }
}

/// A single advisory rule
#[derive(Debug, Clone, Copy)]
pub struct AdvisoryRule {
    pub feature: FeatureKey,
    pub threshold: Threshold,
    pub category: AdviceCategory,
    pub icon: &'static str,
    pub message: &'static str,
}

/// Rules in evaluation (and output) order
pub const RULES: [AdvisoryRule; 4] = [
    AdvisoryRule {
        feature: FeatureKey::NdviTrend,
        threshold: Threshold::Below(0.01),
        category: AdviceCategory::SlowVegetationGrowth,
        icon: "🔎",
        message: "Vegetation growth is slow: improve soil nutrition or irrigation.",
    },
    AdvisoryRule {
        feature: FeatureKey::RainSum,
        threshold: Threshold::Below(400.0),
        category: AdviceCategory::LowRainfall,
        icon: "💧",
        message: "Low rainfall: consider drought-tolerant crop varieties.",
    },
    AdvisoryRule {
        feature: FeatureKey::TempAvg,
        threshold: Threshold::Above(30.0),
        category: AdviceCategory::HighTemperature,
        icon: "🌡️",
        message: "High temperatures: try early-season sowing next time.",
    },
    AdvisoryRule {
        feature: FeatureKey::NdviPeakWeek,
        threshold: Threshold::Above(20.0),
        category: AdviceCategory::LatePeakGrowth,
        icon: "⏳",
        message: "Late peak growth: check fertilizer and pest schedules.",
    },
];

const OPTIMAL_MESSAGE: &str = "Excellent! All conditions are optimal for healthy yield.";

/// Human-readable agronomic suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: AdviceCategory,
    pub icon: String,
    pub message: String,
}

impl Suggestion {
    fn from_rule(rule: &AdvisoryRule) -> Self {
        Self {
            category: rule.category,
            icon: rule.icon.to_string(),
            message: rule.message.to_string(),
        }
    }

    fn all_optimal() -> Self {
        Self {
            category: AdviceCategory::AllOptimal,
            icon: "✅".to_string(),
            message: OPTIMAL_MESSAGE.to_string(),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.category == AdviceCategory::AllOptimal
    }
}

/// Evaluate every rule against the assembled values
pub fn advise(features: &FeatureVector) -> Vec<Suggestion> {
    let suggestions: Vec<Suggestion> = RULES
        .iter()
        .filter(|rule| rule.threshold.is_triggered(features[rule.feature]))
        .map(Suggestion::from_rule)
        .collect();

    if suggestions.is_empty() {
        vec![Suggestion::all_optimal()]
    } else {
        suggestions
    }
}

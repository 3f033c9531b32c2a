//! Breed prediction extraction and the confidence policy.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clarify::{ClarifyingBand, DETAILED_BELOW, MODERATE_BELOW};

/// Label used when no usable prediction came back.
pub const UNKNOWN_BREED: &str = "unknown";

/// Labels that always warrant an explanation, whatever the confidence.
pub const UNCERTAIN_LABELS: &[&str] = &["uncertain", "mixed", "unknown", "error"];

/// Top-ranked breed from the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedPrediction {
    pub breed: String,
    pub confidence: f64,
}

impl BreedPrediction {
    /// Build a prediction, clamping confidence into [0, 1].
    pub fn new(breed: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            breed: breed.into(),
            confidence,
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_BREED, 0.0)
    }

    pub fn has_uncertain_label(&self) -> bool {
        let label = self.breed.trim().to_lowercase();
        UNCERTAIN_LABELS.contains(&label.as_str())
    }
}

impl Default for BreedPrediction {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Extract the first entry of a classifier `predictions` list.
///
/// Accepts `{"predictions": [{"class": .., "confidence": ..}, ..]}`. Anything
/// else (missing list, empty list, non-object entry) yields
/// [`BreedPrediction::unknown`]. The list is trusted to be ranked already.
pub fn top_prediction(payload: Option<&Value>) -> BreedPrediction {
    let top = payload
        .and_then(|p| p.get("predictions"))
        .and_then(|p| p.as_array())
        .and_then(|list| list.first());

    let Some(top) = top.filter(|t| t.is_object()) else {
        return BreedPrediction::unknown();
    };

    let breed = top
        .get("class")
        .and_then(|c| c.as_str())
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(UNKNOWN_BREED);
    let confidence = top
        .get("confidence")
        .and_then(|c| c.as_f64())
        .unwrap_or(0.0);

    BreedPrediction::new(breed, confidence)
}

/// Thresholds deciding what supplementary material goes in the envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidencePolicy {
    /// Below this an explanation is requested
    #[serde(default = "default_explanation_threshold")]
    pub explanation_threshold: f64,

    /// Below this clarifying questions are attached. Also the upper edge
    /// of the moderate questionnaire band.
    #[serde(default = "default_clarification_threshold")]
    pub clarification_threshold: f64,

    /// Below this the detailed questionnaire is used
    #[serde(default = "default_detailed_threshold")]
    pub detailed_threshold: f64,
}

fn default_explanation_threshold() -> f64 {
    0.7
}

fn default_clarification_threshold() -> f64 {
    MODERATE_BELOW
}

fn default_detailed_threshold() -> f64 {
    DETAILED_BELOW
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            explanation_threshold: default_explanation_threshold(),
            clarification_threshold: default_clarification_threshold(),
            detailed_threshold: default_detailed_threshold(),
        }
    }
}

impl ConfidencePolicy {
    /// Low confidence or an uncertain label triggers an explanation.
    pub fn needs_explanation(&self, prediction: &BreedPrediction) -> bool {
        prediction.confidence < self.explanation_threshold || prediction.has_uncertain_label()
    }

    pub fn needs_clarification(&self, prediction: &BreedPrediction) -> bool {
        prediction.confidence < self.clarification_threshold
    }

    /// Questionnaire band, or `None` when no questions are needed.
    ///
    /// Band edges follow the configured thresholds, so a raised
    /// clarification threshold widens the moderate band instead of
    /// reaching the light one.
    pub fn clarifying_band(&self, prediction: &BreedPrediction) -> Option<ClarifyingBand> {
        if !self.needs_clarification(prediction) {
            return None;
        }
        Some(ClarifyingBand::with_cutoffs(
            prediction.confidence,
            self.detailed_threshold,
            self.clarification_threshold,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_prediction_takes_first_entry() {
        let payload = json!({
            "predictions": [
                {"class": "Gir", "confidence": 0.92},
                {"class": "Sahiwal", "confidence": 0.05}
            ]
        });
        let p = top_prediction(Some(&payload));
        assert_eq!(p.breed, "Gir");
        assert_eq!(p.confidence, 0.92);
    }

    #[test]
    fn test_top_prediction_defaults() {
        assert_eq!(top_prediction(None), BreedPrediction::unknown());
        assert_eq!(
            top_prediction(Some(&json!({"predictions": []}))),
            BreedPrediction::unknown()
        );
        assert_eq!(
            top_prediction(Some(&json!({"error": "quota"}))),
            BreedPrediction::unknown()
        );
        assert_eq!(
            top_prediction(Some(&json!({"predictions": {"Gir": {"confidence": 0.9}}}))),
            BreedPrediction::unknown()
        );
    }

    #[test]
    fn test_top_prediction_partial_entry() {
        let p = top_prediction(Some(&json!({"predictions": [{"confidence": 0.8}]})));
        assert_eq!(p.breed, UNKNOWN_BREED);
        assert_eq!(p.confidence, 0.8);

        let p = top_prediction(Some(&json!({"predictions": [{"class": "Hariana"}]})));
        assert_eq!(p.breed, "Hariana");
        assert_eq!(p.confidence, 0.0);
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(BreedPrediction::new("Gir", 1.7).confidence, 1.0);
        assert_eq!(BreedPrediction::new("Gir", -0.2).confidence, 0.0);
        assert_eq!(BreedPrediction::new("Gir", f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_policy_thresholds() {
        let policy = ConfidencePolicy::default();

        let confident = BreedPrediction::new("Gir", 0.92);
        assert!(!policy.needs_explanation(&confident));
        assert!(!policy.needs_clarification(&confident));

        let borderline = BreedPrediction::new("Gir", 0.7);
        assert!(!policy.needs_explanation(&borderline));

        let moderate = BreedPrediction::new("Sahiwal", 0.6);
        assert!(policy.needs_explanation(&moderate));
        assert!(!policy.needs_clarification(&moderate));

        let low = BreedPrediction::new("Sahiwal", 0.42);
        assert!(policy.needs_explanation(&low));
        assert!(policy.needs_clarification(&low));
    }

    #[test]
    fn test_clarifying_band_default_policy() {
        let policy = ConfidencePolicy::default();
        let band = |c| policy.clarifying_band(&BreedPrediction::new("Gir", c));
        assert_eq!(band(0.1), Some(ClarifyingBand::Detailed));
        assert_eq!(band(0.42), Some(ClarifyingBand::Moderate));
        assert_eq!(band(0.5), None);
    }

    #[test]
    fn test_clarifying_band_follows_raised_threshold() {
        let policy = ConfidencePolicy {
            clarification_threshold: 0.6,
            ..ConfidencePolicy::default()
        };
        let band = |c| policy.clarifying_band(&BreedPrediction::new("Gir", c));
        assert_eq!(band(0.55), Some(ClarifyingBand::Moderate));
        assert_eq!(band(0.2), Some(ClarifyingBand::Detailed));
        assert_eq!(band(0.65), None);
    }

    #[test]
    fn test_uncertain_label_triggers_explanation() {
        let policy = ConfidencePolicy::default();
        for label in ["Mixed", "uncertain", " UNKNOWN ", "error"] {
            let p = BreedPrediction::new(label, 0.95);
            assert!(policy.needs_explanation(&p), "{}", label);
            assert!(!policy.needs_clarification(&p));
        }
    }
}

//! Clarifying questionnaires for uncertain breed identifications.

use serde::{Deserialize, Serialize};

/// How much follow-up we ask the user for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarifyingBand {
    /// Confidence below 0.3
    Detailed,
    /// Confidence below 0.5
    Moderate,
    /// Anything else
    Light,
}

impl ClarifyingBand {
    /// Band under the default cutoffs (0.3 and 0.5).
    pub fn for_confidence(confidence: f64) -> Self {
        Self::with_cutoffs(confidence, DETAILED_BELOW, MODERATE_BELOW)
    }

    /// Detailed below `detailed_below`, moderate below `moderate_below`.
    pub fn with_cutoffs(confidence: f64, detailed_below: f64, moderate_below: f64) -> Self {
        if confidence < detailed_below {
            ClarifyingBand::Detailed
        } else if confidence < moderate_below {
            ClarifyingBand::Moderate
        } else {
            ClarifyingBand::Light
        }
    }

    pub fn questions(&self) -> &'static str {
        match self {
            ClarifyingBand::Detailed => DETAILED_QUESTIONS,
            ClarifyingBand::Moderate => MODERATE_QUESTIONS,
            ClarifyingBand::Light => LIGHT_QUESTIONS,
        }
    }
}

pub const DETAILED_BELOW: f64 = 0.3;
pub const MODERATE_BELOW: f64 = 0.5;

const DETAILED_QUESTIONS: &str = "The AI is very uncertain about this breed identification. \
To help improve accuracy, could you provide:

• Size and Build: Is this animal large, medium, or small? Any distinctive body shape?
• Color and Markings: What is the primary color? Any spots, patches, or distinctive markings?
• Physical Features: Any notable features like ear shape, hump size, or horn characteristics?
• Location: What region/state is this animal from?
• Purpose: Is this animal used for dairy, draught, or both?
• Known History: Do you know anything about the animal's parentage or breeding?";

const MODERATE_QUESTIONS: &str = "The AI has moderate confidence in this breed identification. \
To confirm, could you verify:

• Color Pattern: Does the color match the predicted breed characteristics?
• Size: Is the size appropriate for the predicted breed?
• Region: Is this breed common in your area?
• Usage: Is this animal used for the typical purpose of this breed?";

const LIGHT_QUESTIONS: &str = "The AI is reasonably confident but would appreciate confirmation:

• Does this breed identification seem correct based on your knowledge?
• Are there any characteristics that don't match the predicted breed?";

/// Questionnaire text for the band the confidence falls into.
pub fn clarifying_questions(confidence: f64) -> String {
    ClarifyingBand::for_confidence(confidence)
        .questions()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(ClarifyingBand::for_confidence(0.0), ClarifyingBand::Detailed);
        assert_eq!(ClarifyingBand::for_confidence(0.29), ClarifyingBand::Detailed);
        assert_eq!(ClarifyingBand::for_confidence(0.3), ClarifyingBand::Moderate);
        assert_eq!(ClarifyingBand::for_confidence(0.49), ClarifyingBand::Moderate);
        assert_eq!(ClarifyingBand::for_confidence(0.5), ClarifyingBand::Light);
        assert_eq!(ClarifyingBand::for_confidence(0.99), ClarifyingBand::Light);
    }

    #[test]
    fn test_custom_cutoffs() {
        assert_eq!(ClarifyingBand::with_cutoffs(0.35, 0.4, 0.7), ClarifyingBand::Detailed);
        assert_eq!(ClarifyingBand::with_cutoffs(0.65, 0.4, 0.7), ClarifyingBand::Moderate);
        assert_eq!(ClarifyingBand::with_cutoffs(0.7, 0.4, 0.7), ClarifyingBand::Light);
    }

    #[test]
    fn test_questionnaires_differ() {
        let detailed = clarifying_questions(0.1);
        let moderate = clarifying_questions(0.42);
        let light = clarifying_questions(0.6);
        assert!(detailed.contains("very uncertain"));
        assert!(moderate.contains("moderate confidence"));
        assert!(light.contains("reasonably confident"));
        assert!(detailed.lines().count() > moderate.lines().count());
    }
}

//! Prompt templates for breed explanations.

use pashu_shared::BreedPrediction;

pub const SYSTEM_PROMPT: &str = "You are an expert veterinary AI assistant specializing in Indian cattle breeds. \
Provide clear, helpful explanations about breed identification, characteristics, and common confusions. \
Be concise but informative, focusing on practical insights for farmers.";

/// Returned in place of an explanation when the text service fails.
pub const EXPLANATION_UNAVAILABLE: &str = "AI explanation service is currently unavailable. \
Please rely on the breed prediction and the clarifying questions, or try again later.";

/// Retrieval query for the knowledge index.
pub fn retrieval_query(prediction: &BreedPrediction) -> String {
    format!(
        "Breed prediction results: {} with {:.2} confidence. \
         What this breed is known for, key characteristics to look for, \
         possible reasons for uncertainty, similar breeds that might be confused.",
        prediction.breed.replace('_', " "),
        prediction.confidence
    )
}

pub fn explanation_prompt(context: &str, prediction: &BreedPrediction, image_name: &str) -> String {
    format!(
        "Based on the following knowledge base and prediction results, provide a helpful explanation:

KNOWLEDGE BASE:
{}

PREDICTION RESULTS:
- Predicted Breed: {}
- Confidence: {:.2}
- Image: {}

Please provide a clear explanation that helps the user understand the breed identification result.",
        context, prediction.breed, prediction.confidence, image_name
    )
}

//! Retrieval-augmented explanations for uncertain predictions.

use crate::clients::{GenerationRequest, TextGenerator};
use crate::config::{Config, KnowledgeConfig};
use crate::prompts::{explanation_prompt, retrieval_query, EXPLANATION_UNAVAILABLE, SYSTEM_PROMPT};
use pashu_shared::knowledge::{chunk_text, KnowledgeIndex};
use pashu_shared::{BreedPrediction, UpstreamError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Generation parameters taken from config
#[derive(Debug, Clone, Copy)]
pub struct ExplainSettings {
    pub top_k: usize,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl ExplainSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            top_k: config.knowledge.top_k,
            max_tokens: config.text_generation.max_tokens,
            temperature: config.text_generation.temperature,
            timeout: config.text_generation_timeout(),
        }
    }
}

pub struct Explainer {
    index: KnowledgeIndex,
    generator: Arc<dyn TextGenerator>,
    settings: ExplainSettings,
}

impl Explainer {
    /// Chunk and index the knowledge text once.
    pub fn new(
        knowledge_text: &str,
        knowledge: &KnowledgeConfig,
        generator: Arc<dyn TextGenerator>,
        settings: ExplainSettings,
    ) -> Self {
        let index = KnowledgeIndex::new(chunk_text(knowledge_text, &knowledge.chunk_options()));
        info!("Knowledge base indexed: {} chunks", index.len());
        Self {
            index,
            generator,
            settings,
        }
    }

    pub fn knowledge_chunks(&self) -> usize {
        self.index.len()
    }

    pub fn generator_configured(&self) -> bool {
        self.generator.is_configured()
    }

    /// Top-k relevant chunks joined by blank lines.
    ///
    /// Falls back to the leading chunks when nothing matches so the model
    /// always gets some reference material.
    pub fn context_for(&self, prediction: &BreedPrediction) -> String {
        let query = retrieval_query(prediction);
        let hits = self.index.search(&query, self.settings.top_k);
        debug!(
            "Retrieved {} knowledge chunks for '{}'",
            hits.len(),
            prediction.breed
        );

        if hits.is_empty() {
            return self
                .index
                .chunks()
                .iter()
                .take(self.settings.top_k)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n\n");
        }

        hits.iter()
            .map(|h| h.text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Ask the text service for an explanation.
    pub async fn try_explain(
        &self,
        prediction: &BreedPrediction,
        image_name: &str,
    ) -> Result<String, UpstreamError> {
        let context = self.context_for(prediction);
        let request = GenerationRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: explanation_prompt(&context, prediction, image_name),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let text = tokio::time::timeout(self.settings.timeout, self.generator.generate(&request))
            .await
            .map_err(|_| UpstreamError::Timeout(self.settings.timeout.as_secs()))??;

        if text.trim().is_empty() {
            return Err(UpstreamError::EmptyResponse);
        }
        Ok(text)
    }

    /// Explanation text, or the static unavailable message on any failure.
    pub async fn explain(&self, prediction: &BreedPrediction, image_name: &str) -> String {
        match self.try_explain(prediction, image_name).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Explanation unavailable for '{}': {}", prediction.breed, e);
                EXPLANATION_UNAVAILABLE.to_string()
            }
        }
    }
}

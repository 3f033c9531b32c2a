//! Configuration management for pashud.
//!
//! Loads settings from a TOML file (explicit path, `PASHU_CONFIG`,
//! /etc/pashu/config.toml, then ./pashud.toml) or uses defaults.
//! Credentials are never part of the defaults: they come from the file or
//! from the environment, and the environment wins.

use anyhow::{Context, Result};
use pashu_shared::knowledge::ChunkOptions;
use pashu_shared::upload::default_allowed_extensions;
use pashu_shared::ConfidencePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// System config file path
pub const CONFIG_PATH: &str = "/etc/pashu/config.toml";

/// Config file next to the working directory, used for local runs
pub const LOCAL_CONFIG_PATH: &str = "pashud.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "PASHU_CONFIG";

pub const BIND_ENV: &str = "PASHU_BIND";
pub const DETECT_KEY_ENV: &str = "ROBOFLOW_API_KEY_DETECT";
pub const BREED_KEY_ENV: &str = "ROBOFLOW_API_KEY_BREED";
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Smallest accepted upstream timeout
pub const MIN_TIMEOUT_SECS: u64 = 1;

const ROBOFLOW_API_URL: &str = "https://serverless.roboflow.com";

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Largest accepted request body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Where uploads live while a request is processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("uploads")
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

/// Roboflow detection workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default = "default_roboflow_url")]
    pub api_url: String,

    #[serde(default = "default_workspace")]
    pub workspace: String,

    #[serde(default = "default_workflow_id")]
    pub workflow_id: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_use_cache")]
    pub use_cache: bool,

    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

fn default_roboflow_url() -> String {
    ROBOFLOW_API_URL.to_string()
}

fn default_workspace() -> String {
    "shiv-q9erb".to_string()
}

fn default_workflow_id() -> String {
    "detect-and-classify-2".to_string()
}

fn default_use_cache() -> bool {
    true
}

fn default_upstream_timeout() -> u64 {
    30
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            api_url: default_roboflow_url(),
            workspace: default_workspace(),
            workflow_id: default_workflow_id(),
            api_key: None,
            use_cache: default_use_cache(),
            timeout_secs: default_upstream_timeout(),
        }
    }
}

/// Roboflow hosted breed classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedConfig {
    #[serde(default = "default_roboflow_url")]
    pub api_url: String,

    #[serde(default = "default_model_id")]
    pub model_id: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

fn default_model_id() -> String {
    "breed-6neji/1".to_string()
}

impl Default for BreedConfig {
    fn default() -> Self {
        Self {
            api_url: default_roboflow_url(),
            model_id: default_model_id(),
            api_key: None,
            timeout_secs: default_upstream_timeout(),
        }
    }
}

/// OpenAI-compatible chat completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextGenerationConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_llm_timeout() -> u64 {
    60
}

impl Default for TextGenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Knowledge base used as explanation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_knowledge_path")]
    pub path: PathBuf,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks retrieved per explanation
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_knowledge_path() -> PathBuf {
    PathBuf::from("models/knowledge/breed_knowledge.txt")
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_top_k() -> usize {
    3
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_knowledge_path(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
        }
    }
}

impl KnowledgeConfig {
    pub fn chunk_options(&self) -> ChunkOptions {
        ChunkOptions {
            chunk_size: self.chunk_size,
            overlap: self.chunk_overlap,
            ..ChunkOptions::default()
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub uploads: UploadConfig,

    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub breed: BreedConfig,

    #[serde(default)]
    pub text_generation: TextGenerationConfig,

    #[serde(default)]
    pub policy: ConfidencePolicy,

    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

impl Config {
    /// Load config and apply environment overrides.
    ///
    /// An explicit path must exist and parse. Otherwise the usual locations
    /// are tried in order and defaults are used when none is readable.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => Self::load_from_default_locations(),
        };
        config.apply_env_overrides();
        config.clamp_timeouts();
        Ok(config)
    }

    fn load_from_default_locations() -> Self {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            candidates.push(PathBuf::from(path));
        }
        candidates.push(PathBuf::from(CONFIG_PATH));
        candidates.push(PathBuf::from(LOCAL_CONFIG_PATH));

        for path in &candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_path(path) {
                Ok(config) => return config,
                Err(e) => warn!("Ignoring config {}: {:#}", path.display(), e),
            }
        }

        warn!("No config file found, using defaults");
        Config::default()
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = get(BIND_ENV) {
            self.server.bind = bind;
        }
        if let Some(key) = get(DETECT_KEY_ENV) {
            self.detection.api_key = Some(key);
        }
        if let Some(key) = get(BREED_KEY_ENV) {
            self.breed.api_key = Some(key);
        }
        if let Some(key) = get(OPENAI_KEY_ENV) {
            self.text_generation.api_key = Some(key);
        }
    }

    /// Environment variable names of credentials that are still missing
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !has_value(&self.detection.api_key) {
            missing.push(DETECT_KEY_ENV);
        }
        if !has_value(&self.breed.api_key) {
            missing.push(BREED_KEY_ENV);
        }
        if !has_value(&self.text_generation.api_key) {
            missing.push(OPENAI_KEY_ENV);
        }
        missing
    }

    /// Raise zero timeouts to the minimum so upstream calls are not
    /// failed before they start.
    pub fn clamp_timeouts(&mut self) {
        let timeouts = [
            ("detection", &mut self.detection.timeout_secs),
            ("breed", &mut self.breed.timeout_secs),
            ("text_generation", &mut self.text_generation.timeout_secs),
        ];
        for (section, secs) in timeouts {
            if *secs < MIN_TIMEOUT_SECS {
                warn!(
                    "{}.timeout_secs = {} is too small, using {}",
                    section, secs, MIN_TIMEOUT_SECS
                );
                *secs = MIN_TIMEOUT_SECS;
            }
        }
    }

    pub fn detection_timeout(&self) -> Duration {
        Duration::from_secs(self.detection.timeout_secs)
    }

    pub fn breed_timeout(&self) -> Duration {
        Duration::from_secs(self.breed.timeout_secs)
    }

    pub fn text_generation_timeout(&self) -> Duration {
        Duration::from_secs(self.text_generation.timeout_secs)
    }
}

pub(crate) fn has_value(key: &Option<String>) -> bool {
    key.as_deref().map(|k| !k.trim().is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert_eq!(config.uploads.allowed_extensions.len(), 6);
        assert_eq!(config.breed.model_id, "breed-6neji/1");
        assert_eq!(config.text_generation.max_tokens, 500);
        assert_eq!(config.policy.explanation_threshold, 0.7);
        assert_eq!(config.policy.clarification_threshold, 0.5);
        assert_eq!(config.knowledge.top_k, 3);
        assert!(config.detection.api_key.is_none());
    }

    #[test]
    fn test_defaults_carry_no_credentials() {
        let config = Config::default();
        assert_eq!(
            config.missing_credentials(),
            vec![DETECT_KEY_ENV, BREED_KEY_ENV, OPENAI_KEY_ENV]
        );
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
bind = "127.0.0.1:9000"

[breed]
model_id = "cattle-breeds/4"
timeout_secs = 5

[policy]
explanation_threshold = 0.8
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.breed.model_id, "cattle-breeds/4");
        assert_eq!(config.breed_timeout(), Duration::from_secs(5));
        assert_eq!(config.policy.explanation_threshold, 0.8);
        // Defaults for missing fields
        assert_eq!(config.policy.clarification_threshold, 0.5);
        assert_eq!(config.server.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.detection.workflow_id, "detect-and-classify-2");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (BIND_ENV, "127.0.0.1:8123"),
            (BREED_KEY_ENV, "breed-key"),
            (OPENAI_KEY_ENV, "   "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.text_generation.api_key = Some("from-file".to_string());
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.bind, "127.0.0.1:8123");
        assert_eq!(config.breed.api_key.as_deref(), Some("breed-key"));
        // Blank env value does not clobber the file value
        assert_eq!(config.text_generation.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.missing_credentials(), vec![DETECT_KEY_ENV]);
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pashud.toml");
        fs::write(&path, "[uploads]\nscratch_dir = \"/tmp/pashu-scratch\"\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.uploads.scratch_dir, PathBuf::from("/tmp/pashu-scratch"));
    }

    #[test]
    fn test_zero_timeouts_are_raised_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pashud.toml");
        fs::write(
            &path,
            "[detection]\ntimeout_secs = 0\n\n[text_generation]\ntimeout_secs = 0\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.detection_timeout(), Duration::from_secs(MIN_TIMEOUT_SECS));
        assert_eq!(config.text_generation_timeout(), Duration::from_secs(MIN_TIMEOUT_SECS));
        assert_eq!(config.breed_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/pashud.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_chunk_options_from_config() {
        let config = KnowledgeConfig::default();
        let options = config.chunk_options();
        assert_eq!(options.chunk_size, 500);
        assert_eq!(options.overlap, 50);
        assert_eq!(options.separator, "\n\n");
    }
}

//! Configuration types for plant analysis.
//!
//! All behaviour is controlled through [`AnalysisConfig`], built via its
//! [`AnalysisConfigBuilder`]. The defaults reproduce the sampling settings the
//! diagnosis prompt was tuned with (temperature 0.5, top-p 0.9, top-k 40).

use crate::error::PlantDocError;
use crate::pipeline::llm::PlantAnalyzer;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables read, in order, for the API key when none is set explicitly.
pub const DEFAULT_API_KEY_ENV: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Largest accepted upload, in bytes (10 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Configuration for a plant analysis.
///
/// # Example
/// ```rust
/// use plantdoc::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .model("gemini-2.5-pro")
///     .api_timeout_secs(90)
///     .build()
///     .unwrap();
/// assert_eq!(config.top_k, 40);
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Gemini model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Sampling temperature. Range 0.0–2.0. Default: 0.5.
    ///
    /// Lower than the API default so the diagnosis stays factual.
    pub temperature: f32,

    /// Nucleus sampling cutoff. Range 0.0–1.0. Default: 0.9.
    pub top_p: f32,

    /// Top-k sampling cutoff. Default: 40.
    pub top_k: u32,

    /// Explicit API key. Takes precedence over the environment.
    pub api_key: Option<String>,

    /// Environment variables holding the API key, first non-empty wins.
    /// Default: [`DEFAULT_API_KEY_ENV`].
    pub api_key_env: Vec<String>,

    /// Scheme and host of the inference API, without a trailing path.
    pub base_url: String,

    /// Per-request timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Upload size limit in bytes. Default: [`DEFAULT_MAX_IMAGE_BYTES`].
    pub max_image_bytes: u64,

    /// Custom system instruction. If None, uses [`crate::prompts::SYSTEM_INSTRUCTION`].
    pub system_prompt: Option<String>,

    /// Pre-constructed analyzer. Takes precedence over the built-in Gemini client.
    pub analyzer: Option<Arc<dyn PlantAnalyzer>>,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.5,
            top_p: 0.9,
            top_k: 40,
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.iter().map(|s| s.to_string()).collect(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_timeout_secs: 60,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            system_prompt: None,
            analyzer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_env", &self.api_key_env)
            .field("base_url", &self.base_url)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_image_bytes", &self.max_image_bytes)
            .field("system_prompt", &self.system_prompt.as_ref().map(|p| p.len()))
            .field("analyzer", &self.analyzer.as_ref().map(|_| "<dyn PlantAnalyzer>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn AnalysisProgressCallback>"),
            )
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolve the API key: explicit value first, then each of `api_key_env`.
    ///
    /// Empty values count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                self.api_key_env
                    .iter()
                    .filter_map(|name| std::env::var(name).ok())
                    .find(|v| !v.trim().is_empty())
            })
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.config.top_p = p.clamp(0.0, 1.0);
        self
    }

    pub fn top_k(mut self, k: u32) -> Self {
        self.config.top_k = k.max(1);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Read the key from this single environment variable instead of the defaults.
    pub fn api_key_env(mut self, name: impl Into<String>) -> Self {
        self.config.api_key_env = vec![name.into()];
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_image_bytes(mut self, n: u64) -> Self {
        self.config.max_image_bytes = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn analyzer(mut self, analyzer: Arc<dyn PlantAnalyzer>) -> Self {
        self.config.analyzer = Some(analyzer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, PlantDocError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(PlantDocError::InvalidConfig("Model must not be empty".into()));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(PlantDocError::InvalidConfig(format!(
                "Base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.api_timeout_secs == 0 {
            return Err(PlantDocError::InvalidConfig("API timeout must be ≥ 1 second".into()));
        }
        if c.max_image_bytes == 0 {
            return Err(PlantDocError::InvalidConfig("Image size limit must be ≥ 1 byte".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_sampling() {
        let c = AnalysisConfig::default();
        assert_eq!(c.temperature, 0.5);
        assert_eq!(c.top_p, 0.9);
        assert_eq!(c.top_k, 40);
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.max_image_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn builder_clamps() {
        let c = AnalysisConfig::builder()
            .temperature(5.0)
            .top_p(-1.0)
            .top_k(0)
            .build()
            .unwrap();
        assert_eq!(c.temperature, 2.0);
        assert_eq!(c.top_p, 0.0);
        assert_eq!(c.top_k, 1);
    }

    #[test]
    fn builder_trims_base_url() {
        let c = AnalysisConfig::builder()
            .base_url("http://127.0.0.1:8080/")
            .build()
            .unwrap();
        assert_eq!(c.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn builder_rejects_bad_values() {
        assert!(AnalysisConfig::builder().model(" ").build().is_err());
        assert!(AnalysisConfig::builder().base_url("ftp://x").build().is_err());
        assert!(AnalysisConfig::builder().api_timeout_secs(0).build().is_err());
        assert!(AnalysisConfig::builder().max_image_bytes(0).build().is_err());
    }

    #[test]
    fn explicit_key_wins() {
        let c = AnalysisConfig::builder().api_key("k-123").build().unwrap();
        assert_eq!(c.resolve_api_key().as_deref(), Some("k-123"));
    }

    #[test]
    fn unset_env_resolves_to_none() {
        let c = AnalysisConfig::builder()
            .api_key_env("PLANTDOC_TEST_UNSET_KEY_9F2A")
            .build()
            .unwrap();
        assert_eq!(c.resolve_api_key(), None);
    }

    #[test]
    fn blank_explicit_key_is_absent() {
        let c = AnalysisConfig::builder()
            .api_key("   ")
            .api_key_env("PLANTDOC_TEST_UNSET_KEY_9F2A")
            .build()
            .unwrap();
        assert_eq!(c.resolve_api_key(), None);
    }

    #[test]
    fn debug_redacts_key() {
        let c = AnalysisConfig::builder().api_key("secret-key").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret-key"));
        assert!(dbg.contains("<redacted>"));
    }
}

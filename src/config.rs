//! Configuration types for minutes summarisation.
//!
//! All behaviour is controlled through [`SummaryConfig`], built via its
//! [`SummaryConfigBuilder`]. The config value is passed explicitly into every
//! entry point; in particular the API credential lives here and nowhere else,
//! so two requests with different keys can run side by side in one process.

use crate::error::SummaryError;
use crate::pipeline::export::{DEFAULT_FILE_NAME, DEFAULT_TITLE};
use crate::pipeline::table::RowPolicy;
use crate::progress::ProgressCallback;
use crate::prompts::{placeholder_count, MINUTES_PLACEHOLDER};
use edgequake_llm::LLMProvider;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for one summarisation request.
///
/// Built via [`SummaryConfig::builder()`] or using
/// [`SummaryConfig::default()`].
///
/// # Example
/// ```rust
/// use minutes_audit::{RowPolicy, SummaryConfig};
///
/// let config = SummaryConfig::builder()
///     .api_key("sk-test")
///     .model("gpt-4.1-mini")
///     .row_policy(RowPolicy::Strict)
///     .build()
///     .unwrap();
/// assert_eq!(config.temperature, 0.3);
/// ```
#[derive(Clone)]
pub struct SummaryConfig {
    /// Model identifier sent with the completion request. Default: `gpt-3.5-turbo`.
    pub model: String,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama") used when no
    /// API key is configured. Resolved through `edgequake_llm::ProviderFactory`.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over everything else.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// API key for the OpenAI-compatible endpoint at `api_base_url`.
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint. Default: `https://api.openai.com/v1`.
    pub api_base_url: String,

    /// Sampling temperature. Default: 0.3.
    ///
    /// Low enough that the same minutes produce materially the same table,
    /// high enough that bullet wording reads naturally.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: provider default.
    pub max_tokens: Option<usize>,

    /// Timeout for the model call in seconds. Default: 120.
    ///
    /// Expiry is reported once as [`SummaryError::ApiTimeout`]; nothing is retried.
    pub api_timeout_secs: u64,

    /// Custom prompt template containing `{minutes}` once. If None, uses the built-in prompt.
    pub prompt_template: Option<String>,

    /// Heading written above the exported table. Default: "Board Minutes Summary for Audit".
    pub title: String,

    /// File name suggested for the exported document. Default: `audit_summary.docx`.
    pub output_file_name: String,

    /// How rows with the wrong number of cells are handled. Default: [`RowPolicy::Normalize`].
    pub row_policy: RowPolicy,

    /// Stage progress events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            provider_name: None,
            provider: None,
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            temperature: 0.3,
            max_tokens: None,
            api_timeout_secs: 120,
            prompt_template: None,
            title: DEFAULT_TITLE.to_string(),
            output_file_name: DEFAULT_FILE_NAME.to_string(),
            row_policy: RowPolicy::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("prompt_template", &self.prompt_template.as_ref().map(|t| t.len()))
            .field("title", &self.title)
            .field("output_file_name", &self.output_file_name)
            .field("row_policy", &self.row_policy)
            .finish()
    }
}

impl SummaryConfig {
    /// Create a new builder for `SummaryConfig`.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SummaryConfig`].
#[derive(Debug)]
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl SummaryConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Take the API key from a loaded secrets file, if it has one.
    ///
    /// An already-set key wins over the secrets file.
    pub fn secrets(mut self, secrets: &Secrets) -> Self {
        if self.config.api_key.is_none() {
            self.config.api_key = secrets.openai_api_key().map(str::to_string);
        }
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.config.prompt_template = Some(template.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn output_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.output_file_name = name.into();
        self
    }

    pub fn row_policy(mut self, policy: RowPolicy) -> Self {
        self.config.row_policy = policy;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummaryConfig, SummaryError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(SummaryError::InvalidConfig("model must not be empty".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(SummaryError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if let Some(ref key) = c.api_key {
            if key.trim().is_empty() {
                return Err(SummaryError::InvalidConfig("API key must not be empty".into()));
            }
        }
        if let Some(ref template) = c.prompt_template {
            let n = placeholder_count(template);
            if n != 1 {
                return Err(SummaryError::InvalidConfig(format!(
                    "prompt template must contain {} exactly once, found {}",
                    MINUTES_PLACEHOLDER, n
                )));
            }
        }
        if c.title.trim().is_empty() {
            return Err(SummaryError::InvalidConfig("title must not be empty".into()));
        }
        if !c.output_file_name.to_ascii_lowercase().ends_with(".docx") {
            return Err(SummaryError::InvalidConfig(format!(
                "output file name must end in .docx, got '{}'",
                c.output_file_name
            )));
        }
        Ok(self.config)
    }
}

// ── Secrets file ─────────────────────────────────────────────────────────

/// Deployment-time secret store, read once at process start.
///
/// ```toml
/// [openai]
/// api_key = "sk-..."
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    openai: Option<OpenAiSecrets>,
}

#[derive(Clone, Default, Deserialize)]
struct OpenAiSecrets {
    api_key: Option<String>,
}

impl fmt::Debug for OpenAiSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSecrets")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Secrets {
    /// Parse a secrets document.
    pub fn from_toml_str(s: &str) -> Result<Self, SummaryError> {
        toml::from_str(s).map_err(|e| SummaryError::InvalidConfig(format!("secrets file: {e}")))
    }

    /// Read and parse a secrets file.
    pub fn load(path: &Path) -> Result<Self, SummaryError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SummaryError::InvalidConfig(format!("cannot read secrets file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// The `[openai] api_key` entry, ignoring blank values.
    pub fn openai_api_key(&self) -> Option<&str> {
        self.openai
            .as_ref()
            .and_then(|o| o.api_key.as_deref())
            .filter(|k| !k.trim().is_empty())
    }
}

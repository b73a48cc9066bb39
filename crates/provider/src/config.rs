use serde::{Deserialize, Serialize};

use crate::resilience::{CircuitBreakerConfig, RateLimitConfig, RetryConfig};
use crate::ProviderError;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const HF_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Runtime configuration describing which remote model service to talk to and how.
///
/// The value is passed explicitly to [`build_provider`](crate::build_provider);
/// nothing in this crate reads the environment on its own.
///
/// # Example
/// ```no_run
/// use provider::{build_provider, ProviderConfig};
///
/// let cfg = ProviderConfig {
///     api_provider: "gemini".into(),
///     api_key: Some("AIza...".into()),
///     ..Default::default()
/// };
///
/// let _handle = build_provider(&cfg);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    /// `"api"` (remote HTTP) or `"fast"` (deterministic offline stub).
    pub mode: String,
    /// Remote flavour: `"gemini"` (default), `"openai"`, `"hf"` or `"custom"`.
    pub api_provider: String,
    /// Override for the provider's base URL (useful for proxies and tests).
    pub api_base_url: Option<String>,
    /// Full embedding endpoint. Wins over `api_base_url`; required for `"custom"`.
    pub embed_url: Option<String>,
    /// Full generation endpoint. Enables generation for `"hf"` / `"custom"`.
    pub generate_url: Option<String>,
    /// API key. Required by `"gemini"` and `"openai"`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Embedding model; the provider's default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    /// Generation model; the provider's default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_model: Option<String>,
    /// Per-request timeout in seconds.
    pub api_timeout_secs: u64,
    /// Normalize embeddings to unit length.
    pub normalize: bool,
    /// Vector length produced in `"fast"` mode.
    pub stub_dimension: usize,
    /// Sampling temperature forwarded to generation calls when set.
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_config: Option<RetryConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_breaker_config: Option<CircuitBreakerConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_config: Option<RateLimitConfig>,
    /// Retry, circuit breaker and rate limiting around every remote call.
    pub enable_resilience: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            mode: "api".into(),
            api_provider: "gemini".into(),
            api_base_url: None,
            embed_url: None,
            generate_url: None,
            api_key: None,
            embedding_model: None,
            generation_model: None,
            api_timeout_secs: 30,
            normalize: true,
            stub_dimension: 768,
            temperature: None,
            retry_config: None,           // defaults when None
            circuit_breaker_config: None, // defaults when None
            rate_limit_config: None,      // defaults when None
            enable_resilience: true,
        }
    }
}

impl ProviderConfig {
    /// Offline configuration backed by the deterministic stub.
    pub fn fast() -> Self {
        Self {
            mode: "fast".into(),
            ..Self::default()
        }
    }

    pub fn provider_kind(&self) -> Result<ApiProviderKind, ProviderError> {
        ApiProviderKind::parse(&self.api_provider)
    }

    /// Configured embedding model, else the default for `api_provider`.
    pub fn embedding_model(&self) -> &str {
        non_blank(self.embedding_model.as_deref())
            .unwrap_or_else(|| self.kind_or_default().default_embedding_model())
    }

    /// Configured generation model, else the default for `api_provider`.
    pub fn generation_model(&self) -> &str {
        non_blank(self.generation_model.as_deref())
            .unwrap_or_else(|| self.kind_or_default().default_generation_model())
    }

    // unknown kinds are rejected by `validate`
    fn kind_or_default(&self) -> ApiProviderKind {
        self.provider_kind().unwrap_or(ApiProviderKind::Gemini)
    }

    /// The API key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        match self.mode.to_ascii_lowercase().as_str() {
            "fast" | "stub" => {
                if self.stub_dimension == 0 {
                    return Err(ProviderError::InvalidConfig(
                        "stub_dimension must be greater than zero".into(),
                    ));
                }
            }
            "api" => {
                let kind = self.provider_kind()?;
                if kind == ApiProviderKind::Custom && self.embed_url.is_none() {
                    return Err(ProviderError::InvalidConfig(
                        "embed_url is required for the custom provider".into(),
                    ));
                }
                if self.api_timeout_secs == 0 {
                    return Err(ProviderError::InvalidConfig(
                        "api_timeout_secs must be greater than zero".into(),
                    ));
                }
            }
            other => {
                return Err(ProviderError::InvalidConfig(format!(
                    "unknown provider mode '{other}' (expected 'api' or 'fast')"
                )))
            }
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Remote API flavour, which decides URL layout, payload shape and auth header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiProviderKind {
    Gemini,
    OpenAI,
    HuggingFace,
    Custom,
}

impl ApiProviderKind {
    pub fn parse(value: &str) -> Result<Self, ProviderError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" | "gpt" => Ok(Self::OpenAI),
            "hf" | "huggingface" => Ok(Self::HuggingFace),
            "custom" => Ok(Self::Custom),
            other => Err(ProviderError::InvalidConfig(format!(
                "unknown api_provider '{other}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAI => "openai",
            Self::HuggingFace => "hf",
            Self::Custom => "custom",
        }
    }

    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some(GEMINI_BASE_URL),
            Self::OpenAI => Some(OPENAI_BASE_URL),
            Self::HuggingFace => Some(HF_BASE_URL),
            Self::Custom => None,
        }
    }

    pub fn default_embedding_model(&self) -> &'static str {
        match self {
            Self::Gemini => "text-embedding-004",
            Self::OpenAI => "text-embedding-3-small",
            Self::HuggingFace => "sentence-transformers/all-MiniLM-L6-v2",
            Self::Custom => "",
        }
    }

    /// Empty for kinds that only generate through an explicit `generate_url`.
    pub fn default_generation_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.0-flash",
            Self::OpenAI => "gpt-4o-mini",
            Self::HuggingFace | Self::Custom => "",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Gemini | Self::OpenAI)
    }

    /// Environment variable people conventionally keep the key in.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
            Self::HuggingFace => "HF_API_TOKEN",
            Self::Custom => "ORIGINALITY__PROVIDER__API_KEY",
        }
    }
}

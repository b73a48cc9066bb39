//! YAML configuration file support.
//!
//! A single document describes which model service to talk to and how the
//! scorer behaves. Every section is optional; missing fields fall back to
//! the same defaults the library types use.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "newsroom"
//!
//! provider:
//!   mode: "api"
//!   api_provider: "gemini"
//!   embedding_model: "text-embedding-004"
//!   generation_model: "gemini-2.0-flash"
//!   api_timeout_secs: 30
//!   retry_config:
//!     max_retries: 3
//!     base_delay: 200
//!     max_delay: 5000
//!     jitter: true
//!
//! scoring:
//!   strategy: "embedding"
//!   failure_policy: "degrade"
//!   cache_reference_embeddings: true
//!   likely_ai_threshold: 25
//!   max_text_chars: 3000
//! ```
//!
//! The API key is normally left out of the file. [`OriginalityConfig::load`]
//! picks it up from the provider's conventional environment variable
//! (`GEMINI_API_KEY`, `OPENAI_API_KEY`, ...).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use provider::ProviderConfig;
use scorer::ScoringConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the YAML file to load.
pub const CONFIG_PATH_ENV: &str = "ORIGINALITY_CONFIG";

/// File looked up in the working directory when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "originality.yaml";

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OriginalityConfig {
    #[serde(default = "default_config_version")]
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for OriginalityConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            name: None,
            provider: ProviderConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl OriginalityConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: OriginalityConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration the way the CLI does: the file named by
    /// `ORIGINALITY_CONFIG`, else `originality.yaml` when present, else
    /// defaults. A missing API key is then filled from the environment.
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut config = match Self::config_path() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration file");
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.fill_api_key_from(|name| env::var(name).ok());
        Ok(config)
    }

    /// The file [`load`](Self::load) would read, if any.
    pub fn config_path() -> Option<PathBuf> {
        if let Some(explicit) = env::var_os(CONFIG_PATH_ENV).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(explicit));
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.is_file().then_some(local)
    }

    /// Fill `provider.api_key` from the provider's conventional variable
    /// when the document did not set one. Returns whether a key was found.
    pub fn fill_api_key_from<F>(&mut self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.provider.api_key().is_some() {
            return true;
        }
        let Ok(kind) = self.provider.provider_kind() else {
            return false;
        };
        match lookup(kind.key_env_var()).filter(|key| !key.trim().is_empty()) {
            Some(key) => {
                self.provider.api_key = Some(key);
                true
            }
            None => false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }

        self.provider
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("provider: {e}")))?;
        self.scoring
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("scoring: {e}")))?;

        Ok(())
    }
}

fn default_config_version() -> String {
    "1.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorer::{FailurePolicy, StrategyKind};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
provider:
  mode: "fast"
  stub_dimension: 64
scoring:
  strategy: "direct"
  failure_policy: "fail_fast"
"#;

        let config = OriginalityConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.name, Some("test config".to_string()));
        assert_eq!(config.provider.mode, "fast");
        assert_eq!(config.provider.stub_dimension, 64);
        assert_eq!(config.scoring.strategy, StrategyKind::Direct);
        assert_eq!(config.scoring.failure_policy, FailurePolicy::FailFast);
        // untouched fields keep their defaults
        assert_eq!(config.scoring.max_text_chars, 3000);
        assert!(config.scoring.cache_reference_embeddings);
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1"
provider:
  api_provider: "openai"
  embedding_model: "text-embedding-3-small"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = OriginalityConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.version, "1");
        assert_eq!(config.provider.api_provider, "openai");
        assert_eq!(config.provider.embedding_model(), "text-embedding-3-small");
        assert_eq!(config.provider.generation_model(), "gpt-4o-mini");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = OriginalityConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigLoadError::FileRead(_)));
    }

    #[test]
    fn test_default_config() {
        let config = OriginalityConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(config.name.is_none());
        assert_eq!(config.provider.api_provider, "gemini");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = OriginalityConfig::from_yaml("{}").unwrap();
        assert_eq!(config, OriginalityConfig::default());
    }

    #[test]
    fn test_unsupported_version() {
        let result = OriginalityConfig::from_yaml("version: \"2.0\"\n");
        assert!(matches!(
            result,
            Err(ConfigLoadError::UnsupportedVersion(v)) if v == "2.0"
        ));
    }

    #[test]
    fn test_provider_validation() {
        let yaml = r#"
version: "1.0"
provider:
  api_provider: "carrier-pigeon"
"#;

        let result = OriginalityConfig::from_yaml(yaml);
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("provider"));
        assert!(message.contains("carrier-pigeon"));
    }

    #[test]
    fn test_scoring_validation() {
        let yaml = r#"
version: "1.0"
scoring:
  likely_ai_threshold: 150
"#;

        let result = OriginalityConfig::from_yaml(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("likely_ai_threshold"));
    }

    #[test]
    fn test_unknown_strategy_is_parse_error() {
        let yaml = r#"
scoring:
  strategy: "vibes"
"#;
        assert!(matches!(
            OriginalityConfig::from_yaml(yaml),
            Err(ConfigLoadError::YamlParse(_))
        ));
    }

    #[test]
    fn test_api_key_filled_from_lookup() {
        let mut config = OriginalityConfig::default();
        let found = config.fill_api_key_from(|name| {
            assert_eq!(name, "GEMINI_API_KEY");
            Some("from-env".to_string())
        });
        assert!(found);
        assert_eq!(config.provider.api_key(), Some("from-env"));
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let mut config = OriginalityConfig::default();
        config.provider.api_key = Some("explicit".into());
        assert!(config.fill_api_key_from(|_| Some("from-env".into())));
        assert_eq!(config.provider.api_key(), Some("explicit"));
    }

    #[test]
    fn test_blank_env_key_is_ignored() {
        let mut config = OriginalityConfig::default();
        config.provider.api_provider = "openai".into();
        let found = config.fill_api_key_from(|name| {
            assert_eq!(name, "OPENAI_API_KEY");
            Some("   ".to_string())
        });
        assert!(!found);
        assert!(config.provider.api_key().is_none());
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let mut config = OriginalityConfig::default();
        config.provider.api_key = Some("secret".into());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("secret"));
    }

    #[test]
    fn test_full_yaml_roundtrip() {
        let yaml = r#"
version: "1.0"
name: "production"
provider:
  mode: "api"
  api_provider: "gemini"
  api_base_url: "http://127.0.0.1:9000/v1beta"
  embedding_model: "text-embedding-004"
  generation_model: "gemini-2.0-flash"
  api_timeout_secs: 10
  normalize: true
  temperature: 0.7
  enable_resilience: true
  retry_config:
    max_retries: 2
    base_delay: 100
    max_delay: 1000
    jitter: false
  circuit_breaker_config:
    failure_threshold: 3
    reset_timeout: 10000
  rate_limit_config:
    requests_per_second: 5
    burst_size: 10
    max_wait: 2000

scoring:
  strategy: "embedding"
  failure_policy: "degrade"
  cache_reference_embeddings: false
  likely_ai_threshold: 40
  max_text_chars: 2000
  reference:
    ai_like:
      - "In conclusion, it is important to note the multifaceted nature of this topic."
    human_like:
      - "honestly i just threw it in the oven and hoped"
"#;

        let config = OriginalityConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.provider.api_timeout_secs, 10);
        assert_eq!(config.provider.retry_config.as_ref().unwrap().max_retries, 2);
        assert_eq!(
            config
                .provider
                .circuit_breaker_config
                .as_ref()
                .unwrap()
                .failure_threshold,
            3
        );
        assert!(!config.scoring.cache_reference_embeddings);
        assert_eq!(config.scoring.likely_ai_threshold, 40);
        assert_eq!(config.scoring.reference.len(), 2);

        let yaml_out = serde_yaml::to_string(&config).unwrap();
        let config2 = OriginalityConfig::from_yaml(&yaml_out).unwrap();
        assert_eq!(config, config2);
    }
}

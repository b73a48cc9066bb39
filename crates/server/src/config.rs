use originality::OriginalityConfig;
use provider::ProviderConfig;
use scorer::ScoringConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

/// Base name of the optional config file (`originality-server.{toml,yaml,json}`).
pub const CONFIG_FILE_STEM: &str = "originality-server";

/// Prefix of the environment overrides, e.g. `ORIGINALITY__PORT=9000` or
/// `ORIGINALITY__SCORING__FAILURE_POLICY=fail_fast`.
pub const ENV_PREFIX: &str = "ORIGINALITY";

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in KB
    #[serde(default = "default_max_body_size_kb")]
    pub max_body_size_kb: usize,

    /// Rate limit: requests per minute per API key
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    /// API keys for the `/api/v1` routes. Authentication is off when empty.
    #[serde(default)]
    pub api_keys: HashSet<String>,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Remote model service
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Scoring behaviour, including `max_text_chars`
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_kb: default_max_body_size_kb(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            api_keys: HashSet::new(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            provider: ProviderConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional config file and
    /// `ORIGINALITY__*` environment variables, in increasing priority.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name(CONFIG_FILE_STEM).required(false))
            // Override with environment variables
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("api_keys")
                    .try_parsing(true),
            );

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;
        config.fill_api_key_from(|name| std::env::var(name).ok());
        config.validate()?;

        if config.api_keys.is_empty() {
            tracing::warn!("No API keys configured, /api/v1 routes are open");
        }

        Ok(config)
    }

    /// Fill the provider key from its conventional variable
    /// (`GEMINI_API_KEY`, `OPENAI_API_KEY`, ...) when none was configured.
    pub fn fill_api_key_from<F>(&mut self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut core = self.originality_config();
        let found = core.fill_api_key_from(lookup);
        self.provider = core.provider;
        found
    }

    /// The library-level view of this configuration.
    pub fn originality_config(&self) -> OriginalityConfig {
        OriginalityConfig {
            name: Some(CONFIG_FILE_STEM.to_string()),
            provider: self.provider.clone(),
            scoring: self.scoring.clone(),
            ..OriginalityConfig::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        if self.rate_limit_per_minute == 0 {
            anyhow::bail!("rate_limit_per_minute must be greater than zero");
        }
        self.originality_config().validate()?;
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_kb * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_kb() -> usize {
    64
}

fn default_rate_limit_per_minute() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use dashmap::DashMap;
use metrics_exporter_prometheus::PrometheusHandle;
use provider::{build_provider, CircuitState, ProviderHandle};
use scorer::OriginalityService;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Rate limit tracking: API key -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, std::time::Instant)>>,

    /// Scorer and paraphraser (shared across requests)
    pub service: Arc<OriginalityService>,

    /// Providers behind the service, kept for readiness reporting
    pub providers: ProviderHandle,

    /// Prometheus exposition handle when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create new server state with the providers the config describes
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let providers = build_provider(&config.provider)
            .map_err(|e| ServerError::Config(format!("provider: {e}")))?;
        Self::with_providers(config, providers)
    }

    /// Create server state on top of already built providers
    pub fn with_providers(config: ServerConfig, providers: ProviderHandle) -> ServerResult<Self> {
        let service = OriginalityService::from_config(&config.scoring, &providers)?;
        let metrics = if config.metrics_enabled {
            crate::metrics::install()
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            rate_limiter: Arc::new(DashMap::new()),
            service: Arc::new(service),
            providers,
            metrics,
        })
    }

    /// Whether the `/api/v1` routes require a key at all
    pub fn auth_enabled(&self) -> bool {
        !self.config.api_keys.is_empty()
    }

    /// Check if API key is valid
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.contains(key)
    }

    /// Check rate limit for API key
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = std::time::Instant::now();
        let window = std::time::Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }

    /// Breaker state of the embedding provider, if it has one
    pub fn embedder_circuit(&self) -> Option<CircuitState> {
        self.providers.embedder.circuit_state()
    }

    /// Breaker state of the generation provider, if it has one
    pub fn generator_circuit(&self) -> Option<CircuitState> {
        self.providers.generator.circuit_state()
    }
}

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::config::ApiProviderKind;
use crate::normalize::l2_normalize_in_place;
use crate::resilience::{
    execute_with_retry_async, CircuitBreaker, CircuitState, RateLimitStats, RetryConfig,
    RetryResult, TokenBucket,
};
use crate::{EmbeddingProvider, GenerationProvider, PromptTemplate, ProviderConfig, ProviderError};

// Shared HTTP client with connection pooling. Per-request timeouts come from config.
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(32)
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "falling back to default HTTP client");
            reqwest::Client::new()
        })
});

/// Error bodies are echoed into errors and logs; keep them short.
const MAX_ERROR_BODY: usize = 512;

/// Remote embedding and generation provider speaking the Gemini, OpenAI,
/// Hugging Face or a custom JSON protocol.
///
/// Each instance owns its own circuit breaker and token bucket, so two
/// providers configured side by side never share failure state.
#[derive(Debug)]
pub struct HttpProvider {
    config: ProviderConfig,
    kind: ApiProviderKind,
    breaker: Option<CircuitBreaker>,
    limiter: Option<TokenBucket>,
    retry: RetryConfig,
}

impl HttpProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let kind = config.provider_kind()?;
        if kind == ApiProviderKind::Custom && config.embed_url.is_none() {
            return Err(ProviderError::InvalidConfig(
                "embed_url is required for the custom provider".into(),
            ));
        }
        if kind.requires_api_key() && config.api_key().is_none() {
            tracing::warn!(
                provider = kind.as_str(),
                env = kind.key_env_var(),
                "no API key configured; remote calls will fail until one is set"
            );
        }

        let (breaker, limiter) = if config.enable_resilience {
            (
                Some(CircuitBreaker::new(
                    config.circuit_breaker_config.unwrap_or_default(),
                )),
                Some(TokenBucket::new(config.rate_limit_config.unwrap_or_default())),
            )
        } else {
            (None, None)
        };
        let retry = config.retry_config.unwrap_or_default();

        Ok(Self {
            config,
            kind,
            breaker,
            limiter,
            retry,
        })
    }

    pub fn kind(&self) -> ApiProviderKind {
        self.kind
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn circuit_state(&self) -> Option<CircuitState> {
        self.breaker.as_ref().map(CircuitBreaker::current_state)
    }

    pub fn rate_limit_stats(&self) -> Option<RateLimitStats> {
        self.limiter.as_ref().map(TokenBucket::stats)
    }

    fn base_url(&self) -> Result<String, ProviderError> {
        self.config
            .api_base_url
            .as_deref()
            .or_else(|| self.kind.default_base_url())
            .map(|base| base.trim_end_matches('/').to_string())
            .ok_or_else(|| {
                ProviderError::InvalidConfig(format!(
                    "api_base_url is required for provider '{}'",
                    self.kind.as_str()
                ))
            })
    }

    pub(crate) fn embed_endpoint(&self) -> Result<String, ProviderError> {
        if let Some(url) = self.config.embed_url.as_deref() {
            return Ok(url.to_string());
        }
        let base = self.base_url()?;
        let model = self.config.embedding_model();
        Ok(match self.kind {
            ApiProviderKind::Gemini => format!("{base}/{}:embedContent", gemini_model_path(model)),
            ApiProviderKind::OpenAI => format!("{base}/embeddings"),
            ApiProviderKind::HuggingFace | ApiProviderKind::Custom => format!("{base}/{model}"),
        })
    }

    pub(crate) fn generate_endpoint(&self) -> Result<String, ProviderError> {
        if let Some(url) = self.config.generate_url.as_deref() {
            return Ok(url.to_string());
        }
        match self.kind {
            ApiProviderKind::Gemini => Ok(format!(
                "{}/{}:generateContent",
                self.base_url()?,
                gemini_model_path(self.config.generation_model())
            )),
            ApiProviderKind::OpenAI => Ok(format!("{}/chat/completions", self.base_url()?)),
            ApiProviderKind::HuggingFace | ApiProviderKind::Custom => {
                Err(ProviderError::Unsupported(format!(
                    "provider '{}' has no generation endpoint; set generate_url",
                    self.kind.as_str()
                )))
            }
        }
    }

    fn ensure_credentials(&self) -> Result<(), ProviderError> {
        if self.kind.requires_api_key() && self.config.api_key().is_none() {
            return Err(ProviderError::MissingCredentials(format!(
                "{} is not set",
                self.kind.key_env_var()
            )));
        }
        Ok(())
    }

    pub(crate) fn embedding_payload(&self, text: &str) -> Value {
        let model = self.config.embedding_model();
        match self.kind {
            ApiProviderKind::Gemini => json!({
                "model": gemini_model_path(model),
                "content": { "parts": [{ "text": text }] },
            }),
            ApiProviderKind::OpenAI => json!({ "input": text, "model": model }),
            ApiProviderKind::HuggingFace => json!({ "inputs": text }),
            ApiProviderKind::Custom => json!({ "text": text }),
        }
    }

    pub(crate) fn generation_payload(&self, template: &PromptTemplate, text: &str) -> Value {
        let prompt = template.render(text);
        match self.kind {
            ApiProviderKind::Gemini => {
                let mut generation_config = serde_json::Map::new();
                if template.json_response {
                    generation_config.insert("responseMimeType".into(), json!("application/json"));
                }
                if let Some(temperature) = self.config.temperature {
                    generation_config.insert("temperature".into(), json!(temperature));
                }
                json!({
                    "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
                    "generationConfig": generation_config,
                })
            }
            ApiProviderKind::OpenAI => {
                let mut body = json!({
                    "model": self.config.generation_model(),
                    "messages": [{ "role": "user", "content": prompt }],
                });
                if template.json_response {
                    body["response_format"] = json!({ "type": "json_object" });
                }
                if let Some(temperature) = self.config.temperature {
                    body["temperature"] = json!(temperature);
                }
                body
            }
            ApiProviderKind::HuggingFace => json!({ "inputs": prompt }),
            ApiProviderKind::Custom => json!({ "prompt": prompt }),
        }
    }

    /// Circuit check, rate limit, retried request, circuit bookkeeping.
    async fn call(&self, url: &str, payload: Value) -> Result<Value, ProviderError> {
        let provider = self.kind.as_str();

        if let Some(breaker) = &self.breaker {
            if !breaker.allow_request() {
                return Err(ProviderError::CircuitOpen(provider.to_string()));
            }
        }
        if let Some(limiter) = &self.limiter {
            if !limiter.acquire().await {
                return Err(ProviderError::RateLimited(provider.to_string()));
            }
        }

        let payload = &payload;
        let outcome = if self.config.enable_resilience {
            execute_with_retry_async(
                &self.retry,
                move |attempt| {
                    if attempt > 0 {
                        tracing::debug!(provider, attempt, "retrying provider request");
                    }
                    self.send(url, payload)
                },
                |err: &ProviderError| err.is_retryable(),
            )
            .await
        } else {
            let start = Instant::now();
            RetryResult {
                result: self.send(url, payload).await,
                attempts: 1,
                total_duration: start.elapsed(),
            }
        };

        if let Some(breaker) = &self.breaker {
            match &outcome.result {
                Ok(_) => breaker.record_success(),
                Err(err) if err.trips_circuit() => breaker.record_failure(),
                Err(_) => {}
            }
        }

        if let Err(err) = &outcome.result {
            tracing::debug!(
                provider,
                attempts = outcome.attempts,
                elapsed_ms = outcome.total_duration.as_millis() as u64,
                error = %err,
                "provider request failed"
            );
        }
        outcome.into_result()
    }

    async fn send(&self, url: &str, payload: &Value) -> Result<Value, ProviderError> {
        let mut request = HTTP_CLIENT
            .post(url)
            .timeout(Duration::from_secs(self.config.api_timeout_secs))
            .header("Content-Type", "application/json");
        if let Some(key) = self.config.api_key() {
            request = match self.kind {
                ApiProviderKind::Gemini => request.header("x-goog-api-key", key),
                _ => request.bearer_auth(key),
            };
        }

        let response = request
            .json(payload)
            .send()
            .await
            .map_err(|e| ProviderError::Http(describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|&i| body.is_char_boundary(i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON response: {e}")))
    }
}

#[async_trait]
impl EmbeddingProvider for HttpProvider {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.ensure_credentials()?;
        let url = self.embed_endpoint()?;
        let response = self.call(&url, self.embedding_payload(text)).await?;

        let mut vector = parse_embedding(self.kind, response)?;
        if vector.is_empty() {
            return Err(ProviderError::MalformedResponse(
                "API response contained an empty embedding".into(),
            ));
        }
        if self.config.normalize {
            l2_normalize_in_place(&mut vector);
        }
        tracing::debug!(provider = self.kind.as_str(), dim = vector.len(), "embedded text");
        Ok(vector)
    }

    fn circuit_state(&self) -> Option<CircuitState> {
        HttpProvider::circuit_state(self)
    }
}

#[async_trait]
impl GenerationProvider for HttpProvider {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    async fn generate(&self, template: &PromptTemplate, text: &str) -> Result<String, ProviderError> {
        let url = self.generate_endpoint()?;
        self.ensure_credentials()?;
        let response = self
            .call(&url, self.generation_payload(template, text))
            .await?;
        let generated = parse_generated_text(self.kind, response)?;
        tracing::debug!(
            provider = self.kind.as_str(),
            prompt = %template.name,
            chars = generated.len(),
            "generated text"
        );
        Ok(generated)
    }

    fn circuit_state(&self) -> Option<CircuitState> {
        HttpProvider::circuit_state(self)
    }
}

fn gemini_model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

pub(crate) fn parse_embedding(kind: ApiProviderKind, value: Value) -> Result<Vec<f32>, ProviderError> {
    if kind == ApiProviderKind::Gemini {
        if let Some(values) = value.pointer("/embedding/values") {
            return parse_embedding_vector(values.clone());
        }
    }
    let mut vectors = parse_embeddings_from_value(value)?;
    if vectors.is_empty() {
        return Err(ProviderError::MalformedResponse(
            "API response did not contain embeddings".into(),
        ));
    }
    Ok(vectors.swap_remove(0))
}

fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, ProviderError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }

            if let Some(Value::Object(mut embedding)) = map.remove("embedding") {
                if let Some(values) = embedding.remove("values") {
                    return parse_embedding_vector(values).map(|v| vec![v]);
                }
            }

            if let Some(Value::Array(items)) = map.remove("data") {
                let mut vectors = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(mut obj) => {
                            if let Some(embedding) = obj.remove("embedding") {
                                vectors.push(parse_embedding_vector(embedding)?);
                            } else {
                                return Err(ProviderError::MalformedResponse(
                                    "missing `embedding` field in data item".into(),
                                ));
                            }
                        }
                        _ => {
                            return Err(ProviderError::MalformedResponse(
                                "unexpected entry inside `data` array".into(),
                            ))
                        }
                    }
                }
                return Ok(vectors);
            }

            Err(ProviderError::MalformedResponse(
                "unsupported embedding response shape".into(),
            ))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, ProviderError> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                Ok(Vec::new())
            } else if items.iter().all(|item| matches!(item, Value::Array(_))) {
                items.into_iter().map(parse_embedding_vector).collect()
            } else {
                parse_embedding_vector(Value::Array(items)).map(|vec| vec![vec])
            }
        }
        other => parse_embedding_vector(other).map(|vec| vec![vec]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, ProviderError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num.as_f64().map(|f| f as f32).ok_or_else(|| {
                    ProviderError::MalformedResponse("non-finite embedding value".into())
                }),
                other => Err(ProviderError::MalformedResponse(format!(
                    "embedding entries must be numbers, got {other:?}"
                ))),
            })
            .collect(),
        other => Err(ProviderError::MalformedResponse(format!(
            "embedding vector must be an array, got {other:?}"
        ))),
    }
}

pub(crate) fn parse_generated_text(kind: ApiProviderKind, value: Value) -> Result<String, ProviderError> {
    let text = match kind {
        ApiProviderKind::Gemini => value
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect::<String>()
            }),
        ApiProviderKind::OpenAI => value
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string),
        ApiProviderKind::HuggingFace | ApiProviderKind::Custom => match &value {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => items
                .first()
                .and_then(|item| item.get("generated_text"))
                .and_then(Value::as_str)
                .map(str::to_string),
            Value::Object(map) => ["generated_text", "text", "output"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        },
    };

    text.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
        ProviderError::MalformedResponse(format!(
            "no generated text in {} response",
            kind.as_str()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::CircuitBreakerConfig;

    fn gemini() -> HttpProvider {
        HttpProvider::new(ProviderConfig {
            api_key: Some("k".into()),
            ..ProviderConfig::default()
        })
        .unwrap()
    }

    fn openai() -> HttpProvider {
        HttpProvider::new(ProviderConfig {
            api_provider: "openai".into(),
            api_key: Some("k".into()),
            ..ProviderConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn gemini_endpoints() {
        let p = gemini();
        assert_eq!(
            p.embed_endpoint().unwrap(),
            "https://generativelanguage.googleapis.com/v1beta/models/text-embedding-004:embedContent"
        );
        assert_eq!(
            p.generate_endpoint().unwrap(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn base_url_override_strips_trailing_slash() {
        let p = HttpProvider::new(ProviderConfig {
            api_base_url: Some("http://127.0.0.1:9999/v1beta/".into()),
            embedding_model: Some("models/custom-embed".into()),
            ..ProviderConfig::default()
        })
        .unwrap();
        assert_eq!(
            p.embed_endpoint().unwrap(),
            "http://127.0.0.1:9999/v1beta/models/custom-embed:embedContent"
        );
    }

    #[test]
    fn openai_endpoints() {
        let p = openai();
        assert_eq!(p.embed_endpoint().unwrap(), "https://api.openai.com/v1/embeddings");
        assert_eq!(
            p.generate_endpoint().unwrap(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn hf_generation_needs_explicit_endpoint() {
        let p = HttpProvider::new(ProviderConfig {
            api_provider: "hf".into(),
            embedding_model: Some("BAAI/bge-small-en-v1.5".into()),
            ..ProviderConfig::default()
        })
        .unwrap();
        assert_eq!(
            p.embed_endpoint().unwrap(),
            "https://api-inference.huggingface.co/models/BAAI/bge-small-en-v1.5"
        );
        assert!(matches!(p.generate_endpoint(), Err(ProviderError::Unsupported(_))));
    }

    #[test]
    fn custom_without_endpoint_is_rejected() {
        let err = HttpProvider::new(ProviderConfig {
            api_provider: "custom".into(),
            ..ProviderConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidConfig(_)));
    }

    #[test]
    fn gemini_embedding_payload_shape() {
        let payload = gemini().embedding_payload("hello");
        assert_eq!(payload["model"], "models/text-embedding-004");
        assert_eq!(payload["content"]["parts"][0]["text"], "hello");
    }

    #[test]
    fn gemini_generation_payload_requests_json() {
        let template = PromptTemplate::new("t", "Do: {{text}}").with_json_response(true);
        let payload = gemini().generation_payload(&template, "it");
        assert_eq!(payload["contents"][0]["parts"][0]["text"], "Do: it");
        assert_eq!(
            payload["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn openai_generation_payload_shape() {
        let template = PromptTemplate::new("t", "{{text}}").with_json_response(true);
        let payload = openai().generation_payload(&template, "hi");
        assert_eq!(payload["model"], "gpt-4o-mini");
        assert_eq!(payload["messages"][0]["content"], "hi");
        assert_eq!(payload["response_format"]["type"], "json_object");
    }

    #[test]
    fn openai_without_models_uses_openai_defaults() {
        let payload = openai().embedding_payload("hi");
        assert_eq!(payload["model"], "text-embedding-3-small");

        let template = PromptTemplate::new("t", "{{text}}");
        let payload = openai().generation_payload(&template, "hi");
        assert_eq!(payload["model"], "gpt-4o-mini");
    }

    #[test]
    fn parse_gemini_embedding() {
        let value = json!({ "embedding": { "values": [0.1, 0.2, 0.3] } });
        let v = parse_embedding(ApiProviderKind::Gemini, value).unwrap();
        assert_eq!(v, vec![0.1f32, 0.2, 0.3]);
    }

    #[test]
    fn parse_openai_embedding() {
        let value = json!({ "data": [{ "embedding": [1.0, 2.0] }], "model": "m" });
        let v = parse_embedding(ApiProviderKind::OpenAI, value).unwrap();
        assert_eq!(v, vec![1.0f32, 2.0]);
    }

    #[test]
    fn parse_bare_and_nested_arrays() {
        let v = parse_embedding(ApiProviderKind::HuggingFace, json!([0.5, 0.25])).unwrap();
        assert_eq!(v, vec![0.5f32, 0.25]);
        let v = parse_embedding(ApiProviderKind::Custom, json!({ "embeddings": [[1.0], [2.0]] }))
            .unwrap();
        assert_eq!(v, vec![1.0f32]);
    }

    #[test]
    fn parse_embedding_rejects_garbage() {
        assert!(matches!(
            parse_embedding(ApiProviderKind::Gemini, json!({ "error": "nope" })),
            Err(ProviderError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_embedding(ApiProviderKind::Custom, json!(["a", "b"])),
            Err(ProviderError::MalformedResponse(_))
        ));
        assert!(parse_embedding(ApiProviderKind::Custom, json!([])).is_err());
    }

    #[test]
    fn parse_gemini_text_joins_parts() {
        let value = json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        });
        assert_eq!(
            parse_generated_text(ApiProviderKind::Gemini, value).unwrap(),
            "{\"a\":1}"
        );
    }

    #[test]
    fn parse_openai_text() {
        let value = json!({ "choices": [{ "message": { "role": "assistant", "content": "ok" } }] });
        assert_eq!(parse_generated_text(ApiProviderKind::OpenAI, value).unwrap(), "ok");
    }

    #[test]
    fn parse_hf_generated_text() {
        let value = json!([{ "generated_text": "rewritten" }]);
        assert_eq!(
            parse_generated_text(ApiProviderKind::HuggingFace, value).unwrap(),
            "rewritten"
        );
    }

    #[test]
    fn parse_text_rejects_empty_candidates() {
        assert!(parse_generated_text(ApiProviderKind::Gemini, json!({ "candidates": [] })).is_err());
        let blank = json!({ "choices": [{ "message": { "content": "   " } }] });
        assert!(parse_generated_text(ApiProviderKind::OpenAI, blank).is_err());
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let p = HttpProvider::new(ProviderConfig::default()).unwrap();
        let err = p.embed("hello").await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::MissingCredentials("GEMINI_API_KEY is not set".into())
        );
        // Credential errors never count against the breaker.
        assert_eq!(p.circuit_state(), Some(CircuitState::Closed));
    }

    #[test]
    fn resilience_can_be_disabled() {
        let p = HttpProvider::new(ProviderConfig {
            enable_resilience: false,
            circuit_breaker_config: Some(CircuitBreakerConfig::default()),
            ..ProviderConfig::default()
        })
        .unwrap();
        assert!(p.circuit_state().is_none());
        assert!(p.rate_limit_stats().is_none());
    }
}

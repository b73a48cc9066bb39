use async_trait::async_trait;
use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;
use crate::{EmbeddingProvider, GenerationProvider, PromptTemplate, ProviderConfig, ProviderError};

/// Deterministic offline provider used in `"fast"` mode.
///
/// Embeddings are sinusoids seeded from a hash of the text, so the same
/// text always maps to the same vector and no network is touched. Text
/// generation is not available.
#[derive(Debug, Clone)]
pub struct StubProvider {
    dimension: usize,
    normalize: bool,
}

impl StubProvider {
    pub fn new(dimension: usize, normalize: bool) -> Self {
        Self {
            dimension: dimension.max(1),
            normalize,
        }
    }

    pub fn from_config(cfg: &ProviderConfig) -> Self {
        Self::new(cfg.stub_dimension, cfg.normalize)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub(crate) fn make_embedding(&self, text: &str) -> Vec<f32> {
        let h = hash64(text.as_bytes());
        let mut v = vec![0f32; self.dimension];
        for (idx, value) in v.iter_mut().enumerate() {
            let mixed = h.rotate_left((idx % 64) as u32) ^ (idx as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
            *value = ((mixed >> 40) as f32 * 0.0001).sin();
        }
        if self.normalize {
            l2_normalize_in_place(&mut v);
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        Ok(self.make_embedding(text))
    }
}

#[async_trait]
impl GenerationProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(&self, template: &PromptTemplate, _text: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Unsupported(format!(
            "stub provider cannot run prompt '{}'",
            template.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_dimension_follows_config() {
        let stub = StubProvider::from_config(&ProviderConfig {
            stub_dimension: 384,
            ..ProviderConfig::fast()
        });
        assert_eq!(stub.make_embedding("hello").len(), 384);
    }

    #[test]
    fn stub_is_deterministic() {
        let stub = StubProvider::new(768, false);
        assert_eq!(stub.make_embedding("same text"), stub.make_embedding("same text"));
    }

    #[test]
    fn stub_differs_by_text() {
        let stub = StubProvider::new(768, false);
        assert_ne!(stub.make_embedding("hello"), stub.make_embedding("world"));
    }

    #[test]
    fn stub_values_in_range_and_nonzero() {
        let stub = StubProvider::new(256, false);
        for text in ["", "Hello 世界 🌍", "!@#$%^&*()"] {
            let v = stub.make_embedding(text);
            assert!(v.iter().all(|x| (-1.0..=1.0).contains(x)));
            assert!(!v.iter().all(|&x| x == 0.0), "all zero for {text:?}");
        }
    }

    #[test]
    fn stub_normalizes() {
        let stub = StubProvider::new(128, true);
        let v = stub.make_embedding("test");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "norm={norm}");
    }

    #[test]
    fn zero_dimension_is_clamped() {
        assert_eq!(StubProvider::new(0, true).dimension(), 1);
    }

    #[tokio::test]
    async fn stub_generation_is_unsupported() {
        let stub = StubProvider::new(8, true);
        let err = stub
            .generate(&PromptTemplate::new("paraphrase", "{{text}}"), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unsupported(_)));
    }
}

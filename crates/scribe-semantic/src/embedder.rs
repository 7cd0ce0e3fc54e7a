//! Embedding service for ticket retrieval
//!
//! Provides text embeddings for the in-memory vector index.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::vector::normalize;

/// Embedding vector type
pub type Embedding = Vec<f32>;

/// Trait for text embedding services
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for text
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Batch embed multiple texts (more efficient)
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Model identifier for logging
    fn model_name(&self) -> &str;

    /// Embedding dimension
    fn dimension(&self) -> usize;
}

/// Shared embedder type, built once at startup
pub type SharedEmbedder = Arc<dyn Embedder>;

/// OpenAI embeddings client
pub struct OpenAIEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimension: usize,
}

impl OpenAIEmbedder {
    /// Create embedder with default model (text-embedding-3-small)
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }

    /// Create embedder with specific model
    pub fn with_model(api_key: String, model: String, dimension: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            dimension,
        }
    }

    /// Create embedder for a known OpenAI model name
    ///
    /// Dimension is inferred for the published models; anything else is assumed 1536.
    pub fn for_model(api_key: String, model: &str) -> Self {
        let dimension = match model {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        };
        Self::with_model(api_key, model.to_string(), dimension)
    }

    /// Create from environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key))
    }

    async fn request(&self, input: serde_json::Value) -> Result<EmbeddingResponse> {
        let response = self
            .client
            .post("https://api.openai.com/v1/embeddings")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": self.model,
                "input": input
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("OpenAI embeddings error {}: {}", status, body));
        }

        Ok(response.json::<EmbeddingResponse>().await?)
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let response = self.request(serde_json::json!(text)).await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| anyhow!("No embedding in response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self.request(serde_json::json!(texts)).await?;
        if response.data.len() != texts.len() {
            return Err(anyhow!(
                "Expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            ));
        }

        // Sort by index to maintain order
        let mut embeddings: Vec<_> = response.data.into_iter().collect();
        embeddings.sort_by_key(|d| d.index);

        Ok(embeddings.into_iter().map(|d| d.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Cached embedder wrapper
///
/// Query variants repeat across invocations, so the cache saves round trips.
pub struct CachedEmbedder {
    inner: SharedEmbedder,
    cache: RwLock<HashMap<String, Embedding>>,
    max_cache_size: usize,
}

impl CachedEmbedder {
    /// Create cached wrapper around an embedder
    pub fn new(inner: SharedEmbedder) -> Self {
        Self::with_max_cache(inner, 10000)
    }

    /// Create with custom cache size
    pub fn with_max_cache(inner: SharedEmbedder, max_size: usize) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            max_cache_size: max_size,
        }
    }

    /// Number of cached entries
    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[async_trait]
impl Embedder for CachedEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        {
            let cache = self.cache.read().await;
            if let Some(emb) = cache.get(text) {
                return Ok(emb.clone());
            }
        }

        let embedding = self.inner.embed(text).await?;

        {
            let mut cache = self.cache.write().await;
            if cache.len() < self.max_cache_size {
                cache.insert(text.to_string(), embedding.clone());
            }
        }

        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let mut results = vec![None; texts.len()];
        let mut uncached_indices = Vec::new();
        let mut uncached_texts = Vec::new();

        {
            let cache = self.cache.read().await;
            for (i, text) in texts.iter().enumerate() {
                if let Some(emb) = cache.get(*text) {
                    results[i] = Some(emb.clone());
                } else {
                    uncached_indices.push(i);
                    uncached_texts.push(*text);
                }
            }
        }

        if !uncached_texts.is_empty() {
            let new_embeddings = self.inner.embed_batch(&uncached_texts).await?;

            let mut cache = self.cache.write().await;
            for (idx, embedding) in uncached_indices.into_iter().zip(new_embeddings) {
                if cache.len() < self.max_cache_size {
                    cache.insert(texts[idx].to_string(), embedding.clone());
                }
                results[idx] = Some(embedding);
            }
        }

        results
            .into_iter()
            .enumerate()
            .map(|(i, opt)| opt.ok_or_else(|| anyhow!("Missing embedding for index {}", i)))
            .collect()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

/// Deterministic bag-of-words embedder for offline runs and tests
///
/// Each lower-cased word of three or more characters is hashed (FNV-1a) into
/// one of `dimension` buckets; the count vector is L2 normalized. Texts that
/// share words are similar, texts that share none are orthogonal.
pub struct HashingEmbedder {
    dimension: usize,
}

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "this", "that", "are", "was", "into", "about",
];

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket(&self, word: &str) -> usize {
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in word.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x100000001b3);
        }
        (hash % self.dimension as u64) as usize
    }

    fn embed_sync(&self, text: &str) -> Embedding {
        let mut counts = vec![0.0f32; self.dimension];
        let lowered = text.to_lowercase();
        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= 3 && !STOPWORDS.contains(w))
        {
            counts[self.bucket(word)] += 1.0;
        }
        normalize(counts)
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(self.embed_sync(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.embed_sync(t)).collect())
    }

    fn model_name(&self) -> &str {
        "hashing-bow"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

//! Relevance retrieval
//!
//! Two candidate strategies run against the same vector index: a direct
//! nearest-neighbour lookup of the query, and a multi-query lookup over
//! model-paraphrased variants. Their ranked lists are merged with equal-weight
//! reciprocal rank fusion and deduplicated by ticket key.
//!
//! ```text
//! query ──┬── NearestNeighbourStrategy ──┐
//!         │                              ├── fuse_equal ── top_k tickets
//!         └── MultiQueryStrategy ────────┘
//! ```

pub mod fusion;
pub mod multi_query;

use std::sync::Arc;

use async_trait::async_trait;
use scribe_semantic::{SharedEmbedder, VectorIndex};
use tracing::debug;

use crate::corpus::{Corpus, WorkItem};
use crate::error::RetrievalError;

pub use fusion::{fuse_equal, fuse_weighted, Fused, RRF_C};
pub use multi_query::MultiQueryStrategy;

/// Default number of tickets returned by a retrieval
pub const DEFAULT_TOP_K: usize = 10;

/// Default cosine threshold for nearest-neighbour hits
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.2;

/// One way of producing ranked candidates for a query
#[async_trait]
pub trait RetrievalStrategy: Send + Sync {
    /// Ranked corpus positions, best first
    async fn candidates(&self, query: &str) -> Result<Vec<usize>, RetrievalError>;

    /// Strategy name for logging
    fn name(&self) -> &str;
}

/// Direct lookup of the query embedding
#[derive(Clone)]
pub struct NearestNeighbourStrategy {
    embedder: SharedEmbedder,
    index: Arc<VectorIndex>,
    k: usize,
    min_similarity: f32,
}

impl NearestNeighbourStrategy {
    pub fn new(embedder: SharedEmbedder, index: Arc<VectorIndex>) -> Self {
        Self {
            embedder,
            index,
            k: DEFAULT_TOP_K,
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub(crate) async fn lookup(&self, text: &str) -> Result<Vec<usize>, RetrievalError> {
        if self.index.is_empty() {
            return Ok(Vec::new());
        }
        let embedding = self
            .embedder
            .embed(text)
            .await
            .map_err(RetrievalError::Embedding)?;
        let hits = self.index.search(&embedding, self.k, self.min_similarity)?;
        Ok(hits.into_iter().map(|hit| hit.position).collect())
    }
}

#[async_trait]
impl RetrievalStrategy for NearestNeighbourStrategy {
    async fn candidates(&self, query: &str) -> Result<Vec<usize>, RetrievalError> {
        self.lookup(query).await
    }

    fn name(&self) -> &str {
        "nearest_neighbour"
    }
}

/// Blends several retrieval strategies with equal weight
pub struct RelevanceRetriever {
    corpus: Arc<Corpus>,
    strategies: Vec<Arc<dyn RetrievalStrategy>>,
    top_k: usize,
}

impl RelevanceRetriever {
    pub fn new(corpus: Arc<Corpus>, strategies: Vec<Arc<dyn RetrievalStrategy>>) -> Self {
        Self {
            corpus,
            strategies,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Up to `top_k` tickets ranked by fused score, unique by key
    ///
    /// An empty corpus returns nothing without calling any strategy.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<WorkItem>, RetrievalError> {
        if self.corpus.is_empty() || self.strategies.is_empty() || self.top_k == 0 {
            return Ok(Vec::new());
        }

        let mut lists: Vec<Vec<&str>> = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            let positions = strategy.candidates(query).await?;
            debug!(
                strategy = strategy.name(),
                candidates = positions.len(),
                "Strategy candidates"
            );
            let keys = positions
                .into_iter()
                .filter_map(|pos| self.corpus.item(pos))
                .map(|item| item.key.as_str())
                .collect();
            lists.push(keys);
        }

        let mut fused = fuse_equal(&lists);
        fused.truncate(self.top_k);
        debug!(
            ranked = ?fused.iter().map(|f| f.key).collect::<Vec<_>>(),
            "Fused ranking"
        );

        let items = fused
            .into_iter()
            .filter_map(|f| self.corpus.items().iter().find(|item| item.key == f.key))
            .cloned()
            .collect();
        Ok(items)
    }
}

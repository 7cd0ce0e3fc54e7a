//! In-memory vector index
//!
//! Built once from a document collection, then queried read-only. Safe to
//! share across tasks behind an `Arc` without locking.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::embedder::{Embedder, Embedding};
use crate::vector::{cosine_similarity, normalize};

/// Errors building or querying the index
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedder returned {actual} vectors for {expected} texts")]
    CountMismatch { expected: usize, actual: usize },
}

/// One nearest-neighbour hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredHit {
    /// Position of the document in the collection the index was built from
    pub position: usize,
    /// Cosine similarity to the query (-1.0..=1.0)
    pub similarity: f32,
}

/// Read-only cosine similarity index over document embeddings
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<Embedding>,
    dimension: usize,
}

impl VectorIndex {
    /// Embed `texts` in batches of `batch_size` and index them by position
    pub async fn build(
        embedder: &dyn Embedder,
        texts: &[&str],
        batch_size: usize,
    ) -> Result<Self, IndexError> {
        let batch_size = batch_size.max(1);
        let mut embeddings = Vec::with_capacity(texts.len());

        for (batch_no, chunk) in texts.chunks(batch_size).enumerate() {
            let batch = embedder
                .embed_batch(chunk)
                .await
                .map_err(IndexError::Embedding)?;
            if batch.len() != chunk.len() {
                return Err(IndexError::CountMismatch {
                    expected: chunk.len(),
                    actual: batch.len(),
                });
            }
            debug!(batch = batch_no, size = chunk.len(), "Embedded document batch");
            embeddings.extend(batch);
        }

        let index = Self::from_embeddings(embeddings)?;
        info!(
            documents = index.len(),
            dimension = index.dimension,
            model = embedder.model_name(),
            "Vector index built"
        );
        Ok(index)
    }

    /// Index precomputed embeddings; all must share one dimension
    pub fn from_embeddings(embeddings: Vec<Embedding>) -> Result<Self, IndexError> {
        let dimension = embeddings.first().map(|e| e.len()).unwrap_or(0);
        let mut entries = Vec::with_capacity(embeddings.len());
        for embedding in embeddings {
            if embedding.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
            entries.push(normalize(embedding));
        }
        Ok(Self { entries, dimension })
    }

    /// Top `k` documents with similarity >= `min_similarity`
    ///
    /// Ordered by similarity descending; equal similarities keep collection order.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<Vec<ScoredHit>, IndexError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut hits: Vec<ScoredHit> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| ScoredHit {
                position,
                similarity: cosine_similarity(query, entry),
            })
            .filter(|hit| hit.similarity >= min_similarity)
            .collect();

        // Stable sort keeps collection order among ties
        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension (0 for an empty index)
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

//! Semantic index for Sprint Scribe
//!
//! Embeds ticket text and answers nearest-neighbour queries over it.
//!
//! # Architecture
//!
//! ```text
//! Ticket page content (one per work item)
//!       │
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  Embedder (text-embedding-3-small)      │
//! │  batched, cached, L2 normalized         │
//! └─────────────────────────────────────────┘
//!       │
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  VectorIndex (in memory, read-only)     │
//! │  cosine similarity, threshold, top-k    │
//! │  → positions ranked by similarity       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The index stores positions, not documents. Callers keep their own
//! collection and map positions back to it.

pub mod embedder;
pub mod index;
pub mod vector;

pub use embedder::{
    CachedEmbedder, Embedder, Embedding, HashingEmbedder, OpenAIEmbedder, SharedEmbedder,
};
pub use index::{IndexError, ScoredHit, VectorIndex};
pub use vector::{cosine_similarity, l2_norm, normalize};

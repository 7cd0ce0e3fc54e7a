//! Multi-query retrieval
//!
//! Asks the model for alternative phrasings of the query, runs a
//! nearest-neighbour lookup for each, and pools the hits as an
//! order-preserving unique union.

use std::collections::HashSet;

use async_trait::async_trait;
use scribe_agentic::{preview, SharedLlmClient};
use tracing::debug;

use super::{NearestNeighbourStrategy, RetrievalStrategy};
use crate::error::RetrievalError;

/// Default number of paraphrases requested
pub const DEFAULT_VARIANT_COUNT: usize = 3;

const SYSTEM_PROMPT: &str = "You are an AI language model assistant. Your task is to generate \
different versions of the given user question to retrieve relevant documents from a vector \
database. By generating multiple perspectives on the user question, your goal is to help the \
user overcome some of the limitations of distance-based similarity search. Provide these \
alternative questions separated by newlines, with no numbering and no other text.";

pub struct MultiQueryStrategy {
    llm: SharedLlmClient,
    nearest: NearestNeighbourStrategy,
    variant_count: usize,
}

impl MultiQueryStrategy {
    pub fn new(llm: SharedLlmClient, nearest: NearestNeighbourStrategy) -> Self {
        Self {
            llm,
            nearest,
            variant_count: DEFAULT_VARIANT_COUNT,
        }
    }

    pub fn with_variant_count(mut self, variant_count: usize) -> Self {
        self.variant_count = variant_count.max(1);
        self
    }

    /// Paraphrased variants; falls back to the query itself when the model
    /// returns nothing usable
    pub async fn variants(&self, query: &str) -> Result<Vec<String>, RetrievalError> {
        let user_prompt = format!(
            "Generate {} different versions of this question.\n\nOriginal question: {}",
            self.variant_count, query
        );
        let response = self
            .llm
            .chat(SYSTEM_PROMPT, &user_prompt)
            .await
            .map_err(RetrievalError::QueryExpansion)?;
        debug!(response = preview(&response, 200), "Query variants");

        let mut variants = parse_variants(&response);
        variants.truncate(self.variant_count);
        if variants.is_empty() {
            variants.push(query.to_string());
        }
        Ok(variants)
    }
}

#[async_trait]
impl RetrievalStrategy for MultiQueryStrategy {
    async fn candidates(&self, query: &str) -> Result<Vec<usize>, RetrievalError> {
        let variants = self.variants(query).await?;

        let mut seen = HashSet::new();
        let mut pooled = Vec::new();
        for variant in &variants {
            for position in self.nearest.lookup(variant).await? {
                if seen.insert(position) {
                    pooled.push(position);
                }
            }
        }
        Ok(pooled)
    }

    fn name(&self) -> &str {
        "multi_query"
    }
}

/// One variant per non-empty line, list markers removed, duplicates dropped
fn parse_variants(response: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    response
        .lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line);
    // "1." / "2)" numbering
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim();
        }
    }
    line.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedLlm;
    use scribe_semantic::{HashingEmbedder, SharedEmbedder, VectorIndex};
    use std::sync::Arc;

    #[test]
    fn test_parse_variants_strips_markers() {
        let parsed = parse_variants("1. How do users sign in?\n\n- Login flow\n* Auth page\n2) Login flow\n");
        assert_eq!(
            parsed,
            vec!["How do users sign in?", "Login flow", "Auth page"]
        );
    }

    #[test]
    fn test_parse_variants_keeps_leading_numbers_in_text() {
        assert_eq!(parse_variants("2FA rollout"), vec!["2FA rollout"]);
    }

    async fn strategy(llm: Arc<ScriptedLlm>) -> MultiQueryStrategy {
        let embedder: SharedEmbedder = Arc::new(HashingEmbedder::new(4096));
        let texts = ["Add login form", "Add logout button", "Rotate TLS certificates"];
        let index = VectorIndex::build(embedder.as_ref(), &texts, 8).await.unwrap();
        let nearest = NearestNeighbourStrategy::new(embedder, Arc::new(index)).with_min_similarity(0.3);
        MultiQueryStrategy::new(llm, nearest)
    }

    #[tokio::test]
    async fn test_variants_pool_unique_union() {
        let llm = Arc::new(ScriptedLlm::new(["login screen\nlogout action\nlogin again"]));
        let strategy = strategy(llm.clone()).await;

        let positions = strategy.candidates("sign in").await.unwrap();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_response_falls_back_to_query() {
        let llm = Arc::new(ScriptedLlm::new(["\n  \n"]));
        let strategy = strategy(llm).await;
        assert_eq!(strategy.variants("certificates").await.unwrap(), vec!["certificates"]);
    }

    #[tokio::test]
    async fn test_llm_failure_is_query_expansion_error() {
        let llm = Arc::new(ScriptedLlm::failing("rate limited"));
        let strategy = strategy(llm).await;
        assert!(matches!(
            strategy.candidates("login").await,
            Err(RetrievalError::QueryExpansion(_))
        ));
    }
}

//! External knowledge fetching
//!
//! [`TavilyClient`] calls the Tavily search API. [`KnowledgeFetcher`] wraps any
//! [`WebSearch`] and never fails: errors are logged and become an empty
//! result, so the synthesizer still runs with no context.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SearchError;

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

/// Default number of results requested per search
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSnippet {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Web search capability
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<WebSnippet>, SearchError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}

pub type SharedWebSearch = Arc<dyn WebSearch>;

/// Tavily search client
pub struct TavilyClient {
    client: reqwest::Client,
    api_key: Option<String>,
    max_results: usize,
}

impl TavilyClient {
    /// Client with an optional key; without one every search fails with
    /// [`SearchError::MissingApiKey`]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Create from TAVILY_API_KEY
    pub fn from_env() -> Self {
        Self::new(std::env::var("TAVILY_API_KEY").ok())
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<WebSnippet>, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;

        let response = self
            .client
            .post(TAVILY_ENDPOINT)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&serde_json::json!({
                "query": query,
                "max_results": self.max_results,
                "search_depth": "basic",
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }

    fn provider_name(&self) -> &str {
        "tavily"
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    url: String,
    content: Option<String>,
}

fn parse_response(body: &str) -> Result<Vec<WebSnippet>, SearchError> {
    let parsed: TavilyResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Decode(e.to_string()))?;
    Ok(parsed
        .results
        .into_iter()
        .map(|r| WebSnippet {
            title: r.title,
            url: r.url,
            content: r.content,
        })
        .collect())
}

/// Fail-soft wrapper around a web search
#[derive(Clone)]
pub struct KnowledgeFetcher {
    search: SharedWebSearch,
}

impl KnowledgeFetcher {
    pub fn new(search: SharedWebSearch) -> Self {
        Self { search }
    }

    /// Search results, or nothing if the search failed for any reason
    pub async fn search(&self, query: &str) -> Vec<WebSnippet> {
        match self.search.search(query).await {
            Ok(snippets) => {
                debug!(
                    provider = self.search.provider_name(),
                    results = snippets.len(),
                    "Web search complete"
                );
                snippets
            }
            Err(e) => {
                warn!(
                    provider = self.search.provider_name(),
                    error = %e,
                    "Web search failed, continuing without online results"
                );
                Vec::new()
            }
        }
    }
}

//! Runtime configuration from environment variables
//!
//! `.env.local` and `.env` are loaded first when present; variables already
//! set in the process environment take precedence over both.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::retrieval::multi_query::DEFAULT_VARIANT_COUNT;
use crate::retrieval::{DEFAULT_MIN_SIMILARITY, DEFAULT_TOP_K};
use crate::search::DEFAULT_MAX_RESULTS;

pub const DEFAULT_TICKETS_CSV: &str = "./data/TF-Task.csv";
pub const DEFAULT_EPICS_CSV: &str = "./data/TF-EPIC.csv";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Load `.env.local` then `.env` into the process environment, if present
pub fn load_dotenv() {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();
}

#[derive(Debug, Clone)]
pub struct ScribeConfig {
    /// Chat and embeddings both use it
    pub openai_api_key: String,
    /// `OPENAI_MODEL`; `None` keeps the client default
    pub chat_model: Option<String>,
    pub embedding_model: String,
    pub tavily_api_key: Option<String>,
    pub tickets_csv: PathBuf,
    pub epics_csv: PathBuf,
    pub top_k: usize,
    pub min_similarity: f32,
    pub query_variants: usize,
    pub search_results: usize,
}

impl ScribeConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let openai_api_key = get("OPENAI_API_KEY").ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;

        Ok(Self {
            openai_api_key,
            chat_model: get("OPENAI_MODEL"),
            embedding_model: get("SCRIBE_EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            tavily_api_key: get("TAVILY_API_KEY"),
            tickets_csv: get("SCRIBE_TICKETS_CSV")
                .unwrap_or_else(|| DEFAULT_TICKETS_CSV.to_string())
                .into(),
            epics_csv: get("SCRIBE_EPICS_CSV")
                .unwrap_or_else(|| DEFAULT_EPICS_CSV.to_string())
                .into(),
            top_k: parse_var(&get, "SCRIBE_TOP_K", DEFAULT_TOP_K)?,
            min_similarity: parse_var(&get, "SCRIBE_MIN_SIMILARITY", DEFAULT_MIN_SIMILARITY)?,
            query_variants: parse_var(&get, "SCRIBE_QUERY_VARIANTS", DEFAULT_VARIANT_COUNT)?,
            search_results: parse_var(&get, "SCRIBE_SEARCH_RESULTS", DEFAULT_MAX_RESULTS)?,
        })
    }
}

fn parse_var<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                var: name,
                reason: e.to_string(),
                value,
            }),
        None => Ok(default),
    }
}

//! Error types for the query-resolution workflow
//!
//! Fatal failures (retrieval, judgment, synthesis) surface through
//! [`WorkflowError`]. Search failures are absorbed by the knowledge fetcher and
//! never reach the caller. A lookup that finds nothing is not an error at all;
//! it shows up as `None` or an empty collection in the workflow state.

use std::path::PathBuf;

use thiserror::Error;

/// Failure that aborts one workflow invocation
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("relevance judgment failed: {0}")]
    Judgment(#[source] anyhow::Error),

    #[error("proposal synthesis failed: {0}")]
    Synthesis(#[source] anyhow::Error),
}

impl WorkflowError {
    /// Short stage label, carried in logs and the CLI's `--json` error output
    pub fn stage(&self) -> &'static str {
        match self {
            WorkflowError::Retrieval(_) => "retrieve",
            WorkflowError::Judgment(_) => "judge",
            WorkflowError::Synthesis(_) => "synthesize",
        }
    }
}

/// Candidate retrieval errors
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("query embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),

    #[error("query paraphrasing failed: {0}")]
    QueryExpansion(#[source] anyhow::Error),

    #[error("index lookup failed: {0}")]
    Index(#[from] scribe_semantic::IndexError),
}

/// Web search errors (absorbed by the knowledge fetcher)
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed search response: {0}")]
    Decode(String),

    #[error("search API key not configured")]
    MissingApiKey,
}

/// Corpus loading errors
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("{source_name} has no '{column}' column")]
    MissingColumn { source_name: String, column: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: '{value}' ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Startup errors while building the shared context
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),

    #[error("semantic index build failed: {0}")]
    Index(#[from] scribe_semantic::IndexError),

    #[error("LLM client setup failed: {0}")]
    Client(#[source] anyhow::Error),

    #[error("missing component: {0}")]
    MissingComponent(&'static str),
}

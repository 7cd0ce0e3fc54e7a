//! Sprint Scribe - query resolution against an epic/ticket backlog
//!
//! Given a free-text query, find the existing epic it belongs to and list its
//! tickets; if no existing epic matches, research the subject online and draft
//! new epics with tickets.
//!
//! ## Workflow
//!
//! ```text
//! query → retrieve tickets → resolve parent epic → judge relevance
//!           ├─ related   → extract the epic's tickets
//!           └─ unrelated → web search → synthesize proposal
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sprint_scribe::{ScribeConfig, ScribeContext, WorkflowController};
//!
//! # async fn run() -> anyhow::Result<()> {
//! sprint_scribe::config::load_dotenv();
//! let config = ScribeConfig::from_env()?;
//! let ctx = ScribeContext::from_config(&config).await?;
//!
//! let state = WorkflowController::new(&ctx).run("add SSO login").await?;
//! println!("{}", serde_json::to_string_pretty(&state)?);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Configuration and startup wiring
pub mod config;
pub mod context;

// Corpus and documents
pub mod corpus;
pub mod proposal;

// Workflow components
pub mod extractor;
pub mod judge;
pub mod resolver;
pub mod retrieval;
pub mod search;
pub mod synthesizer;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::ScribeConfig;
pub use context::{ScribeContext, ScribeContextBuilder};
pub use corpus::{Corpus, Initiative, WorkItem};
pub use error::{
    ConfigError, ContextError, CorpusError, RetrievalError, SearchError, WorkflowError,
};
pub use extractor::TaskExtractor;
pub use judge::{Relevance, RelevanceJudge};
pub use proposal::{
    EpicTickets, ProposalDocument, ProposalEntry, ProposalItem, ProposalParseError, RawProposal,
};
pub use resolver::InitiativeResolver;
pub use retrieval::{
    MultiQueryStrategy, NearestNeighbourStrategy, RelevanceRetriever, RetrievalStrategy,
};
pub use search::{KnowledgeFetcher, TavilyClient, WebSearch, WebSnippet};
pub use synthesizer::ProposalSynthesizer;
pub use workflow::{WorkflowController, WorkflowStage, WorkflowState};

//! Relevance judgment
//!
//! One yes/no model call decides whether the query is about the resolved epic.
//! Any answer that does not start with "yes" counts as unrelated.

use std::fmt;

use scribe_agentic::{preview, SharedLlmClient};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SYSTEM_PROMPT: &str = "You are an expert project manager. Given a user query and an epic \
summary, determine if the query is about the epic. Respond with 'yes' or 'no'.";

/// Outcome of a judgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relevance {
    Related,
    Unrelated,
}

impl Relevance {
    /// Fail-closed reading of a model answer
    pub fn from_response(response: &str) -> Self {
        if response.trim().to_lowercase().starts_with("yes") {
            Relevance::Related
        } else {
            Relevance::Unrelated
        }
    }

    pub fn is_related(self) -> bool {
        matches!(self, Relevance::Related)
    }
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relevance::Related => write!(f, "related"),
            Relevance::Unrelated => write!(f, "unrelated"),
        }
    }
}

pub struct RelevanceJudge {
    llm: SharedLlmClient,
}

impl RelevanceJudge {
    pub fn new(llm: SharedLlmClient) -> Self {
        Self { llm }
    }

    /// Judge the query against an epic summary
    ///
    /// A missing or blank summary means there is no epic to compare against:
    /// unrelated, without a model call.
    pub async fn judge(
        &self,
        query: &str,
        initiative_summary: Option<&str>,
    ) -> anyhow::Result<Relevance> {
        let Some(summary) = initiative_summary.filter(|s| !s.trim().is_empty()) else {
            return Ok(Relevance::Unrelated);
        };

        let user_prompt = format!(
            "Query: {}\n\nEpic Summary: {}\n\nIs the query about this epic?",
            query, summary
        );
        let answer = self.llm.chat(SYSTEM_PROMPT, &user_prompt).await?;
        let relevance = Relevance::from_response(&answer);
        debug!(answer = preview(&answer, 40), %relevance, "Relevance judged");
        Ok(relevance)
    }
}

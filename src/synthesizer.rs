//! Proposal synthesis from web research
//!
//! Used when no existing epic matches. The model is asked for JSON only, but
//! its answer is returned as-is in a [`RawProposal`]; callers decide whether to
//! parse it.

use scribe_agentic::{preview, SharedLlmClient};
use tracing::debug;

use crate::proposal::RawProposal;
use crate::search::WebSnippet;

const SYSTEM_PROMPT: &str = r#"You are a project analyst. Given a user query and online information about technologies, generate a list of relevant EPICs and tickets that might be needed for a project.

Format the output as a JSON list in the following structure:

[
  {
    "epic_name": "<Epic Title>",
    "tickets": [
      {
        "name": "<Task Title>",
        "description": "<Task Description>"
      }
    ]
  }
]

Only output the JSON list, nothing else."#;

pub struct ProposalSynthesizer {
    llm: SharedLlmClient,
}

impl ProposalSynthesizer {
    pub fn new(llm: SharedLlmClient) -> Self {
        Self { llm }
    }

    /// Generate epics and tickets for `query` from the snippets' content
    pub async fn synthesize(
        &self,
        query: &str,
        snippets: &[WebSnippet],
    ) -> anyhow::Result<RawProposal> {
        let context = build_context(snippets);
        let user_prompt = format!("Query: {}\nOnline Information: {}", query, context);

        let text = self.llm.chat(SYSTEM_PROMPT, &user_prompt).await?;
        debug!(
            context_chars = context.len(),
            response = preview(&text, 200),
            "Proposal generated"
        );
        Ok(RawProposal(text))
    }
}

/// Snippet contents joined by newlines, skipping snippets without content
fn build_context(snippets: &[WebSnippet]) -> String {
    snippets
        .iter()
        .filter_map(|s| s.content.as_deref())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedLlm;
    use std::sync::Arc;

    fn snippet(content: Option<&str>) -> WebSnippet {
        WebSnippet {
            title: "t".to_string(),
            url: "https://example.com".to_string(),
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn test_context_skips_missing_content() {
        let context = build_context(&[snippet(Some("a")), snippet(None), snippet(Some("b"))]);
        assert_eq!(context, "a\nb");
    }

    #[tokio::test]
    async fn test_returns_raw_text() {
        let llm = Arc::new(ScriptedLlm::new(["not json at all"]));
        let synthesizer = ProposalSynthesizer::new(llm.clone());
        let raw = synthesizer.synthesize("edge caching", &[]).await.unwrap();

        assert_eq!(raw.as_str(), "not json at all");
        assert!(raw.parse().is_err());
        assert_eq!(llm.prompts()[0].1, "Query: edge caching\nOnline Information: ");
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let synthesizer = ProposalSynthesizer::new(Arc::new(ScriptedLlm::failing("timeout")));
        assert!(synthesizer.synthesize("q", &[]).await.is_err());
    }
}

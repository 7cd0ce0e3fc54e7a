//! Query-resolution workflow
//!
//! A fixed sequence of steps with one branch: after the relevance judgment the
//! run either extracts the matched epic's tickets or searches the web and
//! synthesizes new epics. Each step reads and extends a [`WorkflowState`];
//! nothing is revisited.

mod state;

pub use state::{WorkflowStage, WorkflowState};

use tracing::{debug, info, instrument};

use crate::context::ScribeContext;
use crate::error::WorkflowError;
use crate::judge::Relevance;
use crate::proposal::EpicTickets;

/// Runs queries through the workflow against a shared context
pub struct WorkflowController<'a> {
    ctx: &'a ScribeContext,
}

impl<'a> WorkflowController<'a> {
    pub fn new(ctx: &'a ScribeContext) -> Self {
        Self { ctx }
    }

    /// Run one query to completion
    #[instrument(skip(self), fields(query = %query))]
    pub async fn run(&self, query: &str) -> Result<WorkflowState, WorkflowError> {
        let mut state = WorkflowState::new(query);

        self.retrieve(&mut state).await?;
        self.resolve(&mut state);
        let relevance = self.judge(&mut state).await?;

        match relevance {
            Relevance::Related => self.extract(&mut state),
            Relevance::Unrelated => {
                self.search(&mut state).await;
                self.synthesize(&mut state).await?;
            }
        }

        state.stage = WorkflowStage::Done;
        info!(
            epic_key = ?state.resolved_initiative_key,
            related = relevance.is_related(),
            "Workflow complete"
        );
        Ok(state)
    }

    async fn retrieve(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        let candidates = self.ctx.retriever().retrieve(&state.query).await?;
        debug!(
            candidates = ?candidates.iter().map(|c| c.key.as_str()).collect::<Vec<_>>(),
            "Retrieved candidates"
        );
        state.resolved_initiative_key = self.ctx.resolver().resolve_parent(&candidates);
        state.stage = WorkflowStage::Retrieved;
        Ok(())
    }

    fn resolve(&self, state: &mut WorkflowState) {
        state.resolved_initiative_summary = self
            .ctx
            .resolver()
            .lookup_summary(state.resolved_initiative_key.as_deref());
        state.stage = WorkflowStage::Resolved;
        debug!(
            epic_key = ?state.resolved_initiative_key,
            epic_summary = ?state.resolved_initiative_summary,
            "Resolved epic"
        );
    }

    async fn judge(&self, state: &mut WorkflowState) -> Result<Relevance, WorkflowError> {
        let relevance = self
            .ctx
            .judge()
            .judge(&state.query, state.resolved_initiative_summary.as_deref())
            .await
            .map_err(WorkflowError::Judgment)?;
        state.is_related = Some(relevance.is_related());
        state.stage = WorkflowStage::Judged;
        info!(%relevance, "Judged relevance");
        Ok(relevance)
    }

    fn extract(&self, state: &mut WorkflowState) {
        let document = self
            .ctx
            .extractor()
            .extract(state.resolved_initiative_key.as_deref());
        debug!(tickets = document.item_count(), "Extracted tickets");
        state.extracted_items = Some(EpicTickets::Extracted(document));
        state.stage = WorkflowStage::Extracted;
    }

    async fn search(&self, state: &mut WorkflowState) {
        let snippets = self.ctx.fetcher().search(&state.query).await;
        debug!(results = snippets.len(), "Searched online");
        state.external_snippets = Some(snippets);
        state.stage = WorkflowStage::Searched;
    }

    async fn synthesize(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        let raw = self
            .ctx
            .synthesizer()
            .synthesize(&state.query, state.online_results())
            .await
            .map_err(WorkflowError::Synthesis)?;
        state.extracted_items = Some(EpicTickets::Generated(raw));
        state.stage = WorkflowStage::Synthesized;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Corpus, Initiative, WorkItem};
    use crate::error::SearchError;
    use crate::search::{WebSearch, WebSnippet};
    use crate::test_support::ScriptedLlm;
    use async_trait::async_trait;
    use scribe_semantic::HashingEmbedder;
    use std::sync::Arc;

    struct NoSearch;

    #[async_trait]
    impl WebSearch for NoSearch {
        async fn search(&self, _query: &str) -> Result<Vec<WebSnippet>, SearchError> {
            Err(SearchError::MissingApiKey)
        }

        fn provider_name(&self) -> &str {
            "none"
        }
    }

    fn auth_corpus() -> Corpus {
        let ticket = |key: &str, title: &str| WorkItem {
            key: key.to_string(),
            parent_key: "E1".to_string(),
            parent_summary: "Auth Epic".to_string(),
            title: title.to_string(),
            body: format!("Summary: {}", title),
        };
        Corpus::new(
            vec![ticket("T1", "Add login"), ticket("T2", "Add logout")],
            vec![Initiative {
                key: "E1".to_string(),
                summary: "Auth Epic".to_string(),
            }],
        )
    }

    async fn context(corpus: Corpus, llm: Arc<ScriptedLlm>) -> ScribeContext {
        ScribeContext::builder()
            .corpus(corpus)
            .llm(llm)
            .embedder(Arc::new(HashingEmbedder::new(4096)))
            .web_search(Arc::new(NoSearch))
            .build()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_related_branch_extracts() {
        // paraphrases, then the judgment
        let llm = Arc::new(ScriptedLlm::new(["login page\nsign in", "yes"]));
        let ctx = context(auth_corpus(), llm.clone()).await;

        let state = WorkflowController::new(&ctx).run("add login").await.unwrap();

        assert_eq!(state.stage, WorkflowStage::Done);
        assert_eq!(state.resolved_initiative_key.as_deref(), Some("E1"));
        assert_eq!(state.resolved_initiative_summary.as_deref(), Some("Auth Epic"));
        assert_eq!(state.is_related, Some(true));
        assert!(state.external_snippets.is_none());
        let doc = state.extracted_items.unwrap().document().unwrap();
        assert_eq!(doc.item_count(), 2);
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_unrelated_branch_synthesizes() {
        let llm = Arc::new(ScriptedLlm::new([
            "login page",
            "no",
            r#"[{"epic_name": "Vector DB", "tickets": []}]"#,
        ]));
        let ctx = context(auth_corpus(), llm.clone()).await;

        let state = WorkflowController::new(&ctx).run("add login").await.unwrap();

        assert_eq!(state.is_related, Some(false));
        assert_eq!(state.external_snippets, Some(vec![]));
        let tickets = state.extracted_items.unwrap();
        assert!(tickets.is_generated());
        assert_eq!(tickets.document().unwrap().entries()[0].initiative_name, "Vector DB");
        assert_eq!(llm.calls(), 3);
    }

    #[tokio::test]
    async fn test_judgment_failure_is_fatal() {
        let llm = Arc::new(ScriptedLlm::new(["login page"]));
        let ctx = context(auth_corpus(), llm).await;

        let err = WorkflowController::new(&ctx).run("add login").await.unwrap_err();
        assert!(matches!(err, WorkflowError::Judgment(_)));
    }

    #[tokio::test]
    async fn test_empty_corpus_goes_straight_to_synthesis() {
        let llm = Arc::new(ScriptedLlm::new(["[]"]));
        let ctx = context(Corpus::empty(), llm.clone()).await;

        let state = WorkflowController::new(&ctx).run("anything").await.unwrap();

        assert!(state.resolved_initiative_key.is_none());
        assert_eq!(state.is_related, Some(false));
        // only the synthesis call
        assert_eq!(llm.calls(), 1);
    }
}

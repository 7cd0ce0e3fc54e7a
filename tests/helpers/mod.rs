//! Offline fakes for workflow integration tests
//!
//! The LLM fake routes on the system prompt, so one instance can serve the
//! paraphraser, the judge and the synthesizer while counting each role.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use scribe_agentic::LlmClient;
use scribe_semantic::HashingEmbedder;
use sprint_scribe::{
    Corpus, Initiative, ScribeContext, SearchError, WebSearch, WebSnippet, WorkItem,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Paraphrase,
    Judge,
    Synthesize,
}

pub struct RoutingLlm {
    paraphrases: Result<String, String>,
    judgment: Result<String, String>,
    proposal: Result<String, String>,
    calls: Mutex<Vec<(Role, String)>>,
}

impl RoutingLlm {
    pub fn new() -> Self {
        Self {
            paraphrases: Ok(String::new()),
            judgment: Ok("no".to_string()),
            proposal: Ok("[]".to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn paraphrases(mut self, text: &str) -> Self {
        self.paraphrases = Ok(text.to_string());
        self
    }

    pub fn failing_paraphrases(mut self, message: &str) -> Self {
        self.paraphrases = Err(message.to_string());
        self
    }

    pub fn judgment(mut self, answer: &str) -> Self {
        self.judgment = Ok(answer.to_string());
        self
    }

    pub fn failing_judgment(mut self, message: &str) -> Self {
        self.judgment = Err(message.to_string());
        self
    }

    pub fn proposal(mut self, text: &str) -> Self {
        self.proposal = Ok(text.to_string());
        self
    }

    pub fn failing_proposal(mut self, message: &str) -> Self {
        self.proposal = Err(message.to_string());
        self
    }

    pub fn count(&self, role: Role) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| *r == role)
            .count()
    }

    /// User prompts sent for `role`, in call order
    pub fn prompts(&self, role: Role) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[async_trait]
impl LlmClient for RoutingLlm {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let role = if system_prompt.contains("expert project manager") {
            Role::Judge
        } else if system_prompt.contains("project analyst") {
            Role::Synthesize
        } else {
            Role::Paraphrase
        };
        self.calls
            .lock()
            .unwrap()
            .push((role, user_prompt.to_string()));

        let reply = match role {
            Role::Paraphrase => self.paraphrases.clone(),
            Role::Judge => self.judgment.clone(),
            Role::Synthesize => self.proposal.clone(),
        };
        reply.map_err(|msg| anyhow!(msg))
    }

    fn model_name(&self) -> &str {
        "routing-fake"
    }

    fn provider_name(&self) -> &str {
        "test"
    }
}

/// Web search returning fixed snippets
pub struct StaticSearch(pub Vec<WebSnippet>);

#[async_trait]
impl WebSearch for StaticSearch {
    async fn search(&self, _query: &str) -> Result<Vec<WebSnippet>, SearchError> {
        Ok(self.0.clone())
    }

    fn provider_name(&self) -> &str {
        "static"
    }
}

/// Web search that always fails
pub struct FailingSearch;

#[async_trait]
impl WebSearch for FailingSearch {
    async fn search(&self, _query: &str) -> Result<Vec<WebSnippet>, SearchError> {
        Err(SearchError::Decode("unexpected end of input".to_string()))
    }

    fn provider_name(&self) -> &str {
        "failing"
    }
}

pub fn snippet(title: &str, url: &str, content: Option<&str>) -> WebSnippet {
    WebSnippet {
        title: title.to_string(),
        url: url.to_string(),
        content: content.map(str::to_string),
    }
}

pub fn ticket(key: &str, parent_key: &str, parent_summary: &str, title: &str) -> WorkItem {
    WorkItem {
        key: key.to_string(),
        parent_key: parent_key.to_string(),
        parent_summary: parent_summary.to_string(),
        title: title.to_string(),
        body: format!("Issue key: {}\nSummary: {}", key, title),
    }
}

pub fn epic(key: &str, summary: &str) -> Initiative {
    Initiative {
        key: key.to_string(),
        summary: summary.to_string(),
    }
}

/// Auth epic with two tickets, plus an unrelated infrastructure epic
pub fn backlog() -> Corpus {
    Corpus::new(
        vec![
            ticket("T1", "E1", "Auth Epic", "Add login"),
            ticket("T2", "E1", "Auth Epic", "Add logout"),
            ticket("T3", "E2", "Platform Epic", "Rotate database credentials"),
            ticket("T4", "", "", "Tidy changelog"),
        ],
        vec![epic("E1", "Auth Epic"), epic("E2", "Platform Epic")],
    )
}

pub async fn context(
    corpus: Corpus,
    llm: Arc<RoutingLlm>,
    search: Arc<dyn WebSearch>,
) -> ScribeContext {
    ScribeContext::builder()
        .corpus(corpus)
        .llm(llm)
        .embedder(Arc::new(HashingEmbedder::new(4096)))
        .web_search(search)
        .build()
        .await
        .expect("context should build offline")
}

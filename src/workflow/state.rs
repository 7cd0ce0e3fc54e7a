//! Per-invocation workflow state

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::proposal::EpicTickets;
use crate::search::WebSnippet;

/// Position in the workflow
///
/// ```text
/// Start → Retrieved → Resolved → Judged ─┬─ related ──→ Extracted ─────────────┬→ Done
///                                        └─ unrelated → Searched → Synthesized ┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    #[default]
    Start,
    Retrieved,
    Resolved,
    Judged,
    Extracted,
    Searched,
    Synthesized,
    Done,
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowStage::Start => "start",
            WorkflowStage::Retrieved => "retrieved",
            WorkflowStage::Resolved => "resolved",
            WorkflowStage::Judged => "judged",
            WorkflowStage::Extracted => "extracted",
            WorkflowStage::Searched => "searched",
            WorkflowStage::Synthesized => "synthesized",
            WorkflowStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Everything one run learned about a query
///
/// Fields are filled in stage order and never cleared. Serialized names are
/// the ones the presentation layer reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub query: String,

    /// Parent key of the top candidate; `None` iff nothing was retrieved
    #[serde(rename = "epic_key")]
    pub resolved_initiative_key: Option<String>,

    #[serde(rename = "epic_summary")]
    pub resolved_initiative_summary: Option<String>,

    pub is_related: Option<bool>,

    #[serde(rename = "epic_tickets")]
    pub extracted_items: Option<EpicTickets>,

    /// Only set on the unrelated branch
    #[serde(rename = "online_results")]
    pub external_snippets: Option<Vec<WebSnippet>>,

    #[serde(skip)]
    pub stage: WorkflowStage,
}

impl WorkflowState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            resolved_initiative_key: None,
            resolved_initiative_summary: None,
            is_related: None,
            extracted_items: None,
            external_snippets: None,
            stage: WorkflowStage::Start,
        }
    }

    pub fn is_done(&self) -> bool {
        self.stage == WorkflowStage::Done
    }

    /// Online results, empty when the search branch did not run
    pub fn online_results(&self) -> &[WebSnippet] {
        self.external_snippets.as_deref().unwrap_or(&[])
    }
}

//! Epic/ticket proposal documents
//!
//! The same nested shape comes out of two places: the task extractor builds it
//! from the corpus, the proposal synthesizer asks a model to write it as JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One ticket inside a proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One epic with its tickets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalEntry {
    #[serde(rename = "epic_name")]
    pub initiative_name: String,
    #[serde(rename = "tickets", default)]
    pub items: Vec<ProposalItem>,
}

/// Ordered list of epics with tickets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalDocument(pub Vec<ProposalEntry>);

impl ProposalDocument {
    pub fn entries(&self) -> &[ProposalEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total ticket count across all epics
    pub fn item_count(&self) -> usize {
        self.0.iter().map(|e| e.items.len()).sum()
    }
}

#[derive(Debug, Error)]
#[error("generated proposal is not valid JSON: {0}")]
pub struct ProposalParseError(#[from] serde_json::Error);

/// Model-generated proposal text, not yet validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawProposal(pub String);

impl RawProposal {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a document, tolerating a surrounding Markdown code fence
    pub fn parse(&self) -> Result<ProposalDocument, ProposalParseError> {
        let json = strip_code_blocks(&self.0);
        Ok(serde_json::from_str(&json)?)
    }
}

/// Tickets attached to a finished run
///
/// Serialized untagged: a JSON array when extracted, a string when generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EpicTickets {
    Extracted(ProposalDocument),
    Generated(RawProposal),
}

impl EpicTickets {
    /// Structured view; generated text is parsed on demand
    pub fn document(&self) -> Result<ProposalDocument, ProposalParseError> {
        match self {
            EpicTickets::Extracted(doc) => Ok(doc.clone()),
            EpicTickets::Generated(raw) => raw.parse(),
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, EpicTickets::Generated(_))
    }
}

fn strip_code_blocks(text: &str) -> String {
    let text = text.trim();
    if !text.starts_with("```") {
        return text.to_string();
    }
    let mut lines: Vec<&str> = text.lines().skip(1).collect();
    if lines.last().is_some_and(|l| l.trim_start().starts_with("```")) {
        lines.pop();
    }
    lines.join("\n")
}

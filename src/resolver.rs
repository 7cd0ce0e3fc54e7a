//! Initiative resolution: ranked tickets to parent epic

use std::sync::Arc;

use crate::corpus::{Corpus, WorkItem};

/// Maps retrieval results to an epic key and summary
#[derive(Clone)]
pub struct InitiativeResolver {
    corpus: Arc<Corpus>,
}

impl InitiativeResolver {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self { corpus }
    }

    /// Parent key of the top-ranked candidate
    ///
    /// Only the first candidate decides. An orphan on top yields `Some("")`,
    /// which resolves to no summary downstream.
    pub fn resolve_parent(&self, candidates: &[WorkItem]) -> Option<String> {
        candidates.first().map(|item| item.parent_key.clone())
    }

    /// Summary of the epic with this key; `None` when absent, empty or unknown
    pub fn lookup_summary(&self, parent_key: Option<&str>) -> Option<String> {
        parent_key
            .and_then(|key| self.corpus.initiative(key))
            .map(|initiative| initiative.summary.clone())
    }
}

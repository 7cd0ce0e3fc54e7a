//! Task extraction for a matched epic

use std::sync::Arc;

use crate::corpus::Corpus;
use crate::proposal::{ProposalDocument, ProposalEntry, ProposalItem};

/// Collects the tickets under an epic into a proposal document
#[derive(Clone)]
pub struct TaskExtractor {
    corpus: Arc<Corpus>,
}

impl TaskExtractor {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self { corpus }
    }

    /// Every ticket whose parent is `initiative_key`, in corpus order
    ///
    /// A key always yields one entry, named after the first ticket's parent
    /// summary, or the key itself when that is blank or nothing matched.
    /// No key: empty document.
    pub fn extract(&self, initiative_key: Option<&str>) -> ProposalDocument {
        let Some(key) = initiative_key.filter(|k| !k.is_empty()) else {
            return ProposalDocument::default();
        };

        let mut name = None;
        let items: Vec<ProposalItem> = self
            .corpus
            .items_under(key)
            .map(|item| {
                name.get_or_insert_with(|| item.parent_summary.clone());
                ProposalItem {
                    name: item.title.clone(),
                    description: item.body.clone(),
                }
            })
            .collect();

        let initiative_name = name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| key.to_string());
        ProposalDocument(vec![ProposalEntry {
            initiative_name,
            items,
        }])
    }
}

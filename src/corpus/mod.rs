//! Work-item corpus
//!
//! Tickets and the epics they roll up to, loaded once at startup and read-only
//! afterwards. Positions in [`Corpus::items`] are the document ids used by the
//! semantic index.

pub mod loader;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use loader::{load_initiatives, load_work_items, EpicColumns, TicketColumns};

/// A ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub key: String,
    /// Parent epic key; empty for orphans
    pub parent_key: String,
    /// Parent epic summary, denormalized from the ticket export
    pub parent_summary: String,
    pub title: String,
    /// Full row text; this is what gets embedded
    pub body: String,
}

impl WorkItem {
    pub fn is_orphan(&self) -> bool {
        self.parent_key.is_empty()
    }
}

/// An epic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
    pub key: String,
    pub summary: String,
}

/// Immutable ticket and epic collections with an epic lookup table
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    items: Vec<WorkItem>,
    initiatives: Vec<Initiative>,
    initiative_index: HashMap<String, usize>,
}

impl Corpus {
    /// Build a corpus. Tickets with a key already seen are dropped; for epics
    /// the first occurrence of a key wins the lookup.
    pub fn new(items: Vec<WorkItem>, initiatives: Vec<Initiative>) -> Self {
        let mut seen = HashSet::new();
        let mut unique_items = Vec::with_capacity(items.len());
        for item in items {
            if seen.insert(item.key.clone()) {
                unique_items.push(item);
            } else {
                warn!(key = %item.key, "Duplicate ticket key dropped");
            }
        }

        let mut initiative_index = HashMap::with_capacity(initiatives.len());
        for (pos, initiative) in initiatives.iter().enumerate() {
            initiative_index
                .entry(initiative.key.clone())
                .or_insert(pos);
        }

        Self {
            items: unique_items,
            initiatives,
            initiative_index,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn item(&self, position: usize) -> Option<&WorkItem> {
        self.items.get(position)
    }

    pub fn initiatives(&self) -> &[Initiative] {
        &self.initiatives
    }

    /// Epic by key; the empty key never matches
    pub fn initiative(&self, key: &str) -> Option<&Initiative> {
        if key.is_empty() {
            return None;
        }
        self.initiative_index
            .get(key)
            .and_then(|&pos| self.initiatives.get(pos))
    }

    /// Tickets whose parent is `key`, in corpus order
    pub fn items_under<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a WorkItem> + 'a {
        self.items
            .iter()
            .filter(move |item| !key.is_empty() && item.parent_key == key)
    }

    /// Ticket bodies in corpus order, for index building
    pub fn bodies(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.body.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

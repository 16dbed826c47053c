//! The forest: one entry per completed session, kept in memory only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tree planted by a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestEntry {
    /// Creation order, starting at 1.
    pub id: u64,
    pub planted_at: DateTime<Utc>,
}

/// Append-only, insertion-ordered record of completed sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Forest {
    entries: Vec<ForestEntry>,
    next_id: u64,
}

impl Forest {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Plant a tree and return a copy of the new entry.
    pub(crate) fn plant(&mut self, planted_at: DateTime<Utc>) -> ForestEntry {
        // `Default` leaves next_id at 0; ids still start at 1.
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        let entry = ForestEntry { id, planted_at };
        self.entries.push(entry.clone());
        entry
    }

    pub fn entries(&self) -> &[ForestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

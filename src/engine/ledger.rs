use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Accumulated mistake counts keyed by entry identity.
///
/// Absent identities count as zero. Counts only ever grow.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MistakeLedger {
    counts: HashMap<String, u32>,
}

impl MistakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weight(&self, identity: &str) -> u32 {
        self.counts.get(identity).copied().unwrap_or(0)
    }

    /// Record one incorrect response and return the new count.
    pub fn record_miss(&mut self, identity: &str) -> u32 {
        let count = self.counts.entry(identity.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| c as u64).sum()
    }

    /// Entries ordered by descending count, ties alphabetical.
    pub fn most_missed(&self, limit: usize) -> Vec<(&str, u32)> {
        let mut rows: Vec<(&str, u32)> = self
            .counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(id, count)| (id.as_str(), *count))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows.truncate(limit);
        rows
    }
}

impl FromIterator<(String, u32)> for MistakeLedger {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

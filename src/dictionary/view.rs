use std::collections::HashSet;

use tracing::warn;

use crate::dictionary::entry::{Entry, EntryKind, Language};
use crate::engine::fuzzy;
use crate::error::EngineError;

/// Drop later entries whose identity already appeared, keeping input order.
pub fn dedupe_by_identity(entries: &[Entry]) -> Vec<Entry> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(entries.len());
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        if seen.insert(entry.identity()) {
            out.push(entry.clone());
        } else {
            warn!("{}", EngineError::DuplicateIdentity(entry.english.clone()));
        }
    }
    out
}

/// Read-only view over the dictionary, split by entry kind.
#[derive(Clone, Debug, Default)]
pub struct VocabularyView {
    entries: Vec<Entry>,
}

impl VocabularyView {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries: dedupe_by_identity(&entries),
        }
    }

    pub fn all(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn of_kind(&self, kind: EntryKind) -> Vec<Entry> {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    pub fn words(&self) -> Vec<Entry> {
        self.of_kind(EntryKind::Word)
    }

    pub fn phrases(&self) -> Vec<Entry> {
        self.of_kind(EntryKind::Phrase)
    }

    /// Fuzzy search over English and both translations. An empty query
    /// returns every entry.
    pub fn search(&self, query: &str) -> Vec<&Entry> {
        if query.trim().is_empty() {
            return self.entries.iter().collect();
        }

        let mut scored: Vec<(f64, &Entry)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let best = [
                    entry.english.as_str(),
                    entry.translation(Language::Telugu),
                    entry.translation(Language::Konkani),
                ]
                .into_iter()
                .map(|field| fuzzy::similarity(query, field))
                .fold(0.0, f64::max);
                (best >= fuzzy::SEARCH_THRESHOLD).then_some((best, entry))
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().map(|(_, entry)| entry).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VocabularyView {
        VocabularyView::new(vec![
            Entry::word("water", "neeru", "udak"),
            Entry::word("tree", "chettu", "rook"),
            Entry::phrase("good morning", "shubhodayam", "dev bore dis dium"),
            Entry::word("water", "duplicate", "duplicate"),
        ])
    }

    #[test]
    fn test_duplicates_pruned_keep_first() {
        let view = sample();
        assert_eq!(view.len(), 3);
        assert_eq!(view.all()[0].telugu, "neeru");
    }

    #[test]
    fn test_kind_filters() {
        let view = sample();
        assert_eq!(view.words().len(), 2);
        assert_eq!(view.phrases().len(), 1);
    }

    #[test]
    fn test_search_matches_translations() {
        let view = sample();
        let hits = view.search("udak");
        assert_eq!(hits.first().map(|e| e.english.as_str()), Some("water"));

        let hits = view.search("wat");
        assert_eq!(hits.first().map(|e| e.english.as_str()), Some("water"));
        assert!(!hits.iter().any(|e| e.english == "good morning"));
    }

    #[test]
    fn test_empty_search_returns_all() {
        let view = sample();
        assert_eq!(view.search("  ").len(), 3);
    }
}

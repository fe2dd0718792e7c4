//! Concurrent URL deduplication.

use dashmap::DashSet;

/// Set of URLs already claimed for crawling.
///
/// The set grows monotonically for the lifetime of a run; there is no
/// eviction. `DashSet::insert` gives the required atomic test-and-insert:
/// no second caller can observe the gap between the membership check and
/// the insertion.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: DashSet<String>,
}

impl VisitedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the URL was already present (caller discards it);
    /// otherwise inserts it and returns `false`.
    ///
    /// Callers are expected to have rejected empty/whitespace-only input
    /// before this point.
    pub fn seen_or_insert(&self, url: &str) -> bool {
        !self.urls.insert(url.to_string())
    }

    /// Number of distinct URLs claimed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_is_new_second_is_seen() {
        let visited = VisitedSet::new();
        assert!(!visited.seen_or_insert("https://example.com/"));
        assert!(visited.seen_or_insert("https://example.com/"));
        assert!(!visited.seen_or_insert("https://example.com/other"));
        assert_eq!(visited.len(), 2);
    }
}

use tracing::debug;

use crate::catalog::LatLng;

/// Selection payload stored with a history entry: identity plus viewport, never a marker reference
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPayload {
    pub slug: String,
    pub center: LatLng,
    pub zoom: f64,
}

/// A navigation record; `payload` is `None` for the page's initial entry
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub path: String,
    pub payload: Option<HistoryPayload>,
}

/// Navigation primitives the selection logic is written against
pub trait NavigationSurface {
    /// Create a new forward-navigable entry visible as `path`
    fn push_entry(&mut self, path: &str, payload: HistoryPayload);

    /// Step back; `None` when already at the first entry
    fn back(&mut self) -> Option<&HistoryEntry>;

    /// Step forward; `None` when already at the last entry
    fn forward(&mut self) -> Option<&HistoryEntry>;

    /// Path of the active entry
    fn current_path(&self) -> &str;
}

/// In-memory session history: a stack of entries with a cursor
#[derive(Debug)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl SessionHistory {
    /// Start a session whose initial entry is `initial_path` with no payload
    pub fn new(initial_path: &str) -> Self {
        Self {
            entries: vec![HistoryEntry {
                path: initial_path.to_string(),
                payload: None,
            }],
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }
}

impl NavigationSurface for SessionHistory {
    fn push_entry(&mut self, path: &str, payload: HistoryPayload) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry {
            path: path.to_string(),
            payload: Some(payload),
        });
        self.cursor = self.entries.len() - 1;
        debug!(path, depth = self.entries.len(), "pushed history entry");
    }

    fn back(&mut self) -> Option<&HistoryEntry> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    fn forward(&mut self) -> Option<&HistoryEntry> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor])
    }

    fn current_path(&self) -> &str {
        &self.current().path
    }
}

/// Which way a back/forward navigation moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    Back,
    Forward,
}

/// Translates selections into history entries and traversals back into payloads
#[derive(Debug)]
pub struct HistoryBridge<N> {
    surface: N,
}

impl<N: NavigationSurface> HistoryBridge<N> {
    pub fn new(surface: N) -> Self {
        Self { surface }
    }

    /// Record a user selection at the feature's slug
    pub fn record(&mut self, payload: HistoryPayload) {
        let path = format!("/{}", payload.slug);
        self.surface.push_entry(&path, payload);
    }

    /// Move through history; yields the reached entry, or `None` at either end
    pub fn traverse(&mut self, direction: Traversal) -> Option<HistoryEntry> {
        let entry = match direction {
            Traversal::Back => self.surface.back(),
            Traversal::Forward => self.surface.forward(),
        };
        entry.cloned()
    }

    pub fn current_path(&self) -> &str {
        self.surface.current_path()
    }

    pub fn surface(&self) -> &N {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(slug: &str) -> HistoryPayload {
        HistoryPayload {
            slug: slug.to_string(),
            center: LatLng::new(54.79, 9.43),
            zoom: 15.0,
        }
    }

    #[test]
    fn test_push_and_back() {
        let mut bridge = HistoryBridge::new(SessionHistory::new("/"));
        bridge.record(payload("a"));
        bridge.record(payload("b"));
        assert_eq!(bridge.current_path(), "/b");

        let entry = bridge.traverse(Traversal::Back).unwrap();
        assert_eq!(entry.payload, Some(payload("a")));
        let entry = bridge.traverse(Traversal::Back).unwrap();
        assert_eq!(entry.payload, None);
        assert_eq!(entry.path, "/");
        assert!(bridge.traverse(Traversal::Back).is_none());
    }

    #[test]
    fn test_same_path_twice_is_two_entries() {
        let mut history = SessionHistory::new("/");
        history.push_entry("/a", payload("a"));
        history.push_entry("/a", payload("a"));
        assert_eq!(history.len(), 3);
        assert_eq!(history.back().map(|e| e.path.clone()), Some("/a".to_string()));
    }

    #[test]
    fn test_push_truncates_forward() {
        let mut history = SessionHistory::new("/");
        history.push_entry("/a", payload("a"));
        history.push_entry("/b", payload("b"));
        history.back();
        history.push_entry("/c", payload("c"));

        assert_eq!(history.len(), 3);
        assert!(!history.can_go_forward());
        assert_eq!(history.current_path(), "/c");
    }

    #[test]
    fn test_forward_restores_payload() {
        let mut bridge = HistoryBridge::new(SessionHistory::new("/"));
        bridge.record(payload("a"));
        bridge.traverse(Traversal::Back);
        let entry = bridge.traverse(Traversal::Forward).unwrap();
        assert_eq!(entry.payload, Some(payload("a")));
        assert!(bridge.traverse(Traversal::Forward).is_none());
    }
}

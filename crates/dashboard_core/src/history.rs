//! In-memory hash history. Locations are rendered as `#/path` so the
//! dashboard keeps working when served from an arbitrary URL subpath.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            pathname: "/".to_string(),
            search: String::new(),
            hash: String::new(),
        }
    }
}

impl Location {
    pub fn parse(path: &str) -> Self {
        let (rest, hash) = match path.find('#') {
            Some(idx) => (&path[..idx], &path[idx..]),
            None => (path, ""),
        };
        let (pathname, search) = match rest.find('?') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        let pathname = if pathname.starts_with('/') {
            pathname.to_string()
        } else {
            format!("/{pathname}")
        };
        Self {
            pathname,
            search: search.to_string(),
            hash: hash.to_string(),
        }
    }

    pub fn to_path(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryAction {
    Pop,
    Push,
    Replace,
}

#[derive(Debug, Clone)]
pub struct HashHistory {
    entries: Vec<Location>,
    index: usize,
    action: HistoryAction,
}

impl Default for HashHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HashHistory {
    pub fn new() -> Self {
        Self {
            entries: vec![Location::default()],
            index: 0,
            action: HistoryAction::Pop,
        }
    }

    /// Starts from the fragment of a full href (`https://host/sub/#/catalog`)
    /// or from a bare fragment (`#/catalog`).
    pub fn from_href(href: &str) -> Self {
        let fragment = href
            .find('#')
            .map(|idx| &href[idx + 1..])
            .unwrap_or_default();
        Self {
            entries: vec![Location::parse(fragment)],
            index: 0,
            action: HistoryAction::Pop,
        }
    }

    pub fn location(&self) -> &Location {
        &self.entries[self.index]
    }

    pub fn action(&self) -> HistoryAction {
        self.action
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, path: &str) -> &Location {
        self.entries.truncate(self.index + 1);
        self.entries.push(Location::parse(path));
        self.index = self.entries.len() - 1;
        self.action = HistoryAction::Push;
        self.location()
    }

    pub fn replace(&mut self, path: &str) -> &Location {
        self.entries[self.index] = Location::parse(path);
        self.action = HistoryAction::Replace;
        self.location()
    }

    /// Moves `delta` entries. Out-of-range moves are ignored, like a browser.
    pub fn go(&mut self, delta: isize) -> bool {
        let target = self.index as isize + delta;
        if delta == 0 || target < 0 || target as usize >= self.entries.len() {
            return false;
        }
        self.index = target as usize;
        self.action = HistoryAction::Pop;
        true
    }

    pub fn back(&mut self) -> bool {
        self.go(-1)
    }

    pub fn forward(&mut self) -> bool {
        self.go(1)
    }

    pub fn create_href(&self, location: &Location) -> String {
        format!("#{}", location.to_path())
    }
}

/// Shared handle over a [`HashHistory`], held by the store and the router
/// middleware.
#[derive(Debug, Clone, Default)]
pub struct History {
    inner: Arc<Mutex<HashHistory>>,
}

impl History {
    pub fn new(history: HashHistory) -> Self {
        Self {
            inner: Arc::new(Mutex::new(history)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, HashHistory> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn location(&self) -> Location {
        self.lock().location().clone()
    }

    pub fn href(&self) -> String {
        let guard = self.lock();
        guard.create_href(guard.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_and_hash() {
        let location = Location::parse("/catalog/ns/default?filter=db#top");
        assert_eq!(location.pathname, "/catalog/ns/default");
        assert_eq!(location.search, "?filter=db");
        assert_eq!(location.hash, "#top");
        assert_eq!(location.to_path(), "/catalog/ns/default?filter=db#top");
    }

    #[test]
    fn push_truncates_forward_entries() {
        let mut history = HashHistory::new();
        history.push("/a");
        history.push("/b");
        assert!(history.back());
        history.push("/c");

        assert_eq!(history.len(), 3);
        assert_eq!(history.location().pathname, "/c");
        assert!(!history.forward());
    }

    #[test]
    fn go_ignores_out_of_range_moves() {
        let mut history = HashHistory::new();
        history.push("/a");
        assert!(!history.go(-5));
        assert!(!history.go(3));
        assert!(history.go(-1));
        assert_eq!(history.location().pathname, "/");
        assert_eq!(history.action(), HistoryAction::Pop);
    }

    #[test]
    fn hrefs_use_the_fragment() {
        let history = HashHistory::from_href("https://example.com/dashboard/#/apps/ns/x");
        assert_eq!(history.location().pathname, "/apps/ns/x");
        assert_eq!(history.create_href(history.location()), "#/apps/ns/x");

        let empty = HashHistory::from_href("https://example.com/dashboard/");
        assert_eq!(empty.location().pathname, "/");
    }

    #[test]
    fn replace_keeps_length() {
        let mut history = HashHistory::new();
        history.push("/a");
        history.replace("/b");
        assert_eq!(history.len(), 2);
        assert_eq!(history.action(), HistoryAction::Replace);
        assert_eq!(history.location().pathname, "/b");
    }
}

//! Session history abstraction
//!
//! Entries carry an opaque key. Scroll offsets are saved against that key
//! when the user leaves an entry and read back when they return to it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::scroll::ScrollPosition;

/// Opaque history entry identifier
pub type EntryKey = u64;

/// One entry of session history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub key: EntryKey,
    /// URL including any base prefix
    pub url: String,
}

/// Host history integration
///
/// All methods take `&self`; implementations use interior mutability the
/// way the browser's `History` object does.
pub trait History {
    /// Entry currently displayed
    fn current(&self) -> HistoryEntry;

    /// Append an entry after the current one, dropping forward entries
    fn push(&self, url: &str) -> HistoryEntry;

    /// Overwrite the current entry's URL, keeping its key
    fn replace(&self, url: &str) -> HistoryEntry;

    /// Move `delta` entries through history
    ///
    /// Returns the entry landed on when the move completes synchronously.
    /// Hosts with asynchronous traversal return `None` and report the entry
    /// later through `Navigator::handle_pop`.
    fn go(&self, delta: isize) -> Option<HistoryEntry>;

    /// Remember the viewport offset for an entry
    fn save_scroll(&self, key: EntryKey, position: ScrollPosition);

    /// Offset saved for an entry, if it was ever left
    fn saved_scroll(&self, key: EntryKey) -> Option<ScrollPosition>;
}

#[derive(Debug)]
struct MemoryInner {
    entries: Vec<HistoryEntry>,
    index: usize,
    next_key: EntryKey,
    scroll: HashMap<EntryKey, ScrollPosition>,
}

impl MemoryInner {
    fn allocate(&mut self, url: &str) -> HistoryEntry {
        let entry = HistoryEntry {
            key: self.next_key,
            url: url.to_string(),
        };
        self.next_key += 1;
        entry
    }
}

/// In-memory history for tests and non-browser hosts
///
/// Clones share the same stack.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryHistory {
    /// History holding a single entry for `initial`
    pub fn new(initial: &str) -> Self {
        let mut inner = MemoryInner {
            entries: Vec::new(),
            index: 0,
            next_key: 1,
            scroll: HashMap::new(),
        };
        let first = inner.allocate(initial);
        inner.entries.push(first);
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Position of the current entry
    pub fn index(&self) -> usize {
        self.inner.borrow().index
    }

    /// All entry URLs, oldest first
    pub fn urls(&self) -> Vec<String> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|e| e.url.clone())
            .collect()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn current(&self) -> HistoryEntry {
        let inner = self.inner.borrow();
        inner.entries[inner.index].clone()
    }

    fn push(&self, url: &str) -> HistoryEntry {
        let mut inner = self.inner.borrow_mut();
        let entry = inner.allocate(url);
        let keep = inner.index + 1;
        let dropped: Vec<HistoryEntry> = inner.entries.drain(keep..).collect();
        for stale in dropped {
            inner.scroll.remove(&stale.key);
        }
        inner.entries.push(entry.clone());
        inner.index = keep;
        entry
    }

    fn replace(&self, url: &str) -> HistoryEntry {
        let mut inner = self.inner.borrow_mut();
        let index = inner.index;
        let entry = &mut inner.entries[index];
        entry.url = url.to_string();
        entry.clone()
    }

    fn go(&self, delta: isize) -> Option<HistoryEntry> {
        let mut inner = self.inner.borrow_mut();
        let target = inner.index.checked_add_signed(delta)?;
        if delta == 0 || target >= inner.entries.len() {
            return None;
        }
        inner.index = target;
        Some(inner.entries[target].clone())
    }

    fn save_scroll(&self, key: EntryKey, position: ScrollPosition) {
        self.inner.borrow_mut().scroll.insert(key, position);
    }

    fn saved_scroll(&self, key: EntryKey) -> Option<ScrollPosition> {
        self.inner.borrow().scroll.get(&key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_go() {
        let history = MemoryHistory::new("/");
        history.push("/qa");
        history.push("/explain");
        assert_eq!(history.urls(), vec!["/", "/qa", "/explain"]);
        assert_eq!(history.index(), 2);

        let back = history.go(-1).unwrap();
        assert_eq!(back.url, "/qa");
        assert_eq!(history.current(), back);

        assert!(history.go(-5).is_none());
        assert!(history.go(5).is_none());
        assert!(history.go(0).is_none());
        assert_eq!(history.index(), 1);
    }

    #[test]
    fn test_push_drops_forward_entries() {
        let history = MemoryHistory::new("/");
        history.push("/qa");
        let explain = history.push("/explain");
        history.save_scroll(explain.key, ScrollPosition::new(0.0, 50.0));

        history.go(-1);
        history.push("/feedback");

        assert_eq!(history.urls(), vec!["/", "/qa", "/feedback"]);
        assert_eq!(history.saved_scroll(explain.key), None);
    }

    #[test]
    fn test_replace_keeps_key() {
        let history = MemoryHistory::new("/");
        let before = history.current();
        let after = history.replace("/signin");

        assert_eq!(before.key, after.key);
        assert_eq!(after.url, "/signin");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_keys_unique() {
        let history = MemoryHistory::new("/");
        let a = history.push("/qa");
        let b = history.push("/qa");
        assert_ne!(a.key, b.key);
        assert_eq!(history.current().key, b.key);
    }
}

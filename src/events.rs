//! Vault change notifications
//!
//! A single save usually produces both a content change and a metadata change
//! for the same file. `ChangeFilter` collapses these by remembering the content
//! hash last processed for each path.

use std::collections::HashMap;

use crate::util;

/// Change reported by the host (or the file watcher in watch mode)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    /// File content changed
    Modified(String),
    /// Cached frontmatter changed
    MetadataChanged(String),
    Renamed { from: String, to: String },
    Deleted(String),
    /// Host finished loading; rebuild everything
    LayoutReady,
}

impl VaultEvent {
    /// Path primarily affected by the event
    pub fn path(&self) -> Option<&str> {
        match self {
            VaultEvent::Modified(path) | VaultEvent::MetadataChanged(path) | VaultEvent::Deleted(path) => {
                Some(path)
            }
            VaultEvent::Renamed { to, .. } => Some(to),
            VaultEvent::LayoutReady => None,
        }
    }
}

/// Drops notifications for content that was already processed
#[derive(Debug, Default, Clone)]
pub struct ChangeFilter {
    seen: HashMap<String, String>,
}

impl ChangeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `content` of `path` differs from what was last accepted
    pub fn accept(&mut self, path: &str, content: &str) -> bool {
        let hash = util::content_hash(content);
        match self.seen.get(path) {
            Some(previous) if *previous == hash => false,
            _ => {
                self.seen.insert(path.to_string(), hash);
                true
            }
        }
    }

    /// Forget `path` (and anything below it)
    pub fn forget(&mut self, path: &str) {
        self.seen.retain(|key, _| !util::is_within(key, path));
    }

    /// Move remembered hashes after a rename
    pub fn rename(&mut self, from: &str, to: &str) {
        let moved: Vec<(String, String)> = self
            .seen
            .iter()
            .filter_map(|(key, hash)| util::rebase_path(key, from, to).map(|k| (k, hash.clone())))
            .collect();
        self.forget(from);
        self.seen.extend(moved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_notifications_collapse() {
        let mut filter = ChangeFilter::new();
        assert!(filter.accept("a.md", "one"));
        assert!(!filter.accept("a.md", "one"));
        assert!(filter.accept("a.md", "two"));
        assert!(filter.accept("b.md", "two"));
    }

    #[test]
    fn test_forget_and_rename() {
        let mut filter = ChangeFilter::new();
        filter.accept("Drafts/a.md", "x");
        filter.rename("Drafts", "Book");
        assert!(!filter.accept("Book/a.md", "x"));
        assert!(filter.accept("Drafts/a.md", "x"));

        filter.forget("Book");
        assert!(filter.accept("Book/a.md", "x"));
    }

    #[test]
    fn test_event_path() {
        assert_eq!(VaultEvent::Modified("a.md".into()).path(), Some("a.md"));
        assert_eq!(
            VaultEvent::Renamed { from: "a.md".into(), to: "b.md".into() }.path(),
            Some("b.md")
        );
        assert_eq!(VaultEvent::LayoutReady.path(), None);
    }
}

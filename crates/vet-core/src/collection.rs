//! Per-validator diagnostic collections.
//!
//! Each validator publishes into its own [`DiagnosticCollection`]: a mapping from document URI to
//! the document's current diagnostics. Writes replace the previous list wholesale; nothing is
//! merged. Subscribers are notified after every mutation, with a version number that increases
//! by one per change.

use crate::diagnostics::Diagnostic;
use std::collections::BTreeMap;

/// What happened to a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionChangeType {
    /// Diagnostics for `uri` were replaced.
    Set {
        /// The affected document.
        uri: String,
    },
    /// Diagnostics for `uri` were removed.
    Deleted {
        /// The affected document.
        uri: String,
    },
    /// Every entry was removed.
    Cleared,
}

/// A change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionChange {
    /// Name of the collection that changed.
    pub collection: String,
    /// Change type
    pub change_type: CollectionChangeType,
    /// Collection version after the change.
    pub version: u64,
}

/// Collection change callback.
pub type CollectionChangeCallback = Box<dyn FnMut(&CollectionChange) + Send>;

/// Diagnostics keyed by document URI.
pub struct DiagnosticCollection {
    name: String,
    entries: BTreeMap<String, Vec<Diagnostic>>,
    version: u64,
    callbacks: Vec<CollectionChangeCallback>,
}

impl DiagnosticCollection {
    /// Create an empty collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
            version: 0,
            callbacks: Vec::new(),
        }
    }

    /// Collection name (the validator label).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of mutations applied so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the diagnostics for `uri`.
    ///
    /// An empty list removes the entry.
    pub fn set(&mut self, uri: impl Into<String>, diagnostics: Vec<Diagnostic>) {
        let uri = uri.into();
        if diagnostics.is_empty() {
            self.delete(&uri);
            return;
        }

        self.entries.insert(uri.clone(), diagnostics);
        self.notify(CollectionChangeType::Set { uri });
    }

    /// Remove the diagnostics for `uri`. No-op when the document has none.
    pub fn delete(&mut self, uri: &str) {
        if self.entries.remove(uri).is_some() {
            self.notify(CollectionChangeType::Deleted {
                uri: uri.to_string(),
            });
        }
    }

    /// Remove every entry. No-op when already empty.
    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.notify(CollectionChangeType::Cleared);
    }

    /// Current diagnostics for `uri` (empty when none).
    pub fn get(&self, uri: &str) -> &[Diagnostic] {
        self.entries.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `uri` has an entry.
    pub fn has(&self, uri: &str) -> bool {
        self.entries.contains_key(uri)
    }

    /// Number of documents with diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no document has diagnostics.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(uri, diagnostics)` in URI order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Diagnostic])> {
        self.entries
            .iter()
            .map(|(uri, diagnostics)| (uri.as_str(), diagnostics.as_slice()))
    }

    /// Subscribe to collection changes.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&CollectionChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    fn notify(&mut self, change_type: CollectionChangeType) {
        self.version += 1;
        let change = CollectionChange {
            collection: self.name.clone(),
            change_type,
            version: self.version,
        };
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }
}

impl std::fmt::Debug for DiagnosticCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticCollection")
            .field("name", &self.name)
            .field("entries", &self.entries)
            .field("version", &self.version)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{Position, TextRange};
    use std::sync::{Arc, Mutex};

    fn diag(message: &str) -> Diagnostic {
        let range = TextRange::empty(Position::new(0, 0));
        Diagnostic::error("file:///a.cue", range, "unit-test", message)
    }

    #[test]
    fn test_set_replaces_previous_entry() {
        let mut collection = DiagnosticCollection::new("unit-test");
        collection.set("file:///a.cue", vec![diag("first")]);
        collection.set("file:///a.cue", vec![diag("second")]);

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get("file:///a.cue").len(), 1);
        assert_eq!(collection.get("file:///a.cue")[0].message, "second");
    }

    #[test]
    fn test_delete_and_clear_are_noops_when_empty() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let mut collection = DiagnosticCollection::new("unit-test");
        collection.subscribe(move |change| {
            seen_clone.lock().unwrap().push(change.change_type.clone());
        });

        collection.delete("file:///a.cue");
        collection.clear();
        assert_eq!(collection.version(), 0);

        collection.set("file:///a.cue", vec![diag("x")]);
        collection.set("file:///b.cue", Vec::new());
        collection.delete("file:///a.cue");

        assert_eq!(collection.version(), 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                CollectionChangeType::Set {
                    uri: "file:///a.cue".to_string()
                },
                CollectionChangeType::Deleted {
                    uri: "file:///a.cue".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_get_missing_is_empty() {
        let collection = DiagnosticCollection::new("unit-test");
        assert!(collection.get("file:///nope.cue").is_empty());
        assert!(!collection.has("file:///nope.cue"));
    }
}

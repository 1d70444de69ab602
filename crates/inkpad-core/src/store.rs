//! Document store - owns the current document and its undo history.
//!
//! Every content change from the editing surface goes through
//! [`DocumentStore::update_document`]. Calls that make no sense in the current
//! state (no open document, undo at the oldest snapshot, unknown ids) are
//! silent no-ops, so toolbar-style triggers can invoke them unconditionally.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::document::{DEFAULT_TITLE, Document, DocumentId};
use crate::history::HistoryStack;
use crate::sink::{DocumentSink, LogSink};

/// The current document, its history, and the library of known documents
pub struct DocumentStore {
    /// All known documents (the current one included, possibly stale)
    documents: Vec<Document>,
    /// Document being edited
    current: Option<Document>,
    /// Whether the current content differs from what was last saved
    has_unsaved_changes: bool,
    /// Library documents switched away from with unsaved edits
    unsaved: HashSet<DocumentId>,
    /// Keystroke-level undo history for the current document
    history: HistoryStack,
    /// Where saved documents go
    sink: Box<dyn DocumentSink + Send>,
    /// Title for newly created documents
    default_title: String,
}

impl DocumentStore {
    /// Create an empty store that logs saved documents
    pub fn new() -> Self {
        Self::with_sink(LogSink)
    }

    /// Create an empty store that hands saved documents to `sink`
    pub fn with_sink(sink: impl DocumentSink + Send + 'static) -> Self {
        Self {
            documents: Vec::new(),
            current: None,
            has_unsaved_changes: false,
            unsaved: HashSet::new(),
            history: HistoryStack::new(),
            sink: Box::new(sink),
            default_title: DEFAULT_TITLE.to_string(),
        }
    }

    /// Cap the undo history depth (unbounded by default)
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history = HistoryStack::with_limit(limit);
        self
    }

    /// Title used by `create_document`
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Add previously persisted documents to the library
    pub fn load_documents(&mut self, docs: impl IntoIterator<Item = Document>) {
        for doc in docs {
            self.upsert(doc);
        }
    }

    // --- Accessors ---

    pub fn current_document(&self) -> Option<&Document> {
        self.current.as_ref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    /// Ids of every document holding edits that were never saved, the
    /// current one included
    pub fn unsaved_documents(&self) -> Vec<DocumentId> {
        self.documents()
            .into_iter()
            .map(Document::id)
            .filter(|id| self.is_unsaved(*id))
            .collect()
    }

    fn is_unsaved(&self, id: DocumentId) -> bool {
        match &self.current {
            Some(current) if current.id() == id => self.has_unsaved_changes,
            _ => self.unsaved.contains(&id),
        }
    }

    /// Content snapshots of the current document, oldest first
    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    /// History cursor, `None` when there is no history
    pub fn current_index(&self) -> Option<usize> {
        self.history.current_index()
    }

    pub fn can_undo(&self) -> bool {
        self.current.is_some() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.current.is_some() && self.history.can_redo()
    }

    /// All known documents, with the live current document in place of its entry
    pub fn documents(&self) -> Vec<&Document> {
        self.documents
            .iter()
            .map(|doc| match &self.current {
                Some(current) if current.id() == doc.id() => current,
                _ => doc,
            })
            .collect()
    }

    /// Look up a known document by id
    pub fn get_document(&self, id: DocumentId) -> Option<&Document> {
        match &self.current {
            Some(current) if current.id() == id => Some(current),
            _ => self.documents.iter().find(|d| d.id() == id),
        }
    }

    // --- Lifecycle ---

    /// Start a fresh, empty document and make it current
    pub fn create_document(&mut self) -> DocumentId {
        self.stash_current();

        let doc = Document::with_title(self.default_title.clone());
        let id = doc.id();
        self.documents.push(doc.clone());
        self.current = Some(doc);
        self.history.reset("");
        self.has_unsaved_changes = false;

        debug!(%id, "created document");
        id
    }

    /// Record new content from the editing surface
    pub fn update_document(&mut self, content: impl Into<String>) {
        let Some(doc) = self.current.as_mut() else {
            return;
        };
        let content = content.into();

        doc.set_content(content.clone());
        self.history.push(content);
        self.has_unsaved_changes = true;
    }

    /// Hand the current document to the sink and mark it clean
    pub fn save_document(&mut self) {
        let Some(doc) = self.current.clone() else {
            return;
        };

        if let Err(e) = self.sink.persist(&doc) {
            warn!(id = %doc.id(), error = %e, "failed to persist document");
        }
        self.unsaved.remove(&doc.id());
        self.upsert(doc);
        self.has_unsaved_changes = false;
    }

    /// Step back to the previous snapshot
    pub fn undo(&mut self) {
        let Some(doc) = self.current.as_mut() else {
            return;
        };
        if let Some(content) = self.history.undo() {
            doc.set_content(content);
            self.has_unsaved_changes = true;
        }
    }

    /// Step forward to the next snapshot
    pub fn redo(&mut self) {
        let Some(doc) = self.current.as_mut() else {
            return;
        };
        if let Some(content) = self.history.redo() {
            doc.set_content(content);
            self.has_unsaved_changes = true;
        }
    }

    // --- Library ---

    /// Make a known document current, starting a fresh history for it.
    ///
    /// The document comes back dirty if it was left with unsaved edits.
    pub fn select_document(&mut self, id: DocumentId) {
        if self.current.as_ref().is_some_and(|d| d.id() == id) {
            return;
        }
        let Some(doc) = self.documents.iter().find(|d| d.id() == id).cloned() else {
            return;
        };

        self.stash_current();

        self.history.reset(doc.content().to_string());
        self.current = Some(doc);
        self.has_unsaved_changes = self.unsaved.remove(&id);
    }

    /// Give a document a new title; blank titles are ignored
    pub fn rename_document(&mut self, id: DocumentId, title: &str) {
        let title = title.trim();
        if title.is_empty() {
            return;
        }

        let mut found = false;
        if let Some(current) = self.current.as_mut().filter(|d| d.id() == id) {
            current.set_title(title);
            found = true;
        }
        if let Some(doc) = self.documents.iter_mut().find(|d| d.id() == id) {
            doc.set_title(title);
            found = true;
        }
        if found {
            debug!(%id, title, "renamed document");
        }
    }

    /// Forget a document; deleting the current one closes it
    pub fn delete_document(&mut self, id: DocumentId) {
        if self.get_document(id).is_none() {
            return;
        }
        self.documents.retain(|d| d.id() != id);
        self.unsaved.remove(&id);
        if let Err(e) = self.sink.forget(id) {
            warn!(%id, error = %e, "failed to remove persisted document");
        }

        if self.current.as_ref().is_some_and(|d| d.id() == id) {
            self.current = None;
            self.history.clear();
            self.has_unsaved_changes = false;
            debug!(%id, "deleted current document");
        }
    }

    /// Write the live current document back into the library, remembering
    /// whether it still needs saving
    fn stash_current(&mut self) {
        if let Some(doc) = self.current.take() {
            if self.has_unsaved_changes {
                debug!(id = %doc.id(), "switching away from a document with unsaved changes");
                self.unsaved.insert(doc.id());
            }
            self.upsert(doc);
        }
        self.has_unsaved_changes = false;
    }

    fn upsert(&mut self, doc: Document) {
        match self.documents.iter_mut().find(|d| d.id() == doc.id()) {
            Some(slot) => *slot = doc,
            None => self.documents.push(doc),
        }
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

//! Persistence seam for saved documents.

use anyhow::Result;

use crate::document::{Document, DocumentId};

/// Receives documents handed over by `DocumentStore::save_document`.
///
/// Saving is fire-and-forget from the store's point of view: an error is
/// logged by the caller and never rolls back in-memory state.
pub trait DocumentSink {
    fn persist(&mut self, doc: &Document) -> Result<()>;

    /// Drop whatever was persisted for a deleted document
    fn forget(&mut self, _id: DocumentId) -> Result<()> {
        Ok(())
    }
}

/// Sink that only logs what it was given
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DocumentSink for LogSink {
    fn persist(&mut self, doc: &Document) -> Result<()> {
        tracing::info!(
            id = %doc.id(),
            title = %doc.title(),
            bytes = doc.content().len(),
            "document saved"
        );
        Ok(())
    }
}

impl<S: DocumentSink + ?Sized> DocumentSink for Box<S> {
    fn persist(&mut self, doc: &Document) -> Result<()> {
        (**self).persist(doc)
    }

    fn forget(&mut self, id: DocumentId) -> Result<()> {
        (**self).forget(id)
    }
}

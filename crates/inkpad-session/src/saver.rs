//! Background document saving.
//!
//! Saves are handed to a dedicated thread running a small tokio runtime, so
//! `DocumentStore::save_document` never waits on the disk. Results come back
//! as [`SaveEvent`]s the caller can poll.

use std::sync::mpsc as std_mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Result, anyhow};
use inkpad_core::{Document, DocumentId, DocumentSink};
use tokio::sync::mpsc as tokio_mpsc;

/// Commands from the main thread to the save thread
#[derive(Debug)]
pub enum SaveCommand {
    /// Persist this snapshot of a document
    Persist(Document),
    /// Remove a deleted document
    Forget(DocumentId),
    /// Finish queued saves and stop
    Shutdown,
}

/// Events from the save thread to the main thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveEvent {
    Saved { id: DocumentId },
    Removed { id: DocumentId },
    Failed { id: DocumentId, error: String },
}

/// Cheap handle that queues documents for the save thread
#[derive(Debug, Clone)]
pub struct SaveSender {
    command_tx: tokio_mpsc::UnboundedSender<SaveCommand>,
}

impl DocumentSink for SaveSender {
    fn persist(&mut self, doc: &Document) -> Result<()> {
        self.command_tx
            .send(SaveCommand::Persist(doc.clone()))
            .map_err(|_| anyhow!("save thread has stopped"))
    }

    fn forget(&mut self, id: DocumentId) -> Result<()> {
        self.command_tx
            .send(SaveCommand::Forget(id))
            .map_err(|_| anyhow!("save thread has stopped"))
    }
}

/// Owner of the save thread; dropping it flushes pending saves
pub struct SaveHandle {
    command_tx: tokio_mpsc::UnboundedSender<SaveCommand>,
    event_rx: std_mpsc::Receiver<SaveEvent>,
    thread: Option<JoinHandle<()>>,
}

impl SaveHandle {
    /// A sink that feeds this save thread
    pub fn sender(&self) -> SaveSender {
        SaveSender {
            command_tx: self.command_tx.clone(),
        }
    }

    /// Non-blocking check for save events
    pub fn poll_event(&self) -> Option<SaveEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next save event
    pub fn wait_event(&self, timeout: Duration) -> Option<SaveEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Flush queued saves and stop the thread
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.command_tx.send(SaveCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("save thread panicked");
            }
        }
    }
}

impl Drop for SaveHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start the save thread writing through `sink`
pub fn start_save_thread<S>(sink: S) -> SaveHandle
where
    S: DocumentSink + Send + 'static,
{
    let (command_tx, command_rx) = tokio_mpsc::unbounded_channel();
    let (event_tx, event_rx) = std_mpsc::channel();

    let thread = thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("Failed to create tokio runtime");

        rt.block_on(run_saver(sink, command_rx, event_tx));
    });

    SaveHandle {
        command_tx,
        event_rx,
        thread: Some(thread),
    }
}

/// Main save loop
async fn run_saver<S: DocumentSink>(
    mut sink: S,
    mut command_rx: tokio_mpsc::UnboundedReceiver<SaveCommand>,
    event_tx: std_mpsc::Sender<SaveEvent>,
) {
    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            SaveCommand::Persist(doc) => {
                let id = doc.id();
                let event = match sink.persist(&doc) {
                    Ok(()) => SaveEvent::Saved { id },
                    Err(e) => failed(id, e),
                };
                // Nobody listening is fine
                let _ = event_tx.send(event);
            }
            SaveCommand::Forget(id) => {
                let event = match sink.forget(id) {
                    Ok(()) => SaveEvent::Removed { id },
                    Err(e) => failed(id, e),
                };
                let _ = event_tx.send(event);
            }
            SaveCommand::Shutdown => break,
        }
    }
    tracing::debug!("save thread stopped");
}

fn failed(id: DocumentId, e: anyhow::Error) -> SaveEvent {
    tracing::warn!(%id, error = %e, "background save failed");
    SaveEvent::Failed {
        id,
        error: format!("{e:#}"),
    }
}

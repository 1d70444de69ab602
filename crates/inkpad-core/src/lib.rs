//! Core document model for inkpad.
//!
//! - [`DocumentStore`]: current document, linear undo/redo, document library
//! - [`VersionHistory`]: bounded log of named snapshots with line diffs
//! - [`DocumentSink`]: where saved documents are handed off

pub mod document;
pub mod history;
pub mod sink;
pub mod store;
pub mod versions;

pub use document::{DEFAULT_TITLE, Document, DocumentId};
pub use history::HistoryStack;
pub use sink::{DocumentSink, LogSink};
pub use store::DocumentStore;
pub use versions::{
    DEFAULT_DESCRIPTION, DEFAULT_MAX_VERSIONS, DocumentVersion, LineDiff, VersionHistory,
    VersionId, diff_html, diff_lines, escape_html,
};

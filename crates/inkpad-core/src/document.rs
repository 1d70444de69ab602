//! The document model.
//!
//! Content is an opaque string produced and consumed by the editing surface;
//! nothing in this crate parses it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to freshly created documents
pub const DEFAULT_TITLE: &str = "Untitled document";

/// Unique identifier for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the hyphenated form produced by `Display`
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single editable document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Document {
    /// Create an empty document with the default title
    pub fn new() -> Self {
        Self::with_title(DEFAULT_TITLE)
    }

    /// Create an empty document with the given title
    pub fn with_title(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::new(),
            title: title.into(),
            content: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the content and bump the modification time
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.touch();
    }

    /// Replace the title and bump the modification time
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    fn touch(&mut self) {
        // Never move backwards, even if the wall clock does
        self.updated_at = Utc::now().max(self.updated_at);
    }

    /// Pretend the document was created and last modified `age` ago
    #[cfg(test)]
    pub(crate) fn backdate(&mut self, age: chrono::TimeDelta) {
        self.created_at -= age;
        self.updated_at -= age;
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

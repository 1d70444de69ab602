//! Bounded log of named document snapshots, separate from undo history.
//!
//! Versions are coarse-grained checkpoints (explicit snapshots or periodic
//! auto-saves). The log keeps at most `max_versions` entries and evicts the
//! oldest first.

use std::collections::{HashSet, VecDeque};
use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default capacity of a version log
pub const DEFAULT_MAX_VERSIONS: usize = 50;

/// Description used when none is given
pub const DEFAULT_DESCRIPTION: &str = "Auto-save";

/// Unique identifier for a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionId(pub Uuid);

impl VersionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl Default for VersionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A full content snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub id: VersionId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

/// Lines added and removed between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl LineDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Version log with FIFO eviction
#[derive(Debug, Clone)]
pub struct VersionHistory {
    versions: VecDeque<DocumentVersion>,
    max_versions: usize,
}

impl VersionHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_VERSIONS)
    }

    /// Create a log holding at most `max_versions` entries (at least one)
    pub fn with_capacity(max_versions: usize) -> Self {
        let max_versions = max_versions.max(1);
        Self {
            versions: VecDeque::with_capacity(max_versions),
            max_versions,
        }
    }

    /// Record a snapshot labelled "Auto-save"
    pub fn add_version(&mut self, content: impl Into<String>) -> VersionId {
        self.add_version_with_description(content, DEFAULT_DESCRIPTION)
    }

    /// Record a snapshot with a custom label
    pub fn add_version_with_description(
        &mut self,
        content: impl Into<String>,
        description: impl Into<String>,
    ) -> VersionId {
        let id = VersionId::new();
        self.versions.push_back(DocumentVersion {
            id,
            content: content.into(),
            timestamp: Utc::now(),
            description: description.into(),
        });

        while self.versions.len() > self.max_versions {
            if let Some(evicted) = self.versions.pop_front() {
                tracing::debug!(id = %evicted.id, "evicted oldest version");
            }
        }
        id
    }

    /// All versions, most recent first
    pub fn versions(&self) -> Vec<DocumentVersion> {
        self.versions.iter().rev().cloned().collect()
    }

    pub fn get_version(&self, id: VersionId) -> Option<&DocumentVersion> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Content of a version, for the caller to feed back into the store
    pub fn restore_version(&self, id: VersionId) -> Option<String> {
        self.get_version(id).map(|v| v.content.clone())
    }

    /// Line diff between two snapshots (see [`diff_lines`])
    pub fn compare_versions(&self, old_content: &str, new_content: &str) -> LineDiff {
        diff_lines(old_content, new_content)
    }

    /// Line diff rendered as marked-up HTML (see [`diff_html`])
    pub fn diff_html(&self, old_content: &str, new_content: &str) -> String {
        diff_html(old_content, new_content)
    }

    pub fn clear(&mut self) {
        self.versions.clear();
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn max_versions(&self) -> usize {
        self.max_versions
    }
}

impl Default for VersionHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Presence-based line diff.
///
/// A non-blank old line is removed if it appears nowhere in the new content,
/// and a non-blank new line is added if it appears nowhere in the old content.
/// Position is ignored: moved or reordered lines produce no output, and
/// duplicates are matched by text alone.
pub fn diff_lines(old_content: &str, new_content: &str) -> LineDiff {
    let old_lines: Vec<&str> = old_content.split('\n').collect();
    let new_lines: Vec<&str> = new_content.split('\n').collect();
    let old_set: HashSet<&str> = old_lines.iter().copied().collect();
    let new_set: HashSet<&str> = new_lines.iter().copied().collect();

    let missing_from = |lines: &[&str], other: &HashSet<&str>| -> Vec<String> {
        lines
            .iter()
            .filter(|line| !is_blank(line) && !other.contains(*line))
            .map(|line| line.to_string())
            .collect()
    };

    LineDiff {
        removed: missing_from(&old_lines, &new_set),
        added: missing_from(&new_lines, &old_set),
    }
}

/// Blank by the web platform's whitespace rules: Unicode White_Space plus the
/// byte order mark, but not NEL (U+0085)
fn is_blank(line: &str) -> bool {
    line.chars()
        .all(|c| c == '\u{feff}' || (c != '\u{85}' && c.is_whitespace()))
}

/// Render [`diff_lines`] as one `<div>` per line, removals first
pub fn diff_html(old_content: &str, new_content: &str) -> String {
    let diff = diff_lines(old_content, new_content);
    let mut html = String::new();

    for line in &diff.removed {
        let _ = write!(
            html,
            r#"<div style="background: #fee; padding: 2px 4px; margin: 2px 0;">- {}</div>"#,
            escape_html(line)
        );
    }
    for line in &diff.added {
        let _ = write!(
            html,
            r#"<div style="background: #dfd; padding: 2px 4px; margin: 2px 0;">+ {}</div>"#,
            escape_html(line)
        );
    }
    html
}

/// Escape text for use as HTML element content
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

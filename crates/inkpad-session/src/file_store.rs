//! Documents persisted as one pretty-printed JSON file each.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use inkpad_core::{Document, DocumentId, DocumentSink};

/// Directory-backed document storage
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a document's file
    pub fn path_for(&self, id: DocumentId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Write a document, replacing any previous copy
    pub fn save(&self, doc: &Document) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;

        // Write to a sibling file first so a crash never leaves half a document
        let path = self.path_for(doc.id());
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(doc)?;
        fs::write(&tmp, content).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }

    /// Load a single document
    pub fn load(&self, id: DocumentId) -> Result<Document> {
        let path = self.path_for(id);
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let doc = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(doc)
    }

    /// Load every document in the directory, oldest first.
    ///
    /// Files that fail to parse are skipped with a warning.
    pub fn load_all(&self) -> Result<Vec<Document>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut docs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|e| e != "json") {
                continue;
            }
            match fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|s| serde_json::from_str::<Document>(&s).map_err(Into::into))
            {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable document");
                }
            }
        }

        docs.sort_by_key(|d| d.created_at());
        Ok(docs)
    }

    /// Delete a document's file; missing files are not an error
    pub fn remove(&self, id: DocumentId) -> Result<()> {
        let path = self.path_for(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
        }
    }
}

impl DocumentSink for JsonFileStore {
    fn persist(&mut self, doc: &Document) -> Result<()> {
        self.save(doc)?;
        tracing::info!(id = %doc.id(), path = %self.path_for(doc.id()).display(), "document saved");
        Ok(())
    }

    fn forget(&mut self, id: DocumentId) -> Result<()> {
        self.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, content: &str) -> Document {
        let mut doc = Document::with_title(title);
        doc.set_content(content);
        doc
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("docs"));
        let saved = doc("Notes", "<p>hello</p>");

        store.save(&saved).unwrap();
        assert_eq!(store.load(saved.id()).unwrap(), saved);
    }

    #[test]
    fn load_all_skips_garbage_and_sorts_by_creation() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let first = doc("first", "1");
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = doc("second", "2");
        store.save(&second).unwrap();
        store.save(&first).unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();
        fs::write(dir.path().join("readme.txt"), "ignored").unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, vec![first, second]);
    }

    #[test]
    fn load_all_of_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let d = doc("gone", "");
        store.save(&d).unwrap();

        store.remove(d.id()).unwrap();
        store.remove(d.id()).unwrap();
        assert!(store.load(d.id()).is_err());
    }

    #[test]
    fn persist_goes_through_the_sink_trait() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonFileStore::new(dir.path());
        let d = doc("sink", "<p>via sink</p>");

        sink.persist(&d).unwrap();
        assert_eq!(sink.load(d.id()).unwrap().content(), "<p>via sink</p>");
    }
}

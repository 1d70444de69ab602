use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use inkpad_core::{Document, DocumentId, DocumentStore, VersionHistory, VersionId};
use inkpad_export::{
    ExportFormat, ImportFormat, export_document, extract_text, import_content, sanitize_html, stats,
    write_export,
};
use inkpad_session::{Config, JsonFileStore, SaveEvent, SaveHandle, start_save_thread};

pub const HELP: &str = "\
commands:
  new                   start a new document
  list                  list documents (* marks the open one)
  open <n|id>           open a document from the list
  title <text>          rename the open document
  set <text>            replace the content (\\n starts a new line)
  append <text>         add a line to the content
  import <file>         replace the content with a .html, .md or text file
  show                  print the content
  text                  print the content as plain text
  stats                 count words, characters and paragraphs
  sanitize              strip <script> and <style> elements
  undo | redo           step through edit history
  save                  save the open document
  snapshot [label]      record a named version
  versions              list recorded versions, newest first
  restore <n|id>        bring back a version's content
  diff <n|id>           compare a version with the current content
  export <html|md> [dir]  write the document to a file
  delete [n|id]         delete a document (default: the open one)
  quit                  leave";

/// Interactive editing session
pub struct App {
    pub store: DocumentStore,
    /// Version log per document, created on first use
    versions: HashMap<DocumentId, VersionHistory>,
    config: Config,
    saver: SaveHandle,
    /// Content edits since the last automatic version
    edits_since_snapshot: usize,
    pub running: bool,
}

impl App {
    /// Open a session over the documents in `config.data_dir`
    pub fn new(config: Config) -> Result<Self> {
        let files = JsonFileStore::new(&config.data_dir);
        let existing = files
            .load_all()
            .with_context(|| format!("loading documents from {}", config.data_dir.display()))?;

        let saver = start_save_thread(files);
        let mut store = DocumentStore::with_sink(saver.sender())
            .with_history_limit(config.history_limit)
            .with_default_title(config.default_title.clone());
        store.load_documents(existing);

        Ok(Self {
            store,
            versions: HashMap::new(),
            config,
            saver,
            edits_since_snapshot: 0,
            running: true,
        })
    }

    /// Run one command line, returning what to print
    pub fn execute(&mut self, line: &str) -> Result<String> {
        let line = line.trim();
        let (cmd, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();

        match cmd {
            "" => Ok(String::new()),
            "help" | "?" => Ok(HELP.to_string()),
            "new" => {
                let id = self.store.create_document();
                self.edits_since_snapshot = 0;
                Ok(format!("created {id}"))
            }
            "list" => Ok(self.list()),
            "open" => {
                let id = self.resolve_document(arg)?;
                self.store.select_document(id);
                self.edits_since_snapshot = 0;
                Ok(format!("opened {}", self.current()?.title()))
            }
            "title" => {
                let id = self.current()?.id();
                if arg.is_empty() {
                    bail!("usage: title <text>");
                }
                self.store.rename_document(id, arg);
                Ok(format!("renamed to {}", self.current()?.title()))
            }
            "set" => {
                self.current()?;
                self.edit(arg.replace("\\n", "\n"));
                Ok(self.status())
            }
            "append" => {
                let content = self.current()?.content();
                let content = if content.is_empty() {
                    arg.to_string()
                } else {
                    format!("{content}\n{arg}")
                };
                self.edit(content);
                Ok(self.status())
            }
            "import" => {
                self.current()?;
                if arg.is_empty() {
                    bail!("usage: import <file>");
                }
                let path = Path::new(arg);
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                self.edit(import_content(&text, ImportFormat::from_path(path)));
                Ok(self.status())
            }
            "show" => Ok(self.current()?.content().to_string()),
            "text" => Ok(extract_text(self.current()?.content())),
            "stats" => Ok(stats(self.current()?.content()).to_string()),
            "sanitize" => {
                let content = sanitize_html(self.current()?.content());
                if content != self.current()?.content() {
                    self.edit(content);
                }
                Ok(self.status())
            }
            "undo" => {
                self.store.undo();
                Ok(self.status())
            }
            "redo" => {
                self.store.redo();
                Ok(self.status())
            }
            "save" => {
                self.current()?;
                self.store.save_document();
                Ok("saving".to_string())
            }
            "snapshot" => {
                let doc = self.current()?;
                let (id, content) = (doc.id(), doc.content().to_string());
                let label = if arg.is_empty() { "Snapshot" } else { arg };
                let version = self
                    .versions_for(id)
                    .add_version_with_description(content, label);
                Ok(format!("recorded version {version}"))
            }
            "versions" => self.list_versions(),
            "restore" => {
                let version = self.resolve_version(arg)?;
                let id = self.current()?.id();
                let content = self
                    .versions_for(id)
                    .restore_version(version)
                    .ok_or_else(|| anyhow!("version {version} is gone"))?;
                self.edit(content);
                Ok(self.status())
            }
            "diff" => {
                let version = self.resolve_version(arg)?;
                let doc = self.current()?;
                let id = doc.id();
                let current = doc.content().to_string();
                let versions = self.versions_for(id);
                let old = versions
                    .get_version(version)
                    .ok_or_else(|| anyhow!("version {version} is gone"))?;
                let diff = versions.compare_versions(&old.content, &current);
                if diff.is_empty() {
                    return Ok("no changes".to_string());
                }
                let mut out: Vec<String> = diff.removed.iter().map(|l| format!("- {l}")).collect();
                out.extend(diff.added.iter().map(|l| format!("+ {l}")));
                Ok(out.join("\n"))
            }
            "export" => {
                let (format, dir) = arg.split_once(' ').unwrap_or((arg, "."));
                let format = parse_export_format(format)?;
                let exported = export_document(self.current()?, format);
                let path = write_export(Path::new(dir.trim()), &exported)?;
                Ok(format!("wrote {}", path.display()))
            }
            "delete" => {
                let id = if arg.is_empty() {
                    self.current()?.id()
                } else {
                    self.resolve_document(arg)?
                };
                self.store.delete_document(id);
                self.versions.remove(&id);
                Ok(format!("deleted {id}"))
            }
            "quit" | "exit" => {
                self.running = false;
                Ok(String::new())
            }
            other => Err(anyhow!("unknown command `{other}` (try `help`)")),
        }
    }

    /// Describe save results that arrived since the last call
    pub fn drain_save_events(&self) -> Vec<String> {
        std::iter::from_fn(|| self.saver.poll_event())
            .map(|event| match event {
                SaveEvent::Saved { id } => format!("saved {id}"),
                SaveEvent::Removed { id } => format!("removed {id} from disk"),
                SaveEvent::Failed { id, error } => format!("could not save {id}: {error}"),
            })
            .collect()
    }

    /// Titles of documents with edits that were never saved
    pub fn unsaved_titles(&self) -> Vec<String> {
        self.store
            .unsaved_documents()
            .into_iter()
            .filter_map(|id| self.store.get_document(id))
            .map(|doc| doc.title().to_string())
            .collect()
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Finish pending saves
    pub fn shutdown(self) {
        self.saver.shutdown();
    }

    fn current(&self) -> Result<&Document> {
        self.store
            .current_document()
            .ok_or_else(|| anyhow!("no document open (use `new` or `open`)"))
    }

    /// Apply new content and take an automatic version when due
    fn edit(&mut self, content: String) {
        self.store.update_document(content);
        self.edits_since_snapshot += 1;

        let every = self.config.autosnapshot_every;
        if every > 0 && self.edits_since_snapshot >= every {
            if let Some(doc) = self.store.current_document() {
                let (id, content) = (doc.id(), doc.content().to_string());
                self.versions_for(id).add_version(content);
            }
            self.edits_since_snapshot = 0;
        }
    }

    fn versions_for(&mut self, id: DocumentId) -> &mut VersionHistory {
        let max = self.config.max_versions;
        self.versions
            .entry(id)
            .or_insert_with(|| VersionHistory::with_capacity(max))
    }

    fn status(&self) -> String {
        match self.store.current_document() {
            Some(doc) => format!(
                "{} | {} bytes | {}/{}{}",
                doc.title(),
                doc.content().len(),
                self.store.current_index().map_or(0, |i| i + 1),
                self.store.history().len(),
                if self.store.has_unsaved_changes() { " | modified" } else { "" },
            ),
            None => "no document open".to_string(),
        }
    }

    fn list(&self) -> String {
        let current = self.store.current_document().map(|d| d.id());
        let docs = self.store.documents();
        if docs.is_empty() {
            return "no documents".to_string();
        }
        docs.iter()
            .enumerate()
            .map(|(i, doc)| {
                format!(
                    "{}{:>3}. {}  {}  {}",
                    if Some(doc.id()) == current { "*" } else { " " },
                    i + 1,
                    doc.title(),
                    doc.updated_at().format("%Y-%m-%d %H:%M"),
                    doc.id()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn list_versions(&mut self) -> Result<String> {
        let id = self.current()?.id();
        let versions = self.versions_for(id).versions();
        if versions.is_empty() {
            return Ok("no versions yet".to_string());
        }
        Ok(versions
            .iter()
            .enumerate()
            .map(|(i, v)| {
                format!(
                    "{:>3}. {}  {}  {}",
                    i + 1,
                    v.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    v.description,
                    v.id
                )
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Accept a 1-based position from `list` or a full id
    fn resolve_document(&self, arg: &str) -> Result<DocumentId> {
        let docs = self.store.documents();
        if let Ok(n) = arg.parse::<usize>() {
            return docs
                .get(n.wrapping_sub(1))
                .map(|d| d.id())
                .ok_or_else(|| anyhow!("no document number {n}"));
        }
        DocumentId::parse(arg)
            .filter(|id| docs.iter().any(|d| d.id() == *id))
            .ok_or_else(|| anyhow!("no document `{arg}`"))
    }

    /// Accept a 1-based position from `versions` or a full id
    fn resolve_version(&mut self, arg: &str) -> Result<VersionId> {
        let id = self.current()?.id();
        if let Ok(n) = arg.parse::<usize>() {
            return self
                .versions_for(id)
                .versions()
                .get(n.wrapping_sub(1))
                .map(|v| v.id)
                .ok_or_else(|| anyhow!("no version number {n}"));
        }
        VersionId::parse(arg).ok_or_else(|| anyhow!("usage: restore|diff <n|id>"))
    }
}

pub fn parse_export_format(s: &str) -> Result<ExportFormat> {
    match s.trim().to_ascii_lowercase().as_str() {
        "html" | "htm" => Ok(ExportFormat::Html),
        "md" | "markdown" => Ok(ExportFormat::Markdown),
        other => Err(anyhow!("unknown export format `{other}` (html or md)")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn app(dir: &Path) -> App {
        let config = Config {
            data_dir: dir.join("docs"),
            autosnapshot_every: 2,
            ..Config::default()
        };
        App::new(config).unwrap()
    }

    fn wait_for_save(app: &App) -> Vec<String> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let events = app.drain_save_events();
            if !events.is_empty() || Instant::now() > deadline {
                return events;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn edit_undo_redo_through_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());

        app.execute("new").unwrap();
        app.execute("set <p>one</p>").unwrap();
        app.execute("append <p>two</p>").unwrap();
        assert_eq!(app.execute("show").unwrap(), "<p>one</p>\n<p>two</p>");

        app.execute("undo").unwrap();
        assert_eq!(app.execute("show").unwrap(), "<p>one</p>");
        app.execute("redo").unwrap();
        assert_eq!(app.execute("show").unwrap(), "<p>one</p>\n<p>two</p>");
    }

    #[test]
    fn commands_needing_a_document_explain_themselves() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());

        assert!(app.execute("show").is_err());
        assert!(app.execute("set x").is_err());
        assert_eq!(app.execute("undo").unwrap(), "no document open");
        assert!(app.execute("frobnicate").is_err());
    }

    #[test]
    fn saved_documents_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = app(dir.path());
        first.execute("new").unwrap();
        first.execute("title Shopping").unwrap();
        first.execute("set <p>eggs</p>").unwrap();
        first.execute("save").unwrap();
        let events = wait_for_save(&first);
        assert!(events[0].starts_with("saved "));
        first.shutdown();

        let mut second = app(dir.path());
        assert!(second.execute("list").unwrap().contains("Shopping"));
        second.execute("open 1").unwrap();
        assert_eq!(second.execute("show").unwrap(), "<p>eggs</p>");
    }

    #[test]
    fn switching_away_keeps_unsaved_edits_visible() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        app.execute("new").unwrap();
        app.execute("title Draft").unwrap();
        app.execute("set <p>important</p>").unwrap();
        app.execute("new").unwrap();

        assert!(!app.store.has_unsaved_changes());
        assert_eq!(app.unsaved_titles(), ["Draft"]);

        app.execute("open 1").unwrap();
        assert_eq!(app.execute("show").unwrap(), "<p>important</p>");
        assert!(app.store.has_unsaved_changes());
        app.execute("save").unwrap();
        wait_for_save(&app);
        assert!(app.unsaved_titles().is_empty());

        app.shutdown();
        let docs = JsonFileStore::new(dir.path().join("docs")).load_all().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content(), "<p>important</p>");
    }

    #[test]
    fn versions_restore_and_diff() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        app.execute("new").unwrap();
        app.execute("set a\\nb\\nc").unwrap();
        app.execute("snapshot first draft").unwrap();
        app.execute("set a\\nc\\nd").unwrap();

        // Two edits since the last automatic version: one auto-save on top
        let listing = app.execute("versions").unwrap();
        assert!(listing.contains("Auto-save"));
        assert!(listing.contains("first draft"));

        assert_eq!(app.execute("diff 2").unwrap(), "- b\n+ d");
        app.execute("restore 2").unwrap();
        assert_eq!(app.execute("show").unwrap(), "a\nb\nc");
        assert!(app.execute("restore 9").is_err());
    }

    #[test]
    fn delete_removes_document_and_its_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        app.execute("new").unwrap();
        let id = app.store.current_document().unwrap().id();
        app.execute("save").unwrap();
        wait_for_save(&app);

        app.execute("delete").unwrap();
        assert!(app.store.current_document().is_none());
        assert_eq!(wait_for_save(&app), [format!("removed {id} from disk")]);
        assert_eq!(app.execute("list").unwrap(), "no documents");
    }

    #[test]
    fn stats_text_and_sanitize() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        app.execute("new").unwrap();
        app.execute("set <p>Tea &amp; cake</p><style>p {}</style><p>now</p>").unwrap();

        app.execute("sanitize").unwrap();
        assert_eq!(app.execute("show").unwrap(), "<p>Tea &amp; cake</p><p>now</p>");
        assert_eq!(app.execute("text").unwrap(), "Tea & cakenow");
        assert_eq!(app.execute("stats").unwrap(), "3 words, 13 characters, 2 paragraphs");

        app.execute("undo").unwrap();
        assert!(app.execute("show").unwrap().contains("<style>"));
    }

    #[test]
    fn export_writes_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        app.execute("new").unwrap();
        app.execute("title Report").unwrap();
        app.execute("set <h1>Report</h1><p><em>draft</em></p>").unwrap();

        let out = dir.path().join("out");
        app.execute(&format!("export md {}", out.display())).unwrap();
        let written = std::fs::read_to_string(out.join("Report.md")).unwrap();
        assert_eq!(written, "# Report\n*draft*");
    }

    #[test]
    fn import_markdown_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Notes\n\n**todo**").unwrap();

        let mut app = app(dir.path());
        app.execute("new").unwrap();
        app.execute(&format!("import {}", path.display())).unwrap();
        assert_eq!(
            app.execute("show").unwrap(),
            "<p><h1>Notes</h1></p><p><strong>todo</strong></p>"
        );
    }
}

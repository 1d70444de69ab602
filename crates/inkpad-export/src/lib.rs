//! Import and export of inkpad documents.
//!
//! Document content is editor HTML. Export turns a document into a
//! downloadable file body; import turns foreign text into editor HTML.

pub mod html;
pub mod markdown;
pub mod text;

use std::path::Path;

use anyhow::{Context, Result};
use inkpad_core::Document;

pub use html::{sanitize_html, standalone_html};
pub use markdown::{html_to_markdown, markdown_to_html, plain_text_to_html};
pub use text::{TextStats, extract_text, stats};

/// Output formats for [`export_document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Markdown,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Markdown => "md",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Html => "text/html",
            ExportFormat::Markdown => "text/markdown",
        }
    }
}

/// Input formats for [`import_content`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Html,
    Markdown,
    PlainText,
}

impl ImportFormat {
    /// Guess the format from a file extension, defaulting to plain text
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .as_deref()
        {
            Some("html" | "htm") => ImportFormat::Html,
            Some("md" | "markdown") => ImportFormat::Markdown,
            _ => ImportFormat::PlainText,
        }
    }
}

/// A rendered file ready to be written or offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    pub file_name: String,
    pub mime_type: &'static str,
    pub body: String,
}

/// Render a document in the given format
pub fn export_document(doc: &Document, format: ExportFormat) -> Exported {
    let body = match format {
        ExportFormat::Html => standalone_html(doc.title(), doc.content()),
        ExportFormat::Markdown => html_to_markdown(doc.content()),
    };

    Exported {
        file_name: format!("{}.{}", file_stem(doc.title()), format.extension()),
        mime_type: format.mime_type(),
        body,
    }
}

/// Convert imported text into editor HTML
pub fn import_content(text: &str, format: ImportFormat) -> String {
    match format {
        ImportFormat::Html => sanitize_html(text),
        ImportFormat::Markdown => markdown_to_html(text),
        ImportFormat::PlainText => plain_text_to_html(text),
    }
}

/// Write an export to `dir`, returning the full path
pub fn write_export(dir: &Path, exported: &Exported) -> Result<std::path::PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating export directory {}", dir.display()))?;
    let path = dir.join(&exported.file_name);
    std::fs::write(&path, &exported.body)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// File-system safe name derived from a title
fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if stem.is_empty() {
        "document".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::with_title("Plan: v2/final");
        doc.set_content("<h1>Plan</h1><p><strong>Ship</strong> it</p>");
        doc
    }

    #[test]
    fn markdown_export_converts_content() {
        let exported = export_document(&sample(), ExportFormat::Markdown);
        assert_eq!(exported.file_name, "Plan_ v2_final.md");
        assert_eq!(exported.mime_type, "text/markdown");
        assert_eq!(exported.body, "# Plan\n**Ship** it");
    }

    #[test]
    fn html_export_is_a_full_page() {
        let exported = export_document(&sample(), ExportFormat::Html);
        assert_eq!(exported.file_name, "Plan_ v2_final.html");
        assert!(exported.body.contains("<h1>Plan</h1><p><strong>Ship</strong> it</p>"));
        assert!(exported.body.contains("<title>Plan: v2/final</title>"));
    }

    #[test]
    fn blank_title_gets_a_fallback_name() {
        let doc = Document::with_title("   ");
        assert_eq!(export_document(&doc, ExportFormat::Html).file_name, "document.html");
    }

    #[test]
    fn import_dispatches_on_format() {
        assert_eq!(import_content("# Hi", ImportFormat::Markdown), "<p><h1>Hi</h1></p>");
        assert_eq!(import_content("hi", ImportFormat::PlainText), "<p>hi</p>");
        assert_eq!(
            import_content("<p>x</p><script>bad()</script>", ImportFormat::Html),
            "<p>x</p>"
        );
    }

    #[test]
    fn import_format_from_extension() {
        assert_eq!(ImportFormat::from_path(Path::new("a.MD")), ImportFormat::Markdown);
        assert_eq!(ImportFormat::from_path(Path::new("a.htm")), ImportFormat::Html);
        assert_eq!(ImportFormat::from_path(Path::new("notes")), ImportFormat::PlainText);
    }

    #[test]
    fn write_export_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let exported = export_document(&sample(), ExportFormat::Markdown);
        let path = write_export(&dir.path().join("out"), &exported).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), exported.body);
    }
}

//! Plain text view of editor HTML and simple document statistics.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static pattern"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(amp|lt|gt|quot|#39|apos|nbsp);").expect("static pattern")
});

/// Word, character and paragraph counts of a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStats {
    pub words: usize,
    pub characters: usize,
    pub paragraphs: usize,
}

impl std::fmt::Display for TextStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} words, {} characters, {} paragraphs",
            self.words, self.characters, self.paragraphs
        )
    }
}

/// The text a reader would see: tags dropped, common entities decoded
pub fn extract_text(html: &str) -> String {
    let text = TAG.replace_all(html, "");
    ENTITY
        .replace_all(&text, |caps: &Captures| match &caps[1] {
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            "quot" => "\"",
            "#39" | "apos" => "'",
            _ => "\u{a0}",
        })
        .into_owned()
}

/// Count words and characters of the visible text, and non-empty paragraphs
pub fn stats(html: &str) -> TextStats {
    let text = extract_text(html);
    TextStats {
        words: text.split_whitespace().count(),
        characters: text.chars().count(),
        paragraphs: html.split("</p>").filter(|p| !p.trim().is_empty()).count(),
    }
}

//! Regex-based HTML <-> Markdown conversion.
//!
//! Covers the formatting the editor produces day to day: bold, italic,
//! three heading levels and paragraphs. Every other tag (underline included)
//! is stripped on the way to Markdown.

use std::sync::LazyLock;

use regex::Regex;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern")
}

static HTML_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (re(r"<strong>(.*?)</strong>"), "**${1}**"),
        (re(r"<b>(.*?)</b>"), "**${1}**"),
        (re(r"<em>(.*?)</em>"), "*${1}*"),
        (re(r"<i>(.*?)</i>"), "*${1}*"),
        (re(r"<h1>(.*?)</h1>"), "# ${1}"),
        (re(r"<h2>(.*?)</h2>"), "## ${1}"),
        (re(r"<h3>(.*?)</h3>"), "### ${1}"),
        (re(r"<p>(.*?)</p>"), "\n${1}\n"),
        (re(r"(?i)<br\s*/?>"), "\n"),
    ]
});

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| re(r"<[^>]*>"));

static MARKDOWN_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (re(r"(?im)^# (.*)$"), "<h1>${1}</h1>"),
        (re(r"(?im)^## (.*)$"), "<h2>${1}</h2>"),
        (re(r"(?im)^### (.*)$"), "<h3>${1}</h3>"),
        (re(r"\*\*(.*?)\*\*"), "<strong>${1}</strong>"),
        (re(r"\*(.*?)\*"), "<em>${1}</em>"),
        (re(r"_(.*?)_"), "<u>${1}</u>"),
        (re(r"\n\n"), "</p><p>"),
    ]
});

/// Convert editor HTML to Markdown
pub fn html_to_markdown(html: &str) -> String {
    let mut md = html.to_string();
    for (pattern, replacement) in HTML_RULES.iter() {
        md = pattern.replace_all(&md, *replacement).into_owned();
    }

    ANY_TAG.replace_all(&md, "").trim().to_string()
}

/// Convert Markdown to editor HTML
pub fn markdown_to_html(markdown: &str) -> String {
    let mut html = markdown.to_string();
    for (pattern, replacement) in MARKDOWN_RULES.iter() {
        html = pattern.replace_all(&html, *replacement).into_owned();
    }
    format!("<p>{html}</p>")
}

/// Convert plain text to paragraphs, one per blank-line-separated block
pub fn plain_text_to_html(text: &str) -> String {
    text.split("\n\n")
        .map(|block| {
            if block.trim().is_empty() {
                "<p><br></p>".to_string()
            } else {
                format!("<p>{}</p>", block.replace('\n', "<br>"))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_formatting_becomes_markdown() {
        let html = "<h1>Title</h1><p><strong>bold</strong> and <em>soft</em></p><p>next<br/>line</p>";
        assert_eq!(
            html_to_markdown(html),
            "# Title\n**bold** and *soft*\n\nnext\nline"
        );
    }

    #[test]
    fn unknown_tags_are_stripped() {
        assert_eq!(
            html_to_markdown(r#"<div class="x"><u>under</u> <span>plain</span></div>"#),
            "under plain"
        );
    }

    #[test]
    fn markdown_headings_and_emphasis_become_html() {
        assert_eq!(
            markdown_to_html("# Title\n**bold** *soft* _under_"),
            "<p><h1>Title</h1>\n<strong>bold</strong> <em>soft</em> <u>under</u></p>"
        );
    }

    #[test]
    fn blank_lines_split_paragraphs() {
        assert_eq!(markdown_to_html("one\n\ntwo"), "<p>one</p><p>two</p>");
    }

    #[test]
    fn heading_levels_do_not_collide() {
        assert_eq!(
            markdown_to_html("## Sub\n### Minor"),
            "<p><h2>Sub</h2>\n<h3>Minor</h3></p>"
        );
    }

    #[test]
    fn plain_text_paragraphs_and_breaks() {
        assert_eq!(
            plain_text_to_html("a\nb\n\n\n\nc"),
            "<p>a<br>b</p><p><br></p><p>c</p>"
        );
    }

    #[test]
    fn common_markers_round_trip() {
        let md = "# Heading\n\n**bold** and *italic*";
        let html = markdown_to_html(md);
        assert_eq!(html_to_markdown(&html), md);
    }
}

//! HTML import cleanup and standalone page export.

use std::fmt::Write;
use std::sync::LazyLock;

use inkpad_core::escape_html;
use regex::Regex;

static UNSAFE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<(?:script|style)\b[^>]*/>",
    )
    .expect("static pattern")
});

/// Strip `<script>` and `<style>` elements from imported HTML
pub fn sanitize_html(html: &str) -> String {
    UNSAFE.replace_all(html, "").into_owned()
}

/// Wrap editor content in a complete HTML page
pub fn standalone_html(title: &str, body: &str) -> String {
    let mut output = String::new();

    writeln!(
        &mut output,
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{}</title>
  <style>
    body {{ font-family: Arial, sans-serif; padding: 20px; }}
    h1, h2, h3 {{ color: #333; }}
    p {{ line-height: 1.6; }}
  </style>
</head>
<body>"#,
        escape_html(title)
    )
    .unwrap();
    writeln!(&mut output, "{body}").unwrap();
    writeln!(&mut output, "</body>\n</html>").unwrap();

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_are_removed() {
        let html = r#"<p>keep</p><SCRIPT type="text/javascript">alert("x")
</script ><p>also</p><script src="a.js"/>"#;
        assert_eq!(sanitize_html(html), "<p>keep</p><p>also</p>");
    }

    #[test]
    fn styles_are_removed() {
        let html = "<style>p { color: red }</style><p>plain</p><STYLE media=\"print\">\nh1 {}\n</Style>";
        assert_eq!(sanitize_html(html), "<p>plain</p>");
    }

    #[test]
    fn html_without_scripts_is_unchanged() {
        let html = "<p>describe <code>script</code> and <code>style</code> tags</p>";
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn page_wraps_body_and_escapes_title() {
        let page = standalone_html("Q&A", "<p>body</p>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Q&amp;A</title>"));
        assert!(page.contains("<body>\n<p>body</p>\n</body>"));
    }
}

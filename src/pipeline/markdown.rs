//! Markdown to HTML with YAML (`---`) or TOML (`+++`) frontmatter.

use pulldown_cmark::{Options, Parser, html};
use serde_json::{Map, Value};

/// Frontmatter syntax, picked by the fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    Yaml,
    Toml,
}

/// GFM extensions: tables, footnotes, strikethrough, task lists.
///
/// Soft line breaks stay soft (no `<br>` conversion).
fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_FOOTNOTES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    opts
}

/// Render a Markdown body to HTML.
pub fn render(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Render a short Markdown snippet without the wrapping paragraph.
pub fn render_inline(markdown: &str) -> String {
    let html = render(markdown);
    let trimmed = html.trim_end();
    match trimmed
        .strip_prefix("<p>")
        .and_then(|s| s.strip_suffix("</p>"))
    {
        // Only unwrap a single paragraph.
        Some(inner) if !inner.contains("<p>") => inner.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Detect and split frontmatter.
///
/// Returns `(header, body, format)` if a fenced header is present.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str, FrontmatterFormat)> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();

    for (fence, format) in [
        ("---", FrontmatterFormat::Yaml),
        ("+++", FrontmatterFormat::Toml),
    ] {
        let Some(rest) = trimmed.strip_prefix(fence) else {
            continue;
        };
        // The opening fence must be alone on its line.
        if !rest.starts_with('\n') && !rest.starts_with("\r\n") {
            continue;
        }
        let closing = format!("\n{fence}");
        if let Some(end) = rest.find(&closing) {
            let header = rest[..end].trim();
            let after = &rest[end + closing.len()..];
            let body = after
                .strip_prefix("\r\n")
                .or_else(|| after.strip_prefix('\n'))
                .unwrap_or(after);
            return Some((header, body, format));
        }
    }

    None
}

/// Parse frontmatter into a JSON object and return the body.
///
/// Files without a header get an empty map. A header that is not a
/// mapping or fails to parse is an error message for the caller to wrap.
pub fn parse_frontmatter(content: &str) -> Result<(Map<String, Value>, &str), String> {
    let Some((header, body, format)) = split_frontmatter(content) else {
        return Ok((Map::new(), content));
    };

    let value = match format {
        FrontmatterFormat::Yaml => {
            if header.is_empty() {
                Value::Null
            } else {
                serde_yaml_ng::from_str::<Value>(header)
                    .map_err(|e| format!("invalid YAML frontmatter: {e}"))?
            }
        }
        FrontmatterFormat::Toml => {
            let table: toml::Table =
                toml::from_str(header).map_err(|e| format!("invalid TOML frontmatter: {e}"))?;
            serde_json::to_value(table).map_err(|e| format!("invalid TOML frontmatter: {e}"))?
        }
    };

    match value {
        Value::Object(map) => Ok((map, body)),
        Value::Null => Ok((Map::new(), body)),
        other => Err(format!(
            "frontmatter must be a key/value mapping, found {}",
            json_kind(&other)
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_yaml_frontmatter() {
        let content = "---\ntitle: Hello\norder: 2\ntags: [a, b]\n---\n\n# Body";
        let (meta, body) = parse_frontmatter(content).unwrap();
        assert_eq!(meta["title"], json!("Hello"));
        assert_eq!(meta["order"], json!(2));
        assert_eq!(meta["tags"], json!(["a", "b"]));
        assert!(body.trim_start().starts_with("# Body"));
    }

    #[test]
    fn test_toml_frontmatter() {
        let content = "+++\ntitle = \"Hello\"\norder = 1.5\n+++\nBody";
        let (meta, body) = parse_frontmatter(content).unwrap();
        assert_eq!(meta["title"], json!("Hello"));
        assert_eq!(meta["order"], json!(1.5));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just content";
        let (meta, body) = parse_frontmatter(content).unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_horizontal_rule_is_not_frontmatter() {
        let content = "Intro\n\n---\n\nMore";
        assert!(split_frontmatter(content).is_none());
    }

    #[test]
    fn test_empty_yaml_header() {
        let (meta, body) = parse_frontmatter("---\n---\nText").unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, "Text");
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let err = parse_frontmatter("---\ntitle: [unclosed\n---\nx").unwrap_err();
        assert!(err.contains("YAML"));
    }

    #[test]
    fn test_scalar_header_is_error() {
        let err = parse_frontmatter("---\njust a string\n---\nx").unwrap_err();
        assert!(err.contains("mapping"));
    }

    #[test]
    fn test_render_gfm() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn test_soft_breaks_stay_soft() {
        let html = render("line one\nline two");
        assert!(!html.contains("<br"));
    }

    #[test]
    fn test_render_inline() {
        assert_eq!(render_inline("*Crown* book"), "<em>Crown</em> book");
        assert_eq!(render_inline("a\n\nb"), "<p>a</p>\n<p>b</p>");
    }
}

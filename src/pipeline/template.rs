//! Template rendering on minijinja.
//!
//! # Template names
//!
//! | Source                               | Registered as              |
//! |--------------------------------------|----------------------------|
//! | `input.template`                     | its file name              |
//! | `<template dir>/partials/**/*.html`  | file stem (`chapter`)      |
//! | `helpers` file                       | `helpers`                  |
//!
//! Partials are pulled in with `{% include "chapter" %}`, macros from the
//! helpers file with `{% import "helpers" as h %}`.
//!
//! Output is HTML-escaped everywhere; chapter bodies need `| safe`.

use chrono::{DateTime, Local, NaiveDate, Utc};
use minijinja::{AutoEscape, Environment, Error, ErrorKind, Value, value::Rest};
use serde::Serialize;
use serde_json::Map;
use std::{
    collections::BTreeMap,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use super::{BuildError, Document, markdown};
use crate::config::{MetadataConfig, PageConfig};

/// Extensions picked up from `partials/`.
const PARTIAL_EXTENSIONS: &[&str] = &["html", "hbs", "jinja", "j2"];

/// Name the helpers file is registered under.
pub const HELPERS_TEMPLATE: &str = "helpers";

// ============================================================================
// Helpers
// ============================================================================

/// A template helper: positional arguments in, value or message out.
pub type HelperFn = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Named helpers installed into every render environment.
///
/// Each helper is callable as a function (`join(tags, ", ")`) and as a
/// filter (`tags | join(", ")`).
#[derive(Clone, Default)]
pub struct HelperRegistry {
    helpers: BTreeMap<String, HelperFn>,
}

impl HelperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the stock helpers:
    /// `markdown`, `json`, `format_date`, `eq`, `gt`, `lt`, `gte`, `lte`,
    /// `length`, `join`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register("markdown", helper_markdown)
            .register("json", helper_json)
            .register("format_date", helper_format_date)
            .register("eq", |args| Ok(Value::from(arg(args, 0) == arg(args, 1))))
            .register("gt", |args| compare(args, |o| o.is_gt()))
            .register("lt", |args| compare(args, |o| o.is_lt()))
            .register("gte", |args| compare(args, |o| o.is_ge()))
            .register("lte", |args| compare(args, |o| o.is_le()))
            .register("length", |args| {
                Ok(Value::from(arg(args, 0).len().unwrap_or(0)))
            })
            .register("join", helper_join);
        registry
    }

    /// Add or replace a helper.
    pub fn register<F>(&mut self, name: impl Into<String>, helper: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.helpers.insert(name.into(), Arc::new(helper));
        self
    }

    fn install(&self, env: &mut Environment<'static>) {
        for (name, helper) in &self.helpers {
            let as_function = Arc::clone(helper);
            env.add_function(name.clone(), move |args: Rest<Value>| {
                as_function(&args.0).map_err(helper_error)
            });
            let as_filter = Arc::clone(helper);
            env.add_filter(name.clone(), move |args: Rest<Value>| {
                as_filter(&args.0).map_err(helper_error)
            });
        }
    }
}

fn helper_error(message: String) -> Error {
    Error::new(ErrorKind::InvalidOperation, message)
}

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::UNDEFINED)
}

fn compare(args: &[Value], pick: fn(std::cmp::Ordering) -> bool) -> Result<Value, String> {
    let ordering = arg(args, 0).partial_cmp(&arg(args, 1));
    Ok(Value::from(ordering.is_some_and(pick)))
}

fn helper_markdown(args: &[Value]) -> Result<Value, String> {
    let text = arg(args, 0);
    if text.is_undefined() || text.is_none() {
        return Ok(Value::from(""));
    }
    Ok(Value::from_safe_string(markdown::render_inline(
        &text.to_string(),
    )))
}

fn helper_json(args: &[Value]) -> Result<Value, String> {
    serde_json::to_string_pretty(&arg(args, 0))
        .map(Value::from)
        .map_err(|e| e.to_string())
}

fn helper_join(args: &[Value]) -> Result<Value, String> {
    let list = arg(args, 0);
    if list.is_undefined() || list.is_none() {
        return Ok(Value::from(""));
    }
    let separator = args
        .get(1)
        .and_then(Value::as_str)
        .unwrap_or(", ")
        .to_string();
    let items = list.try_iter().map_err(|e| e.to_string())?;
    let joined = items.map(|v| v.to_string()).collect::<Vec<_>>().join(&separator);
    Ok(Value::from(joined))
}

/// `format_date(value, "iso")` → ISO-8601 UTC timestamp; with no format
/// → `January 2, 2024`; any other format is a strftime pattern.
/// A missing value means now.
fn helper_format_date(args: &[Value]) -> Result<Value, String> {
    let value = arg(args, 0);
    let when: DateTime<Utc> = if value.is_undefined() || value.is_none() {
        Utc::now()
    } else {
        parse_date(&value.to_string())?
    };

    let format = args.get(1).and_then(Value::as_str);
    let out = match format {
        Some("iso") => when.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        other => {
            let pattern = other.unwrap_or("%B %-d, %Y");
            let mut out = String::new();
            write!(out, "{}", when.with_timezone(&Local).format(pattern))
                .map_err(|_| format!("invalid date format `{pattern}`"))?;
            out
        }
    };
    Ok(Value::from(out))
}

fn parse_date(text: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("cannot parse `{text}` as a date"))
}

// ============================================================================
// Renderer
// ============================================================================

/// Everything a template can see.
#[derive(Debug, Serialize)]
pub struct RenderContext<'a> {
    pub metadata: &'a MetadataConfig,
    pub chapters: &'a [Document],
    pub data: &'a Map<String, serde_json::Value>,
    pub page: &'a PageConfig,
    /// Build day as `YYYY-MM-DD`.
    pub generated_date: String,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        metadata: &'a MetadataConfig,
        chapters: &'a [Document],
        data: &'a Map<String, serde_json::Value>,
        page: &'a PageConfig,
    ) -> Self {
        Self {
            metadata,
            chapters,
            data,
            page,
            generated_date: Local::now().format("%Y-%m-%d").to_string(),
        }
    }
}

/// Renders the main template. Sources are re-read on every call.
pub struct TemplateRenderer {
    template: PathBuf,
    helpers_file: Option<PathBuf>,
    registry: HelperRegistry,
}

impl TemplateRenderer {
    pub fn new(template: PathBuf, helpers_file: Option<PathBuf>, registry: HelperRegistry) -> Self {
        Self {
            template,
            helpers_file,
            registry,
        }
    }

    pub fn render(&self, context: &RenderContext<'_>) -> Result<String, BuildError> {
        let env = self.environment()?;
        let template = env.get_template(&self.main_name())?;
        Ok(template.render(context)?)
    }

    fn main_name(&self) -> String {
        self.template
            .file_name()
            .map_or_else(|| "main".to_string(), |n| n.to_string_lossy().into_owned())
    }

    fn environment(&self) -> Result<Environment<'static>, BuildError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        self.registry.install(&mut env);

        let template_dir = self.template.parent().unwrap_or(Path::new("."));
        for (name, source) in load_partials(template_dir)? {
            env.add_template_owned(name, source)?;
        }

        if let Some(helpers) = &self.helpers_file {
            env.add_template_owned(HELPERS_TEMPLATE, read(helpers)?)?;
        }

        env.add_template_owned(self.main_name(), read(&self.template)?)?;
        Ok(env)
    }
}

fn read(path: &Path) -> Result<String, BuildError> {
    fs::read_to_string(path).map_err(|e| BuildError::io(path, e))
}

/// `(stem, source)` for every partial; a missing `partials/` is fine.
fn load_partials(template_dir: &Path) -> Result<Vec<(String, String)>, BuildError> {
    let partials_dir = template_dir.join("partials");
    if !partials_dir.is_dir() {
        return Ok(Vec::new());
    }

    let pattern = format!(
        "{}/**/*",
        glob::Pattern::escape(&partials_dir.to_string_lossy())
    );
    let entries = glob::glob(&pattern).map_err(|e| BuildError::InvalidPattern {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;

    let mut partials = Vec::new();
    for path in entries.filter_map(Result::ok) {
        let is_partial = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| PARTIAL_EXTENSIONS.contains(&e));
        if !is_partial || !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        partials.push((stem, read(&path)?));
    }
    Ok(partials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, args: &[Value]) -> Result<Value, String> {
        let registry = HelperRegistry::with_builtins();
        let helper = registry.helpers.get(name).unwrap();
        helper(args)
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
    }

    impl Fixture {
        fn new(layout: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path().to_path_buf();
            fs::create_dir_all(root.join("templates/partials")).unwrap();
            fs::write(root.join("templates/layout.html"), layout).unwrap();
            Self { _dir: dir, root }
        }

        fn write(&self, rel: &str, content: &str) {
            fs::write(self.root.join(rel), content).unwrap();
        }

        fn renderer(&self, helpers: Option<&str>) -> TemplateRenderer {
            TemplateRenderer::new(
                self.root.join("templates/layout.html"),
                helpers.map(|h| self.root.join(h)),
                HelperRegistry::with_builtins(),
            )
        }
    }

    fn chapter(path: &str, title: &str, html: &str) -> Document {
        let mut frontmatter = Map::new();
        frontmatter.insert("title".into(), json!(title));
        Document {
            path: path.into(),
            absolute_path: PathBuf::from(path),
            frontmatter,
            html: html.into(),
            raw: String::new(),
        }
    }

    fn render(renderer: &TemplateRenderer, chapters: &[Document]) -> Result<String, BuildError> {
        let metadata = MetadataConfig::default();
        let page = PageConfig::default();
        let data = Map::new();
        renderer.render(&RenderContext::new(&metadata, chapters, &data, &page))
    }

    #[test]
    fn test_renders_chapters_with_partial() {
        let fx = Fixture::new(
            "<h1>{{ metadata.title }}</h1>{% for chapter in chapters %}{% include \"chapter\" %}{% endfor %}",
        );
        fx.write(
            "templates/partials/chapter.html",
            "<section>{{ chapter.frontmatter.title }}:{{ chapter.html | safe }}</section>",
        );
        let chapters = [chapter("a.md", "One", "<p>x</p>")];

        let html = render(&fx.renderer(None), &chapters).unwrap();
        assert_eq!(html, "<h1>Untitled Book</h1><section>One:<p>x</p></section>");
    }

    #[test]
    fn test_missing_partial_is_render_error() {
        let fx = Fixture::new("{% include \"cover\" %}");
        let err = render(&fx.renderer(None), &[]).unwrap_err();
        assert!(matches!(err, BuildError::Render(ref m) if m.contains("cover")));
    }

    #[test]
    fn test_missing_variable_renders_empty() {
        let fx = Fixture::new("[{{ metadata.nope }}]");
        assert_eq!(render(&fx.renderer(None), &[]).unwrap(), "[]");
    }

    #[test]
    fn test_missing_main_template_is_io_error() {
        let fx = Fixture::new("");
        fs::remove_file(fx.root.join("templates/layout.html")).unwrap();
        let err = render(&fx.renderer(None), &[]).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }

    #[test]
    fn test_helpers_file_macros() {
        let fx = Fixture::new("{% import \"helpers\" as h %}{{ h.shout(metadata.lang) }}");
        fx.write("helpers.html", "{% macro shout(s) %}{{ s | upper }}!{% endmacro %}");
        let html = render(&fx.renderer(Some("helpers.html")), &[]).unwrap();
        assert_eq!(html, "EN!");
    }

    #[test]
    fn test_page_and_date_in_context() {
        let fx = Fixture::new("{{ page.size }} {{ page.margins.top }} {{ generated_date | length }}");
        assert_eq!(render(&fx.renderer(None), &[]).unwrap(), "A4 2cm 10");
    }

    #[test]
    fn test_escapes_by_default() {
        let fx = Fixture::new("{{ chapters[0].html }}");
        let chapters = [chapter("a.md", "A", "<b>")];
        assert_eq!(render(&fx.renderer(None), &chapters).unwrap(), "&lt;b&gt;");
    }

    #[test]
    fn test_builtin_helpers_in_templates() {
        let fx = Fixture::new(
            "{{ markdown(\"*hi*\") }}|{{ join(metadata.keywords) }}|{{ length(chapters) }}|{% if gt(length(chapters), 0) %}yes{% endif %}",
        );
        let chapters = [chapter("a.md", "A", "")];
        let html = render(&fx.renderer(None), &chapters).unwrap();
        assert_eq!(html, "<em>hi</em>||1|yes");
    }

    #[test]
    fn test_custom_helper_registry() {
        let fx = Fixture::new("{{ shout(metadata.author) }}");
        let mut registry = HelperRegistry::with_builtins();
        registry.register("shout", |args| {
            Ok(Value::from(arg(args, 0).to_string().to_uppercase()))
        });
        let renderer = TemplateRenderer::new(fx.root.join("templates/layout.html"), None, registry);
        assert_eq!(render(&renderer, &[]).unwrap(), "UNKNOWN AUTHOR");
    }

    #[test]
    fn test_unknown_helper_is_render_error() {
        let fx = Fixture::new("{{ nope(1) }}");
        assert!(matches!(
            render(&fx.renderer(None), &[]).unwrap_err(),
            BuildError::Render(_)
        ));
    }

    #[test]
    fn test_comparison_helpers() {
        let (two, three) = (Value::from(2), Value::from(3));
        assert_eq!(call("gt", &[three.clone(), two.clone()]).unwrap(), Value::from(true));
        assert_eq!(call("lt", &[three.clone(), two.clone()]).unwrap(), Value::from(false));
        assert_eq!(call("gte", &[two.clone(), two.clone()]).unwrap(), Value::from(true));
        assert_eq!(call("lte", &[two.clone(), three]).unwrap(), Value::from(true));
        assert_eq!(call("eq", &[two.clone(), two]).unwrap(), Value::from(true));
    }

    #[test]
    fn test_join_and_length() {
        let list = Value::from(vec!["a", "b"]);
        assert_eq!(call("join", &[list.clone()]).unwrap(), Value::from("a, b"));
        assert_eq!(
            call("join", &[list.clone(), Value::from(" / ")]).unwrap(),
            Value::from("a / b")
        );
        assert_eq!(call("length", &[list]).unwrap(), Value::from(2));
        assert_eq!(call("length", &[]).unwrap(), Value::from(0));
    }

    #[test]
    fn test_format_date() {
        let iso = call("format_date", &[Value::from("2024-03-05"), Value::from("iso")]).unwrap();
        assert_eq!(iso, Value::from("2024-03-05T00:00:00.000Z"));

        let custom =
            call("format_date", &[Value::from("2024-03-05T12:00:00Z"), Value::from("%Y")]).unwrap();
        assert_eq!(custom, Value::from("2024"));

        assert!(call("format_date", &[Value::from("soon")]).is_err());
    }

    #[test]
    fn test_json_helper() {
        let out = call("json", &[Value::from_serialize(json!({"a": 1}))]).unwrap();
        assert_eq!(out.as_str(), Some("{\n  \"a\": 1\n}"));
    }
}

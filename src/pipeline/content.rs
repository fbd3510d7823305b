//! Content discovery, compilation and ordering.

use rayon::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use std::{
    cmp::Ordering,
    fs,
    path::{Path, PathBuf},
};

use super::{BuildError, markdown};
use crate::utils::path::to_slash;

/// One compiled source file.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Root-relative path with `/` separators.
    pub path: String,
    pub absolute_path: PathBuf,
    /// Frontmatter fields. `title`, `subtitle`, `author`, `id`, `order`
    /// and `tags` are the recognized ones; anything else rides along.
    pub frontmatter: Map<String, Value>,
    pub html: String,
    /// Body text without the frontmatter header.
    pub raw: String,
}

impl Document {
    /// Explicit numeric position, if any.
    pub fn order(&self) -> Option<f64> {
        self.frontmatter.get("order").and_then(Value::as_f64)
    }

    pub fn title(&self) -> Option<&str> {
        self.frontmatter.get("title").and_then(Value::as_str)
    }
}

/// Turns one source file into a [`Document`].
pub trait ContentCompiler: Send + Sync {
    fn compile(&self, path: &Path, root: &Path) -> Result<Document, BuildError>;
}

/// Markdown with YAML or TOML frontmatter.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownCompiler;

impl ContentCompiler for MarkdownCompiler {
    fn compile(&self, path: &Path, root: &Path) -> Result<Document, BuildError> {
        let source = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        let display = to_slash(path, root);

        let (frontmatter, body) =
            markdown::parse_frontmatter(&source).map_err(|message| BuildError::Compile {
                path: display.clone(),
                message,
            })?;

        Ok(Document {
            path: display,
            absolute_path: path.to_path_buf(),
            frontmatter,
            html: markdown::render(body),
            raw: body.to_string(),
        })
    }
}

/// Expand the content glob into files, in discovery order.
pub fn discover(pattern: &str) -> Result<Vec<PathBuf>, BuildError> {
    let entries = glob::glob(pattern).map_err(|e| BuildError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        return Err(BuildError::NoContentFound {
            pattern: pattern.to_string(),
        });
    }
    Ok(files)
}

/// Compile every file in parallel, then restore a deterministic order.
///
/// The first failure (in discovery order) aborts the build.
pub fn compile_all(
    compiler: &dyn ContentCompiler,
    files: &[PathBuf],
    root: &Path,
) -> Result<Vec<Document>, BuildError> {
    let mut documents = files
        .par_iter()
        .map(|path| compiler.compile(path, root))
        .collect::<Result<Vec<_>, _>>()?;

    sort_documents(&mut documents);
    Ok(documents)
}

/// Ordered documents first (ascending `order`), then the rest by path.
///
/// Stable: documents comparing equal keep their discovery order.
pub fn sort_documents(documents: &mut [Document]) {
    documents.sort_by(compare);
}

fn compare(a: &Document, b: &Document) -> Ordering {
    match (a.order(), b.order()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.path.cmp(&b.path),
    }
}

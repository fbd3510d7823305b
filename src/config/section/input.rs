//! `[input]` section configuration.
//!
//! Source locations of the book. All three keys are required.
//!
//! # Example
//!
//! ```toml
//! [input]
//! content = "src/content/**/*.md"       # Glob of chapter files
//! template = "src/templates/layout.html" # Main template
//! styles = "src/styles.css"             # Print stylesheet
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::resolve_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source inputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Glob pattern for content files.
    pub content: String,
    /// Main template file.
    pub template: PathBuf,
    /// Main stylesheet.
    pub styles: PathBuf,
}

impl InputConfig {
    pub const CONTENT: FieldPath = FieldPath::new("input.content");
    pub const TEMPLATE: FieldPath = FieldPath::new("input.template");
    pub const STYLES: FieldPath = FieldPath::new("input.styles");

    /// Make every input absolute against the project root.
    pub fn normalize(&mut self, root: &Path) {
        if !self.content.is_empty() {
            self.content = resolve_path(Path::new(&self.content), root)
                .to_string_lossy()
                .into_owned();
        }
        if !self.template.as_os_str().is_empty() {
            self.template = resolve_path(&self.template, root);
        }
        if !self.styles.as_os_str().is_empty() {
            self.styles = resolve_path(&self.styles, root);
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.content.trim().is_empty() {
            diag.error_with_hint(
                Self::CONTENT,
                "required field is missing",
                "e.g. content = \"src/content/**/*.md\"",
            );
        } else if let Err(e) = glob::Pattern::new(&self.content) {
            diag.error(Self::CONTENT, format!("invalid glob pattern: {e}"));
        }
        if self.template.as_os_str().is_empty() {
            diag.error(Self::TEMPLATE, "required field is missing");
        }
        if self.styles.as_os_str().is_empty() {
            diag.error(Self::STYLES, "required field is missing");
        }
    }

    /// Directory holding the main template (and its `partials/`).
    pub fn template_dir(&self) -> &Path {
        self.template.parent().unwrap_or(Path::new("."))
    }

    /// Longest wildcard-free directory prefix of the content glob.
    pub fn content_dir(&self) -> PathBuf {
        crate::config::util::glob_base(&self.content)
    }
}

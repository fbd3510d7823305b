//! `[output]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [output]
//! html = "dist/book.html"
//! pdf = "dist/book.pdf"
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::resolve_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name templates link to for the stylesheet.
pub const STYLES_COPY_NAME: &str = "styles.css";

/// Generated artifacts. Both keys are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Rendered HTML (input to the PDF renderer).
    pub html: PathBuf,
    /// Final PDF.
    pub pdf: PathBuf,
}

impl OutputConfig {
    pub const HTML: FieldPath = FieldPath::new("output.html");
    pub const PDF: FieldPath = FieldPath::new("output.pdf");

    pub fn normalize(&mut self, root: &Path) {
        if !self.html.as_os_str().is_empty() {
            self.html = resolve_path(&self.html, root);
        }
        if !self.pdf.as_os_str().is_empty() {
            self.pdf = resolve_path(&self.pdf, root);
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.html.as_os_str().is_empty() {
            diag.error(Self::HTML, "required field is missing");
        }
        if self.pdf.as_os_str().is_empty() {
            diag.error(Self::PDF, "required field is missing");
        }
        if !self.html.as_os_str().is_empty() && self.html == self.pdf {
            diag.error(Self::PDF, "must differ from output.html");
        }
    }

    /// Where the stylesheet copy lands: `styles.css` next to the HTML,
    /// whatever the source file is called.
    pub fn styles_copy(&self) -> PathBuf {
        self.html
            .parent()
            .map_or_else(|| PathBuf::from(STYLES_COPY_NAME), |dir| dir.join(STYLES_COPY_NAME))
    }
}

//! `[page]` section configuration.
//!
//! Exposed to templates as `page` so layouts can emit `@page` rules.
//!
//! # Example
//!
//! ```toml
//! [page]
//! size = "5.5in 8.5in"
//!
//! [page.margins]
//! top = "0.75in"
//! inside = "0.75in"
//! outside = "0.5in"
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// CSS page size (`A4`, `letter`, `5.5in 8.5in`).
    pub size: String,
    pub margins: Margins,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: "A4".into(),
            margins: Margins::default(),
        }
    }
}

/// CSS lengths; unset sides fall back to `2cm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: String,
    pub bottom: String,
    pub left: String,
    pub right: String,
    pub inside: String,
    pub outside: String,
}

impl Default for Margins {
    fn default() -> Self {
        let m = || "2cm".to_string();
        Self {
            top: m(),
            bottom: m(),
            left: m(),
            right: m(),
            inside: m(),
            outside: m(),
        }
    }
}

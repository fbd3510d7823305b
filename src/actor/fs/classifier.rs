//! Path → build category.
//!
//! Rules, first match wins:
//!
//! | # | Rule                                 | Category      |
//! |---|--------------------------------------|---------------|
//! | 1 | the project's `crown.toml`           | `Config`      |
//! | 2 | the configured `helpers` file        | `CustomLogic` |
//! | 3 | `.md` / `.markdown`                  | `Content`     |
//! | 4 | `.html` / `.hbs` / `.jinja` / `.j2`  | `Template`    |
//! | 5 | `.css` / `.scss`                     | `Style`       |
//! | 6 | anything else                        | `Content`     |

use std::path::Path;

use super::types::Category;
use crate::config::CrownConfig;

const CONTENT_EXTENSIONS: &[&str] = &["md", "markdown"];
const TEMPLATE_EXTENSIONS: &[&str] = &["html", "htm", "hbs", "jinja", "j2"];
const STYLE_EXTENSIONS: &[&str] = &["css", "scss"];

/// Classify a changed path. Total: unknown files fall back to `Content`.
pub fn classify(path: &Path, config: &CrownConfig) -> Category {
    if config.is_config_file(path) {
        return Category::Config;
    }
    if config.helpers.as_deref() == Some(path) {
        return Category::CustomLogic;
    }

    let ext = extension(path);
    if CONTENT_EXTENSIONS.contains(&ext.as_str()) {
        Category::Content
    } else if TEMPLATE_EXTENSIONS.contains(&ext.as_str()) {
        Category::Template
    } else if STYLE_EXTENSIONS.contains(&ext.as_str()) {
        Category::Style
    } else {
        Category::Content
    }
}

/// Whether a change to `path` can affect the book.
///
/// Watch roots are directories, so they report siblings nobody asked for.
/// Keeps the config file, helpers, stylesheet, data sources, Markdown under
/// the content directory and templates under the template directory.
/// Build outputs and editor temp files never count.
pub fn is_relevant(path: &Path, config: &CrownConfig) -> bool {
    if is_temp_file(path) || config.is_build_output(path) {
        return false;
    }
    if config.is_config_file(path)
        || config.helpers.as_deref() == Some(path)
        || path == config.input.styles
        || config.data.values().any(|p| p == path)
    {
        return true;
    }

    let ext = extension(path);
    (path.starts_with(config.input.content_dir()) && CONTENT_EXTENSIONS.contains(&ext.as_str()))
        || (path.starts_with(config.input.template_dir())
            && TEMPLATE_EXTENSIONS.contains(&ext.as_str()))
}

/// Check if path is a temp/backup file (editor artifacts).
pub fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

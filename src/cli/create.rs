//! `crown create`: scaffold a new book from an embedded project template.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};

use crate::embed::project::{self, ProjectVars};
use crate::log;
use crate::utils::path::normalize_path;

/// Create `name` (relative to the current directory) from `template`.
///
/// Refuses to touch an existing directory. Returns the project root.
pub fn create_project(name: &Path, template: &str) -> Result<PathBuf> {
    let files = project::find(template).ok_or_else(|| {
        anyhow!(
            "template `{}` not found (available: {})",
            template,
            project::NAMES.join(", ")
        )
    })?;

    let root = normalize_path(name);
    if root.exists() {
        bail!("directory `{}` already exists", name.display());
    }

    let title = root
        .file_name()
        .map_or_else(|| "My Book".to_string(), |n| n.to_string_lossy().into_owned());
    log!("create"; "creating {} from the `{}` template", name.display(), template);

    let vars = ProjectVars { title };
    for file in files {
        let path = root.join(file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
        }
        fs::write(&path, file.content.render(&vars))
            .with_context(|| format!("failed to write '{}'", path.display()))?;
    }
    fs::write(root.join(".gitignore"), "dist/\n")
        .with_context(|| format!("failed to write '{}'", root.join(".gitignore").display()))?;

    log!("create"; "project created at {}", root.display());
    log!("create"; "next: cd {} && crown dev", name.display());
    Ok(root)
}

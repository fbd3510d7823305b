//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/book/src/content/  ← cwd
/// /home/user/book/crown.toml    ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_file_from(&cwd, config_name)
}

/// Same as [`find_config_file`] but starting at `start`.
pub fn find_config_file_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

/// Longest leading directory of a glob pattern that has no wildcard.
///
/// # Examples
/// ```ignore
/// glob_base("/book/src/content/**/*.md") -> "/book/src/content"
/// glob_base("/book/chapters/*.md")       -> "/book/chapters"
/// glob_base("/book/intro.md")            -> "/book"
/// ```
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    let mut components = Path::new(pattern).components().peekable();
    while let Some(component) = components.next() {
        let text = component.as_os_str().to_string_lossy();
        if text.contains(['*', '?', '[', '{']) || components.peek().is_none() {
            break;
        }
        base.push(component.as_os_str());
    }
    base
}

// ============================================================================
// tests
// ============================================================================

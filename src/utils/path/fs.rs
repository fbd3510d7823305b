//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_path` - resolve config-relative paths against the project root
//! - `to_slash` - root-relative display paths with `/` separators

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
///
/// # Example
/// ```ignore
/// use crown::utils::path::normalize_path;
/// let abs = normalize_path(Path::new("./chapters/01-intro.md"));
/// ```
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            lexical_clean(path)
        } else {
            std::env::current_dir()
                .map_or_else(|_| path.to_path_buf(), |cwd| lexical_clean(&cwd.join(path)))
        }
    })
}

/// Resolve a config-relative path against `root`.
///
/// Absolute paths are kept. Relative paths are joined with `root` and
/// cleaned lexically, so files that don't exist yet (outputs) still
/// resolve to a stable absolute path.
#[inline]
pub fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        return lexical_clean(path);
    }
    lexical_clean(&root.join(path))
}

/// Remove `.` and fold `..` components without touching the filesystem.
pub fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Render `path` relative to `root` with `/` separators.
///
/// Paths outside `root` are returned whole.
pub fn to_slash(path: &Path, root: &Path) -> String {
    let Ok(rel) = path.strip_prefix(root) else {
        return path.to_string_lossy().replace('\\', "/");
    };
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

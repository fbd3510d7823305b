use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

use crate::config::CrownConfig;

/// One path to keep under watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct WatchRoot {
    pub(super) path: PathBuf,
    pub(super) mode: RecursiveMode,
}

impl WatchRoot {
    fn recursive(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: RecursiveMode::Recursive,
        }
    }

    fn shallow(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: RecursiveMode::NonRecursive,
        }
    }
}

/// Everything a build reads:
///
/// - content directory (glob prefix before the first wildcard), recursive
/// - template directory, recursive (covers `partials/`)
/// - project root, shallow (for `crown.toml`)
/// - stylesheet, helpers file and data sources, each by its directory
///
/// Single files are watched through their parent so editors that save by
/// rename don't orphan the watch.
pub(super) fn collect_watch_roots(config: &CrownConfig) -> Vec<WatchRoot> {
    let mut roots = vec![
        WatchRoot::recursive(config.input.content_dir()),
        WatchRoot::recursive(config.input.template_dir()),
        WatchRoot::shallow(config.get_root()),
    ];

    let files = std::iter::once(config.input.styles.as_path())
        .chain(config.helpers.as_deref())
        .chain(config.data.values().map(PathBuf::as_path));
    for file in files {
        if let Some(parent) = file.parent() {
            roots.push(WatchRoot::shallow(parent));
        }
    }

    dedupe(roots)
}

/// Drop duplicates and anything a recursive root already covers.
fn dedupe(roots: Vec<WatchRoot>) -> Vec<WatchRoot> {
    let recursive: Vec<PathBuf> = roots
        .iter()
        .filter(|r| r.mode == RecursiveMode::Recursive)
        .map(|r| r.path.clone())
        .collect();

    let mut kept: Vec<WatchRoot> = Vec::new();
    for root in roots {
        let covered = recursive
            .iter()
            .any(|r| root.path.starts_with(r) && !(root.path == *r && root.mode == RecursiveMode::Recursive));
        if covered || kept.iter().any(|k| k.path == root.path) {
            continue;
        }
        kept.push(root);
    }
    kept
}

/// Watch-root consistency manager.
///
/// Responsibility:
/// - Attach existing roots at startup
/// - Re-attach roots that were removed and recreated
pub(super) struct WatchRoots {
    desired: Vec<WatchRoot>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    pub(super) fn new(roots: Vec<WatchRoot>) -> Self {
        Self {
            desired: roots,
            attached: FxHashSet::default(),
        }
    }

    pub(super) fn attach_existing(
        &mut self,
        watcher: &mut RecommendedWatcher,
    ) -> notify::Result<()> {
        for root in &self.desired {
            if !root.path.exists() {
                crate::debug!("watch"; "not yet present: {}", root.path.display());
                continue;
            }
            watcher.watch(&root.path, root.mode)?;
            self.attached.insert(root.path.clone());
        }

        Ok(())
    }

    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        // Drop stale handles for roots that no longer exist.
        self.attached.retain(|path| path.exists());

        for root in &self.desired {
            if self.attached.contains(&root.path) || !root.path.exists() {
                continue;
            }

            if watcher.watch(&root.path, root.mode).is_ok() {
                self.attached.insert(root.path.clone());
                crate::debug!("watch"; "re-attached watch: {}", root.path.display());
            }
        }
    }

    pub(super) fn paths(&self) -> impl Iterator<Item = &Path> {
        self.desired.iter().map(|r| r.path.as_path())
    }
}

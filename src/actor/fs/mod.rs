//! FileSystem Actor
//!
//! Watches the project and sends one coalesced trigger per burst of
//! changes to the BuildCoordinator. Implements the "Watcher-First" pattern:
//! the watcher is live before the initial build, so nothing written during
//! that build is lost.
//!
//! Architecture:
//! ```text
//! notify → classifier (relevance + category) → Debouncer (latest wins) → CoordinatorMsg
//! ```

use std::sync::Arc;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::CoordinatorMsg;
use crate::config::CrownConfig;
use crate::utils::path::normalize_path;

// Path → category, plus relevance filtering.
pub mod classifier;
// Pure timing.
mod debouncer;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;


pub use classifier::classify;
pub use types::{Category, ChangeEvent, ChangeKind};

use debouncer::Debouncer;
use watch_roots::{WatchRoots, collect_watch_roots};

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    /// Watch-root consistency layer (attach/re-attach root directories)
    watch_roots: WatchRoots,
    /// Channel to send triggers to the BuildCoordinator
    coordinator_tx: mpsc::Sender<CoordinatorMsg>,
    /// Debouncer state
    debouncer: Debouncer<ChangeEvent>,
    /// Project configuration for file classification
    config: Arc<CrownConfig>,
}

impl FsActor {
    /// Create a new FsActor with Watcher-First pattern
    ///
    /// The watcher starts immediately, buffering events while the caller
    /// performs the initial build.
    pub fn new(
        config: Arc<CrownConfig>,
        coordinator_tx: mpsc::Sender<CoordinatorMsg>,
    ) -> notify::Result<Self> {
        // Create sync channel for notify (it doesn't support async)
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        // Missing roots are re-attached once they appear
        let mut watch_roots = WatchRoots::new(collect_watch_roots(&config));
        watch_roots.attach_existing(&mut watcher)?;
        crate::debug_do! {
            for path in watch_roots.paths() {
                crate::log!("watch"; "watching {}", config.root_relative(path));
            }
        }

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            coordinator_tx,
            debouncer: Debouncer::new(config.watch.debounce()),
            config,
        })
    }

    /// Run the actor event loop until the coordinator goes away.
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            coordinator_tx,
            mut debouncer,
            config,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Poll notify on a plain thread and forward into tokio
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => {
                    let Some(event) = event else { break };
                    for change in changes_from_event(&event, &config) {
                        crate::debug!(
                            "watch";
                            "{} {} ({})",
                            change.kind.label(),
                            config.root_relative(&change.path),
                            change.category.label()
                        );
                        debouncer.notify(change);
                    }
                }
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    watch_roots.maintain(&mut watcher);
                    let Some(change) = debouncer.take_if_ready() else { continue };
                    if coordinator_tx.send(CoordinatorMsg::Trigger(change)).await.is_err() {
                        break;
                    }
                }
            }
        }

        crate::debug!("watch"; "stopped");
    }
}

/// Turn one raw notify event into classified changes.
///
/// Irrelevant paths (outputs, temp files, unwatched siblings) and
/// directories are dropped. Kinds are reconciled with what is on disk:
/// a "modified" path that is gone was removed, a "removed" path that
/// exists again was an atomic save.
fn changes_from_event(event: &notify::Event, config: &CrownConfig) -> Vec<ChangeEvent> {
    let Some(kind) = ChangeKind::from_notify(&event.kind) else {
        return Vec::new();
    };

    event
        .paths
        .iter()
        .map(|p| normalize_path(p))
        .filter(|p| !p.is_dir() && classifier::is_relevant(p, config))
        .filter_map(|path| {
            let exists = path.exists();
            let kind = match kind {
                ChangeKind::Added if !exists => return None,
                ChangeKind::Modified if !exists => ChangeKind::Removed,
                ChangeKind::Removed if exists => ChangeKind::Modified,
                other => other,
            };
            Some(ChangeEvent::new(classify(&path, config), path, kind))
        })
        .collect()
}

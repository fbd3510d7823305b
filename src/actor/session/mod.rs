//! Watch Session - wires up and runs the actor system
//!
//! A thin orchestrator: it creates the channels, starts the watcher, runs
//! the initial build and then hands control to the actors.
//!
//! ```text
//! FsActor --Trigger--> BuildCoordinator --> Observers --> WsActor
//! (watch)              (state + pipeline)   (terminal)    (broadcast)
//! ```
//!
//! Startup is Watcher-First: the watcher is attached before the initial
//! build, so edits made while it runs are buffered and trigger a rebuild
//! instead of being lost.

mod runtime;

use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::coordinator::BuildCoordinator;
use super::fs::FsActor;
use super::messages::{CoordinatorMsg, WsMsg};
use super::ws::WsActor;
use crate::config::CrownConfig;
use crate::observer::{LiveReloadObserver, Observer, ObserverSet, TerminalObserver};
use crate::pipeline::{BuildPipeline, Pipeline};
use crate::reload::server::start_ws_server_with_channel;

/// Channel buffer size
const CHANNEL_BUFFER: usize = 32;

/// A bound live-reload socket and the channel feeding its actor.
pub struct LiveReload {
    tx: mpsc::Sender<WsMsg>,
    rx: mpsc::Receiver<WsMsg>,
    port: u16,
}

impl LiveReload {
    /// Bind the WebSocket server, probing upward from `base_port`.
    pub fn bind(base_port: u16) -> Result<Self> {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER);
        let port = start_ws_server_with_channel(base_port, tx.clone())?;
        crate::debug!("reload"; "websocket on port {}", port);
        Ok(Self { tx, rx, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Watch Session - owns one watch or dev run
pub struct WatchSession {
    config: Arc<CrownConfig>,
    pipeline: Arc<dyn Pipeline>,
    live_reload: Option<LiveReload>,
    shutdown_rx: Option<Receiver<()>>,
}

impl WatchSession {
    /// Create from Arc<CrownConfig> with the real build pipeline
    pub fn with_config(config: Arc<CrownConfig>) -> Self {
        let pipeline = Arc::new(BuildPipeline::new(Arc::clone(&config)));
        Self {
            config,
            pipeline,
            live_reload: None,
            shutdown_rx: None,
        }
    }

    /// Replace the build pipeline
    pub fn with_pipeline(mut self, pipeline: Arc<dyn Pipeline>) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Push build events to preview clients
    pub fn with_live_reload(mut self, live_reload: LiveReload) -> Self {
        self.live_reload = Some(live_reload);
        self
    }

    /// Set shutdown signal receiver
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run until the shutdown signal fires (or, without one, until an
    /// actor stops).
    pub async fn run(self) -> Result<()> {
        let Self {
            config,
            pipeline,
            live_reload,
            shutdown_rx,
        } = self;

        let (coordinator_tx, coordinator_rx) = mpsc::channel::<CoordinatorMsg>(CHANNEL_BUFFER);

        let fs_actor = FsActor::new(Arc::clone(&config), coordinator_tx.clone())
            .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;

        let mut observers = ObserverSet::new().with(TerminalObserver::new(config.get_root()));
        let mut ws = None;
        if let Some(live) = live_reload {
            observers = observers.with(LiveReloadObserver::new(live.tx.clone(), config.get_root()));
            ws = Some((WsActor::new(live.rx), live.tx));
        }
        let observer: Arc<dyn Observer> = Arc::new(observers);

        crate::log!("watch"; "watching {}", config.get_root().display());
        initial_build(&pipeline, observer.as_ref()).await;

        let coordinator = BuildCoordinator::new(
            coordinator_rx,
            pipeline,
            observer,
            config.watch.backpressure,
        );

        crate::debug!("actor"; "start");
        runtime::run_actors(fs_actor, coordinator, ws, coordinator_tx, shutdown_rx).await;
        crate::debug!("actor"; "stopped");
        Ok(())
    }
}

/// The build that runs before any trigger is accepted.
///
/// A failure is reported like any other; watching starts regardless.
async fn initial_build(pipeline: &Arc<dyn Pipeline>, observer: &dyn Observer) {
    observer.on_build_start();
    let task = Arc::clone(pipeline);
    let attempt = tokio::task::spawn_blocking(move || task.execute())
        .await
        .unwrap_or_else(|e| crate::pipeline::BuildAttempt::crashed(format!("build task failed: {e}")));
    observer.on_build_result(&attempt);
}

#[cfg(test)]
mod tests;

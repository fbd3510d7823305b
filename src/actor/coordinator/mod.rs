//! Build Coordinator
//!
//! The only stateful actor. Receives coalesced triggers and decides:
//!
//! - `Config` trigger → restart-required notification, never a build
//! - anything else while `Idle` → start a build
//! - anything else while `Building` → defer one rebuild or drop, per
//!   `[watch] backpressure`
//!
//! Builds run on the blocking pool so the actor keeps receiving (and the
//! FsActor keeps coalescing) while the renderer works. A failed build is
//! just a `BuildAttempt` with `succeeded == false`; the loop carries on.

mod state;

#[cfg(test)]
mod tests;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::{sync::mpsc, task::JoinHandle};

pub use state::{Admission, BuildState};

use super::fs::{Category, ChangeEvent};
use super::messages::CoordinatorMsg;
use crate::config::Backpressure;
use crate::observer::Observer;
use crate::pipeline::{BuildAttempt, Pipeline};

/// Build Coordinator actor
pub struct BuildCoordinator {
    rx: mpsc::Receiver<CoordinatorMsg>,
    pipeline: Arc<dyn Pipeline>,
    observer: Arc<dyn Observer>,
    state: Arc<BuildState>,
    policy: Backpressure,
    stopping: Arc<AtomicBool>,
}

impl BuildCoordinator {
    pub fn new(
        rx: mpsc::Receiver<CoordinatorMsg>,
        pipeline: Arc<dyn Pipeline>,
        observer: Arc<dyn Observer>,
        policy: Backpressure,
    ) -> Self {
        Self {
            rx,
            pipeline,
            observer,
            state: Arc::new(BuildState::new()),
            policy,
            stopping: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set to stop admitting builds ahead of `Shutdown`, which may sit
    /// behind triggers already queued in the channel.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stopping)
    }

    /// Run until `Shutdown` or every sender is gone, then wait for the
    /// in-flight build (there is no cancellation).
    pub async fn run(mut self) {
        let mut in_flight: Option<JoinHandle<()>> = None;

        while let Some(msg) = self.rx.recv().await {
            match msg {
                CoordinatorMsg::Trigger(event) => {
                    if let Some(handle) = self.on_trigger(&event) {
                        in_flight = Some(handle);
                    }
                }
                CoordinatorMsg::Shutdown => {
                    self.stopping.store(true, Ordering::Release);
                    crate::debug!("coordinator"; "shutting down");
                    break;
                }
            }
        }

        if let Some(handle) = in_flight
            && !handle.is_finished()
        {
            crate::debug!("coordinator"; "waiting for in-flight build");
            let _ = handle.await;
        }
    }

    fn on_trigger(&self, event: &ChangeEvent) -> Option<JoinHandle<()>> {
        if self.stopping.load(Ordering::Acquire) {
            crate::debug!("coordinator"; "shutting down, ignored: {}", event.path.display());
            return None;
        }
        if event.category == Category::Config {
            self.observer.on_restart_required(&event.path);
            return None;
        }

        match self.state.admit(self.policy) {
            Admission::Start => Some(self.spawn_build()),
            Admission::Deferred => {
                crate::debug!("coordinator"; "build running, rebuild queued: {}", event.path.display());
                None
            }
            Admission::Dropped => {
                crate::debug!("coordinator"; "build running, dropped: {}", event.path.display());
                None
            }
        }
    }

    /// Run builds until the state returns to `Idle`.
    ///
    /// The state is settled before observers hear the result, so a trigger
    /// sent in reaction to a result always finds the coordinator idle. A
    /// queued rebuild is skipped once shutdown has begun.
    fn spawn_build(&self) -> JoinHandle<()> {
        let pipeline = Arc::clone(&self.pipeline);
        let observer = Arc::clone(&self.observer);
        let state = Arc::clone(&self.state);
        let stopping = Arc::clone(&self.stopping);

        tokio::spawn(async move {
            loop {
                observer.on_build_start();

                let task = Arc::clone(&pipeline);
                let attempt = tokio::task::spawn_blocking(move || task.execute())
                    .await
                    .unwrap_or_else(|e| BuildAttempt::crashed(format!("build task failed: {e}")));

                let again = state.finish();
                observer.on_build_result(&attempt);

                if !again {
                    break;
                }
                if stopping.load(Ordering::Acquire) {
                    state.finish();
                    crate::debug!("coordinator"; "shutting down, queued rebuild skipped");
                    break;
                }
                crate::debug!("coordinator"; "changes arrived during build, rebuilding");
            }
        })
    }
}

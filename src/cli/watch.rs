//! `crown watch`: rebuild on every source change until Ctrl+C.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Result, anyhow};
use crossbeam::channel;

use crate::actor::WatchSession;
use crate::config::CrownConfig;
use crate::core::register_shutdown;

/// Run a watch session in the foreground.
pub fn watch(config: Arc<CrownConfig>) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = channel::unbounded();
    register_shutdown(shutdown_tx);

    let session = WatchSession::with_config(config).with_shutdown_signal(shutdown_rx);
    spawn_session(session)
        .join()
        .map_err(|_| anyhow!("watch session panicked"))?
}

/// Run the actor system on its own thread with its own tokio runtime.
pub fn spawn_session(session: WatchSession) -> JoinHandle<Result<()>> {
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        rt.block_on(session.run())
    })
}

/// Wait for the session to finish its in-flight build (bounded).
pub fn wait_for_shutdown(handle: JoinHandle<Result<()>>, limit: Duration) -> Result<()> {
    let step = Duration::from_millis(50);
    let mut waited = Duration::ZERO;
    while !handle.is_finished() {
        if waited >= limit {
            crate::debug!("watch"; "session still busy after {:?}, exiting", limit);
            return Ok(());
        }
        thread::sleep(step);
        waited += step;
    }
    handle
        .join()
        .map_err(|_| anyhow!("watch session panicked"))?
}

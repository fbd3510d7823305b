use std::sync::atomic::Ordering;
use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::coordinator::BuildCoordinator;
use crate::actor::fs::FsActor;
use crate::actor::messages::{CoordinatorMsg, WsMsg};
use crate::actor::ws::WsActor;

const SHUTDOWN_POLL: Duration = Duration::from_millis(100);
const WS_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

/// Run all actors concurrently, then tear down in order: watcher first so
/// no new triggers arrive, then the coordinator (which drops queued
/// triggers and waits for its in-flight build), then the WebSocket clients.
pub(super) async fn run_actors(
    fs: FsActor,
    coordinator: BuildCoordinator,
    ws: Option<(WsActor, mpsc::Sender<WsMsg>)>,
    coordinator_tx: mpsc::Sender<CoordinatorMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let stopping = coordinator.stop_flag();
    let mut fs_handle = tokio::spawn(fs.run());
    let mut coordinator_handle = tokio::spawn(coordinator.run());
    let ws = ws.map(|(actor, tx)| (tokio::spawn(actor.run()), tx));

    if let Some(rx) = shutdown_rx {
        // Poll-based since the signal is a crossbeam channel
        loop {
            if rx.try_recv().is_ok() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            if fs_handle.is_finished() || coordinator_handle.is_finished() {
                break;
            }
            tokio::time::sleep(SHUTDOWN_POLL).await;
        }
    } else {
        tokio::select! {
            _ = &mut fs_handle => {}
            _ = &mut coordinator_handle => {}
        }
    }

    stopping.store(true, Ordering::Release);
    fs_handle.abort();
    let _ = fs_handle.await;

    let _ = coordinator_tx.send(CoordinatorMsg::Shutdown).await;
    drop(coordinator_tx);
    let _ = coordinator_handle.await;

    if let Some((handle, tx)) = ws {
        let _ = tx.send(WsMsg::Shutdown).await;
        let _ = tokio::time::timeout(WS_SHUTDOWN_TIMEOUT, handle).await;
    }
}

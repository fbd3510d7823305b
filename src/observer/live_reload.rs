use std::path::{Path, PathBuf};

use tokio::sync::mpsc::{self, error::TrySendError};

use super::Observer;
use crate::actor::messages::WsMsg;
use crate::pipeline::BuildAttempt;
use crate::reload::message::HotReloadMessage;
use crate::utils::path::to_slash;

/// Pushes build events to preview clients through the WsActor.
///
/// Uses `try_send`: a full queue drops the message instead of stalling the
/// coordinator. No connected clients is not an error.
pub struct LiveReloadObserver {
    tx: mpsc::Sender<WsMsg>,
    root: PathBuf,
}

impl LiveReloadObserver {
    pub fn new(tx: mpsc::Sender<WsMsg>, root: impl Into<PathBuf>) -> Self {
        Self {
            tx,
            root: root.into(),
        }
    }

    fn push(&self, message: HotReloadMessage) {
        match self.tx.try_send(WsMsg::Broadcast(message)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => crate::debug!("reload"; "queue full, dropped message"),
            Err(TrySendError::Closed(_)) => crate::debug!("reload"; "websocket actor stopped"),
        }
    }
}

impl Observer for LiveReloadObserver {
    fn on_build_start(&self) {
        self.push(HotReloadMessage::building());
    }

    fn on_build_result(&self, attempt: &BuildAttempt) {
        let message = if attempt.succeeded {
            HotReloadMessage::success(attempt.duration_ms)
        } else {
            HotReloadMessage::error(attempt.error_text())
        };
        self.push(message);
    }

    fn on_restart_required(&self, path: &Path) {
        self.push(HotReloadMessage::restart(to_slash(path, &self.root)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect(rx: &mut mpsc::Receiver<WsMsg>) -> HotReloadMessage {
        match rx.try_recv().unwrap() {
            WsMsg::Broadcast(message) => message,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_lifecycle_messages() {
        let (tx, mut rx) = mpsc::channel(8);
        let observer = LiveReloadObserver::new(tx, "/book");

        observer.on_build_start();
        assert_eq!(expect(&mut rx), HotReloadMessage::building());

        let mut attempt = BuildAttempt::crashed("template error: x");
        observer.on_build_result(&attempt);
        assert_eq!(expect(&mut rx), HotReloadMessage::error("template error: x"));

        attempt.succeeded = true;
        attempt.duration_ms = 40;
        observer.on_build_result(&attempt);
        assert_eq!(expect(&mut rx), HotReloadMessage::success(40));

        observer.on_restart_required(Path::new("/book/crown.toml"));
        assert_eq!(expect(&mut rx), HotReloadMessage::restart("crown.toml"));
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let (tx, mut rx) = mpsc::channel(1);
        let observer = LiveReloadObserver::new(tx, "/book");

        observer.on_build_start();
        observer.on_build_start();

        assert_eq!(expect(&mut rx), HotReloadMessage::building());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        LiveReloadObserver::new(tx, "/book").on_build_start();
    }
}

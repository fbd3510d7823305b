//! WebSocket Actor
//!
//! Owns the preview connections. Build events arrive as
//! `WsMsg::Broadcast` and go to every client; the last build error is kept
//! so a client that connects (or reconnects) mid-failure sees it at once.
//!
//! ```text
//! LiveReloadObserver --[Broadcast]--> WsActor --> Clients
//! ws acceptor        --[AddClient]----^
//! ```

mod client_io;

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::WsMsg;
use crate::reload::message::HotReloadMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    clients: Clients,
    /// Last build error, replayed to new clients until a build succeeds
    pending_error: Arc<Mutex<Option<HotReloadMessage>>>,
    stopped: Arc<AtomicBool>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            pending_error: Arc::new(Mutex::new(None)),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients = Arc::clone(&self.clients);
        let stopped = Arc::clone(&self.stopped);
        std::thread::spawn(move || client_io::reader_loop(clients, stopped));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Broadcast(message) => {
                    self.remember(&message);
                    self.broadcast(Message::Text(message.to_json().into()));
                }
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    break;
                }
            }
        }

        self.stopped.store(true, Ordering::Release);
        for mut ws in self.clients.lock().drain(..) {
            let _ = ws.close(None);
        }
    }

    fn remember(&self, message: &HotReloadMessage) {
        match message {
            HotReloadMessage::Error { .. } => *self.pending_error.lock() = Some(message.clone()),
            HotReloadMessage::Success { .. } => *self.pending_error.lock() = None,
            _ => {}
        }
    }

    /// Broadcast a message to all connected clients
    fn broadcast(&self, msg: Message) {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        let count = clients.len();
        clients.retain_mut(|ws| match ws.send(msg.clone()) {
            Ok(_) => true,
            Err(e) => {
                crate::debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", count);
    }

    #[cfg(test)]
    fn client_count(&self) -> usize {
        self.clients.lock().len()
    }
}

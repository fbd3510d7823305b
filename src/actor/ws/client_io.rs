use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tungstenite::protocol::Message;

use super::{Clients, WsActor};
use crate::reload::message::HotReloadMessage;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

impl WsActor {
    /// Handshake a new connection and bring it up to date.
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Blocking during the handshake, non-blocking afterwards for polling
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                return;
            }
        };

        let connected = HotReloadMessage::connected();
        if let Err(e) = ws.send(Message::Text(connected.to_json().into())) {
            crate::log!("ws"; "failed to send connected message: {}", e);
            return;
        }

        if let Some(ref error) = *self.pending_error.lock() {
            if let Err(e) = ws.send(Message::Text(error.to_json().into())) {
                crate::log!("ws"; "failed to send pending error: {}", e);
            } else {
                crate::debug!("ws"; "sent pending error to new client");
            }
        }

        let _ = ws.get_ref().set_nonblocking(true);

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }
}

/// Poll clients for close frames and broken sockets.
///
/// Clients never send anything meaningful; reading is only how a closed
/// tab is noticed between broadcasts.
pub(super) fn reader_loop(clients: Clients, stopped: Arc<AtomicBool>) {
    while !stopped.load(Ordering::Acquire) {
        std::thread::sleep(POLL_INTERVAL);

        clients.lock().retain_mut(|ws| match ws.read() {
            Ok(Message::Close(_)) => false,
            Ok(_) => true,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                true
            }
            Err(_) => false,
        });
    }
}

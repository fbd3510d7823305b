//! Actor Message Definitions
//!
//! Message types for inter-actor communication.
//!
//! ```text
//! FsActor --Trigger--> BuildCoordinator --observers--> WsActor
//! ```

use crate::actor::fs::ChangeEvent;
use crate::reload::message::HotReloadMessage;

// =============================================================================
// BuildCoordinator Messages
// =============================================================================

/// Messages to the Build Coordinator
#[derive(Debug)]
pub enum CoordinatorMsg {
    /// A coalesced filesystem change
    Trigger(ChangeEvent),
    /// Stop accepting triggers; waits for an in-flight build
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Push to every client
    Broadcast(HotReloadMessage),
    /// Add client
    AddClient(std::net::TcpStream),
    /// Close all clients and stop
    Shutdown,
}

//! Reload Module
//!
//! WebSocket-based live reload for `crown dev`.
//!
//! ```text
//! BuildCoordinator -> LiveReloadObserver -> WsActor -> Browser
//! ```
//!
//! # Modules
//!
//! - `message` - Live reload message types (building, success, error, restart)
//! - `server` - WebSocket server for client connections

pub mod message;
pub mod server;

//! Actor System for Watch Mode
//!
//! Message-passing concurrency for `watch` and `dev`:
//!
//! ```text
//! FsActor --> BuildCoordinator --> Observers --> WsActor
//! (watch)     (state + pipeline)   (fan-out)     (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher, classifier and debouncer
//! - `coordinator` - Build state machine and backpressure
//! - `ws` - WebSocket broadcast
//! - `session` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod session;
pub mod ws;

pub use session::{LiveReload, WatchSession};

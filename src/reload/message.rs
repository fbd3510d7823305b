//! Live Reload Message Protocol
//!
//! JSON messages pushed to preview clients over WebSocket.
//!
//! # Message Types
//!
//! - `building`: a build started
//! - `success`: a build finished, with its duration in milliseconds
//! - `error`: a build failed, with the joined error text
//! - `restart`: `crown.toml` changed; the session must be relaunched
//! - `connected`: handshake greeting with the server version

use serde::{Deserialize, Serialize};

/// Live reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    /// Build started (no payload)
    Building,

    /// Build succeeded; the client reloads the PDF
    Success {
        /// Build duration in milliseconds
        duration: u64,
    },

    /// Build failed (display overlay, keep the old PDF)
    Error {
        /// Errors joined by newlines
        message: String,
    },

    /// Configuration changed; nothing rebuilds until restart
    Restart {
        /// Root-relative path of the changed file
        path: String,
    },

    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },
}

impl HotReloadMessage {
    pub fn building() -> Self {
        Self::Building
    }

    pub fn success(duration_ms: u64) -> Self {
        Self::Success {
            duration: duration_ms,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn restart(path: impl Into<String>) -> Self {
        Self::Restart { path: path.into() }
    }

    /// Create a connected message
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"building"}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_has_no_payload() {
        assert_eq!(HotReloadMessage::building().to_json(), r#"{"type":"building"}"#);
    }

    #[test]
    fn test_success_carries_duration() {
        assert_eq!(
            HotReloadMessage::success(812).to_json(),
            r#"{"type":"success","duration":812}"#
        );
    }

    #[test]
    fn test_error_message() {
        let json = HotReloadMessage::error("template error: x\nPDF renderer failed: y").to_json();
        assert!(json.contains(r#""type":"error""#));
        assert_eq!(
            HotReloadMessage::from_json(&json),
            Some(HotReloadMessage::error("template error: x\nPDF renderer failed: y"))
        );
    }

    #[test]
    fn test_restart_and_connected() {
        assert_eq!(
            HotReloadMessage::restart("crown.toml").to_json(),
            r#"{"type":"restart","path":"crown.toml"}"#
        );
        let json = HotReloadMessage::connected().to_json();
        assert!(json.starts_with(r#"{"type":"connected","version":""#));
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert_eq!(HotReloadMessage::from_json(r#"{"type":"patch"}"#), None);
    }
}

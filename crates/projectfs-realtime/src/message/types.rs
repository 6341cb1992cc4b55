//! Inbound and outbound WebSocket message type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use projectfs_core::events::{DiskChange, RecycleBinEvent};
use projectfs_core::types::ProjectId;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Subscribe to `project:{id}` or `client:{id}`.
    Subscribe {
        /// Channel name.
        channel: String,
    },
    /// Unsubscribe from a channel. The project watch keeps running.
    Unsubscribe {
        /// Channel name.
        channel: String,
    },
    /// Pong response to server ping.
    Pong {
        /// Echoed timestamp.
        timestamp: i64,
    },
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    /// Subscription confirmed.
    Subscribed {
        /// Channel name.
        channel: String,
    },
    /// Unsubscription confirmed.
    Unsubscribed {
        /// Channel name.
        channel: String,
    },
    /// Something changed under a watched project folder.
    FileChange(DiskChange),
    /// Content entered or left the recycle bin.
    RecycleBin(RecycleBinEvent),
    /// A client reported that it changed the tree.
    FolderTreeUpdated {
        /// Project whose tree changed.
        project_id: ProjectId,
        /// Acting user.
        updated_by: String,
        /// When it was reported.
        timestamp: DateTime<Utc>,
    },
    /// Ping (server keepalive).
    Ping {
        /// Server timestamp.
        timestamp: i64,
    },
    /// Error message.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
}

impl OutboundMessage {
    /// An error frame.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}

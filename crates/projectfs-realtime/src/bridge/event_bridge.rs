//! Disk change and recycle bin event → channel mapping.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use projectfs_core::events::{DiskChange, RecycleBinEvent};
use projectfs_core::types::ProjectId;

use crate::channel::types::ChannelType;
use crate::connection::manager::ConnectionManager;
use crate::message::types::OutboundMessage;

/// Bridges domain events into the realtime system.
#[derive(Debug, Clone)]
pub struct EventBridge {
    connections: Arc<ConnectionManager>,
}

impl EventBridge {
    /// Create a new event bridge
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    /// Relay a disk change to the project's channel.
    pub fn on_disk_change(&self, change: DiskChange) -> usize {
        let channel = ChannelType::Project(change.project_id);
        self.connections
            .dispatch_to_channel(&channel, &OutboundMessage::FileChange(change))
    }

    /// Relay a recycle bin event to its project and client channels.
    pub fn on_recycle_bin_event(&self, event: RecycleBinEvent) -> usize {
        let msg = OutboundMessage::RecycleBin(event.clone());
        let mut delivered = self
            .connections
            .dispatch_to_channel(&ChannelType::Client(event.client_id), &msg);
        if let Some(project_id) = event.project_id {
            delivered += self
                .connections
                .dispatch_to_channel(&ChannelType::Project(project_id), &msg);
        }
        delivered
    }

    /// Tell a project's subscribers to refetch the tree.
    pub fn on_folder_tree_updated(&self, project_id: ProjectId, updated_by: &str) -> usize {
        let msg = OutboundMessage::FolderTreeUpdated {
            project_id,
            updated_by: updated_by.to_string(),
            timestamp: Utc::now(),
        };
        self.connections
            .dispatch_to_channel(&ChannelType::Project(project_id), &msg)
    }

    /// Forward every disk change until the sender closes.
    pub fn forward_disk_changes(&self, mut rx: broadcast::Receiver<DiskChange>) -> JoinHandle<()> {
        let bridge = self.clone();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change) => {
                        let delivered = bridge.on_disk_change(change);
                        debug!(delivered, "Relayed disk change");
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "Disk change relay lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Forward every recycle bin event until the sender closes.
    pub fn forward_recycle_bin_events(
        &self,
        mut rx: broadcast::Receiver<RecycleBinEvent>,
    ) -> JoinHandle<()> {
        let bridge = self.clone();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        let delivered = bridge.on_recycle_bin_event(event);
                        debug!(delivered, "Relayed recycle bin event");
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "Recycle bin relay lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

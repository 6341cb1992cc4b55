//! Connection manager: registration, inbound handling, and channel dispatch.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use projectfs_core::config::RealtimeConfig;

use crate::channel::registry::ChannelRegistry;
use crate::channel::types::ChannelType;
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::watcher::DiskWatcher;

use super::handle::{ConnectionHandle, ConnectionId};

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Live connections.
    pool: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    /// Channel registry.
    channels: Arc<ChannelRegistry>,
    /// Shared project watchers.
    watcher: Arc<DiskWatcher>,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        channels: Arc<ChannelRegistry>,
        watcher: Arc<DiskWatcher>,
    ) -> Self {
        Self {
            pool: DashMap::new(),
            channels,
            watcher,
            config,
        }
    }

    /// Registers a new connection.
    ///
    /// Returns the connection handle and a receiver for outbound messages.
    pub fn register(
        &self,
        user_id: &str,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(user_id, tx));
        self.pool.insert(handle.id, handle.clone());
        info!(conn_id = %handle.id, user_id, "WebSocket connection registered");
        (handle, rx)
    }

    /// Unregisters a connection and cleans up subscriptions.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some((_, handle)) = self.pool.remove(conn_id) {
            handle.mark_dead();
            self.channels.unsubscribe_all(*conn_id);
            info!(conn_id = %conn_id, user_id = %handle.user_id, "WebSocket connection unregistered");
        }
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.pool.len()
    }

    /// Send `msg` to every subscriber of `channel`. Returns how many
    /// connections accepted it.
    pub fn dispatch_to_channel(&self, channel: &ChannelType, msg: &OutboundMessage) -> usize {
        let mut delivered = 0;
        for conn_id in self.channels.get_subscribers(channel) {
            if let Some(handle) = self.pool.get(&conn_id) {
                if handle.send(msg.clone()) {
                    delivered += 1;
                }
            }
        }
        delivered
    }

    /// Processes an inbound message from a client.
    pub async fn handle_inbound(&self, conn_id: &ConnectionId, raw_message: &str) {
        let Some(handle) = self.pool.get(conn_id).map(|h| h.clone()) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };

        let msg: InboundMessage = match serde_json::from_str(raw_message) {
            Ok(m) => m,
            Err(e) => {
                handle.send(OutboundMessage::error(
                    "INVALID_MESSAGE",
                    format!("Failed to parse message: {e}"),
                ));
                return;
            }
        };

        match msg {
            InboundMessage::Subscribe { channel } => self.handle_subscribe(&handle, &channel).await,
            InboundMessage::Unsubscribe { channel } => {
                if let Some(parsed) = ChannelType::parse(&channel) {
                    self.channels.unsubscribe(parsed, handle.id);
                }
                handle.send(OutboundMessage::Unsubscribed { channel });
            }
            InboundMessage::Pong { .. } => {}
        }
    }

    /// Handles a subscribe request. Project channels make sure the shared
    /// watch is running.
    async fn handle_subscribe(&self, handle: &ConnectionHandle, channel: &str) {
        let Some(parsed) = ChannelType::parse(channel) else {
            handle.send(OutboundMessage::error(
                "INVALID_CHANNEL",
                format!("Unknown channel: {channel}"),
            ));
            return;
        };

        let current = self.channels.subscription_count(handle.id);
        if current >= self.config.max_subscriptions_per_connection {
            handle.send(OutboundMessage::error(
                "MAX_SUBSCRIPTIONS",
                format!(
                    "Maximum subscriptions ({}) reached",
                    self.config.max_subscriptions_per_connection
                ),
            ));
            return;
        }

        if let ChannelType::Project(project_id) = parsed {
            if let Err(e) = self.watcher.start_watch(project_id).await {
                handle.send(OutboundMessage::error(e.kind.to_string(), e.message));
                return;
            }
        }

        self.channels.subscribe(parsed, handle.id);
        handle.send(OutboundMessage::Subscribed {
            channel: channel.to_string(),
        });
        debug!(conn_id = %handle.id, channel, "Subscribed to channel");
    }
}

//! Reverse index from connections to channels.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

use super::types::ChannelType;

/// Tracks which channels each connection is subscribed to.
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    conn_to_channels: DashMap<ConnectionId, HashSet<ChannelType>>,
}

impl SubscriptionTracker {
    /// Creates a new subscription tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a subscription. Returns `false` if it already existed.
    pub fn add(&self, conn_id: ConnectionId, channel: ChannelType) -> bool {
        self.conn_to_channels
            .entry(conn_id)
            .or_default()
            .insert(channel)
    }

    /// Removes a subscription. Returns whether it existed.
    pub fn remove(&self, conn_id: ConnectionId, channel: &ChannelType) -> bool {
        self.conn_to_channels
            .get_mut(&conn_id)
            .map(|mut channels| channels.remove(channel))
            .unwrap_or(false)
    }

    /// Returns the number of subscriptions for a connection.
    pub fn count(&self, conn_id: ConnectionId) -> usize {
        self.conn_to_channels
            .get(&conn_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Removes all subscriptions for a connection.
    pub fn remove_all(&self, conn_id: ConnectionId) -> HashSet<ChannelType> {
        self.conn_to_channels
            .remove(&conn_id)
            .map(|(_, channels)| channels)
            .unwrap_or_default()
    }
}

//! Channel registry: which connections listen where.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

use super::subscription::SubscriptionTracker;
use super::types::ChannelType;

/// Registry of all active channels.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    /// Channel → subscribed connections.
    channels: DashMap<ChannelType, HashSet<ConnectionId>>,
    /// Reverse index.
    subscriptions: SubscriptionTracker,
}

impl ChannelRegistry {
    /// Creates a new channel registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a channel. Returns `false` if it was
    /// already subscribed.
    pub fn subscribe(&self, channel: ChannelType, conn_id: ConnectionId) -> bool {
        self.channels.entry(channel).or_default().insert(conn_id);
        self.subscriptions.add(conn_id, channel)
    }

    /// Unsubscribes a connection from a channel.
    pub fn unsubscribe(&self, channel: ChannelType, conn_id: ConnectionId) -> bool {
        self.detach(&channel, conn_id);
        self.subscriptions.remove(conn_id, &channel)
    }

    /// Unsubscribes a connection from all channels.
    pub fn unsubscribe_all(&self, conn_id: ConnectionId) {
        for channel in self.subscriptions.remove_all(conn_id) {
            self.detach(&channel, conn_id);
        }
    }

    /// Returns all subscriber connection IDs for a channel.
    pub fn get_subscribers(&self, channel: &ChannelType) -> Vec<ConnectionId> {
        self.channels
            .get(channel)
            .map(|subs| subs.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the subscription count for a connection.
    pub fn subscription_count(&self, conn_id: ConnectionId) -> usize {
        self.subscriptions.count(conn_id)
    }

    /// Returns total number of active channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn detach(&self, channel: &ChannelType, conn_id: ConnectionId) {
        let now_empty = match self.channels.get_mut(channel) {
            Some(mut subs) => {
                subs.remove(&conn_id);
                subs.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.channels.remove_if(channel, |_, subs| subs.is_empty());
        }
    }
}

//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

use projectfs_core::config::RealtimeConfig;
use projectfs_core::events::RecycleBinEvent;

use crate::bridge::event_bridge::EventBridge;
use crate::channel::registry::ChannelRegistry;
use crate::connection::manager::ConnectionManager;
use crate::watcher::DiskWatcher;

/// Central real-time engine.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Channel registry.
    pub channels: Arc<ChannelRegistry>,
    /// Shared project watchers.
    pub watcher: Arc<DiskWatcher>,
    /// Domain event relay.
    pub bridge: EventBridge,
    /// Realtime settings.
    pub config: RealtimeConfig,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.connections.connection_count())
            .field("watching", &self.watcher.watched_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine around an existing watcher registry.
    pub fn new(config: RealtimeConfig, watcher: Arc<DiskWatcher>) -> Self {
        let channels = Arc::new(ChannelRegistry::new());
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            channels.clone(),
            watcher.clone(),
        ));
        let bridge = EventBridge::new(connections.clone());

        info!("Real-time engine initialized");

        Self {
            connections,
            channels,
            watcher,
            bridge,
            config,
        }
    }

    /// Start relaying disk changes and recycle bin events to subscribers.
    pub fn start_forwarding(
        &self,
        recycle_bin: broadcast::Receiver<RecycleBinEvent>,
    ) -> Vec<JoinHandle<()>> {
        vec![
            self.bridge.forward_disk_changes(self.watcher.subscribe()),
            self.bridge.forward_recycle_bin_events(recycle_bin),
        ]
    }

    /// Stop every watch.
    pub fn shutdown(&self) {
        let stopped = self.watcher.stop_all();
        info!(stopped, "Real-time engine shut down");
    }
}

//! Real-time fan-out of mutation events
//!
//! The registry of connected clients is owned here and handed to whoever
//! needs to publish. Delivery is fire-and-forget: `broadcast` never blocks
//! and a dead client never affects the others.

use catalog_core::CatalogEvent;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

pub type ClientId = Uuid;

pub struct Broadcaster {
    clients: DashMap<ClientId, mpsc::UnboundedSender<CatalogEvent>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
        }
    }

    /// Add a client; events arrive on the returned receiver
    pub fn register(&self) -> (ClientId, mpsc::UnboundedReceiver<CatalogEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.clients.insert(id, tx);
        info!(
            "Client registered for broadcasts: {} ({} connected)",
            id,
            self.clients.len()
        );
        (id, rx)
    }

    pub fn unregister(&self, id: &ClientId) {
        if self.clients.remove(id).is_some() {
            info!(
                "Client unregistered from broadcasts: {} ({} connected)",
                id,
                self.clients.len()
            );
        }
    }

    /// Publish an event to every connected client
    pub fn broadcast(&self, event: CatalogEvent) {
        debug!(
            "Broadcasting {} to {} clients",
            event.name(),
            self.clients.len()
        );
        for entry in self.clients.iter() {
            if entry.value().send(event.clone()).is_err() {
                debug!("Failed to deliver {} to client {}", event.name(), entry.key());
            }
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Drop every client; their receivers close
    pub fn close_all(&self) {
        let count = self.clients.len();
        self.clients.clear();
        info!("Closed {} broadcast clients", count);
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

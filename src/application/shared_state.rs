//! Snapshot store shared by the poller and the admin command
//!
//! Holds the last catalog document the poller saw and the channel change
//! notifications go to. All access goes through one tokio `RwLock`, and
//! documents are handed out as `Arc`s so a reader never observes a document
//! that is being replaced.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::domain::catalog::CatalogDocument;
use crate::domain::services::ChannelId;

/// Poller arming state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PollerState {
    /// No destination configured; ticks do nothing
    Idle,
    Armed(ChannelId),
}

#[derive(Debug, Default)]
pub struct SnapshotState {
    /// Starts absent, so the first successful fetch always counts as a change
    pub last_document: Option<Arc<CatalogDocument>>,
    /// Set by `setshopchannel`; never cleared once set
    pub notify_destination: Option<ChannelId>,
}

/// Cloneable handle to the process-wide snapshot state
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    state: Arc<RwLock<SnapshotState>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the poller, or move it to a new destination.
    /// Returns the previous destination, if any.
    pub async fn arm(&self, channel: ChannelId) -> Option<ChannelId> {
        let mut state = self.state.write().await;
        state.notify_destination.replace(channel)
    }

    pub async fn destination(&self) -> Option<ChannelId> {
        self.state.read().await.notify_destination
    }

    pub async fn poller_state(&self) -> PollerState {
        match self.destination().await {
            Some(channel) => PollerState::Armed(channel),
            None => PollerState::Idle,
        }
    }

    pub async fn last_document(&self) -> Option<Arc<CatalogDocument>> {
        self.state.read().await.last_document.clone()
    }

    /// Store `document` if it differs structurally from the last one.
    /// Returns the stored snapshot when it changed, `None` when it did not.
    pub async fn replace_if_changed(&self, document: CatalogDocument) -> Option<Arc<CatalogDocument>> {
        let mut state = self.state.write().await;
        if state.last_document.as_deref() == Some(&document) {
            return None;
        }

        let snapshot = Arc::new(document);
        state.last_document = Some(Arc::clone(&snapshot));
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::fixtures::{document, entry};

    #[tokio::test]
    async fn test_store_starts_idle() {
        let store = SnapshotStore::new();
        assert_eq!(store.poller_state().await, PollerState::Idle);
        assert!(store.last_document().await.is_none());
    }

    #[tokio::test]
    async fn test_rearming_replaces_destination() {
        let store = SnapshotStore::new();
        assert_eq!(store.arm(ChannelId(1)).await, None);
        assert_eq!(store.arm(ChannelId(2)).await, Some(ChannelId(1)));
        assert_eq!(store.poller_state().await, PollerState::Armed(ChannelId(2)));
    }

    #[tokio::test]
    async fn test_replace_only_on_structural_change() {
        let store = SnapshotStore::new();
        let first = document(vec![entry("Reaper", 1500, 1500)]);

        assert!(store.replace_if_changed(first.clone()).await.is_some());
        assert!(store.replace_if_changed(first.clone()).await.is_none());

        let repriced = document(vec![entry("Reaper", 1200, 1500)]);
        let stored = store.replace_if_changed(repriced.clone()).await.unwrap();
        assert_eq!(*stored, repriced);
        assert_eq!(store.last_document().await.as_deref(), Some(&repriced));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = SnapshotStore::new();
        let handle = store.clone();
        handle.arm(ChannelId(9)).await;
        assert_eq!(store.destination().await, Some(ChannelId(9)));
    }
}

//! Change poller
//!
//! On every tick: do nothing while idle, otherwise fetch the catalog, compare
//! it structurally with the last snapshot and push the full catalog to the
//! armed channel when it changed. Fetch failures are a silent skip.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::shared_state::{PollerState, SnapshotStore};
use crate::domain::presentation::{notification_pages, Page};
use crate::domain::services::{CatalogSource, ChannelId, NotificationSink};

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No destination configured
    Idle,
    FetchFailed,
    Unchanged,
    Notified { channel: ChannelId, pages: Vec<Page> },
    /// Snapshot was replaced but the sink rejected the pages
    DeliveryFailed { channel: ChannelId },
}

impl TickOutcome {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FetchFailed => "fetch-failed",
            Self::Unchanged => "unchanged",
            Self::Notified { .. } => "notified",
            Self::DeliveryFailed { .. } => "delivery-failed",
        }
    }
}

#[derive(Clone)]
pub struct ChangePoller {
    source: Arc<dyn CatalogSource>,
    sink: Arc<dyn NotificationSink>,
    store: SnapshotStore,
    interval: Duration,
}

impl ChangePoller {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        sink: Arc<dyn NotificationSink>,
        store: SnapshotStore,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            sink,
            store,
            interval,
        }
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Whole minutes between ticks, as shown in catalog page footers
    pub const fn interval_minutes(&self) -> u64 {
        self.interval.as_secs() / 60
    }

    /// Run one poll cycle
    pub async fn tick(&self) -> TickOutcome {
        let channel = match self.store.poller_state().await {
            PollerState::Idle => return TickOutcome::Idle,
            PollerState::Armed(channel) => channel,
        };

        let document = match self.source.fetch().await {
            Ok(document) => document,
            Err(e) => {
                debug!("Poll skipped: {}", e);
                return TickOutcome::FetchFailed;
            }
        };

        let Some(snapshot) = self.store.replace_if_changed(document).await else {
            debug!("Shop unchanged");
            return TickOutcome::Unchanged;
        };

        let pages = notification_pages(&snapshot, self.interval_minutes());
        info!("🆕 Shop changed: {} entries, sending {} pages to {}", snapshot.len(), pages.len(), channel);

        match self.sink.deliver(channel, &pages).await {
            Ok(()) => TickOutcome::Notified { channel, pages },
            Err(e) => {
                warn!("⚠️ Failed to deliver shop update to {}: {:#}", channel, e);
                TickOutcome::DeliveryFailed { channel }
            }
        }
    }

    /// Spawn the recurring task. The first tick runs immediately.
    pub fn start(self) -> PollerHandle {
        let token = CancellationToken::new();
        let child = token.child_token();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!("🔄 Shop poller started (every {:?})", self.interval);

            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {
                        let outcome = self.tick().await;
                        debug!("Poll tick finished: {}", outcome.label());
                    }
                }
            }

            info!("🛑 Shop poller stopped");
        });

        PollerHandle { token, join }
    }
}

/// Owner of a running poller task
pub struct PollerHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl PollerHandle {
    pub fn is_running(&self) -> bool {
        !self.join.is_finished()
    }

    /// Cancel the task and wait for it to finish its current tick
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.join.await {
            error!("❌ Shop poller task failed: {}", e);
        }
    }
}

//! Application context
//!
//! Wires the catalog source, notification sink, snapshot store, dispatcher
//! and poller together once at startup. Nothing here is global; the context
//! is built by `run()` and passed down explicitly.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::application::dispatcher::CommandDispatcher;
use crate::application::poller::{ChangePoller, PollerHandle};
use crate::application::shared_state::SnapshotStore;
use crate::domain::auth::{Actor, AuthPolicy};
use crate::domain::services::{CatalogSource, ChannelId, NotificationSink};
use crate::infrastructure::catalog_fetcher::CatalogFetcher;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http_client::{HttpClient, HttpClientConfig};
use crate::infrastructure::notify::{ConsoleSink, WebhookSink};

pub struct AppContext {
    pub config: AppConfig,
    pub store: SnapshotStore,
    pub dispatcher: Arc<CommandDispatcher>,
    pub poller: ChangePoller,
}

impl AppContext {
    /// Compose the application from explicit collaborators
    pub fn new(config: AppConfig, source: Arc<dyn CatalogSource>, sink: Arc<dyn NotificationSink>) -> Self {
        let store = SnapshotStore::new();
        let poller = ChangePoller::new(Arc::clone(&source), sink, store.clone(), config.poller.interval());
        let dispatcher = CommandDispatcher::new(
            source,
            store.clone(),
            AuthPolicy::new(config.bot.owner_id),
            poller.interval_minutes(),
        );

        Self {
            config,
            store,
            dispatcher: Arc::new(dispatcher),
            poller,
        }
    }

    /// Compose the application against the real upstream API. Webhook
    /// delivery is used when any webhook is configured, console output
    /// otherwise.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let client = Arc::new(HttpClient::new(HttpClientConfig::from(&config.catalog))?);
        let source: Arc<dyn CatalogSource> = Arc::new(CatalogFetcher::new(Arc::clone(&client), config.catalog.api_url.clone()));

        let sink: Arc<dyn NotificationSink> = if config.notifications.webhooks.is_empty() {
            info!("No webhooks configured, shop updates go to the console");
            Arc::new(ConsoleSink)
        } else {
            info!("{} webhook destinations configured", config.notifications.webhooks.len());
            Arc::new(WebhookSink::new(client, config.notifications.webhooks.clone()))
        };

        Ok(Self::new(config, source, sink))
    }

    /// Identity used for commands typed on the local console
    pub const fn console_actor(&self) -> Actor {
        Actor {
            id: self.config.bot.console_actor_id,
            is_administrator: self.config.bot.console_actor_is_admin,
        }
    }

    /// Arm from `poller.initial_channel`, then spawn the poller
    pub async fn start_poller(&self) -> PollerHandle {
        if let Some(channel) = self.config.poller.initial_channel {
            self.store.arm(ChannelId(channel)).await;
            info!("✅ Shop updates armed for {} from configuration", ChannelId(channel));
        }
        self.poller.clone().start()
    }
}

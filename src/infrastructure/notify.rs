//! Notification sinks
//!
//! `WebhookSink` posts each page as a Discord-style embed to the webhook
//! configured for the channel. `ConsoleSink` prints pages to stdout and is
//! used when no webhooks are configured.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::domain::presentation::Page;
use crate::domain::services::{ChannelId, NotificationSink};
use crate::infrastructure::http_client::HttpClient;

/// Discord embed structure for rich notifications
#[derive(Debug, Serialize, PartialEq)]
pub struct DiscordEmbed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<DiscordImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<DiscordImage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<DiscordField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<DiscordFooter>,
}

/// Thumbnail or full-size image
#[derive(Debug, Serialize, PartialEq)]
pub struct DiscordImage {
    pub url: String,
}

/// Key-value field for Discord embeds
#[derive(Debug, Serialize, PartialEq)]
pub struct DiscordField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DiscordFooter {
    pub text: String,
}

/// Discord webhook message payload
#[derive(Debug, Serialize, PartialEq)]
pub struct DiscordMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub embeds: Vec<DiscordEmbed>,
}

impl DiscordMessage {
    /// One message per page; the page banner becomes the message text
    pub fn from_page(page: &Page) -> Self {
        let fields = page.lines
            .iter()
            .map(|line| DiscordField {
                name: line.heading(),
                value: line.body(),
                inline: false,
            })
            .chain(page.fields.iter().map(|field| DiscordField {
                name: field.name.clone(),
                value: field.value.clone(),
                inline: field.inline,
            }))
            .collect();

        let embed = DiscordEmbed {
            title: page.title.clone(),
            description: page.description.clone(),
            color: page.color,
            timestamp: Utc::now().to_rfc3339(),
            thumbnail: page.thumbnail_url.clone().map(|url| DiscordImage { url }),
            image: page.image_url.clone().map(|url| DiscordImage { url }),
            fields,
            footer: page.footer.clone().map(|text| DiscordFooter { text }),
        };

        Self {
            content: page.banner.clone(),
            embeds: vec![embed],
        }
    }
}

/// Posts pages to per-channel webhooks
pub struct WebhookSink {
    client: Arc<HttpClient>,
    webhooks: HashMap<ChannelId, String>,
}

impl WebhookSink {
    pub fn new(client: Arc<HttpClient>, webhooks: HashMap<u64, String>) -> Self {
        Self {
            client,
            webhooks: webhooks
                .into_iter()
                .map(|(channel, url)| (ChannelId(channel), url))
                .collect(),
        }
    }

    pub fn has_webhook(&self, channel: ChannelId) -> bool {
        self.webhooks.contains_key(&channel)
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn deliver(&self, channel: ChannelId, pages: &[Page]) -> Result<()> {
        let url = self.webhooks
            .get(&channel)
            .with_context(|| format!("No webhook configured for channel {channel}"))?;

        for (index, page) in pages.iter().enumerate() {
            self.client
                .post_json(url, &DiscordMessage::from_page(page))
                .await
                .with_context(|| format!("Failed to deliver page {} of {} to {channel}", index + 1, pages.len()))?;
        }

        debug!("Delivered {} pages to {}", pages.len(), channel);
        Ok(())
    }
}

/// Prints pages to stdout
#[derive(Debug, Default)]
pub struct ConsoleSink;

#[async_trait]
impl NotificationSink for ConsoleSink {
    async fn deliver(&self, channel: ChannelId, pages: &[Page]) -> Result<()> {
        let mut text = format!("[{channel}]\n");
        for page in pages {
            text.push_str(&page.to_string());
            text.push('\n');
        }

        let mut stdout = tokio::io::stdout();
        stdout.write_all(text.as_bytes()).await?;
        stdout.flush().await?;

        info!("📣 Printed {} pages for {}", pages.len(), channel);
        Ok(())
    }
}

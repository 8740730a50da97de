//! Service ports
//!
//! Boundaries the application layer talks to: where catalog documents come
//! from and where change notifications go. Infrastructure provides the real
//! implementations; tests plug in in-memory ones.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::CatalogDocument;
use crate::domain::errors::ShopError;
use crate::domain::presentation::Page;

/// Upstream catalog source
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// One bounded fetch of the current catalog. Every failure collapses to
    /// `ShopError::FetchFailure`.
    async fn fetch(&self) -> Result<CatalogDocument, ShopError>;
}

/// Destination for change notifications (a text channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<#{}>", self.0)
    }
}

impl FromStr for ChannelId {
    type Err = std::num::ParseIntError;

    /// Accepts a bare id or a `<#id>` mention
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let raw = trimmed
            .strip_prefix("<#")
            .and_then(|rest| rest.strip_suffix('>'))
            .unwrap_or(trimmed);
        raw.parse().map(Self)
    }
}

/// Push delivery of rendered pages
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver `pages` to `channel` in order
    async fn deliver(&self, channel: ChannelId, pages: &[Page]) -> Result<()>;
}

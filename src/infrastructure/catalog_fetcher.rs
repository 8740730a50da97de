//! Catalog source backed by the upstream HTTP API

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::catalog::CatalogDocument;
use crate::domain::errors::ShopError;
use crate::domain::services::CatalogSource;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::shop_api::parse_catalog_document;

pub struct CatalogFetcher {
    client: Arc<HttpClient>,
    api_url: String,
}

impl CatalogFetcher {
    pub fn new(client: Arc<HttpClient>, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for CatalogFetcher {
    async fn fetch(&self) -> Result<CatalogDocument, ShopError> {
        let body = match self.client.get_text(&self.api_url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("⚠️ Shop fetch failed: {:#}", e);
                return Err(ShopError::fetch_failure(format!("{e:#}")));
            }
        };

        match parse_catalog_document(&body) {
            Ok(document) => {
                debug!("Fetched shop with {} entries", document.len());
                Ok(document)
            }
            Err(e) => {
                warn!("⚠️ Shop body rejected: {}", e);
                Err(e)
            }
        }
    }
}

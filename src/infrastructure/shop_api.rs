//! Upstream item shop wire format
//!
//! The API answers `{ "status": 200, "data": { "entries": [...] } }`. Only the
//! fields below are read; everything else in the body is ignored.

use serde::Deserialize;

use crate::domain::catalog::{CatalogDocument, CatalogEntry, Item, Labeled};
use crate::domain::constants::display;
use crate::domain::errors::ShopError;

#[derive(Debug, Deserialize)]
struct ShopResponse {
    #[serde(default)]
    data: Option<ShopData>,
}

#[derive(Debug, Deserialize)]
struct ShopData {
    #[serde(default)]
    entries: Option<Vec<WireEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEntry {
    #[serde(default)]
    regular_price: Option<u32>,
    #[serde(default)]
    final_price: Option<u32>,
    #[serde(default)]
    bundle: Option<WireBundle>,
    #[serde(default)]
    br_items: Option<Vec<WireItem>>,
}

#[derive(Debug, Deserialize)]
struct WireBundle {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    rarity: Option<WireLabel>,
    #[serde(default, rename = "type")]
    item_type: Option<WireLabel>,
    #[serde(default)]
    set: Option<WireSet>,
    #[serde(default)]
    images: Option<WireImages>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLabel {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    display_value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSet {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireImages {
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    featured: Option<String>,
}

/// Empty strings count as absent
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn label(wire: Option<WireLabel>, default_value: &str, default_label: &str) -> Labeled {
    let (value, display_value) = match wire {
        Some(WireLabel { value, display_value }) => (non_empty(value), non_empty(display_value)),
        None => (None, None),
    };
    Labeled::new(
        value.unwrap_or_else(|| default_value.to_string()),
        display_value.unwrap_or_else(|| default_label.to_string()),
    )
}

impl From<WireItem> for Item {
    fn from(wire: WireItem) -> Self {
        let (icon_url, featured_image_url) = match wire.images {
            Some(images) => (non_empty(images.icon), non_empty(images.featured)),
            None => (None, None),
        };

        Self {
            name: non_empty(wire.name).unwrap_or_else(|| display::UNKNOWN_ITEM.to_string()),
            description: wire.description.unwrap_or_default(),
            rarity: label(wire.rarity, display::DEFAULT_RARITY_VALUE, display::DEFAULT_RARITY_LABEL),
            item_type: label(wire.item_type, display::DEFAULT_TYPE_VALUE, display::DEFAULT_TYPE_LABEL),
            set_name: wire.set.and_then(|set| non_empty(set.text)),
            icon_url,
            featured_image_url,
        }
    }
}

impl WireEntry {
    /// `None` for entries without battle royale items
    fn into_domain(self) -> Option<CatalogEntry> {
        let items: Vec<Item> = self.br_items
            .unwrap_or_default()
            .into_iter()
            .map(Item::from)
            .collect();

        let bundle_name = self.bundle.map(|bundle| {
            non_empty(bundle.name).unwrap_or_else(|| display::UNKNOWN_BUNDLE.to_string())
        });

        CatalogEntry::new(self.final_price.unwrap_or(0), self.regular_price, bundle_name, items)
    }
}

/// Decode an upstream body into a catalog document
pub fn parse_catalog_document(body: &str) -> Result<CatalogDocument, ShopError> {
    let response: ShopResponse = serde_json::from_str(body)
        .map_err(|e| ShopError::fetch_failure(format!("malformed shop body: {e}")))?;

    let data = response.data
        .ok_or_else(|| ShopError::fetch_failure("shop body has no data"))?;
    let entries = data.entries
        .ok_or_else(|| ShopError::fetch_failure("shop body has no entries"))?;

    let wire_count = entries.len();
    let entries: Vec<CatalogEntry> = entries
        .into_iter()
        .filter_map(WireEntry::into_domain)
        .collect();

    if entries.len() < wire_count {
        tracing::debug!("Skipped {} shop entries without items", wire_count - entries.len());
    }

    Ok(CatalogDocument::new(entries))
}

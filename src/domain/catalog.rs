//! Catalog entities
//!
//! A `CatalogDocument` is one immutable snapshot of the item shop. A new fetch
//! always produces a new document; nothing here is mutated after construction.
//! Equality is structural over every field so the poller can detect changes
//! without relying on upstream timestamps.

use serde::{Deserialize, Serialize};

/// Machine value + display label pair (rarity, item type)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Labeled {
    pub value: String,
    pub label: String,
}

impl Labeled {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A single cosmetic item inside a shop entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub description: String,
    pub rarity: Labeled,
    #[serde(rename = "type")]
    pub item_type: Labeled,
    pub set_name: Option<String>,
    pub icon_url: Option<String>,
    pub featured_image_url: Option<String>,
}

impl Item {
    /// Case-insensitive exact name comparison
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// Case-insensitive substring match over name and description.
    /// `needle` must already be lowercased.
    pub fn contains_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }
}

/// One purchasable listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EntryFields")]
pub struct CatalogEntry {
    pub final_price: u32,
    pub regular_price: u32,
    pub bundle_name: Option<String>,
    /// Never empty; the first item is the canonical one.
    items: Vec<Item>,
}

/// Unchecked serde form of `CatalogEntry`
#[derive(Deserialize)]
struct EntryFields {
    final_price: u32,
    regular_price: u32,
    bundle_name: Option<String>,
    items: Vec<Item>,
}

impl TryFrom<EntryFields> for CatalogEntry {
    type Error = &'static str;

    fn try_from(fields: EntryFields) -> Result<Self, Self::Error> {
        Self::new(
            fields.final_price,
            Some(fields.regular_price),
            fields.bundle_name,
            fields.items,
        )
        .ok_or("catalog entry must contain at least one item")
    }
}

impl CatalogEntry {
    /// Build an entry. Returns `None` when `items` is empty.
    pub fn new(
        final_price: u32,
        regular_price: Option<u32>,
        bundle_name: Option<String>,
        items: Vec<Item>,
    ) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self {
            final_price,
            regular_price: regular_price.unwrap_or(final_price),
            bundle_name,
            items,
        })
    }

    /// First item of the entry, used for every single-item display
    pub fn canonical_item(&self) -> &Item {
        // `new` rejects empty item lists
        &self.items[0]
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// On sale only when the final price is strictly below the regular price.
    /// A final price above the regular price counts as "no discount".
    pub const fn is_discounted(&self) -> bool {
        self.final_price < self.regular_price
    }

    /// Absolute amount saved, zero when not discounted
    pub const fn saved_amount(&self) -> u32 {
        self.regular_price.saturating_sub(self.final_price)
    }

    /// `floor((regular - final) / regular * 100)`; `None` when not discounted
    /// or when the regular price is zero.
    pub const fn discount_percent(&self) -> Option<u32> {
        if !self.is_discounted() || self.regular_price == 0 {
            return None;
        }
        let saved = (self.regular_price - self.final_price) as u64;
        Some((saved * 100 / self.regular_price as u64) as u32)
    }
}

/// One point-in-time snapshot of the shop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    entries: Vec<CatalogEntry>,
}

impl CatalogDocument {
    pub const fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

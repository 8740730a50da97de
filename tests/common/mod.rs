//! Shared builders for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use item_shop_watch_lib::domain::{CatalogDocument, CatalogEntry, CatalogSource, ChannelId, Item, Labeled, NotificationSink, Page, ShopError};

pub fn item(name: &str, rarity: &str, item_type: &str) -> Item {
    Item {
        name: name.to_string(),
        description: format!("{name} description"),
        rarity: Labeled::new(rarity, capitalize(rarity)),
        item_type: Labeled::new(item_type, capitalize(item_type)),
        set_name: None,
        icon_url: Some(format!("https://cdn.example/{}/icon.png", name.to_lowercase())),
        featured_image_url: None,
    }
}

pub fn entry(name: &str, final_price: u32, regular_price: u32) -> CatalogEntry {
    CatalogEntry::new(final_price, Some(regular_price), None, vec![item(name, "rare", "outfit")])
        .expect("one item")
}

pub fn document(entries: Vec<CatalogEntry>) -> CatalogDocument {
    CatalogDocument::new(entries)
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

/// Serves queued results in order, then repeats the last one; counts calls
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<CatalogDocument, ShopError>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<CatalogDocument, ShopError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    async fn fetch(&self) -> Result<CatalogDocument, ShopError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ShopError::fetch_failure("empty script")))
        }
    }
}

/// Records every delivery as (channel, pages)
#[derive(Default)]
pub struct RecordingSink {
    pub deliveries: Mutex<Vec<(ChannelId, Vec<Page>)>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, channel: ChannelId, pages: &[Page]) -> anyhow::Result<()> {
        self.deliveries.lock().unwrap().push((channel, pages.to_vec()));
        Ok(())
    }
}

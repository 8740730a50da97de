//! Poller change detection against upstream-shaped bodies

mod common;

use std::sync::Arc;
use std::time::Duration;

use item_shop_watch_lib::application::{ChangePoller, SnapshotStore, TickOutcome};
use item_shop_watch_lib::domain::{CatalogDocument, ChannelId, PageKind, ShopError};
use item_shop_watch_lib::infrastructure::parse_catalog_document;
use serde_json::json;

use common::{RecordingSink, ScriptedSource};

fn body(entries: serde_json::Value) -> String {
    json!({ "status": 200, "data": { "entries": entries } }).to_string()
}

fn parse(entries: serde_json::Value) -> Result<CatalogDocument, ShopError> {
    parse_catalog_document(&body(entries))
}

fn reaper() -> serde_json::Value {
    json!({
        "regularPrice": 1500,
        "finalPrice": 1500,
        "brItems": [{ "name": "Reaper", "rarity": { "value": "legendary", "displayValue": "Legendary" } }]
    })
}

fn peely(final_price: u32) -> serde_json::Value {
    json!({
        "regularPrice": 1600,
        "finalPrice": final_price,
        "brItems": [{ "name": "Peely", "type": { "value": "outfit", "displayValue": "Outfit" } }]
    })
}

async fn armed_poller(script: Vec<Result<CatalogDocument, ShopError>>) -> (ChangePoller, Arc<RecordingSink>) {
    let store = SnapshotStore::new();
    store.arm(ChannelId(100)).await;
    let sink = Arc::new(RecordingSink::default());
    let poller = ChangePoller::new(
        Arc::new(ScriptedSource::new(script)),
        sink.clone(),
        store,
        Duration::from_secs(600),
    );
    (poller, sink)
}

#[tokio::test]
async fn same_bytes_twice_notify_once() {
    let raw = json!([reaper(), peely(800)]);
    let (poller, sink) = armed_poller(vec![parse(raw.clone()), parse(raw)]).await;

    poller.tick().await;
    poller.tick().await;

    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn structurally_different_documents_notify_twice() {
    let (poller, sink) = armed_poller(vec![
        parse(json!([reaper(), peely(800)])),
        parse(json!([reaper(), peely(1000)])),
    ])
    .await;

    poller.tick().await;
    poller.tick().await;

    assert_eq!(sink.count(), 2);
}

#[tokio::test]
async fn field_order_does_not_count_as_change() {
    let reordered = r#"{ "data": { "entries": [
        { "brItems": [{ "rarity": { "displayValue": "Legendary", "value": "legendary" }, "name": "Reaper" }],
          "finalPrice": 1500, "regularPrice": 1500 }
    ] }, "status": 200 }"#;
    let (poller, sink) = armed_poller(vec![
        parse(json!([reaper()])),
        parse_catalog_document(reordered),
    ])
    .await;

    poller.tick().await;
    assert_eq!(poller.tick().await, TickOutcome::Unchanged);
    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn entries_without_items_do_not_trigger_notifications() {
    let tracks_only = json!({ "finalPrice": 500, "tracks": [{ "title": "Song" }] });
    let (poller, sink) = armed_poller(vec![
        parse(json!([reaper()])),
        parse(json!([reaper(), tracks_only])),
    ])
    .await;

    poller.tick().await;
    poller.tick().await;

    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn malformed_body_is_a_silent_skip() {
    let (poller, sink) = armed_poller(vec![
        parse_catalog_document("<html>502 Bad Gateway</html>"),
        parse(json!([reaper()])),
    ])
    .await;

    assert_eq!(poller.tick().await, TickOutcome::FetchFailed);
    assert!(matches!(poller.tick().await, TickOutcome::Notified { .. }));
    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn notification_is_full_catalog_with_banner_on_first_page() {
    let entries: Vec<serde_json::Value> = (0..17).map(|i| peely(100 + i)).collect();
    let (poller, sink) = armed_poller(vec![parse(json!(entries))]).await;

    poller.tick().await;

    let deliveries = sink.deliveries.lock().unwrap();
    let (channel, pages) = &deliveries[0];
    assert_eq!(*channel, ChannelId(100));
    assert_eq!(pages.len(), 3);
    assert!(pages.iter().all(|page| page.kind == PageKind::Catalog));
    assert!(pages[0].banner.is_some());
    assert!(pages[1..].iter().all(|page| page.banner.is_none()));
}

#[tokio::test]
async fn empty_shop_still_notifies_with_empty_marker() {
    let (poller, sink) = armed_poller(vec![parse(json!([]))]).await;

    poller.tick().await;

    let deliveries = sink.deliveries.lock().unwrap();
    assert_eq!(deliveries[0].1.len(), 1);
    assert!(deliveries[0].1[0].is_empty_marker());
}

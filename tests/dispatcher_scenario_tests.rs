//! End-to-end command scenarios through the dispatcher

mod common;

use std::sync::Arc;

use item_shop_watch_lib::application::{Command, CommandDispatcher, Invocation, SnapshotStore};
use item_shop_watch_lib::domain::{Actor, AuthPolicy, CatalogDocument, CatalogEntry, PageKind, ShopError};

use common::{document, entry, item, ScriptedSource};

const OWNER: u64 = 1_264_677_032_357_527_607;

fn reaper_and_peely() -> CatalogDocument {
    document(vec![entry("Reaper", 1500, 1500), entry("Peely", 800, 1600)])
}

fn setup(script: Vec<Result<CatalogDocument, ShopError>>) -> (CommandDispatcher, Arc<ScriptedSource>) {
    let source = Arc::new(ScriptedSource::new(script));
    let dispatcher = CommandDispatcher::new(source.clone(), SnapshotStore::new(), AuthPolicy::new(OWNER), 10);
    (dispatcher, source)
}

async fn ask(dispatcher: &CommandDispatcher, line: &str) -> item_shop_watch_lib::application::Reply {
    let command = Command::parse(line).expect("valid command");
    dispatcher.handle(Invocation::new(Actor::member(7), command)).await
}

fn names(reply: &item_shop_watch_lib::application::Reply) -> Vec<String> {
    reply
        .pages()
        .iter()
        .flat_map(|page| page.lines.iter().map(|line| line.name.clone()))
        .collect()
}

#[tokio::test]
async fn godlike_rarity_is_rejected_before_any_fetch() {
    let (dispatcher, source) = setup(vec![Ok(reaper_and_peely())]);

    let reply = ask(&dispatcher, "/rarity godlike").await;

    assert!(reply.text().unwrap().starts_with("Invalid rarity."));
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn deals_and_expensive_on_reference_document() {
    let (dispatcher, source) = setup(vec![Ok(reaper_and_peely())]);

    let deals = ask(&dispatcher, "/deals").await;
    assert_eq!(names(&deals), vec!["Peely"]);
    let peely = &deals.pages()[0].lines[0];
    assert!(peely.price.on_sale);
    assert_eq!(peely.price.saved(), 800);
    assert_eq!(peely.price.discount_percent(), Some(50));

    let expensive = ask(&dispatcher, "/expensive").await;
    assert_eq!(names(&expensive), vec!["Reaper", "Peely"]);

    // each on-demand query fetches fresh data
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn on_demand_fetch_failure_is_reported() {
    let (dispatcher, _) = setup(vec![Err(ShopError::fetch_failure("status 503"))]);

    for line in ["/shop", "/item Peely", "/search pe", "/stats", "/bundles", "/cheap"] {
        let reply = ask(&dispatcher, line).await;
        assert_eq!(reply.text(), Some("Could not fetch the item shop."), "{line}");
    }
}

#[tokio::test]
async fn search_caps_at_five() {
    let entries = (0..9).map(|i| entry(&format!("Peely {i}"), 100, 100)).collect();
    let (dispatcher, _) = setup(vec![Ok(document(entries))]);

    let reply = ask(&dispatcher, "/search PEELY").await;
    assert_eq!(names(&reply).len(), 5);
}

#[tokio::test]
async fn rarity_filter_reports_overflow() {
    let entries: Vec<CatalogEntry> = (0..12)
        .map(|i| {
            CatalogEntry::new(100 * i, None, None, vec![item(&format!("Epic {i}"), "epic", "outfit")])
                .expect("one item")
        })
        .collect();
    let (dispatcher, _) = setup(vec![Ok(document(entries))]);

    let reply = ask(&dispatcher, "/rarity EPIC").await;
    assert_eq!(names(&reply).len(), 10);
    let footer = reply.pages().last().and_then(|page| page.footer.clone()).unwrap();
    assert_eq!(footer, "Showing 10 of 12 Epic items");
}

#[tokio::test]
async fn bundles_and_stats() {
    let bundled = CatalogEntry::new(2000, Some(2500), Some("Galaxy Set".to_string()), vec![item("Galaxy", "epic", "outfit")])
        .expect("one item");
    let (dispatcher, _) = setup(vec![Ok(document(vec![entry("Reaper", 1500, 1500), bundled]))]);

    let bundles = ask(&dispatcher, "/bundles").await;
    assert_eq!(names(&bundles), vec!["Galaxy"]);

    let stats = ask(&dispatcher, "/stats").await;
    assert_eq!(stats.pages()[0].kind, PageKind::Stats);
    assert!(stats.to_string().contains("3,500"));
}

#[tokio::test]
async fn shop_paginates_whole_catalog() {
    let entries = (0..17).map(|i| entry(&format!("Item {i}"), 100, 100)).collect();
    let (dispatcher, _) = setup(vec![Ok(document(entries))]);

    let reply = ask(&dispatcher, "/shop").await;
    assert_eq!(reply.pages().len(), 3);
    assert!(reply.pages()[0].banner.is_none());
    assert_eq!(reply.pages()[0].thumbnail_url.as_deref(), Some("https://cdn.example/item 0/icon.png"));
    assert_eq!(
        reply.pages()[1].footer.as_deref(),
        Some("Page 2 • Shop checked every 10 minutes")
    );
}

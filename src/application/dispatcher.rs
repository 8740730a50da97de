//! Command dispatcher
//!
//! Parses command text, checks the caller's privilege, runs the query and
//! formats the result. Every command body returns `Result<_, CommandError>`;
//! `CommandError::user_message` is the only place errors become text.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::shared_state::{PollerState, SnapshotStore};
use crate::domain::auth::{Actor, AuthError, AuthPolicy, Privilege};
use crate::domain::catalog::CatalogDocument;
use crate::domain::constants::limits;
use crate::domain::errors::ShopError;
use crate::domain::presentation::{self, Page};
use crate::domain::query::{self, ItemType, QueryKind, QueryResult, Rarity, SortDirection};
use crate::domain::services::{CatalogSource, ChannelId};

/// Usage and summary of every command, in help order
pub const COMMANDS: &[(&str, &str)] = &[
    ("/shop", "Show the current item shop with icons and details"),
    ("/item <name>", "Show detailed information about a specific item"),
    ("/search <query>", "Search for items in the current shop"),
    ("/price <item>", "Check the price of a specific item"),
    ("/deals", "Show items that are currently on sale/discount"),
    ("/stats", "Show shop statistics and breakdown"),
    ("/rarity <type>", "Show items filtered by rarity (Common, Rare, Epic, etc.)"),
    ("/type <type>", "Show items filtered by type (Outfit, Backpack, Pickaxe, etc.)"),
    ("/expensive", "Show the most expensive items in the shop"),
    ("/cheap", "Show the cheapest items in the shop"),
    ("/bundles", "Show all bundle items in the shop"),
    ("/info", "Show bot information and status"),
    ("/setshopchannel <channel>", "Set up automatic shop updates (Admin only)"),
    ("/help", "Show this help message"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Shop,
    Item { name: String },
    Search { query: String },
    Price { name: String },
    Deals,
    Stats,
    /// Raw value; validated by the dispatcher before any fetch
    Rarity { value: String },
    Type { value: String },
    Expensive,
    Cheap,
    Bundles,
    SetShopChannel { channel: ChannelId },
    Info,
    Help,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}'. Type /help for the list of commands.")]
    UnknownCommand(String),

    #[error("Usage: {usage}")]
    MissingArgument { usage: &'static str },

    #[error("'{0}' is not a channel id or mention")]
    InvalidChannel(String),
}

fn usage_of(name: &str) -> &'static str {
    COMMANDS
        .iter()
        .map(|(usage, _)| *usage)
        .find(|usage| usage[1..].split(' ').next() == Some(name))
        .unwrap_or("/help")
}

impl Command {
    /// Parse console text such as `/rarity epic` or `item Peely`.
    /// The leading slash is optional and command names ignore case; the rest
    /// of the line is the single argument.
    pub fn parse(line: &str) -> Result<Self, ParseCommandError> {
        let line = line.trim();
        let line = line.strip_prefix('/').unwrap_or(line);
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        if name.is_empty() {
            return Err(ParseCommandError::Empty);
        }

        let name = name.to_lowercase();
        let rest = rest.trim();
        let argument = || {
            if rest.is_empty() {
                Err(ParseCommandError::MissingArgument { usage: usage_of(&name) })
            } else {
                Ok(rest.to_string())
            }
        };

        let command = match name.as_str() {
            "shop" => Self::Shop,
            "item" => Self::Item { name: argument()? },
            "search" => Self::Search { query: argument()? },
            "price" => Self::Price { name: argument()? },
            "deals" => Self::Deals,
            "stats" => Self::Stats,
            "rarity" => Self::Rarity { value: argument()? },
            "type" => Self::Type { value: argument()? },
            "expensive" => Self::Expensive,
            "cheap" => Self::Cheap,
            "bundles" => Self::Bundles,
            "setshopchannel" => {
                let raw = argument()?;
                let channel = raw
                    .parse()
                    .map_err(|_| ParseCommandError::InvalidChannel(raw.clone()))?;
                Self::SetShopChannel { channel }
            }
            "info" => Self::Info,
            "help" => Self::Help,
            _ => return Err(ParseCommandError::UnknownCommand(name.clone())),
        };
        Ok(command)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Shop => "shop",
            Self::Item { .. } => "item",
            Self::Search { .. } => "search",
            Self::Price { .. } => "price",
            Self::Deals => "deals",
            Self::Stats => "stats",
            Self::Rarity { .. } => "rarity",
            Self::Type { .. } => "type",
            Self::Expensive => "expensive",
            Self::Cheap => "cheap",
            Self::Bundles => "bundles",
            Self::SetShopChannel { .. } => "setshopchannel",
            Self::Info => "info",
            Self::Help => "help",
        }
    }

    pub const fn privilege(&self) -> Privilege {
        match self {
            Self::SetShopChannel { .. } => Privilege::Administrator,
            Self::Info => Privilege::Owner,
            _ => Privilege::Anyone,
        }
    }

    /// Replies only the invoking actor sees
    pub const fn is_ephemeral(&self) -> bool {
        matches!(self, Self::Help | Self::Info)
    }
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Shop(#[from] ShopError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// `common, rare` -> `Common, Rare`
fn title_list(values: &[&str]) -> String {
    values
        .iter()
        .map(|value| {
            let mut chars = value.chars();
            chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl CommandError {
    /// Text shown to the invoking actor
    pub fn user_message(&self) -> String {
        match self {
            Self::Shop(ShopError::FetchFailure { .. }) => "Could not fetch the item shop.".to_string(),
            Self::Shop(ShopError::NotFound { name }) => {
                format!("Item \"{name}\" not found in the current shop.")
            }
            Self::Shop(ShopError::InvalidParameter { parameter, allowed, .. }) => {
                format!("Invalid {parameter}. Please choose from: {}", title_list(allowed))
            }
            Self::Auth(auth) => auth.to_string(),
        }
    }

    pub const fn is_ephemeral(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// Who asked for what
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub actor: Actor,
    pub command: Command,
}

impl Invocation {
    pub const fn new(actor: Actor, command: Command) -> Self {
        Self { actor, command }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyContent {
    Pages(Vec<Page>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: ReplyContent,
    pub ephemeral: bool,
}

impl Reply {
    pub fn pages(&self) -> &[Page] {
        match &self.content {
            ReplyContent::Pages(pages) => pages,
            ReplyContent::Text(_) => &[],
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            ReplyContent::Text(text) => Some(text),
            ReplyContent::Pages(_) => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.content {
            ReplyContent::Text(text) => writeln!(f, "{text}"),
            ReplyContent::Pages(pages) => {
                for page in pages {
                    writeln!(f, "{page}")?;
                }
                Ok(())
            }
        }
    }
}

pub struct CommandDispatcher {
    source: Arc<dyn CatalogSource>,
    store: SnapshotStore,
    policy: AuthPolicy,
    interval_minutes: u64,
}

impl CommandDispatcher {
    pub fn new(source: Arc<dyn CatalogSource>, store: SnapshotStore, policy: AuthPolicy, interval_minutes: u64) -> Self {
        Self {
            source,
            store,
            policy,
            interval_minutes,
        }
    }

    /// Run a command to completion. Errors never escape; they become text.
    pub async fn handle(&self, invocation: Invocation) -> Reply {
        info!("📨 /{} from {}", invocation.command.name(), invocation.actor.id);

        match self.execute(&invocation).await {
            Ok(content) => Reply {
                content,
                ephemeral: invocation.command.is_ephemeral(),
            },
            Err(e) => {
                match &e {
                    CommandError::Shop(ShopError::FetchFailure { .. }) => {
                        warn!("⚠️ /{} failed: {}", invocation.command.name(), e);
                    }
                    _ => debug!("/{} rejected: {}", invocation.command.name(), e),
                }
                Reply {
                    content: ReplyContent::Text(e.user_message()),
                    ephemeral: e.is_ephemeral() || invocation.command.is_ephemeral(),
                }
            }
        }
    }

    async fn fetch(&self) -> Result<CatalogDocument, CommandError> {
        Ok(self.source.fetch().await?)
    }

    async fn execute(&self, invocation: &Invocation) -> Result<ReplyContent, CommandError> {
        self.policy.authorize(&invocation.actor, invocation.command.privilege())?;

        let pages = match &invocation.command {
            Command::Shop => {
                let doc = self.fetch().await?;
                presentation::paginate_full(Some(&doc), self.interval_minutes)
            }
            Command::Item { name } => {
                let doc = self.fetch().await?;
                let hit = query::find_by_exact_name(Some(&doc), name)?;
                presentation::render_query_result(&QueryResult::new(QueryKind::Item, vec![hit]))
            }
            Command::Price { name } => {
                let doc = self.fetch().await?;
                let hit = query::find_by_exact_name(Some(&doc), name)?;
                presentation::render_query_result(&QueryResult::new(QueryKind::Price, vec![hit]))
            }
            Command::Search { query: text } => {
                let doc = self.fetch().await?;
                presentation::render_query_result(&query::search(Some(&doc), text))
            }
            Command::Deals => {
                let doc = self.fetch().await?;
                let deals = query::discounted(Some(&doc)).limited(limits::DEALS_LIMIT);
                presentation::render_query_result(&deals)
            }
            Command::Stats => {
                let doc = self.fetch().await?;
                presentation::render_query_result(&QueryResult::summary(query::stats(Some(&doc))))
            }
            Command::Rarity { value } => {
                let rarity = value.parse::<Rarity>()?;
                let doc = self.fetch().await?;
                presentation::render_query_result(&query::filter_by_rarity(Some(&doc), rarity))
            }
            Command::Type { value } => {
                let item_type = value.parse::<ItemType>()?;
                let doc = self.fetch().await?;
                presentation::render_query_result(&query::filter_by_type(Some(&doc), item_type))
            }
            Command::Expensive => {
                let doc = self.fetch().await?;
                let top = query::top_by_price(Some(&doc), SortDirection::Descending, limits::TOP_BY_PRICE_LIMIT);
                presentation::render_query_result(&top)
            }
            Command::Cheap => {
                let doc = self.fetch().await?;
                let top = query::top_by_price(Some(&doc), SortDirection::Ascending, limits::TOP_BY_PRICE_LIMIT);
                presentation::render_query_result(&top)
            }
            Command::Bundles => {
                let doc = self.fetch().await?;
                presentation::render_query_result(&query::bundles(Some(&doc)))
            }
            Command::SetShopChannel { channel } => {
                if let Some(previous) = self.store.arm(*channel).await {
                    info!("🔁 Shop updates moved from {} to {}", previous, channel);
                } else {
                    info!("✅ Shop updates armed for {}", channel);
                }
                return Ok(ReplyContent::Text(format!("Item shop updates will be sent to {channel}")));
            }
            Command::Info => {
                let armed = matches!(self.store.poller_state().await, PollerState::Armed(_));
                vec![presentation::info_page(armed, COMMANDS.len())]
            }
            Command::Help => vec![presentation::help_page(COMMANDS, self.interval_minutes)],
        };

        Ok(ReplyContent::Pages(pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::fixtures::{document, entry, entry_with, item};
    use crate::domain::presentation::PageKind;
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const OWNER: u64 = 99;

    struct FixedSource {
        doc: Option<CatalogDocument>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CatalogSource for FixedSource {
        async fn fetch(&self) -> Result<CatalogDocument, ShopError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.doc.clone().ok_or_else(|| ShopError::fetch_failure("offline"))
        }
    }

    fn dispatcher(doc: Option<CatalogDocument>) -> (CommandDispatcher, Arc<FixedSource>, SnapshotStore) {
        let source = Arc::new(FixedSource { doc, calls: AtomicUsize::new(0) });
        let store = SnapshotStore::new();
        let dispatcher = CommandDispatcher::new(source.clone(), store.clone(), AuthPolicy::new(OWNER), 10);
        (dispatcher, source, store)
    }

    fn sample() -> CatalogDocument {
        document(vec![
            entry("Reaper", 1500, 1500),
            entry_with(item("Peely", "epic", "outfit"), 800, 1600),
        ])
    }

    async fn run(dispatcher: &CommandDispatcher, line: &str) -> Reply {
        let command = Command::parse(line).unwrap();
        dispatcher.handle(Invocation::new(Actor::member(1), command)).await
    }

    #[rstest]
    #[case("/shop", Command::Shop)]
    #[case("SHOP", Command::Shop)]
    #[case("/item  Peely ", Command::Item { name: "Peely".to_string() })]
    #[case("/search black knight", Command::Search { query: "black knight".to_string() })]
    #[case("/Rarity Epic", Command::Rarity { value: "Epic".to_string() })]
    #[case("/setshopchannel <#42>", Command::SetShopChannel { channel: ChannelId(42) })]
    #[case("help", Command::Help)]
    fn test_parse(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(Command::parse(line), Ok(expected));
    }

    #[rstest]
    #[case("", ParseCommandError::Empty)]
    #[case("/dance", ParseCommandError::UnknownCommand("dance".to_string()))]
    #[case("/item", ParseCommandError::MissingArgument { usage: "/item <name>" })]
    #[case("/setshopchannel general", ParseCommandError::InvalidChannel("general".to_string()))]
    fn test_parse_errors(#[case] line: &str, #[case] expected: ParseCommandError) {
        assert_eq!(Command::parse(line), Err(expected));
    }

    #[test]
    fn test_help_table_covers_every_command() {
        assert_eq!(COMMANDS.len(), 14);
        for (usage, _) in COMMANDS {
            let name = usage[1..].split(' ').next().unwrap();
            assert_eq!(usage_of(name), *usage);
        }
    }

    #[tokio::test]
    async fn test_invalid_rarity_is_rejected_before_fetch() {
        let (dispatcher, source, _) = dispatcher(Some(sample()));
        let reply = run(&dispatcher, "/rarity godlike").await;

        assert_eq!(
            reply.text(),
            Some("Invalid rarity. Please choose from: Common, Uncommon, Rare, Epic, Legendary, Mythic")
        );
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_type_is_rejected_before_fetch() {
        let (dispatcher, source, _) = dispatcher(Some(sample()));
        let reply = run(&dispatcher, "/type spray").await;

        assert!(reply.text().unwrap().starts_with("Invalid type. Please choose from: Outfit, Backpack"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_message() {
        let (dispatcher, _, _) = dispatcher(None);
        let reply = run(&dispatcher, "/deals").await;
        assert_eq!(reply.text(), Some("Could not fetch the item shop."));
        assert!(!reply.ephemeral);
    }

    #[tokio::test]
    async fn test_item_lookup_and_not_found() {
        let (dispatcher, _, _) = dispatcher(Some(sample()));

        let found = run(&dispatcher, "/item peely").await;
        assert_eq!(found.pages().len(), 1);
        assert_eq!(found.pages()[0].kind, PageKind::Detail);

        let missing = run(&dispatcher, "/price Jonesy").await;
        assert_eq!(missing.text(), Some("Item \"Jonesy\" not found in the current shop."));
    }

    #[tokio::test]
    async fn test_deals_and_expensive_scenario() {
        let (dispatcher, _, _) = dispatcher(Some(sample()));

        let deals = run(&dispatcher, "/deals").await;
        let lines = &deals.pages()[0].lines;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "Peely");
        assert_eq!(lines[0].price.discount_percent(), Some(50));

        let expensive = run(&dispatcher, "/expensive").await;
        let names: Vec<&str> = expensive.pages()[0].lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Reaper", "Peely"]);
    }

    #[tokio::test]
    async fn test_deals_are_capped() {
        let entries = (0..12).map(|i| entry(&format!("Deal {i}"), 500, 1000 + i)).collect();
        let (dispatcher, _, _) = dispatcher(Some(document(entries)));

        let reply = run(&dispatcher, "/deals").await;
        let shown: usize = reply.pages().iter().map(|page| page.lines.len()).sum();
        assert_eq!(shown, limits::DEALS_LIMIT);
    }

    #[tokio::test]
    async fn test_setshopchannel_requires_administrator() {
        let (dispatcher, _, store) = dispatcher(Some(sample()));
        let command = Command::SetShopChannel { channel: ChannelId(5) };

        let denied = dispatcher.handle(Invocation::new(Actor::member(1), command.clone())).await;
        assert_eq!(denied.text(), Some("You need administrator permissions to use this command."));
        assert!(denied.ephemeral);
        assert_eq!(store.poller_state().await, PollerState::Idle);

        let armed = dispatcher.handle(Invocation::new(Actor::administrator(1), command)).await;
        assert_eq!(armed.text(), Some("Item shop updates will be sent to <#5>"));
        assert_eq!(store.poller_state().await, PollerState::Armed(ChannelId(5)));
    }

    #[tokio::test]
    async fn test_info_is_owner_only_and_reports_arming() {
        let (dispatcher, source, store) = dispatcher(Some(sample()));

        let denied = dispatcher.handle(Invocation::new(Actor::administrator(1), Command::Info)).await;
        assert_eq!(denied.text(), Some("❌ This command is restricted to the bot owner only."));

        store.arm(ChannelId(8)).await;
        let info = dispatcher.handle(Invocation::new(Actor::member(OWNER), Command::Info)).await;
        assert!(info.ephemeral);
        assert_eq!(info.pages()[0].kind, PageKind::Info);
        assert!(info.to_string().contains("Auto-updates: Enabled"));
        assert!(info.to_string().contains("🌐 API Status: ✅ Shop API Connected"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_help_is_ephemeral_static_listing() {
        let (dispatcher, source, _) = dispatcher(None);
        let reply = run(&dispatcher, "/help").await;

        assert!(reply.ephemeral);
        assert_eq!(reply.pages()[0].fields.len(), COMMANDS.len());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_filter_is_not_an_error() {
        let (dispatcher, _, _) = dispatcher(Some(sample()));
        let reply = run(&dispatcher, "/rarity legendary").await;

        assert_eq!(reply.pages().len(), 1);
        assert!(reply.pages()[0].is_empty_marker());
    }
}

//! Presentation formatter
//!
//! Turns catalog documents and query results into bounded-size `Page` values.
//! Pages stay structured (line items keep their price fields and an `on_sale`
//! flag) so delivery adapters can render them however they like; the
//! `Display` impl gives the plain-text form used on the console.

use std::fmt;

use serde::Serialize;

use crate::domain::catalog::{CatalogDocument, CatalogEntry};
use crate::domain::constants::{colors, display};
use crate::domain::pagination::PaginationCalculator;
use crate::domain::query::{CatalogStats, Hit, QueryKind, QueryResult};

/// Lines per page for multi-item query results
const LIST_LINES_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageKind {
    Catalog,
    Detail,
    Price,
    List,
    Stats,
    Help,
    Info,
    /// Explicit "nothing to show" marker
    Empty,
}

/// Price of one entry, kept structured so the sale state is unambiguous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceTag {
    pub final_price: u32,
    pub regular_price: u32,
    pub on_sale: bool,
}

impl PriceTag {
    pub const fn of(entry: &CatalogEntry) -> Self {
        Self {
            final_price: entry.final_price,
            regular_price: entry.regular_price,
            on_sale: entry.is_discounted(),
        }
    }

    pub const fn saved(&self) -> u32 {
        if self.on_sale {
            self.regular_price.saturating_sub(self.final_price)
        } else {
            0
        }
    }

    pub const fn discount_percent(&self) -> Option<u32> {
        if !self.on_sale || self.regular_price == 0 {
            return None;
        }
        Some((self.saved() as u64 * 100 / self.regular_price as u64) as u32)
    }
}

impl fmt::Display for PriceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.on_sale {
            write!(
                f,
                "~~{}~~ **{}** {} (SAVE {})",
                group_thousands(self.regular_price.into()),
                group_thousands(self.final_price.into()),
                display::CURRENCY,
                group_thousands(self.saved().into())
            )
        } else {
            write!(f, "**{}** {}", group_thousands(self.final_price.into()), display::CURRENCY)
        }
    }
}

/// What the second half of a line shows besides the price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineStyle {
    /// Full catalog listing: rarity, type and bundle
    Catalog,
    /// Price and rarity
    WithRarity,
    /// Price and type
    WithType,
    /// Price, rarity and type
    Ranked,
    /// Price and discount percentage
    Deal,
    /// Bundle name, price and rarity
    Bundle,
}

/// One rank-numbered entry on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub rank: usize,
    pub name: String,
    pub price: PriceTag,
    pub rarity_label: String,
    pub type_label: String,
    pub bundle_name: Option<String>,
    pub style: LineStyle,
}

impl LineItem {
    pub fn from_hit(rank: usize, hit: Hit<'_>, style: LineStyle) -> Self {
        Self {
            rank,
            name: hit.item.name.clone(),
            price: PriceTag::of(hit.entry),
            rarity_label: hit.item.rarity.label.clone(),
            type_label: hit.item.item_type.label.clone(),
            bundle_name: hit.entry.bundle_name.clone(),
            style,
        }
    }

    pub fn heading(&self) -> String {
        format!("{}. {}", self.rank, self.name)
    }

    pub fn body(&self) -> String {
        let price = &self.price;
        match self.style {
            LineStyle::Catalog => {
                let bundle = self
                    .bundle_name
                    .as_ref()
                    .map(|name| format!(" (Bundle: {name})"))
                    .unwrap_or_default();
                format!("💰 {price}\n⭐ *{} {}*{bundle}", self.rarity_label, self.type_label)
            }
            LineStyle::WithRarity => format!("💰 {price} | ⭐ {}", self.rarity_label),
            LineStyle::WithType => format!("💰 {price} | 📦 {}", self.type_label),
            LineStyle::Ranked => format!("💰 {price} | ⭐ {} | 📦 {}", self.rarity_label, self.type_label),
            LineStyle::Deal => format!(
                "💰 {price}\n💸 {}% off!",
                price.discount_percent().unwrap_or_default()
            ),
            LineStyle::Bundle => format!(
                "📦 **{}**\n💰 {price} | ⭐ {}",
                self.bundle_name.as_deref().unwrap_or(display::UNKNOWN_BUNDLE),
                self.rarity_label
            ),
        }
    }
}

/// Free-form name/value pair (detail, stats, help pages)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }
}

/// A bounded-size renderable unit of output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub kind: PageKind,
    pub title: String,
    pub description: Option<String>,
    pub color: u32,
    /// Text shown above the page (change notifications)
    pub banner: Option<String>,
    pub lines: Vec<LineItem>,
    pub fields: Vec<Field>,
    pub thumbnail_url: Option<String>,
    pub image_url: Option<String>,
    pub footer: Option<String>,
    /// 1-based index within a multi-page response
    pub page_number: Option<usize>,
}

impl Page {
    pub fn new(kind: PageKind, title: impl Into<String>, color: u32) -> Self {
        Self {
            kind,
            title: title.into(),
            description: None,
            color,
            banner: None,
            lines: Vec::new(),
            fields: Vec::new(),
            thumbnail_url: None,
            image_url: None,
            footer: None,
            page_number: None,
        }
    }

    /// Single page carrying only a "nothing here" message
    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(PageKind::Empty, message, colors::EMPTY)
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub const fn is_empty_marker(&self) -> bool {
        matches!(self.kind, PageKind::Empty)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(banner) = &self.banner {
            writeln!(f, "{banner}")?;
        }
        writeln!(f, "== {} ==", self.title)?;
        if let Some(description) = &self.description {
            writeln!(f, "{description}")?;
        }
        for line in &self.lines {
            writeln!(f, "{}", line.heading())?;
            for body_line in line.body().lines() {
                writeln!(f, "    {body_line}")?;
            }
        }
        for field in &self.fields {
            writeln!(f, "{}: {}", field.name, field.value.replace('\n', ", "))?;
        }
        if let Some(url) = self.image_url.as_ref().or(self.thumbnail_url.as_ref()) {
            writeln!(f, "[image] {url}")?;
        }
        if let Some(footer) = &self.footer {
            writeln!(f, "-- {footer} --")?;
        }
        Ok(())
    }
}

/// Every entry, `ITEMS_PER_PAGE` per page, document order. The footer names
/// the poll interval.
pub fn paginate_full(doc: Option<&CatalogDocument>, interval_minutes: u64) -> Vec<Page> {
    paginate_full_with(doc, &PaginationCalculator::default(), interval_minutes)
}

pub fn paginate_full_with(
    doc: Option<&CatalogDocument>,
    calculator: &PaginationCalculator,
    interval_minutes: u64,
) -> Vec<Page> {
    let entries = doc.map(CatalogDocument::entries).unwrap_or_default();
    if entries.is_empty() {
        return vec![Page::empty("No items found in the shop.")];
    }

    let mut pages: Vec<Page> = calculator
        .chunks(entries)
        .enumerate()
        .map(|(page_index, chunk)| {
            let (title, description) = if page_index == 0 {
                (
                    "🛒 Item Shop - All Items",
                    "📋 **Complete list of all items currently in the shop:**",
                )
            } else {
                ("🛒 Item Shop - All Items (Continued)", "📋 **More items from the shop:**")
            };
            let first_rank = page_index * calculator.items_per_page() + 1;
            let mut page = Page::new(PageKind::Catalog, title, colors::DEFAULT)
                .with_description(description)
                .with_footer(format!(
                    "Page {} • Shop checked every {interval_minutes} minutes",
                    page_index + 1
                ));
            page.page_number = Some(page_index + 1);
            page.lines = chunk
                .iter()
                .enumerate()
                .map(|(offset, entry)| LineItem::from_hit(first_rank + offset, Hit::of(entry), LineStyle::Catalog))
                .collect();
            page
        })
        .collect();

    if let (Some(first_page), Some(first_entry)) = (pages.first_mut(), entries.first()) {
        first_page.thumbnail_url.clone_from(&first_entry.canonical_item().icon_url);
    }
    pages
}

/// Catalog pages for a change notification; the first carries the update banner
pub fn notification_pages(doc: &CatalogDocument, interval_minutes: u64) -> Vec<Page> {
    let mut pages = paginate_full(Some(doc), interval_minutes);
    if let Some(first) = pages.first_mut() {
        first.banner = Some(display::UPDATE_BANNER.to_string());
    }
    pages
}

/// Format a query result according to the query that produced it
pub fn render_query_result(result: &QueryResult<'_>) -> Vec<Page> {
    match &result.kind {
        QueryKind::Item => result
            .hits
            .first()
            .map_or_else(|| vec![Page::empty("No shop data available.")], |hit| vec![detail_page(*hit)]),
        QueryKind::Price => result
            .hits
            .first()
            .map_or_else(|| vec![Page::empty("No shop data available.")], |hit| vec![price_page(*hit)]),
        QueryKind::Stats => match &result.stats {
            Some(stats) if stats.total_entries > 0 => vec![stats_page(stats)],
            _ => vec![Page::empty("No items found in the shop.")],
        },
        kind => list_pages(kind, result),
    }
}

struct ListLayout {
    title: String,
    description: Option<String>,
    color: u32,
    style: LineStyle,
    empty_message: String,
    overflow_label: Option<String>,
}

fn list_layout(kind: &QueryKind, shown: usize) -> ListLayout {
    let layout = |title: String, description: Option<String>, color: u32, style: LineStyle, empty_message: String| ListLayout {
        title,
        description,
        color,
        style,
        empty_message,
        overflow_label: None,
    };
    match kind {
        QueryKind::Search { query } => layout(
            format!("🔍 Search Results for \"{query}\""),
            None,
            colors::INFO,
            LineStyle::WithRarity,
            format!("No items found matching \"{query}\"."),
        ),
        QueryKind::Rarity(rarity) => {
            let title = rarity.title();
            ListLayout {
                overflow_label: Some(title.clone()),
                ..layout(
                    format!("⭐ {title} Items"),
                    Some(format!("All {title} items currently in the shop:")),
                    colors::for_rarity_label(&title),
                    LineStyle::WithType,
                    format!("No {title} items found in the current shop."),
                )
            }
        }
        QueryKind::Type(item_type) => {
            let title = item_type.title();
            ListLayout {
                overflow_label: Some(title.clone()),
                ..layout(
                    format!("📦 {title} Items"),
                    Some(format!("All {title} items currently in the shop:")),
                    colors::INFO,
                    LineStyle::WithRarity,
                    format!("No {title} items found in the current shop."),
                )
            }
        }
        QueryKind::Expensive => layout(
            "💰 Most Expensive Items".to_string(),
            Some(format!("Top {shown} most expensive items in the shop:")),
            colors::EXPENSIVE,
            LineStyle::Ranked,
            "No items found in the shop.".to_string(),
        ),
        QueryKind::Cheap => layout(
            "💸 Cheapest Items".to_string(),
            Some(format!("Top {shown} cheapest items in the shop:")),
            colors::CHEAP,
            LineStyle::Ranked,
            "No items found in the shop.".to_string(),
        ),
        QueryKind::Deals => layout(
            "🔥 Hot Deals!".to_string(),
            Some("Items currently on sale:".to_string()),
            colors::DEALS,
            LineStyle::Deal,
            "No items are currently on sale.".to_string(),
        ),
        QueryKind::Bundles => layout(
            "📦 Bundle Items".to_string(),
            Some("All bundle items currently in the shop:".to_string()),
            colors::BUNDLES,
            LineStyle::Bundle,
            "No bundle items found in the current shop.".to_string(),
        ),
        QueryKind::Item | QueryKind::Price | QueryKind::Stats => layout(
            "Results".to_string(),
            None,
            colors::INFO,
            LineStyle::Ranked,
            "No shop data available.".to_string(),
        ),
    }
}

fn list_pages(kind: &QueryKind, result: &QueryResult<'_>) -> Vec<Page> {
    let layout = list_layout(kind, result.hits.len());
    if result.hits.is_empty() {
        return vec![Page::empty(layout.empty_message)];
    }

    let calculator = PaginationCalculator::new(LIST_LINES_PER_PAGE);
    let page_count = calculator.page_count(result.hits.len());
    let mut pages: Vec<Page> = calculator
        .chunks(&result.hits)
        .enumerate()
        .map(|(page_index, chunk)| {
            let first_rank = page_index * calculator.items_per_page() + 1;
            let mut page = Page::new(PageKind::List, layout.title.clone(), layout.color);
            page.description.clone_from(&layout.description);
            page.lines = chunk
                .iter()
                .enumerate()
                .map(|(offset, hit)| LineItem::from_hit(first_rank + offset, *hit, layout.style))
                .collect();
            if page_count > 1 {
                page.page_number = Some(page_index + 1);
                page.footer = Some(format!("Page {} of {page_count}", page_index + 1));
            }
            page
        })
        .collect();

    if let (Some(label), Some(last)) = (&layout.overflow_label, pages.last_mut()) {
        if result.hidden_matches() > 0 {
            last.footer = Some(format!(
                "Showing {} of {} {label} items",
                result.hits.len(),
                result.total_matches
            ));
        }
    }
    pages
}

/// Single-item page: price, rarity, type, optional set and bundle. The
/// featured image is preferred over the icon.
pub fn detail_page(hit: Hit<'_>) -> Page {
    let item = hit.item;
    let description = if item.description.is_empty() {
        "No description available.".to_string()
    } else {
        item.description.clone()
    };
    let mut page = Page::new(
        PageKind::Detail,
        format!("🎮 {}", item.name),
        colors::for_rarity_label(&item.rarity.label),
    )
    .with_description(description)
    .with_field(Field::new("💰 Price", PriceTag::of(hit.entry).to_string(), true))
    .with_field(Field::new("⭐ Rarity", item.rarity.label.clone(), true))
    .with_field(Field::new("📦 Type", item.item_type.label.clone(), true));

    if let Some(set_name) = item.set_name.as_ref().filter(|s| !s.is_empty()) {
        page = page.with_field(Field::new("🎯 Set", set_name.clone(), false));
    }
    if let Some(bundle) = &hit.entry.bundle_name {
        page = page.with_field(Field::new("📦 Bundle", bundle.clone(), false));
    }

    if item.featured_image_url.is_some() {
        page.image_url.clone_from(&item.featured_image_url);
    } else {
        page.thumbnail_url.clone_from(&item.icon_url);
    }
    page
}

/// Price breakdown page, with the discount when the entry is on sale
pub fn price_page(hit: Hit<'_>) -> Page {
    let item = hit.item;
    let price = PriceTag::of(hit.entry);
    let mut page = Page::new(
        PageKind::Price,
        format!("💰 {}", item.name),
        colors::for_rarity_label(&item.rarity.label),
    )
    .with_field(Field::new(
        "Current Price",
        format!("{} {}", group_thousands(price.final_price.into()), display::CURRENCY),
        true,
    ));

    if price.on_sale {
        page = page
            .with_field(Field::new(
                "Original Price",
                format!("{} {}", group_thousands(price.regular_price.into()), display::CURRENCY),
                true,
            ))
            .with_field(Field::new(
                "Discount",
                format!(
                    "Save {} {}! 🎉 ({}% off)",
                    group_thousands(price.saved().into()),
                    display::CURRENCY,
                    price.discount_percent().unwrap_or_default()
                ),
                true,
            ));
    }

    page = page
        .with_field(Field::new("Rarity", item.rarity.label.clone(), true))
        .with_field(Field::new("Type", item.item_type.label.clone(), true));
    page.thumbnail_url.clone_from(&item.icon_url);
    page
}

pub fn stats_page(stats: &CatalogStats) -> Page {
    let breakdown = |counts: &[(String, usize)]| {
        counts
            .iter()
            .map(|(label, count)| format!("{label}: {count}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut page = Page::new(PageKind::Stats, "📊 Shop Statistics", colors::INFO)
        .with_field(Field::new("Total Items", stats.total_entries.to_string(), true))
        .with_field(Field::new(
            "Total Value",
            format!("{} {}", group_thousands(stats.total_value), display::CURRENCY),
            true,
        ));
    if !stats.rarity_counts.is_empty() {
        page = page.with_field(Field::new("Rarity Breakdown", breakdown(&stats.rarity_counts), true));
    }
    if !stats.type_counts.is_empty() {
        page = page.with_field(Field::new("Type Breakdown", breakdown(&stats.type_counts), true));
    }
    page
}

/// Static command listing
pub fn help_page(commands: &[(&str, &str)], interval_minutes: u64) -> Page {
    let mut page = Page::new(PageKind::Help, "🛒 Item Shop Bot Commands", colors::DEFAULT)
        .with_description("Here are all the available commands:")
        .with_footer(format!(
            "The shop is checked for updates every {interval_minutes} minutes"
        ));
    page.fields = commands
        .iter()
        .map(|(usage, summary)| Field::new(format!("`{usage}`"), *summary, false))
        .collect();
    page
}

/// Owner-only status page
pub fn info_page(auto_updates_enabled: bool, command_count: usize) -> Page {
    let auto_updates = if auto_updates_enabled { "Enabled" } else { "Disabled" };
    Page::new(PageKind::Info, "🤖 Item Shop Bot Info", colors::DEFAULT)
        .with_description("Information about this bot:")
        .with_field(Field::new(
            "📊 Bot Status",
            format!("✅ Online\n🔄 Auto-updates: {auto_updates}"),
            false,
        ))
        .with_field(Field::new(
            "🎮 Features",
            "• Complete shop display\n• Item search & filtering\n• Price checking\n• Sale detection\n• Statistics\n• Automatic updates",
            false,
        ))
        .with_field(Field::new(
            "📋 Commands",
            format!("{command_count} total commands available"),
            true,
        ))
        .with_field(Field::new("🌐 API Status", "✅ Shop API Connected", true))
        .with_footer(format!("item-shop-watch v{}", env!("CARGO_PKG_VERSION")))
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

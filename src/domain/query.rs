//! Query engine
//!
//! Pure functions over a `CatalogDocument`. None of them mutate the document;
//! results borrow from it. An absent or empty document yields an empty result
//! for every query except `find_by_exact_name`, which reports `NotFound`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::catalog::{CatalogDocument, CatalogEntry, Item};
use crate::domain::constants::limits;
use crate::domain::errors::ShopError;

/// One matching entry together with its canonical item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit<'a> {
    pub item: &'a Item,
    pub entry: &'a CatalogEntry,
}

impl<'a> Hit<'a> {
    pub fn of(entry: &'a CatalogEntry) -> Self {
        Self {
            item: entry.canonical_item(),
            entry,
        }
    }
}

/// Which query produced a result; selects the page layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    Item,
    Price,
    Search { query: String },
    Rarity(Rarity),
    Type(ItemType),
    Expensive,
    Cheap,
    Deals,
    Bundles,
    Stats,
}

/// Aggregate counts over a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total_entries: usize,
    /// Sum of final prices
    pub total_value: u64,
    /// Ordered by first-seen label
    pub rarity_counts: Vec<(String, usize)>,
    /// Ordered by first-seen label
    pub type_counts: Vec<(String, usize)>,
}

/// Hits of a query plus what the formatter needs to describe them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult<'a> {
    pub kind: QueryKind,
    pub hits: Vec<Hit<'a>>,
    /// Number of matches before display truncation
    pub total_matches: usize,
    pub stats: Option<CatalogStats>,
}

impl<'a> QueryResult<'a> {
    pub fn new(kind: QueryKind, hits: Vec<Hit<'a>>) -> Self {
        let total_matches = hits.len();
        Self {
            kind,
            hits,
            total_matches,
            stats: None,
        }
    }

    /// Keep at most `limit` hits while remembering the full match count
    pub fn truncated(kind: QueryKind, mut hits: Vec<Hit<'a>>, limit: usize) -> Self {
        let total_matches = hits.len();
        hits.truncate(limit);
        Self {
            kind,
            hits,
            total_matches,
            stats: None,
        }
    }

    /// Cap the shown hits, keeping `total_matches` as computed
    #[must_use]
    pub fn limited(mut self, limit: usize) -> Self {
        self.hits.truncate(limit);
        self
    }

    pub fn summary(stats: CatalogStats) -> Self {
        Self {
            kind: QueryKind::Stats,
            hits: Vec::new(),
            total_matches: stats.total_entries,
            stats: Some(stats),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty() && self.stats.as_ref().is_none_or(|s| s.total_entries == 0)
    }

    /// Matches not shown because of truncation
    pub fn hidden_matches(&self) -> usize {
        self.total_matches.saturating_sub(self.hits.len())
    }
}

/// Sort direction for price rankings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

macro_rules! value_set {
    (
        $(#[$meta:meta])*
        $name:ident, $parameter:literal {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every recognised machine value, in display order
            pub const ALL: &'static [&'static str] = &[$($value),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }

            /// Capitalised form used in titles
            pub fn title(self) -> String {
                let value = self.as_str();
                let mut chars = value.chars();
                chars
                    .next()
                    .map(|c| c.to_uppercase().chain(chars).collect())
                    .unwrap_or_default()
            }
        }

        impl FromStr for $name {
            type Err = ShopError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(ShopError::invalid_parameter($parameter, s, Self::ALL)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

value_set! {
    /// The six recognised rarity machine values
    Rarity, "rarity" {
        Common => "common",
        Uncommon => "uncommon",
        Rare => "rare",
        Epic => "epic",
        Legendary => "legendary",
        Mythic => "mythic",
    }
}

value_set! {
    /// The eight recognised item type machine values
    ItemType, "type" {
        Outfit => "outfit",
        Backpack => "backpack",
        Pickaxe => "pickaxe",
        Glider => "glider",
        Emote => "emote",
        Wrap => "wrap",
        Music => "music",
        Banner => "banner",
    }
}

fn entries(doc: Option<&CatalogDocument>) -> &[CatalogEntry] {
    match doc {
        Some(doc) => doc.entries(),
        None => &[],
    }
}

fn hits(doc: Option<&CatalogDocument>) -> impl Iterator<Item = Hit<'_>> {
    entries(doc).iter().map(Hit::of)
}

/// First entry (document order) whose canonical item name equals `name`,
/// ignoring case
pub fn find_by_exact_name<'a>(doc: Option<&'a CatalogDocument>, name: &str) -> Result<Hit<'a>, ShopError> {
    hits(doc)
        .find(|hit| hit.item.name_matches(name))
        .ok_or_else(|| ShopError::not_found(name))
}

/// Case-insensitive substring search over name and description, document
/// order, at most `SEARCH_LIMIT` hits
pub fn search<'a>(doc: Option<&'a CatalogDocument>, query: &str) -> QueryResult<'a> {
    let needle = query.to_lowercase();
    let matched: Vec<Hit<'a>> = hits(doc).filter(|hit| hit.item.contains_lowercase(&needle)).collect();
    QueryResult::truncated(
        QueryKind::Search {
            query: query.to_string(),
        },
        matched,
        limits::SEARCH_LIMIT,
    )
}

/// Entries whose rarity machine value matches, capped for display
pub fn filter_by_rarity(doc: Option<&CatalogDocument>, rarity: Rarity) -> QueryResult<'_> {
    let matched = hits(doc)
        .filter(|hit| hit.item.rarity.value.eq_ignore_ascii_case(rarity.as_str()))
        .collect();
    QueryResult::truncated(QueryKind::Rarity(rarity), matched, limits::FILTER_DISPLAY_LIMIT)
}

/// Validates `value` against the rarity set before looking at the document
pub fn filter_by_rarity_value<'a>(doc: Option<&'a CatalogDocument>, value: &str) -> Result<QueryResult<'a>, ShopError> {
    let rarity = value.parse::<Rarity>()?;
    Ok(filter_by_rarity(doc, rarity))
}

/// Entries whose item type machine value matches, capped for display
pub fn filter_by_type(doc: Option<&CatalogDocument>, item_type: ItemType) -> QueryResult<'_> {
    let matched = hits(doc)
        .filter(|hit| hit.item.item_type.value.eq_ignore_ascii_case(item_type.as_str()))
        .collect();
    QueryResult::truncated(QueryKind::Type(item_type), matched, limits::FILTER_DISPLAY_LIMIT)
}

/// Validates `value` against the type set before looking at the document
pub fn filter_by_type_value<'a>(doc: Option<&'a CatalogDocument>, value: &str) -> Result<QueryResult<'a>, ShopError> {
    let item_type = value.parse::<ItemType>()?;
    Ok(filter_by_type(doc, item_type))
}

/// Stable sort by final price, first `k` entries
pub fn top_by_price(doc: Option<&CatalogDocument>, direction: SortDirection, k: usize) -> QueryResult<'_> {
    let mut ranked: Vec<Hit<'_>> = hits(doc).collect();
    match direction {
        SortDirection::Ascending => ranked.sort_by_key(|hit| hit.entry.final_price),
        SortDirection::Descending => ranked.sort_by(|a, b| b.entry.final_price.cmp(&a.entry.final_price)),
    }
    let kind = match direction {
        SortDirection::Ascending => QueryKind::Cheap,
        SortDirection::Descending => QueryKind::Expensive,
    };
    QueryResult::truncated(kind, ranked, k)
}

/// Discounted entries sorted by discount percentage, highest first.
/// Ties keep document order; zero regular prices are skipped.
pub fn discounted(doc: Option<&CatalogDocument>) -> QueryResult<'_> {
    let mut deals: Vec<(u32, Hit<'_>)> = hits(doc)
        .filter_map(|hit| hit.entry.discount_percent().map(|percent| (percent, hit)))
        .collect();
    deals.sort_by(|a, b| b.0.cmp(&a.0));
    QueryResult::new(QueryKind::Deals, deals.into_iter().map(|(_, hit)| hit).collect())
}

/// Entries sold as part of a bundle, document order, unbounded
pub fn bundles(doc: Option<&CatalogDocument>) -> QueryResult<'_> {
    let matched = hits(doc).filter(|hit| hit.entry.bundle_name.is_some()).collect();
    QueryResult::new(QueryKind::Bundles, matched)
}

/// Aggregate counts keyed by display label in first-seen order
pub fn stats(doc: Option<&CatalogDocument>) -> CatalogStats {
    let mut stats = CatalogStats::default();
    for hit in hits(doc) {
        stats.total_entries += 1;
        stats.total_value += u64::from(hit.entry.final_price);
        bump(&mut stats.rarity_counts, &hit.item.rarity.label);
        bump(&mut stats.type_counts, &hit.item.item_type.label);
    }
    stats
}

fn bump(counts: &mut Vec<(String, usize)>, label: &str) {
    match counts.iter_mut().find(|(seen, _)| seen == label) {
        Some((_, count)) => *count += 1,
        None => counts.push((label.to_string(), 1)),
    }
}

//! Shop display limits and domain constants
//!
//! Fixed characteristics of the item shop listings and of how results are
//! shown to users.

/// Result limits applied by the query engine and the formatter
pub mod limits {
    /// Maximum search hits returned
    pub const SEARCH_LIMIT: usize = 5;

    /// Rarity/type filters show this many hits and report the remainder
    pub const FILTER_DISPLAY_LIMIT: usize = 10;

    /// Default k for the expensive/cheap rankings
    pub const TOP_BY_PRICE_LIMIT: usize = 10;

    /// Maximum discounted entries shown by `deals`
    pub const DEALS_LIMIT: usize = 8;

    /// Line items per catalog page
    pub const ITEMS_PER_PAGE: usize = 8;
}

/// Display vocabulary
pub mod display {
    /// Currency label appended to prices
    pub const CURRENCY: &str = "V-Bucks";

    pub const UNKNOWN_ITEM: &str = "Unknown Item";
    pub const UNKNOWN_BUNDLE: &str = "Unknown Bundle";
    pub const DEFAULT_RARITY_VALUE: &str = "common";
    pub const DEFAULT_RARITY_LABEL: &str = "Common";
    pub const DEFAULT_TYPE_VALUE: &str = "item";
    pub const DEFAULT_TYPE_LABEL: &str = "Item";

    /// Banner on the first page of a change notification
    pub const UPDATE_BANNER: &str = "🆕 **The Item Shop has updated!**";
}

/// Page colours
pub mod colors {
    pub const COMMON: u32 = 0x8A_8A8A;
    pub const UNCOMMON: u32 = 0x2D_8E47;
    pub const RARE: u32 = 0x4A_90E2;
    pub const EPIC: u32 = 0x9B_4F96;
    pub const LEGENDARY: u32 = 0xE6_B800;
    pub const MYTHIC: u32 = 0xFF_6B35;

    pub const DEFAULT: u32 = 0x00_FF00;
    pub const EMPTY: u32 = 0xFF_0000;
    pub const INFO: u32 = 0x4A_90E2;
    pub const EXPENSIVE: u32 = 0xFF_D700;
    pub const CHEAP: u32 = 0x2D_8E47;
    pub const DEALS: u32 = 0xFF_6B35;
    pub const BUNDLES: u32 = 0x9B_4F96;

    /// Colour for a rarity display label; unknown labels get the default
    pub fn for_rarity_label(label: &str) -> u32 {
        match label {
            "Common" => COMMON,
            "Uncommon" => UNCOMMON,
            "Rare" => RARE,
            "Epic" => EPIC,
            "Legendary" => LEGENDARY,
            "Mythic" => MYTHIC,
            _ => DEFAULT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits() {
        assert_eq!(limits::SEARCH_LIMIT, 5);
        assert_eq!(limits::ITEMS_PER_PAGE, 8);
        assert!(limits::DEALS_LIMIT <= limits::FILTER_DISPLAY_LIMIT);
    }

    #[test]
    fn test_rarity_colors() {
        assert_eq!(colors::for_rarity_label("Legendary"), colors::LEGENDARY);
        assert_eq!(colors::for_rarity_label("Icon Series"), colors::DEFAULT);
    }
}

//! Display pagination rules.
//!
//! Responsibility:
//! - how many line items fit on one page
//! - splitting an ordered list into page-sized chunks

use crate::domain::constants::limits::ITEMS_PER_PAGE;

#[derive(Debug, Clone)]
pub struct PaginationCalculator {
    items_per_page: usize,
}

impl Default for PaginationCalculator {
    fn default() -> Self {
        Self {
            items_per_page: ITEMS_PER_PAGE,
        }
    }
}

impl PaginationCalculator {
    /// A page size of zero is clamped to one.
    pub fn new(items_per_page: usize) -> Self {
        Self {
            items_per_page: items_per_page.max(1),
        }
    }

    pub const fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    /// Number of pages needed for `total_items`; zero items still need one page
    /// (the "no items" page).
    pub const fn page_count(&self, total_items: usize) -> usize {
        if total_items == 0 {
            1
        } else {
            total_items.div_ceil(self.items_per_page)
        }
    }

    /// Split `items` into page-sized slices, preserving order
    pub fn chunks<'a, T>(&self, items: &'a [T]) -> impl Iterator<Item = &'a [T]> {
        items.chunks(self.items_per_page)
    }
}

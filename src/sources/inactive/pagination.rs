//! Client-side pagination over an already fetched result set.

use std::ops::Range;

/// Page position derived from the result size and page length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationState {
    /// 1-based current page.
    pub current_page: usize,
    /// Rows per page (never zero).
    pub items_per_page: usize,
    /// Total rows according to the server.
    pub total_items: usize,
    /// `ceil(total_items / items_per_page)`.
    pub total_pages: usize,
}

impl PaginationState {
    /// Empty pagination with the given page length (zero becomes one).
    #[must_use]
    pub const fn new(items_per_page: usize) -> Self {
        Self {
            current_page: 1,
            items_per_page: if items_per_page == 0 { 1 } else { items_per_page },
            total_items: 0,
            total_pages: 0,
        }
    }

    /// Recompute for a new result set and go back to page 1.
    pub const fn reset(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.total_pages = total_items.div_ceil(self.items_per_page);
        self.current_page = 1;
    }

    /// Move to `page` if it exists. Returns whether the page changed.
    pub const fn set_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Change the page length and go back to page 1. Zero is ignored.
    pub const fn set_items_per_page(&mut self, n: usize) -> bool {
        if n == 0 {
            return false;
        }
        self.items_per_page = n;
        self.reset(self.total_items);
        true
    }

    /// Index range of the current page within `len` rows.
    #[must_use]
    pub fn slice_range(&self, len: usize) -> Range<usize> {
        let start = (self.current_page - 1)
            .saturating_mul(self.items_per_page)
            .min(len);
        let end = start.saturating_add(self.items_per_page).min(len);
        start..end
    }

    /// Whether more than one page exists.
    #[must_use]
    pub const fn has_multiple_pages(&self) -> bool {
        self.total_pages > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: 250 rows at 100 per page make three pages; the last holds 50.
    fn slices_last_partial_page() {
        let mut p = PaginationState::new(100);
        p.reset(250);
        assert_eq!(p.total_pages, 3);
        assert!(p.set_page(3));
        assert_eq!(p.slice_range(250), 200..250);
        assert!(!p.set_page(4));
        assert!(!p.set_page(0));
        assert_eq!(p.current_page, 3);
    }

    #[test]
    fn items_per_page_change_resets_to_first_page() {
        let mut p = PaginationState::new(100);
        p.reset(250);
        p.set_page(2);
        assert!(p.set_items_per_page(50));
        assert_eq!(p.current_page, 1);
        assert_eq!(p.total_pages, 5);
        assert!(!p.set_items_per_page(0));
        assert_eq!(p.items_per_page, 50);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let mut p = PaginationState::new(100);
        p.reset(0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.set_page(1));
        assert_eq!(p.slice_range(0), 0..0);
        assert!(!p.has_multiple_pages());
    }
}

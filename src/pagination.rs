//! Client-side pagination over a fetched result set.
//!
//! Pages are 1-based. Out-of-range pages produce empty slices instead of
//! errors so callers can render whatever the user typed.

use serde::{Deserialize, Serialize};

/// Results shown per page.
pub const RESULTS_PER_PAGE: usize = 6;

/// One slot in the page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// Current position within a paginated result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub current_page: usize,
    pub total_pages: usize,
}

impl PageState {
    /// Build a state with `current` clamped to `1..=max(total, 1)`.
    pub fn new(current: usize, total: usize) -> Self {
        Self {
            current_page: clamp_page(current, total),
            total_pages: total,
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}

/// Clamp a requested page to `1..=max(total, 1)`.
pub fn clamp_page(page: usize, total: usize) -> usize {
    page.clamp(1, total.max(1))
}

/// Number of pages needed for `item_count` items. Zero items means zero pages.
pub fn page_count(item_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    item_count.div_ceil(page_size)
}

/// Items on `page` (1-based). Page 0 or past the end yields an empty slice.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Compact page selector: first, last, and the neighbours of `current`.
///
/// Any run of hidden pages, even a single one, collapses into one `Ellipsis`.
pub fn renderable_page_list(current: usize, total: usize) -> Vec<PageItem> {
    if total == 0 {
        return Vec::new();
    }
    let current = clamp_page(current, total);

    let mut anchors = vec![1, total];
    for page in current.saturating_sub(1)..=current + 1 {
        if (1..=total).contains(&page) {
            anchors.push(page);
        }
    }
    anchors.sort_unstable();
    anchors.dedup();

    let mut out = Vec::with_capacity(anchors.len() + 2);
    let mut prev: Option<usize> = None;
    for page in anchors {
        if let Some(p) = prev {
            if page - p > 1 {
                out.push(PageItem::Ellipsis);
            }
        }
        out.push(PageItem::Page(page));
        prev = Some(page);
    }
    out
}

//! # Pagination
//!
//! Shared page helper for catalog and order listings.

use serde::{Deserialize, Serialize};

/// Default page size for listings
pub const DEFAULT_PER_PAGE: u32 = 2;

/// A 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Create a page request; page 0 is treated as page 1,
    /// per_page 0 falls back to the default
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: if per_page == 0 { DEFAULT_PER_PAGE } else { per_page },
        }
    }

    /// Number of items to skip before this page starts
    pub fn offset(&self) -> usize {
        ((self.page - 1) as usize) * self.per_page as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

/// One page of a listing, with the navigation data views need
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    /// Slice one page out of a full result set
    pub fn from_items(all: Vec<T>, request: PageRequest) -> Self {
        let total_items = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.per_page as usize)
            .collect();
        Self {
            items,
            total_items,
            page: request.page,
            per_page: request.per_page,
        }
    }

    pub fn has_next_page(&self) -> bool {
        (self.per_page as u64) * (self.page as u64) < self.total_items
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_next_page().then(|| self.page + 1)
    }

    pub fn previous_page(&self) -> Option<u32> {
        self.has_previous_page().then(|| self.page - 1)
    }

    /// Last page number; an empty listing still has one (empty) page
    pub fn last_page(&self) -> u32 {
        if self.total_items == 0 {
            1
        } else {
            self.total_items.div_ceil(self.per_page as u64) as u32
        }
    }

    /// Map page items, keeping the navigation data
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

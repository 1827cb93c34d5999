//! Pagination bookkeeping derived from list fetches.

use serde::{Deserialize, Serialize};

/// Page used when a fetch does not ask for one.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when a fetch does not ask for one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Position within a paged list.
///
/// Never an independent source of truth: it is recomputed from every
/// successful list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_pages: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            total: 0,
            total_pages: 0,
        }
    }
}

impl Pagination {
    /// Derive the descriptor for a response of `total` items.
    ///
    /// A missing or zero page/limit falls back to the defaults.
    pub fn derive(page: Option<u32>, limit: Option<u32>, total: usize) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT);
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit as usize),
        }
    }

    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        (self.page as usize) < self.total_pages
    }

    /// Whether an earlier page exists.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

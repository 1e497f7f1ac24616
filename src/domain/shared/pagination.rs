use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Largest page a client may request from any listing.
pub const MAX_PAGE_SIZE: i64 = 50;

/// Highest page number whose offset still fits in an `i64`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// Page-number pagination as used by the record history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

impl PageRequest {
    /// Clamps the page to `1..=MAX_PAGE` and the page size to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// Keyset pagination over descending ids. A cursor of 0 starts from the newest row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CursorRequest {
    pub cursor: i64,
    pub page_size: i64,
}

impl Default for CursorRequest {
    fn default() -> Self {
        Self {
            cursor: 0,
            page_size: 10,
        }
    }
}

impl CursorRequest {
    pub fn new(cursor: i64, page_size: i64) -> Self {
        Self {
            cursor: cursor.max(0),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Upper bound (exclusive) for the id scan.
    pub fn upper_bound(&self) -> i64 {
        if self.cursor == 0 { i64::MAX } else { self.cursor }
    }

    /// The cursor for the next page: the last id returned, or 0 once the feed is exhausted.
    pub fn next_cursor(&self, returned: usize, last_id: Option<i64>) -> i64 {
        if (returned as i64) < self.page_size {
            0
        } else {
            last_id.unwrap_or(0)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PagedResponse<T> {
    pub total: i64,
    pub records: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CursorResponse<T> {
    pub total: i64,
    pub records: Vec<T>,
    pub next_cursor: i64,
}

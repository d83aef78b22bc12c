//! Pagination
//!
//! Query-string parsing with server-side clamping and the common
//! `{data, page, per_page, total, total_pages}` envelope.

use serde::{Deserialize, Serialize};

/// Page size used when the client omits `per_page` or sends something unusable
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Upper bound for `per_page`
pub const MAX_PER_PAGE: i64 = 100;

/// Raw pagination parameters as they arrive in the query string
///
/// Kept as strings so that `?page=abc` falls back to defaults instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl PageQuery {
    /// Resolve into a clamped [`PageRequest`]
    pub fn resolve(&self) -> PageRequest {
        let page = parse(self.page.as_deref()).filter(|p| *p >= 1).unwrap_or(1);
        let per_page = match parse(self.per_page.as_deref()) {
            Some(n) if n > MAX_PER_PAGE => MAX_PER_PAGE,
            Some(n) if n >= 1 => n,
            _ => DEFAULT_PER_PAGE,
        };
        PageRequest { page, per_page }
    }
}

fn parse(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

/// Validated page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64) -> Self {
        PageQuery {
            page: Some(page.to_string()),
            per_page: Some(per_page.to_string()),
        }
        .resolve()
    }

    /// SQL `LIMIT`
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// SQL `OFFSET`, saturating for absurd page numbers
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// Paginated response envelope
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: i64) -> Self {
        let total_pages = if total <= 0 {
            0
        } else {
            (total + request.per_page - 1) / request.per_page
        };
        Self {
            data,
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

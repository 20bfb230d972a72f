use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Default page size for most endpoint families
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Default page size for people/project listings
pub const WIDE_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Paging, sorting and common filter parameters read from a query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort_by: Option<String>,
    pub sort_desc: bool,
    pub keyword: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl PageQuery {
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            sort_by: None,
            sort_desc: false,
            keyword: None,
            status: None,
            start_date: None,
            end_date: None,
        }
    }

    /// Parse query parameters. Never fails: anything malformed falls back to
    /// its default, and `page`/`page_size` are clamped into range.
    pub fn parse(params: &HashMap<String, String>, default_page_size: u32) -> Self {
        let defaults = Self::with_page_size(default_page_size);

        let page = params
            .get("page")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|p| p.clamp(1, i64::from(u32::MAX)) as u32)
            .unwrap_or(defaults.page);

        let page_size = params
            .get("page_size")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|s| s.clamp(1, i64::from(MAX_PAGE_SIZE)) as u32)
            .unwrap_or(defaults.page_size);

        let sort_desc = params
            .get("sort_desc")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "desc"))
            .unwrap_or(false);

        Self {
            page,
            page_size,
            sort_by: non_blank(params.get("sort_by")),
            sort_desc,
            keyword: non_blank(params.get("keyword")),
            status: non_blank(params.get("status")),
            start_date: params.get("start_date").and_then(|v| parse_date(v)),
            end_date: params.get("end_date").and_then(|v| parse_date(v)),
        }
    }

    /// Number of records to skip before this page
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }

    pub fn limit(&self) -> usize {
        self.page_size as usize
    }

    pub fn pagination(&self, total: u64) -> Pagination {
        Pagination::new(self.page, self.page_size, total)
    }

    /// Case-insensitive keyword match against any of `haystacks`
    pub fn matches_keyword(&self, haystacks: &[&str]) -> bool {
        match &self.keyword {
            None => true,
            Some(keyword) => {
                let needle = keyword.to_lowercase();
                haystacks.iter().any(|h| h.to_lowercase().contains(&needle))
            }
        }
    }

    pub fn matches_status(&self, status: &str) -> bool {
        self.status.as_deref().map_or(true, |wanted| wanted.eq_ignore_ascii_case(status))
    }

    /// Inclusive date-range check on a timestamp's calendar date
    pub fn in_date_range(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.start_date.map_or(true, |start| day >= start) && self.end_date.map_or(true, |end| day <= end)
    }
}

/// Pagination descriptor returned in the envelope's `meta`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32, total: u64) -> Self {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        Self {
            page,
            page_size,
            total,
            total_pages: total.div_ceil(u64::from(page_size)),
        }
    }
}

/// One page of results handed back by a collaborator
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn page_size_is_clamped() {
        for (raw, expected) in [("-5", 1), ("0", 1), ("1", 1), ("100", 100), ("101", 100), ("1000", 100)] {
            let query = PageQuery::parse(&params(&[("page_size", raw)]), DEFAULT_PAGE_SIZE);
            assert_eq!(query.page_size, expected, "page_size={}", raw);
        }
    }

    #[test]
    fn page_below_one_becomes_one() {
        for raw in ["0", "-3", "-9999999999999"] {
            let query = PageQuery::parse(&params(&[("page", raw)]), DEFAULT_PAGE_SIZE);
            assert_eq!(query.page, 1);
        }
    }

    #[test]
    fn malformed_numbers_fall_back_to_defaults() {
        let query = PageQuery::parse(&params(&[("page", "abc"), ("page_size", "ten")]), WIDE_PAGE_SIZE);
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, WIDE_PAGE_SIZE);
    }

    #[test]
    fn reads_sort_and_filters() {
        let query = PageQuery::parse(
            &params(&[
                ("sort_by", "code"),
                ("sort_desc", "true"),
                ("keyword", "  cash "),
                ("status", ""),
                ("start_date", "2024-01-01"),
                ("end_date", "not-a-date"),
            ]),
            DEFAULT_PAGE_SIZE,
        );
        assert_eq!(query.sort_by.as_deref(), Some("code"));
        assert!(query.sort_desc);
        assert_eq!(query.keyword.as_deref(), Some("cash"));
        assert_eq!(query.status, None);
        assert_eq!(query.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(query.end_date, None);
    }

    #[test]
    fn scenario_page_zero_and_oversized_page() {
        let query = PageQuery::parse(&params(&[("page", "0"), ("page_size", "500")]), DEFAULT_PAGE_SIZE);
        let meta = query.pagination(0);
        assert_eq!((meta.page, meta.page_size), (1, 100));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).total_pages, 2);
        assert_eq!(Pagination::new(3, 20, 41).total_pages, 3);
    }

    #[test]
    fn offset_follows_page() {
        let mut query = PageQuery::with_page_size(20);
        query.page = 3;
        assert_eq!(query.offset(), 40);
    }
}

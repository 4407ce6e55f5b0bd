//! Page-number pagination shared by the feed and listing paths.

use serde::Serialize;
use thiserror::Error;

use crate::domain::error::DomainError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("invalid page: {0}")]
    InvalidPage(String),
    #[error("page size must be greater than zero")]
    InvalidPageSize,
}

impl From<PaginationError> for DomainError {
    fn from(err: PaginationError) -> Self {
        DomainError::validation("page", err.to_string())
    }
}

/// Parse the raw `page` query parameter. Absent or blank means the first page.
pub fn parse_page_number(raw: Option<&str>) -> Result<u32, PaginationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(1),
        Some(value) => value
            .parse::<u32>()
            .map_err(|_| PaginationError::InvalidPage(value.to_string())),
    }
}

/// A 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::InvalidPage(
                "pages are numbered from 1".to_string(),
            ));
        }
        if page_size == 0 {
            return Err(PaginationError::InvalidPageSize);
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

/// One page of results plus the metadata clients need to walk the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap an already-sliced page. `count` is the total across all pages.
    pub fn new(results: Vec<T>, count: u64, request: PageRequest) -> Self {
        let page_size = u64::from(request.page_size());
        let total_pages = u32::try_from(count.div_ceil(page_size)).unwrap_or(u32::MAX);
        let page = request.page();

        Self {
            count,
            page,
            page_size: request.page_size(),
            total_pages,
            next: (page < total_pages).then_some(page + 1),
            previous: (page > 1).then_some(page - 1),
            results,
        }
    }

    /// Slice an in-memory result set. A page past the end is empty.
    pub fn from_slice(items: &[T], request: PageRequest) -> Self
    where
        T: Clone,
    {
        let start = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let results = items
            .iter()
            .skip(start)
            .take(request.limit() as usize)
            .cloned()
            .collect();
        Self::new(results, items.len() as u64, request)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

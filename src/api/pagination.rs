use serde::{Deserialize, Serialize};

const DEFAULT_PER_PAGE: i64 = 10;
const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default)]
    pub(crate) page: Option<i64>,
    #[serde(default)]
    pub(crate) per_page: Option<i64>,
}

impl PageQuery {
    pub(crate) fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub(crate) fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    pub(crate) fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PaginatedResponse<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total_count: i64,
    pub(crate) page: i64,
    pub(crate) per_page: i64,
}

impl<T> PaginatedResponse<T> {
    pub(crate) fn new(items: Vec<T>, total_count: i64, query: &PageQuery) -> Self {
        Self { items, total_count, page: query.page(), per_page: query.per_page() }
    }
}

use trash_shared::api::{Paginated, PaginationMeta, PaginationOptions};

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Normalized page/limit pair for one offset-paginated read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub page: u32,
    pub limit: u32,
}

impl From<PaginationOptions> for PageCursor {
    fn from(opts: PaginationOptions) -> Self {
        Self {
            page: opts.page.unwrap_or(1).max(1),
            limit: opts.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }
}

impl PageCursor {
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Rows to request: one past the page so the next page can be detected
    /// without a count query.
    pub fn fetch_limit(&self) -> u64 {
        u64::from(self.limit) + 1
    }

    /// Builds the page from a read of up to [`fetch_limit`](Self::fetch_limit) rows.
    pub fn paginate<T>(&self, mut rows: Vec<T>) -> Paginated<T> {
        let limit = self.limit as usize;
        let has_next_page = rows.len() > limit;
        rows.truncate(limit);

        Paginated {
            items: rows,
            meta: PaginationMeta {
                page: self.page,
                limit: self.limit,
                has_next_page,
                has_prev_page: self.page > 1,
            },
        }
    }
}

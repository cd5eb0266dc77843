use serde::{Deserialize, Serialize};

use super::statement::SelectStatement;

pub const DEFAULT_PER_PAGE: i64 = 100;
pub const MAX_PER_PAGE: i64 = 250;

/// Page window shared by every fetch operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub limit: i64,
    /// Skip LIMIT/OFFSET. Only for internal, bounded lookups.
    #[serde(skip)]
    pub no_limit: bool,
}

impl FetchParams {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit, no_limit: false }
    }

    pub fn unbounded() -> Self {
        Self { no_limit: true, ..Self::default() }
    }

    pub fn effective_limit(&self) -> i64 {
        effective_limit(self.limit)
    }

    pub fn offset(&self) -> i64 {
        offset_for(self.page, self.effective_limit())
    }
}

/// Non-positive or oversized limits fall back to the default, never to the max.
pub fn effective_limit(limit: i64) -> i64 {
    if limit <= 0 || limit > MAX_PER_PAGE {
        DEFAULT_PER_PAGE
    } else {
        limit
    }
}

/// Saturates instead of overflowing on absurd page numbers.
pub fn offset_for(page: i64, limit: i64) -> i64 {
    if page > 1 {
        limit.saturating_mul(page - 1)
    } else {
        0
    }
}

pub fn bind_pagination(select: SelectStatement, params: &FetchParams) -> SelectStatement {
    if params.no_limit {
        return select;
    }
    select.limit(params.effective_limit()).offset(params.offset())
}

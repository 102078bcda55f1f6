//! Data models for the lending server

pub mod book;
pub mod loan;
pub mod user;

use crate::error::{AppError, AppResult};

// Re-export commonly used types
pub use book::{Book, BookStatus};
pub use loan::{Loan, LoanStatus};
pub use user::{Role, User, UserClaims};

/// Page selection shared by all list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    /// Return every matching row
    pub disabled: bool,
}

impl Pagination {
    pub const DEFAULT_PER_PAGE: i64 = 10;

    pub fn new(page: Option<i64>, per_page: Option<i64>, disabled: Option<bool>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1),
            per_page: per_page.filter(|p| *p > 0).unwrap_or(Self::DEFAULT_PER_PAGE),
            disabled: disabled.unwrap_or(false),
        }
    }

    /// Rows skipped before the requested page, `BadRequest` when the page
    /// lies past what an `i64` offset can address
    pub fn offset(&self) -> AppResult<i64> {
        (self.page - 1)
            .checked_mul(self.per_page)
            .ok_or_else(|| AppError::BadRequest(format!("Page {} is out of range", self.page)))
    }

    /// `LIMIT .. OFFSET ..` suffix, empty when pagination is disabled
    pub fn sql_suffix(&self) -> AppResult<String> {
        if self.disabled {
            Ok(String::new())
        } else {
            Ok(format!(" LIMIT {} OFFSET {}", self.per_page, self.offset()?))
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

/// Split a comma-separated query value into its non-empty parts
pub(crate) fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

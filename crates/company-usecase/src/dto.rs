//! Inbound requests and outbound listings
//!
//! Raw wire values (integer weekday, free-form timezone) stay raw here;
//! sanitization happens inside the operations.

use company_domain::{Company, CompanyId, UserId};

/// Fields for a new company
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyDraft {
    pub name: String,
    pub default_day_week_starts: i64,
    pub default_timezone: String,
}

impl CompanyDraft {
    pub fn new(
        name: impl Into<String>,
        default_day_week_starts: i64,
        default_timezone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            default_day_week_starts,
            default_timezone: default_timezone.into(),
        }
    }
}

/// Full replacement of an existing company
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyUpdate {
    pub id: CompanyId,
    pub name: String,
    pub default_day_week_starts: i64,
    pub default_timezone: String,
}

/// Limit/offset paging; a non-positive limit means "use the default"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Effective (limit, offset) with the default applied
    pub fn resolve(&self, default_limit: usize) -> (usize, usize) {
        let limit = if self.limit <= 0 {
            default_limit
        } else {
            self.limit as usize
        };
        (limit, self.offset.max(0) as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyList {
    pub companies: Vec<Company>,
    pub limit: usize,
    pub offset: usize,
}

/// Companies a user administers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminOfList {
    pub user_id: UserId,
    pub companies: Vec<Company>,
}

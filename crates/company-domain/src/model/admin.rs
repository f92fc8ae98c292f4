//! Admins - Who administers which company
//!
//! A DirectoryEntry is the denormalized view of one user inside one
//! company. Entries are never cached on their own; the unit of caching
//! is the whole admin list of a company.

use super::company::CompanyId;

/// Unique identifier for a User
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user's directory record within a company
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub company_id: CompanyId,
    pub user_id: UserId,
    pub internal_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub confirmed_and_active: bool,
}

impl DirectoryEntry {
    /// Minimal entry with empty directory fields
    pub fn new(company_id: CompanyId, user_id: UserId) -> Self {
        Self {
            company_id,
            user_id,
            internal_id: String::new(),
            name: String::new(),
            email: String::new(),
            phone_number: String::new(),
            confirmed_and_active: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn is_for(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

/// The admin list of a company, as returned to callers
///
/// Order of `admins` is unspecified: removals swap the last entry
/// into the freed slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admins {
    pub company_id: CompanyId,
    pub admins: Vec<DirectoryEntry>,
    pub version: u64,
}

impl Admins {
    pub fn new(company_id: CompanyId, admins: Vec<DirectoryEntry>, version: u64) -> Self {
        Self {
            company_id,
            admins,
            version,
        }
    }

    pub fn len(&self) -> usize {
        self.admins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.admins.iter().any(|e| e.is_for(user_id))
    }
}

//! In-Memory Store Implementations
//!
//! Simple in-memory implementations of the store and resolver ports.
//! Used by the binary's demo wiring and by tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use company_domain::{Company, CompanyId, DirectoryEntry, RepositoryError, UserId};
use company_usecase::port::{AdminStore, CompanyStore, DirectoryResolver};

fn read_lock_error() -> RepositoryError {
    RepositoryError::PersistenceError {
        message: "Failed to acquire read lock".to_string(),
    }
}

fn write_lock_error() -> RepositoryError {
    RepositoryError::PersistenceError {
        message: "Failed to acquire write lock".to_string(),
    }
}

/// In-memory company table
///
/// Ordered by id so paging is stable between calls.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCompanyStore {
    companies: Arc<RwLock<BTreeMap<CompanyId, Company>>>,
}

impl InMemoryCompanyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> Result<usize, RepositoryError> {
        let companies = self.companies.read().map_err(|_| read_lock_error())?;
        Ok(companies.len())
    }
}

#[async_trait]
impl CompanyStore for InMemoryCompanyStore {
    async fn get(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        let companies = self.companies.read().map_err(|_| read_lock_error())?;
        Ok(companies.get(id).cloned())
    }

    async fn insert(&self, company: &Company) -> Result<(), RepositoryError> {
        let mut companies = self.companies.write().map_err(|_| write_lock_error())?;
        if companies.contains_key(company.id()) {
            return Err(RepositoryError::PersistenceError {
                message: format!("duplicate company id {}", company.id()),
            });
        }
        // Versions are local cache state, never stored
        companies.insert(company.id().clone(), company.clone().with_version(0));
        Ok(())
    }

    async fn update(&self, company: &Company) -> Result<(), RepositoryError> {
        let mut companies = self.companies.write().map_err(|_| write_lock_error())?;
        match companies.get_mut(company.id()) {
            Some(stored) => {
                *stored = company.clone().with_version(0);
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                id: company.id().to_string(),
            }),
        }
    }

    async fn list_ids(&self, limit: usize, offset: usize) -> Result<Vec<CompanyId>, RepositoryError> {
        let companies = self.companies.read().map_err(|_| read_lock_error())?;
        Ok(companies.keys().skip(offset).take(limit).cloned().collect())
    }
}

/// In-memory admin relationship table
#[derive(Debug, Clone, Default)]
pub struct InMemoryAdminStore {
    relationships: Arc<RwLock<HashMap<CompanyId, Vec<UserId>>>>,
}

impl InMemoryAdminStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> Result<usize, RepositoryError> {
        let relationships = self.relationships.read().map_err(|_| read_lock_error())?;
        Ok(relationships.values().map(Vec::len).sum())
    }
}

#[async_trait]
impl AdminStore for InMemoryAdminStore {
    async fn exists(&self, company_id: &CompanyId, user_id: &UserId) -> Result<bool, RepositoryError> {
        let relationships = self.relationships.read().map_err(|_| read_lock_error())?;
        Ok(relationships
            .get(company_id)
            .is_some_and(|users| users.contains(user_id)))
    }

    async fn insert(&self, company_id: &CompanyId, user_id: &UserId) -> Result<(), RepositoryError> {
        let mut relationships = self.relationships.write().map_err(|_| write_lock_error())?;
        let users = relationships.entry(company_id.clone()).or_default();
        if users.contains(user_id) {
            return Err(RepositoryError::PersistenceError {
                message: format!("duplicate admin {} for company {}", user_id, company_id),
            });
        }
        users.push(user_id.clone());
        Ok(())
    }

    async fn delete(&self, company_id: &CompanyId, user_id: &UserId) -> Result<(), RepositoryError> {
        let mut relationships = self.relationships.write().map_err(|_| write_lock_error())?;
        if let Some(users) = relationships.get_mut(company_id) {
            if let Some(index) = users.iter().position(|u| u == user_id) {
                users.remove(index);
            }
            if users.is_empty() {
                relationships.remove(company_id);
            }
        }
        Ok(())
    }

    async fn list_users(&self, company_id: &CompanyId) -> Result<Vec<UserId>, RepositoryError> {
        let relationships = self.relationships.read().map_err(|_| read_lock_error())?;
        Ok(relationships.get(company_id).cloned().unwrap_or_default())
    }

    async fn list_companies(&self, user_id: &UserId) -> Result<Vec<CompanyId>, RepositoryError> {
        let relationships = self.relationships.read().map_err(|_| read_lock_error())?;
        let mut companies: Vec<CompanyId> = relationships
            .iter()
            .filter(|(_, users)| users.contains(user_id))
            .map(|(company_id, _)| company_id.clone())
            .collect();
        companies.sort();
        Ok(companies)
    }
}

/// In-memory user directory
///
/// Holds one profile per user; resolving stamps the requested company
/// onto a copy of it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectoryResolver {
    profiles: Arc<RwLock<HashMap<UserId, DirectoryEntry>>>,
}

impl InMemoryDirectoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a user's profile
    pub fn register(&self, profile: DirectoryEntry) -> Result<(), RepositoryError> {
        let mut profiles = self.profiles.write().map_err(|_| write_lock_error())?;
        profiles.insert(profile.user_id.clone(), profile);
        Ok(())
    }
}

#[async_trait]
impl DirectoryResolver for InMemoryDirectoryResolver {
    async fn resolve_entry(
        &self,
        company_id: &CompanyId,
        user_id: &UserId,
    ) -> Result<DirectoryEntry, RepositoryError> {
        let profiles = self.profiles.read().map_err(|_| read_lock_error())?;
        let mut entry = profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                id: user_id.to_string(),
            })?;
        entry.company_id = company_id.clone();
        Ok(entry)
    }
}

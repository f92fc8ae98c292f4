//! Shared cache client
//!
//! Stand-in for the cluster-wide cache that push-invalidation mode
//! notifies. It records which keys were invalidated and can be switched
//! offline to exercise the failure path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use company_domain::{CompanyId, RepositoryError};
use company_usecase::port::SharedCache;
use tracing::debug;

const SERVICE: &str = "shared-cache";

#[derive(Debug, Clone)]
pub struct InMemorySharedCache {
    invalidations: Arc<RwLock<HashMap<String, u64>>>,
    online: Arc<AtomicBool>,
}

impl Default for InMemorySharedCache {
    fn default() -> Self {
        Self {
            invalidations: Arc::new(RwLock::new(HashMap::new())),
            online: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl InMemorySharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Successful invalidations of one company record
    pub fn company_invalidations(&self, id: &CompanyId) -> u64 {
        self.count(&company_key(id))
    }

    /// Successful invalidations of one company's admin list
    pub fn admins_invalidations(&self, id: &CompanyId) -> u64 {
        self.count(&admins_key(id))
    }

    pub fn total_invalidations(&self) -> u64 {
        self.invalidations
            .read()
            .map(|counts| counts.values().sum())
            .unwrap_or(0)
    }

    fn count(&self, key: &str) -> u64 {
        self.invalidations
            .read()
            .ok()
            .and_then(|counts| counts.get(key).copied())
            .unwrap_or(0)
    }

    fn invalidate(&self, key: String) -> Result<(), RepositoryError> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(RepositoryError::Remote {
                service: SERVICE.to_string(),
                message: format!("unable to invalidate {}", key),
            });
        }

        let mut counts = self.invalidations.write().map_err(|_| RepositoryError::Remote {
            service: SERVICE.to_string(),
            message: "Failed to acquire write lock".to_string(),
        })?;
        debug!(key = %key, "shared cache key invalidated");
        *counts.entry(key).or_insert(0) += 1;
        Ok(())
    }
}

fn company_key(id: &CompanyId) -> String {
    format!("company:{}", id)
}

fn admins_key(id: &CompanyId) -> String {
    format!("company:{}:admins", id)
}

#[async_trait]
impl SharedCache for InMemorySharedCache {
    async fn invalidate_company(&self, id: &CompanyId) -> Result<(), RepositoryError> {
        self.invalidate(company_key(id))
    }

    async fn invalidate_admins(&self, id: &CompanyId) -> Result<(), RepositoryError> {
        self.invalidate(admins_key(id))
    }
}

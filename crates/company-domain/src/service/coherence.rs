//! Coherence - How a committed mutation becomes visible to cache readers
//!
//! Two mutually exclusive modes, fixed when the process starts:
//!
//! ```text
//!                    committed mutation on a cached key
//!                                  │
//!             ┌────────────────────┴────────────────────┐
//!             v                                         v
//!      SelfVersioning                           PushInvalidation
//!   update entry, version += 1          update entry, version unchanged
//!   (this replica is its own             caller must notify the shared
//!    freshness authority)                cache (it owns staleness now)
//! ```
//!
//! Every replica of a deployment must run the same mode. Mixing them
//! breaks the assumption about who owns the version.
//!
//! Mutations on cold keys leave the cache alone; the key fills lazily
//! on the next read. Creation is the exception: a brand new company is
//! seeded because nobody can have read it before it existed.

use crate::model::admin::{Admins, DirectoryEntry, UserId};
use crate::model::company::{Company, CompanyId};
use crate::service::versioned_cache::{Populated, VersionedCache, WriteGeneration};

/// Which side owns the "is this copy stale" question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoherenceMode {
    /// Bump the local version on every mutation
    SelfVersioning,
    /// Keep the local version, invalidate the external shared cache
    PushInvalidation,
}

impl CoherenceMode {
    pub fn bumps_local_version(&self) -> bool {
        matches!(self, CoherenceMode::SelfVersioning)
    }

    pub fn notifies_shared_cache(&self) -> bool {
        matches!(self, CoherenceMode::PushInvalidation)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CoherenceMode::SelfVersioning => "self_versioning",
            CoherenceMode::PushInvalidation => "push_invalidation",
        }
    }
}

impl core::fmt::Display for CoherenceMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What applying a mutation did to the local cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEffect {
    /// Key was cold, nothing changed
    Untouched,
    /// Entry updated and bumped to `version`
    Versioned { version: u64 },
    /// Entry updated at unchanged `version`; shared cache must be told
    InvalidationRequired { version: u64 },
}

impl CacheEffect {
    pub fn requires_invalidation(&self) -> bool {
        matches!(self, CacheEffect::InvalidationRequired { .. })
    }

    /// Local version after the mutation, `None` when untouched
    pub fn version(&self) -> Option<u64> {
        match self {
            CacheEffect::Untouched => None,
            CacheEffect::Versioned { version } | CacheEffect::InvalidationRequired { version } => {
                Some(*version)
            }
        }
    }
}

/// The two per-process caches plus the active coherence mode
#[derive(Debug)]
pub struct DirectoryCache {
    mode: CoherenceMode,
    companies: VersionedCache<CompanyId, Company>,
    admins: VersionedCache<CompanyId, Vec<DirectoryEntry>>,
}

impl DirectoryCache {
    pub fn new(mode: CoherenceMode) -> Self {
        Self {
            mode,
            companies: VersionedCache::new(),
            admins: VersionedCache::new(),
        }
    }

    pub fn mode(&self) -> CoherenceMode {
        self.mode
    }

    fn effect(&self, touched: Option<u64>) -> CacheEffect {
        match (touched, self.mode) {
            (None, _) => CacheEffect::Untouched,
            (Some(version), CoherenceMode::SelfVersioning) => CacheEffect::Versioned { version },
            (Some(version), CoherenceMode::PushInvalidation) => {
                CacheEffect::InvalidationRequired { version }
            }
        }
    }

    // ========== Reads ==========

    /// Cached company stamped with its entry version
    pub fn company(&self, id: &CompanyId) -> Option<Company> {
        self.companies
            .get(id)
            .map(|entry| entry.value.with_version(entry.version))
    }

    pub fn admins(&self, id: &CompanyId) -> Option<Admins> {
        self.admins
            .get(id)
            .map(|entry| Admins::new(id.clone(), entry.value, entry.version))
    }

    pub fn company_version(&self, id: &CompanyId) -> u64 {
        self.companies.version(id)
    }

    pub fn admins_version(&self, id: &CompanyId) -> u64 {
        self.admins.version(id)
    }

    // ========== Read-through population ==========

    /// Snapshot to take before reading a company from the store
    pub fn company_generation(&self, id: &CompanyId) -> WriteGeneration {
        self.companies.generation(id)
    }

    /// Snapshot to take before reading an admin list from the store
    pub fn admins_generation(&self, id: &CompanyId) -> WriteGeneration {
        self.admins.generation(id)
    }

    /// Fill a cold company entry after a store read
    ///
    /// A value superseded by a concurrent write is returned to this caller
    /// only, at version 0, and the key stays cold.
    pub fn populate_company(&self, company: Company, seen: WriteGeneration) -> Company {
        match self.companies.populate(company.id().clone(), company, seen) {
            Populated::Cached(entry) => entry.value.with_version(entry.version),
            Populated::Superseded(company) => company.with_version(0),
        }
    }

    /// Fill a cold admin list after a store read
    pub fn populate_admins(
        &self,
        id: &CompanyId,
        admins: Vec<DirectoryEntry>,
        seen: WriteGeneration,
    ) -> Admins {
        match self.admins.populate(id.clone(), admins, seen) {
            Populated::Cached(entry) => Admins::new(id.clone(), entry.value, entry.version),
            Populated::Superseded(admins) => Admins::new(id.clone(), admins, 0),
        }
    }

    // ========== Mutations ==========

    /// Seed both caches for a company that was just created
    ///
    /// Its admin list is known to be empty. Never requires invalidation.
    pub fn record_company_created(&self, company: &Company) {
        self.companies.upsert(company.id().clone(), company.clone(), false);
        self.admins.upsert(company.id().clone(), Vec::new(), false);
    }

    pub fn record_company_updated(&self, company: &Company) -> CacheEffect {
        let bump = self.mode.bumps_local_version();
        let touched = self
            .companies
            .update_existing(company.id(), bump, |cached| *cached = company.clone());
        self.effect(touched)
    }

    /// Append a new admin to a cached list
    ///
    /// A stale copy of the same user (left behind by another replica's
    /// delete) is replaced rather than duplicated.
    pub fn record_admin_added(&self, entry: &DirectoryEntry) -> CacheEffect {
        let bump = self.mode.bumps_local_version();
        let touched = self.admins.update_existing(&entry.company_id, bump, |list| {
            match list.iter_mut().find(|e| e.is_for(&entry.user_id)) {
                Some(existing) => *existing = entry.clone(),
                None => list.push(entry.clone()),
            }
        });
        self.effect(touched)
    }

    pub fn record_admin_removed(&self, company_id: &CompanyId, user_id: &UserId) -> CacheEffect {
        let bump = self.mode.bumps_local_version();
        let touched = self
            .admins
            .remove_from_collection(company_id, bump, |e| e.is_for(user_id))
            .map(|removal| removal.version);
        self.effect(touched)
    }
}

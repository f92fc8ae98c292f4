//! CompanyDirectory - The service every request handler calls into
//!
//! Owns the per-process caches and sequences every mutation:
//!
//! ```text
//! 1. pre-condition   ── checked against the store, never the cache
//! 2. durable write   ── failure aborts; cache and audit untouched
//! 3. audit record
//! 4. telemetry       ── enqueued, never awaited
//! 5. cache update    ── only if the key is already cached
//! 6. invalidation    ── push mode only, only if step 5 touched an entry;
//!                       failure is reported although 1-5 committed
//! ```

use std::sync::Arc;

use company_domain::{CacheEffect, CoherenceMode, CompanyId, DirectoryCache, DirectoryError};
use tracing::{error, info, warn};

use crate::context::RequestContext;
use crate::port::{
    AccessPolicy, Action, AdminStore, AuditEvent, AuditSink, CompanyStore, DirectoryResolver,
    SharedCache, Telemetry, TelemetryEvent,
};

/// Page size used when a listing request does not set one
pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Caching strategy, fixed for the lifetime of the service
pub enum Caching {
    /// Every read goes to the store
    Disabled,
    /// Local version counters are the freshness signal
    SelfVersioning,
    /// Local versions stay put; the shared cache is told about every change
    PushInvalidation(Arc<dyn SharedCache>),
}

impl Caching {
    pub fn mode(&self) -> Option<CoherenceMode> {
        match self {
            Caching::Disabled => None,
            Caching::SelfVersioning => Some(CoherenceMode::SelfVersioning),
            Caching::PushInvalidation(_) => Some(CoherenceMode::PushInvalidation),
        }
    }
}

/// Outbound collaborators of the directory
#[derive(Clone)]
pub struct DirectoryPorts {
    pub companies: Arc<dyn CompanyStore>,
    pub admins: Arc<dyn AdminStore>,
    pub resolver: Arc<dyn DirectoryResolver>,
    pub audit: Arc<dyn AuditSink>,
    pub telemetry: Arc<dyn Telemetry>,
    pub access: Arc<dyn AccessPolicy>,
}

/// Which shared-cache key a mutation invalidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Invalidation {
    Company(CompanyId),
    Admins(CompanyId),
}

/// Company and admin operations over a versioned local cache
pub struct CompanyDirectory {
    pub(crate) companies: Arc<dyn CompanyStore>,
    pub(crate) admins: Arc<dyn AdminStore>,
    pub(crate) resolver: Arc<dyn DirectoryResolver>,
    audit: Arc<dyn AuditSink>,
    telemetry: Arc<dyn Telemetry>,
    access: Arc<dyn AccessPolicy>,
    pub(crate) cache: Option<DirectoryCache>,
    shared_cache: Option<Arc<dyn SharedCache>>,
    pub(crate) default_limit: usize,
}

impl CompanyDirectory {
    pub fn new(ports: DirectoryPorts, caching: Caching) -> Self {
        let cache = caching.mode().map(DirectoryCache::new);
        let shared_cache = match caching {
            Caching::PushInvalidation(shared) => Some(shared),
            Caching::Disabled | Caching::SelfVersioning => None,
        };

        Self {
            companies: ports.companies,
            admins: ports.admins,
            resolver: ports.resolver,
            audit: ports.audit,
            telemetry: ports.telemetry,
            access: ports.access,
            cache,
            shared_cache,
            default_limit: DEFAULT_LIST_LIMIT,
        }
    }

    /// Builder: page size for listings without an explicit limit
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    /// Active coherence mode, `None` when caching is disabled
    pub fn coherence_mode(&self) -> Option<CoherenceMode> {
        self.cache.as_ref().map(DirectoryCache::mode)
    }

    pub(crate) fn authorize(&self, ctx: &RequestContext, action: Action) -> Result<(), DirectoryError> {
        if self.access.permits(ctx.actor(), &action) {
            Ok(())
        } else {
            warn!(actor = ?ctx.actor(), action = ?action, "access denied");
            Err(DirectoryError::permission_denied(
                "you do not have access to this service",
            ))
        }
    }

    /// Steps 3-6 of a mutation whose durable write already committed
    pub(crate) async fn after_commit<F>(
        &self,
        ctx: &RequestContext,
        audit: AuditEvent,
        event: TelemetryEvent,
        apply: F,
        invalidation: Option<Invalidation>,
    ) -> Result<CacheEffect, DirectoryError>
    where
        F: FnOnce(&DirectoryCache) -> CacheEffect,
    {
        info!(
            actor = ?audit.actor,
            target = %audit.target_id,
            company_id = %audit.company_id,
            "{}",
            audit.action.message()
        );
        self.audit.record(audit);
        self.telemetry.track(event);

        let effect = match &self.cache {
            Some(cache) => apply(cache),
            None => CacheEffect::Untouched,
        };

        if effect.requires_invalidation() {
            if let Some(target) = invalidation {
                self.invalidate(ctx, target).await?;
            }
        }
        Ok(effect)
    }

    async fn invalidate(&self, ctx: &RequestContext, target: Invalidation) -> Result<(), DirectoryError> {
        let Some(shared) = &self.shared_cache else {
            return Ok(());
        };

        let (result, message) = match &target {
            Invalidation::Company(id) => (
                ctx.within_deadline(shared.invalidate_company(id)).await?,
                "error invalidating shared company cache",
            ),
            Invalidation::Admins(id) => (
                ctx.within_deadline(shared.invalidate_admins(id)).await?,
                "error invalidating shared admins cache",
            ),
        };

        match result {
            Ok(()) => {
                info!(target = ?target, "shared cache invalidated");
                Ok(())
            }
            Err(err) => Err(internal_error(err, message)),
        }
    }
}

/// Log the cause, hand back only the public message
pub(crate) fn internal_error(cause: impl core::fmt::Display, message: &str) -> DirectoryError {
    error!(error = %cause, "{}", message);
    DirectoryError::internal(message)
}

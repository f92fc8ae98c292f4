//! Dependency injection: config in, ready-to-serve directory out

use std::sync::Arc;
use std::time::Duration;

use company_adapter::{
    AuditTrail, InMemoryAdminStore, InMemoryCompanyStore, InMemoryDirectoryResolver,
    InMemorySharedCache, PermitAll, QueuedTelemetry, TelemetryWorker,
};
use company_usecase::{Caching, CompanyDirectory, DirectoryPorts, RequestContext};
use shared::{CoherenceSetting, ServiceConfig};
use tracing::{info, warn};

/// Everything the process keeps a handle on after start-up
pub struct Wiring {
    pub directory: Arc<CompanyDirectory>,
    pub companies: InMemoryCompanyStore,
    pub admins: InMemoryAdminStore,
    pub resolver: InMemoryDirectoryResolver,
    pub shared_cache: InMemorySharedCache,
    pub audit: Arc<AuditTrail>,
    pub telemetry: QueuedTelemetry,
    deadline: Option<Duration>,
}

impl Wiring {
    /// Build the directory described by `config`
    ///
    /// The returned worker must be spawned for telemetry to leave the queue.
    pub fn build(config: &ServiceConfig) -> (Self, TelemetryWorker) {
        let companies = InMemoryCompanyStore::new();
        let admins = InMemoryAdminStore::new();
        let resolver = InMemoryDirectoryResolver::new();
        let shared_cache = InMemorySharedCache::new();
        let audit = Arc::new(AuditTrail::new(config.audit.max_entries));
        let (telemetry, worker) = QueuedTelemetry::new(config.telemetry.queue_capacity);

        let caching = match (config.cache.enabled, config.cache.mode) {
            (false, _) => Caching::Disabled,
            (true, CoherenceSetting::SelfVersioning) => Caching::SelfVersioning,
            (true, CoherenceSetting::PushInvalidation) => {
                Caching::PushInvalidation(Arc::new(shared_cache.clone()))
            }
        };

        warn!("access policy permits every request");

        let ports = DirectoryPorts {
            companies: Arc::new(companies.clone()),
            admins: Arc::new(admins.clone()),
            resolver: Arc::new(resolver.clone()),
            audit: audit.clone(),
            telemetry: Arc::new(telemetry.clone()),
            access: Arc::new(PermitAll),
        };

        let directory = CompanyDirectory::new(ports, caching)
            .with_default_limit(config.listing.default_limit);

        info!(
            cache = directory
                .coherence_mode()
                .map(|mode| mode.name())
                .unwrap_or("disabled"),
            deadline_ms = ?config.request.deadline_ms,
            "company directory ready"
        );

        (
            Self {
                directory: Arc::new(directory),
                companies,
                admins,
                resolver,
                shared_cache,
                audit,
                telemetry,
                deadline: config.request_deadline(),
            },
            worker,
        )
    }

    /// Request context carrying the configured deadline
    pub fn context(&self, actor: Option<&str>) -> RequestContext {
        let mut ctx = RequestContext::new();
        if let Some(actor) = actor {
            ctx = ctx.with_actor(actor);
        }
        if let Some(deadline) = self.deadline {
            ctx = ctx.with_timeout(deadline);
        }
        ctx
    }
}

//! Ports - What the directory needs from the outside world
//!
//! ```text
//! Use Case Layer              │  Adapter Layer
//! ────────────────────────────┼──────────────────────────────
//! trait CompanyStore          │  InMemoryCompanyStore, MySQL…
//! trait AdminStore            │  InMemoryAdminStore, MySQL…
//! trait DirectoryResolver     │  InMemoryDirectoryResolver
//! trait SharedCache           │  InMemorySharedCache, frontcache client
//! trait AuditSink             │  AuditTrail
//! trait Telemetry             │  QueuedTelemetry
//! trait AccessPolicy          │  PermitAll
//! ```
//!
//! Store, resolver and shared-cache calls are async and fallible and are
//! awaited by the request that issued them. Audit and telemetry are sync
//! and infallible from the caller's point of view.

use async_trait::async_trait;
use company_domain::{Company, CompanyId, DirectoryEntry, RepositoryError, UserId};

/// Canonical storage for company records
#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// Find a company by id
    async fn get(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError>;

    /// Insert a new company
    async fn insert(&self, company: &Company) -> Result<(), RepositoryError>;

    /// Overwrite an existing company
    async fn update(&self, company: &Company) -> Result<(), RepositoryError>;

    /// Page through company ids in a stable order
    async fn list_ids(&self, limit: usize, offset: usize) -> Result<Vec<CompanyId>, RepositoryError>;
}

/// Canonical storage for admin relationships
#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn exists(&self, company_id: &CompanyId, user_id: &UserId) -> Result<bool, RepositoryError>;

    async fn insert(&self, company_id: &CompanyId, user_id: &UserId) -> Result<(), RepositoryError>;

    /// Delete at most one relationship
    async fn delete(&self, company_id: &CompanyId, user_id: &UserId) -> Result<(), RepositoryError>;

    /// Users administering a company
    async fn list_users(&self, company_id: &CompanyId) -> Result<Vec<UserId>, RepositoryError>;

    /// Companies administered by a user
    async fn list_companies(&self, user_id: &UserId) -> Result<Vec<CompanyId>, RepositoryError>;
}

/// Hydrates directory entries for a user within a company
#[async_trait]
pub trait DirectoryResolver: Send + Sync {
    async fn resolve_entry(
        &self,
        company_id: &CompanyId,
        user_id: &UserId,
    ) -> Result<DirectoryEntry, RepositoryError>;
}

/// External shared cache, only used in push-invalidation mode
///
/// Both calls must be idempotent: invalidating the same key twice is
/// always safe.
#[async_trait]
pub trait SharedCache: Send + Sync {
    async fn invalidate_company(&self, id: &CompanyId) -> Result<(), RepositoryError>;

    async fn invalidate_admins(&self, id: &CompanyId) -> Result<(), RepositoryError>;
}

/// Kind of mutation being audited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    CompanyCreated,
    CompanyUpdated,
    AdminAdded,
    AdminRemoved,
}

impl AuditAction {
    pub fn message(&self) -> &'static str {
        match self {
            AuditAction::CompanyCreated => "created company",
            AuditAction::CompanyUpdated => "updated company",
            AuditAction::AdminAdded => "added admin",
            AuditAction::AdminRemoved => "removed admin",
        }
    }

    pub fn target_type(&self) -> &'static str {
        match self {
            AuditAction::CompanyCreated | AuditAction::CompanyUpdated => "company",
            AuditAction::AdminAdded | AuditAction::AdminRemoved => "admin",
        }
    }
}

/// One audited mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub actor: Option<String>,
    /// Company id for company events, user id for admin events
    pub target_id: String,
    pub company_id: CompanyId,
    pub original: Option<Company>,
    pub updated: Option<Company>,
}

/// Receives audit records after a durable write
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Product analytics event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryEvent {
    pub name: &'static str,
    pub actor: Option<String>,
}

impl TelemetryEvent {
    pub fn new(name: &'static str, actor: Option<&str>) -> Self {
        Self {
            name,
            actor: actor.map(str::to_string),
        }
    }
}

/// Fire-and-forget event tracking
///
/// Implementations must return immediately; delivery happens elsewhere
/// and its failures are never reported back to the caller.
pub trait Telemetry: Send + Sync {
    fn track(&self, event: TelemetryEvent);
}

/// Operation being authorized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateCompany,
    ListCompanies,
    GetCompany(CompanyId),
    UpdateCompany(CompanyId),
    ListAdmins(CompanyId),
    GetAdmin(CompanyId),
    CreateAdmin(CompanyId),
    DeleteAdmin(CompanyId),
    AdminOf(UserId),
}

/// Authorization decision point
pub trait AccessPolicy: Send + Sync {
    fn permits(&self, actor: Option<&str>, action: &Action) -> bool;
}

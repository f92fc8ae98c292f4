//! In-memory fakes for the ports, test builds only

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use company_domain::{Company, CompanyId, DirectoryEntry, RepositoryError, UserId};
use tokio::sync::oneshot;

use crate::directory::{Caching, CompanyDirectory, DirectoryPorts};
use crate::port::{
    AccessPolicy, Action, AdminStore, AuditEvent, AuditSink, CompanyStore, DirectoryResolver,
    SharedCache, Telemetry, TelemetryEvent,
};

/// A store read held open after taking its snapshot
///
/// `reached` fires once the read has copied its result; the read returns
/// that copy after `release` is sent or dropped.
pub(crate) type HeldRead = (oneshot::Receiver<()>, oneshot::Sender<()>);

type Hold = Mutex<Option<(oneshot::Sender<()>, oneshot::Receiver<()>)>>;

fn hold_next(slot: &Hold) -> HeldRead {
    let (reached_tx, reached_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();
    *slot.lock().unwrap() = Some((reached_tx, release_rx));
    (reached_rx, release_tx)
}

async fn wait_if_held(slot: &Hold) {
    let held = slot.lock().unwrap().take();
    if let Some((reached, release)) = held {
        let _ = reached.send(());
        let _ = release.await;
    }
}

#[derive(Default)]
pub(crate) struct FakeCompanyStore {
    companies: Mutex<BTreeMap<CompanyId, Company>>,
    get_calls: AtomicUsize,
    fail_writes: AtomicBool,
    hold: Hold,
}

impl FakeCompanyStore {
    pub fn seed(&self, company: Company) {
        self.companies
            .lock()
            .unwrap()
            .insert(company.id().clone(), company);
    }

    pub fn stored(&self, id: &CompanyId) -> Option<Company> {
        self.companies.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.companies.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) {
        self.get_calls.store(0, Ordering::SeqCst);
    }

    /// Hold the next `get` open after it has read the current record
    pub fn hold_next_get(&self) -> HeldRead {
        hold_next(&self.hold)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(RepositoryError::PersistenceError {
                message: "disk full".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CompanyStore for FakeCompanyStore {
    async fn get(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let company = self.stored(id);
        wait_if_held(&self.hold).await;
        Ok(company)
    }

    async fn insert(&self, company: &Company) -> Result<(), RepositoryError> {
        self.check_writable()?;
        self.seed(company.clone());
        Ok(())
    }

    async fn update(&self, company: &Company) -> Result<(), RepositoryError> {
        self.check_writable()?;
        self.seed(company.clone());
        Ok(())
    }

    async fn list_ids(&self, limit: usize, offset: usize) -> Result<Vec<CompanyId>, RepositoryError> {
        Ok(self
            .companies
            .lock()
            .unwrap()
            .keys()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeAdminStore {
    relationships: Mutex<Vec<(CompanyId, UserId)>>,
    list_calls: AtomicUsize,
    hold: Hold,
}

impl FakeAdminStore {
    pub fn seed(&self, company_id: CompanyId, user_id: UserId) {
        self.relationships.lock().unwrap().push((company_id, user_id));
    }

    pub fn len(&self) -> usize {
        self.relationships.lock().unwrap().len()
    }

    /// Hold the next `list_users` open after it has read the relationships
    pub fn hold_next_list(&self) -> HeldRead {
        hold_next(&self.hold)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) {
        self.list_calls.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl AdminStore for FakeAdminStore {
    async fn exists(&self, company_id: &CompanyId, user_id: &UserId) -> Result<bool, RepositoryError> {
        Ok(self
            .relationships
            .lock()
            .unwrap()
            .iter()
            .any(|(c, u)| c == company_id && u == user_id))
    }

    async fn insert(&self, company_id: &CompanyId, user_id: &UserId) -> Result<(), RepositoryError> {
        self.seed(company_id.clone(), user_id.clone());
        Ok(())
    }

    async fn delete(&self, company_id: &CompanyId, user_id: &UserId) -> Result<(), RepositoryError> {
        let mut relationships = self.relationships.lock().unwrap();
        if let Some(index) = relationships
            .iter()
            .position(|(c, u)| c == company_id && u == user_id)
        {
            relationships.remove(index);
        }
        Ok(())
    }

    async fn list_users(&self, company_id: &CompanyId) -> Result<Vec<UserId>, RepositoryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let users: Vec<UserId> = self
            .relationships
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == company_id)
            .map(|(_, u)| u.clone())
            .collect();
        wait_if_held(&self.hold).await;
        Ok(users)
    }

    async fn list_companies(&self, user_id: &UserId) -> Result<Vec<CompanyId>, RepositoryError> {
        Ok(self
            .relationships
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, u)| u == user_id)
            .map(|(c, _)| c.clone())
            .collect())
    }
}

/// Resolves every user except the ones it was told to forget
#[derive(Default)]
pub(crate) struct FakeResolver {
    unknown: Mutex<HashSet<UserId>>,
    calls: AtomicUsize,
}

impl FakeResolver {
    pub fn forget(&self, user_id: UserId) {
        self.unknown.lock().unwrap().insert(user_id);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectoryResolver for FakeResolver {
    async fn resolve_entry(
        &self,
        company_id: &CompanyId,
        user_id: &UserId,
    ) -> Result<DirectoryEntry, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unknown.lock().unwrap().contains(user_id) {
            return Err(RepositoryError::NotFound {
                id: user_id.to_string(),
            });
        }
        Ok(DirectoryEntry::new(company_id.clone(), user_id.clone())
            .with_name(format!("User {}", user_id)))
    }
}

/// Counts successful invalidations per key
#[derive(Default)]
pub(crate) struct FakeSharedCache {
    calls: Mutex<HashMap<String, usize>>,
    failing: AtomicBool,
}

impl FakeSharedCache {
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn company_calls(&self, id: &CompanyId) -> usize {
        self.count(&format!("company:{}", id))
    }

    pub fn admins_calls(&self, id: &CompanyId) -> usize {
        self.count(&format!("admins:{}", id))
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn count(&self, key: &str) -> usize {
        self.calls.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    fn hit(&self, key: String) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Remote {
                service: "shared-cache".to_string(),
                message: "connection refused".to_string(),
            });
        }
        *self.calls.lock().unwrap().entry(key).or_insert(0) += 1;
        Ok(())
    }
}

#[async_trait]
impl SharedCache for FakeSharedCache {
    async fn invalidate_company(&self, id: &CompanyId) -> Result<(), RepositoryError> {
        self.hit(format!("company:{}", id))
    }

    async fn invalidate_admins(&self, id: &CompanyId) -> Result<(), RepositoryError> {
        self.hit(format!("admins:{}", id))
    }
}

#[derive(Default)]
pub(crate) struct RecordingAudit {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAudit {
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for RecordingAudit {
    fn record(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Default)]
pub(crate) struct RecordingTelemetry {
    names: Mutex<Vec<&'static str>>,
}

impl RecordingTelemetry {
    pub fn names(&self) -> Vec<&'static str> {
        self.names.lock().unwrap().clone()
    }
}

impl Telemetry for RecordingTelemetry {
    fn track(&self, event: TelemetryEvent) {
        self.names.lock().unwrap().push(event.name);
    }
}

#[derive(Default)]
pub(crate) struct SwitchableAccess {
    deny: AtomicBool,
}

impl SwitchableAccess {
    pub fn deny_all(&self, deny: bool) {
        self.deny.store(deny, Ordering::SeqCst);
    }
}

impl AccessPolicy for SwitchableAccess {
    fn permits(&self, _actor: Option<&str>, _action: &Action) -> bool {
        !self.deny.load(Ordering::SeqCst)
    }
}

/// A directory wired to fakes, with handles to inspect each one
pub(crate) struct Harness {
    pub directory: CompanyDirectory,
    pub companies: Arc<FakeCompanyStore>,
    pub admins: Arc<FakeAdminStore>,
    pub resolver: Arc<FakeResolver>,
    pub shared: Arc<FakeSharedCache>,
    pub audit: Arc<RecordingAudit>,
    pub telemetry: Arc<RecordingTelemetry>,
    pub access: Arc<SwitchableAccess>,
}

impl Harness {
    /// Fakes wired with `caching`; `shared` is NOT connected
    pub fn new(caching: Caching) -> Self {
        Self::build(caching, Arc::new(FakeSharedCache::default()))
    }

    /// Push-invalidation mode wired to `shared`
    pub fn new_push() -> Self {
        let shared = Arc::new(FakeSharedCache::default());
        Self::build(Caching::PushInvalidation(shared.clone()), shared)
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.directory = self.directory.with_default_limit(limit);
        self
    }

    fn build(caching: Caching, shared: Arc<FakeSharedCache>) -> Self {
        let companies = Arc::new(FakeCompanyStore::default());
        let admins = Arc::new(FakeAdminStore::default());
        let resolver = Arc::new(FakeResolver::default());
        let audit = Arc::new(RecordingAudit::default());
        let telemetry = Arc::new(RecordingTelemetry::default());
        let access = Arc::new(SwitchableAccess::default());

        let ports = DirectoryPorts {
            companies: companies.clone(),
            admins: admins.clone(),
            resolver: resolver.clone(),
            audit: audit.clone(),
            telemetry: telemetry.clone(),
            access: access.clone(),
        };

        Self {
            directory: CompanyDirectory::new(ports, caching),
            companies,
            admins,
            resolver,
            shared,
            audit,
            telemetry,
            access,
        }
    }
}

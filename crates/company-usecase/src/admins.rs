//! Admin relationship operations

use company_domain::{Admins, CompanyId, DirectoryEntry, DirectoryError, RepositoryError, UserId};
use tracing::info;

use crate::context::RequestContext;
use crate::directory::{internal_error, CompanyDirectory, Invalidation};
use crate::dto::AdminOfList;
use crate::port::{Action, AuditAction, AuditEvent, TelemetryEvent};

impl CompanyDirectory {
    /// Admin list of a company, served from cache when warm
    pub async fn list_admins(
        &self,
        ctx: &RequestContext,
        company_id: &CompanyId,
    ) -> Result<Admins, DirectoryError> {
        self.authorize(ctx, Action::ListAdmins(company_id.clone()))?;

        if let Some(cache) = &self.cache {
            if let Some(admins) = cache.admins(company_id) {
                info!(company_id = %company_id, "list admins cache hit");
                return Ok(admins);
            }
            info!(company_id = %company_id, "list admins cache miss");
        }

        let seen = self
            .cache
            .as_ref()
            .map(|cache| cache.admins_generation(company_id));
        self.get_company(ctx, company_id).await?;

        let users = ctx
            .within_deadline(self.admins.list_users(company_id))
            .await?
            .map_err(|err| internal_error(err, "unable to query database"))?;

        let mut entries = Vec::with_capacity(users.len());
        for user_id in &users {
            entries.push(self.resolve_entry(ctx, company_id, user_id).await?);
        }

        Ok(match (&self.cache, seen) {
            (Some(cache), Some(seen)) => cache.populate_admins(company_id, entries, seen),
            _ => Admins::new(company_id.clone(), entries, 0),
        })
    }

    pub async fn admin_exists(
        &self,
        ctx: &RequestContext,
        company_id: &CompanyId,
        user_id: &UserId,
    ) -> Result<bool, DirectoryError> {
        self.get_company(ctx, company_id).await?;
        self.relationship_exists(ctx, company_id, user_id, "failed to query database")
            .await
    }

    pub async fn get_admin(
        &self,
        ctx: &RequestContext,
        company_id: &CompanyId,
        user_id: &UserId,
    ) -> Result<DirectoryEntry, DirectoryError> {
        self.authorize(ctx, Action::GetAdmin(company_id.clone()))?;
        self.require_relationship(ctx, company_id, user_id).await?;
        self.resolve_entry(ctx, company_id, user_id).await
    }

    pub async fn create_admin(
        &self,
        ctx: &RequestContext,
        company_id: &CompanyId,
        user_id: &UserId,
    ) -> Result<DirectoryEntry, DirectoryError> {
        self.authorize(ctx, Action::CreateAdmin(company_id.clone()))?;

        self.load_company(ctx, company_id).await?;
        let exists = self
            .relationship_exists(
                ctx,
                company_id,
                user_id,
                "an unknown error occurred while checking existing relationships",
            )
            .await?;
        if exists {
            return Err(DirectoryError::already_exists("user is already an admin"));
        }

        let entry = self.resolve_entry(ctx, company_id, user_id).await?;

        ctx.within_deadline(self.admins.insert(company_id, user_id))
            .await?
            .map_err(|err| internal_error(err, "failed to query database"))?;

        let audit = AuditEvent {
            action: AuditAction::AdminAdded,
            actor: ctx.actor().map(str::to_string),
            target_id: user_id.to_string(),
            company_id: company_id.clone(),
            original: None,
            updated: None,
        };
        let effect = self
            .after_commit(
                ctx,
                audit,
                TelemetryEvent::new("admin_created", ctx.actor()),
                |cache| cache.record_admin_added(&entry),
                Some(Invalidation::Admins(company_id.clone())),
            )
            .await?;
        if let Some(version) = effect.version() {
            info!(company_id = %company_id, version, "create admin updated admins cache");
        }

        Ok(entry)
    }

    pub async fn delete_admin(
        &self,
        ctx: &RequestContext,
        company_id: &CompanyId,
        user_id: &UserId,
    ) -> Result<(), DirectoryError> {
        self.authorize(ctx, Action::DeleteAdmin(company_id.clone()))?;
        self.require_relationship(ctx, company_id, user_id).await?;

        ctx.within_deadline(self.admins.delete(company_id, user_id))
            .await?
            .map_err(|err| internal_error(err, "failed to query database"))?;

        let audit = AuditEvent {
            action: AuditAction::AdminRemoved,
            actor: ctx.actor().map(str::to_string),
            target_id: user_id.to_string(),
            company_id: company_id.clone(),
            original: None,
            updated: None,
        };
        let effect = self
            .after_commit(
                ctx,
                audit,
                TelemetryEvent::new("admin_deleted", ctx.actor()),
                |cache| cache.record_admin_removed(company_id, user_id),
                Some(Invalidation::Admins(company_id.clone())),
            )
            .await?;
        if let Some(version) = effect.version() {
            info!(company_id = %company_id, version, "delete admin updated admins cache");
        }

        Ok(())
    }

    /// Companies a user administers
    pub async fn admin_of(
        &self,
        ctx: &RequestContext,
        user_id: &UserId,
    ) -> Result<AdminOfList, DirectoryError> {
        self.authorize(ctx, Action::AdminOf(user_id.clone()))?;

        let company_ids = ctx
            .within_deadline(self.admins.list_companies(user_id))
            .await?
            .map_err(|err| internal_error(err, "unable to query database"))?;

        let mut companies = Vec::with_capacity(company_ids.len());
        for company_id in &company_ids {
            companies.push(self.get_company(ctx, company_id).await?);
        }

        Ok(AdminOfList {
            user_id: user_id.clone(),
            companies,
        })
    }

    /// Local version counter, 0 if the admin list was never cached
    pub fn get_admins_version(&self, company_id: &CompanyId) -> u64 {
        self.cache
            .as_ref()
            .map(|cache| cache.admins_version(company_id))
            .unwrap_or(0)
    }

    // ========== Pre-conditions (store only) ==========

    async fn relationship_exists(
        &self,
        ctx: &RequestContext,
        company_id: &CompanyId,
        user_id: &UserId,
        failure: &str,
    ) -> Result<bool, DirectoryError> {
        ctx.within_deadline(self.admins.exists(company_id, user_id))
            .await?
            .map_err(|err| internal_error(err, failure))
    }

    async fn require_relationship(
        &self,
        ctx: &RequestContext,
        company_id: &CompanyId,
        user_id: &UserId,
    ) -> Result<(), DirectoryError> {
        self.load_company(ctx, company_id).await?;
        if self
            .relationship_exists(ctx, company_id, user_id, "failed to query database")
            .await?
        {
            Ok(())
        } else {
            Err(DirectoryError::not_found("admin relationship not found"))
        }
    }

    async fn resolve_entry(
        &self,
        ctx: &RequestContext,
        company_id: &CompanyId,
        user_id: &UserId,
    ) -> Result<DirectoryEntry, DirectoryError> {
        match ctx
            .within_deadline(self.resolver.resolve_entry(company_id, user_id))
            .await?
        {
            Ok(entry) => Ok(entry),
            Err(RepositoryError::NotFound { .. }) => {
                Err(DirectoryError::not_found("directory entry not found"))
            }
            Err(err) => Err(internal_error(err, "unable to resolve directory entry")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Caching;
    use crate::dto::CompanyDraft;
    use crate::testing::Harness;
    use company_domain::{Company, DayOfWeek, ErrorKind};
    use std::collections::HashSet;

    async fn company(h: &Harness) -> Company {
        h.directory
            .create_company(&RequestContext::new(), CompanyDraft::new("Acme", 0, "UTC"))
            .await
            .unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    #[tokio::test]
    async fn test_admin_lifecycle_self_versioning() {
        let h = Harness::new(Caching::SelfVersioning);
        let ctx = RequestContext::new();
        let c1 = company(&h).await;
        assert_eq!(h.directory.get_company_version(c1.id()), 0);

        h.directory.create_admin(&ctx, c1.id(), &user("u1")).await.unwrap();
        assert_eq!(h.directory.get_admins_version(c1.id()), 1);

        h.admins.reset_calls();
        let admins = h.directory.list_admins(&ctx, c1.id()).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert!(admins.contains(&user("u1")));
        assert_eq!(admins.version, 1);
        assert_eq!(h.admins.list_calls(), 0);

        h.directory.delete_admin(&ctx, c1.id(), &user("u1")).await.unwrap();
        let admins = h.directory.list_admins(&ctx, c1.id()).await.unwrap();
        assert!(admins.is_empty());
        assert_eq!(h.directory.get_admins_version(c1.id()), 2);

        assert_eq!(h.shared.total_calls(), 0);
        assert_eq!(
            h.telemetry.names(),
            vec!["company_created", "admin_created", "admin_deleted"]
        );
    }

    #[tokio::test]
    async fn test_admin_lifecycle_push_invalidation() {
        let h = Harness::new_push();
        let ctx = RequestContext::new();
        let c1 = company(&h).await;

        h.directory.create_admin(&ctx, c1.id(), &user("u1")).await.unwrap();
        assert_eq!(h.directory.get_admins_version(c1.id()), 0);
        assert_eq!(h.shared.admins_calls(c1.id()), 1);

        let admins = h.directory.list_admins(&ctx, c1.id()).await.unwrap();
        assert_eq!(admins.len(), 1);

        h.directory.delete_admin(&ctx, c1.id(), &user("u1")).await.unwrap();
        assert!(h.directory.list_admins(&ctx, c1.id()).await.unwrap().is_empty());
        assert_eq!(h.directory.get_admins_version(c1.id()), 0);
        assert_eq!(h.shared.admins_calls(c1.id()), 2);
        assert_eq!(h.shared.company_calls(c1.id()), 0);
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let h = Harness::new(Caching::SelfVersioning);
        let ctx = RequestContext::new();
        let c1 = company(&h).await;

        h.directory.create_admin(&ctx, c1.id(), &user("u1")).await.unwrap();
        let err = h
            .directory
            .create_admin(&ctx, c1.id(), &user("u1"))
            .await
            .unwrap_err();
        assert_eq!(err, DirectoryError::already_exists("user is already an admin"));

        let admins = h.directory.list_admins(&ctx, c1.id()).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins.version, 1);
        assert_eq!(h.admins.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_relationship() {
        let h = Harness::new(Caching::SelfVersioning);
        let ctx = RequestContext::new();
        let c1 = company(&h).await;

        let err = h
            .directory
            .delete_admin(&ctx, c1.id(), &user("nobody"))
            .await
            .unwrap_err();
        assert_eq!(err, DirectoryError::not_found("admin relationship not found"));
        assert_eq!(h.directory.get_admins_version(c1.id()), 0);
    }

    #[tokio::test]
    async fn test_precondition_uses_store_not_stale_cache() {
        let h = Harness::new(Caching::SelfVersioning);
        let ctx = RequestContext::new();
        let c1 = company(&h).await;

        // another replica added u1; our cached list is stale and empty
        h.admins.seed(c1.id().clone(), user("u1"));
        assert!(h.directory.list_admins(&ctx, c1.id()).await.unwrap().is_empty());

        let err = h
            .directory
            .create_admin(&ctx, c1.id(), &user("u1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        // delete succeeds against the store and still touches the cached entry
        h.directory.delete_admin(&ctx, c1.id(), &user("u1")).await.unwrap();
        assert_eq!(h.directory.get_admins_version(c1.id()), 1);
    }

    #[tokio::test]
    async fn test_list_admins_read_through() {
        let h = Harness::new(Caching::SelfVersioning);
        let ctx = RequestContext::new();
        let id = CompanyId::new("c-cold");
        h.companies
            .seed(Company::new(id.clone(), "Cold", DayOfWeek::Sunday, "UTC"));
        for u in ["u1", "u2", "u3"] {
            h.admins.seed(id.clone(), user(u));
        }

        let admins = h.directory.list_admins(&ctx, &id).await.unwrap();
        let ids: HashSet<_> = admins.admins.iter().map(|e| e.user_id.clone()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(admins.version, 0);
        assert_eq!(h.resolver.calls(), 3);

        h.directory.list_admins(&ctx, &id).await.unwrap();
        assert_eq!(h.resolver.calls(), 3);
    }

    #[tokio::test]
    async fn test_list_racing_a_create_keeps_the_new_admin() {
        let h = Harness::new(Caching::SelfVersioning);
        let ctx = RequestContext::new();
        let id = CompanyId::new("c-cold");
        h.companies
            .seed(Company::new(id.clone(), "Cold", DayOfWeek::Sunday, "UTC"));

        // The listing reads no admins and stalls while u1 is added
        let (reached, release) = h.admins.hold_next_list();
        let reader = h.directory.list_admins(&ctx, &id);
        let writer = async {
            reached.await.unwrap();
            h.directory.create_admin(&ctx, &id, &user("u1")).await.unwrap();
            release.send(()).unwrap();
        };
        let (listed, ()) = tokio::join!(reader, writer);
        assert!(listed.unwrap().is_empty());

        let admins = h.directory.list_admins(&ctx, &id).await.unwrap();
        assert!(admins.contains(&user("u1")));
        assert_eq!(admins.len(), 1);
    }

    #[tokio::test]
    async fn test_swap_delete_keeps_remaining_admins() {
        let h = Harness::new(Caching::SelfVersioning);
        let ctx = RequestContext::new();
        let c1 = company(&h).await;
        for u in ["u1", "u2", "u3", "u4"] {
            h.directory.create_admin(&ctx, c1.id(), &user(u)).await.unwrap();
        }

        h.directory.delete_admin(&ctx, c1.id(), &user("u2")).await.unwrap();

        let admins = h.directory.list_admins(&ctx, c1.id()).await.unwrap();
        let ids: HashSet<_> = admins.admins.iter().map(|e| e.user_id.clone()).collect();
        let expected: HashSet<_> = [user("u1"), user("u3"), user("u4")].into_iter().collect();
        assert_eq!(ids, expected);
        assert_eq!(admins.version, 5);
    }

    #[tokio::test]
    async fn test_get_admin_and_exists() {
        let h = Harness::new(Caching::SelfVersioning);
        let ctx = RequestContext::new();
        let c1 = company(&h).await;

        assert!(!h.directory.admin_exists(&ctx, c1.id(), &user("u1")).await.unwrap());
        let err = h.directory.get_admin(&ctx, c1.id(), &user("u1")).await.unwrap_err();
        assert!(err.is_not_found());

        h.directory.create_admin(&ctx, c1.id(), &user("u1")).await.unwrap();
        assert!(h.directory.admin_exists(&ctx, c1.id(), &user("u1")).await.unwrap());
        let entry = h.directory.get_admin(&ctx, c1.id(), &user("u1")).await.unwrap();
        assert_eq!(entry.user_id, user("u1"));

        let err = h
            .directory
            .admin_exists(&ctx, &CompanyId::new("ghost"), &user("u1"))
            .await
            .unwrap_err();
        assert_eq!(err, DirectoryError::not_found("company not found"));
    }

    #[tokio::test]
    async fn test_unresolvable_user_is_not_inserted() {
        let h = Harness::new(Caching::SelfVersioning);
        let ctx = RequestContext::new();
        let c1 = company(&h).await;
        h.resolver.forget(user("ghost"));

        let err = h
            .directory
            .create_admin(&ctx, c1.id(), &user("ghost"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(h.admins.len(), 0);
        assert_eq!(h.directory.get_admins_version(c1.id()), 0);
    }

    #[tokio::test]
    async fn test_push_mode_invalidation_failure_after_commit() {
        let h = Harness::new_push();
        let ctx = RequestContext::new();
        let c1 = company(&h).await;
        h.shared.fail(true);

        let err = h
            .directory
            .create_admin(&ctx, c1.id(), &user("u1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);

        // data changed even though the call failed
        assert_eq!(h.admins.len(), 1);
        assert!(h.directory.list_admins(&ctx, c1.id()).await.unwrap().contains(&user("u1")));
        assert_eq!(h.directory.get_admins_version(c1.id()), 0);

        // retrying the invalidation is harmless
        h.shared.fail(false);
        h.directory.delete_admin(&ctx, c1.id(), &user("u1")).await.unwrap();
        assert_eq!(h.shared.admins_calls(c1.id()), 1);
    }

    #[tokio::test]
    async fn test_admin_of() {
        let h = Harness::new(Caching::SelfVersioning);
        let ctx = RequestContext::new();
        let c1 = company(&h).await;
        let c2 = company(&h).await;
        h.directory.create_admin(&ctx, c1.id(), &user("u1")).await.unwrap();
        h.directory.create_admin(&ctx, c2.id(), &user("u1")).await.unwrap();

        let list = h.directory.admin_of(&ctx, &user("u1")).await.unwrap();
        assert_eq!(list.user_id, user("u1"));
        assert_eq!(list.companies.len(), 2);
        assert!(h.directory.admin_of(&ctx, &user("u2")).await.unwrap().companies.is_empty());
    }
}

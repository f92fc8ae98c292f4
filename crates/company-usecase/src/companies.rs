//! Company operations

use company_domain::{CacheEffect, Company, CompanyId, DirectoryError, RepositoryError};
use tracing::info;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::directory::{internal_error, CompanyDirectory, Invalidation};
use crate::dto::{CompanyDraft, CompanyList, CompanyUpdate, Page};
use crate::port::{Action, AuditAction, AuditEvent, TelemetryEvent};
use crate::sanitize::{require_name, sanitize_day_of_week, validate_timezone};

impl CompanyDirectory {
    pub async fn create_company(
        &self,
        ctx: &RequestContext,
        draft: CompanyDraft,
    ) -> Result<Company, DirectoryError> {
        self.authorize(ctx, Action::CreateCompany)?;

        let day = sanitize_day_of_week(draft.default_day_week_starts)?;
        validate_timezone(&draft.default_timezone)?;
        require_name(&draft.name)?;

        let company = Company::new(
            CompanyId::new(Uuid::new_v4().to_string()),
            draft.name,
            day,
            draft.default_timezone,
        );

        ctx.within_deadline(self.companies.insert(&company))
            .await?
            .map_err(|err| internal_error(err, "could not create company"))?;

        let audit = AuditEvent {
            action: AuditAction::CompanyCreated,
            actor: ctx.actor().map(str::to_string),
            target_id: company.id().to_string(),
            company_id: company.id().clone(),
            original: None,
            updated: Some(company.clone()),
        };
        // Creation has no prior readers anywhere, so nothing to invalidate.
        self.after_commit(
            ctx,
            audit,
            TelemetryEvent::new("company_created", ctx.actor()),
            |cache| {
                cache.record_company_created(&company);
                CacheEffect::Untouched
            },
            None,
        )
        .await?;

        Ok(company)
    }

    /// Read-through lookup of a single company
    pub async fn get_company(
        &self,
        ctx: &RequestContext,
        id: &CompanyId,
    ) -> Result<Company, DirectoryError> {
        self.authorize(ctx, Action::GetCompany(id.clone()))?;

        if let Some(cache) = &self.cache {
            if let Some(company) = cache.company(id) {
                info!(company_id = %id, "get company cache hit");
                return Ok(company);
            }
            info!(company_id = %id, "get company cache miss");
        }

        // Taken before the store read so a write landing meanwhile wins
        let seen = self.cache.as_ref().map(|cache| cache.company_generation(id));
        let company = self.load_company(ctx, id).await?;
        Ok(match (&self.cache, seen) {
            (Some(cache), Some(seen)) => cache.populate_company(company, seen),
            _ => company.with_version(0),
        })
    }

    pub async fn update_company(
        &self,
        ctx: &RequestContext,
        update: CompanyUpdate,
    ) -> Result<Company, DirectoryError> {
        self.authorize(ctx, Action::UpdateCompany(update.id.clone()))?;

        let day = sanitize_day_of_week(update.default_day_week_starts)?;
        validate_timezone(&update.default_timezone)?;

        let original = self.load_company(ctx, &update.id).await?;
        let updated = Company::new(update.id, update.name, day, update.default_timezone);

        ctx.within_deadline(self.companies.update(&updated))
            .await?
            .map_err(|err| internal_error(err, "could not update the company"))?;

        let audit = AuditEvent {
            action: AuditAction::CompanyUpdated,
            actor: ctx.actor().map(str::to_string),
            target_id: updated.id().to_string(),
            company_id: updated.id().clone(),
            original: Some(original),
            updated: Some(updated.clone()),
        };
        let effect = self
            .after_commit(
                ctx,
                audit,
                TelemetryEvent::new("company_updated", ctx.actor()),
                |cache| cache.record_company_updated(&updated),
                Some(Invalidation::Company(updated.id().clone())),
            )
            .await?;

        if let Some(version) = effect.version() {
            info!(company_id = %updated.id(), version, "update company cache");
        }
        let version = effect
            .version()
            .unwrap_or_else(|| self.get_company_version(updated.id()));
        Ok(updated.with_version(version))
    }

    /// Company ids only, no hydration
    pub async fn list_company_rows(
        &self,
        ctx: &RequestContext,
        page: Page,
    ) -> Result<Vec<CompanyId>, DirectoryError> {
        self.authorize(ctx, Action::ListCompanies)?;
        let (limit, offset) = page.resolve(self.default_limit);

        ctx.within_deadline(self.companies.list_ids(limit, offset))
            .await?
            .map_err(|err| internal_error(err, "unable to query database"))
    }

    pub async fn list_companies(
        &self,
        ctx: &RequestContext,
        page: Page,
    ) -> Result<CompanyList, DirectoryError> {
        let (limit, offset) = page.resolve(self.default_limit);
        let ids = self.list_company_rows(ctx, page).await?;

        let mut companies = Vec::with_capacity(ids.len());
        for id in &ids {
            companies.push(self.get_company(ctx, id).await?);
        }

        Ok(CompanyList {
            companies,
            limit,
            offset,
        })
    }

    /// Local version counter, 0 if the company was never cached
    pub fn get_company_version(&self, id: &CompanyId) -> u64 {
        self.cache
            .as_ref()
            .map(|cache| cache.company_version(id))
            .unwrap_or(0)
    }

    /// Store lookup that bypasses the cache
    pub(crate) async fn load_company(
        &self,
        ctx: &RequestContext,
        id: &CompanyId,
    ) -> Result<Company, DirectoryError> {
        match ctx.within_deadline(self.companies.get(id)).await? {
            Ok(Some(company)) => Ok(company),
            Ok(None) | Err(RepositoryError::NotFound { .. }) => {
                Err(DirectoryError::not_found("company not found"))
            }
            Err(err) => Err(internal_error(err, "unable to query database")),
        }
    }
}

//! Demo run: one company, two admins, every mutation path once

use company_domain::{CompanyId, DirectoryEntry, UserId};
use company_usecase::{CompanyDraft, CompanyUpdate, Page};
use tracing::info;

use crate::wiring::Wiring;

pub async fn run(wiring: &Wiring, actor: Option<&str>) -> anyhow::Result<()> {
    let directory = &wiring.directory;
    let ctx = wiring.context(actor);

    // ========================================
    // Directory users
    // ========================================

    for (user, name, email) in [
        ("u-ada", "Ada Lovelace", "ada@example.com"),
        ("u-grace", "Grace Hopper", "grace@example.com"),
    ] {
        wiring.resolver.register(
            DirectoryEntry::new(CompanyId::new(""), UserId::new(user))
                .with_name(name)
                .with_email(email),
        )?;
    }

    // ========================================
    // Company lifecycle
    // ========================================

    let company = directory
        .create_company(&ctx, CompanyDraft::new("Acme", 1, "America/New_York"))
        .await?;
    let company_id = company.id().clone();
    info!(company_id = %company_id, name = company.name(), "created");

    let company = directory
        .update_company(
            &ctx,
            CompanyUpdate {
                id: company_id.clone(),
                name: "Acme Corp".to_string(),
                default_day_week_starts: 0,
                default_timezone: "Europe/London".to_string(),
            },
        )
        .await?;
    info!(
        name = company.name(),
        week_starts = %company.default_day_week_starts(),
        version = company.version(),
        "updated"
    );

    // ========================================
    // Admin lifecycle
    // ========================================

    let ada = UserId::new("u-ada");
    let grace = UserId::new("u-grace");

    directory.create_admin(&ctx, &company_id, &ada).await?;
    directory.create_admin(&ctx, &company_id, &grace).await?;
    if let Err(err) = directory.create_admin(&ctx, &company_id, &ada).await {
        info!(error = %err, "duplicate admin rejected");
    }
    directory.delete_admin(&ctx, &company_id, &ada).await?;

    let admins = directory.list_admins(&ctx, &company_id).await?;
    for entry in &admins.admins {
        info!(user_id = %entry.user_id, name = %entry.name, "admin");
    }

    let listing = directory.list_companies(&ctx, Page::default()).await?;
    let admin_of = directory.admin_of(&ctx, &grace).await?;

    // ========================================
    // Summary
    // ========================================

    let audit = wiring.audit.stats();
    info!(
        companies = listing.companies.len(),
        admins = admins.len(),
        company_version = directory.get_company_version(&company_id),
        admins_version = directory.get_admins_version(&company_id),
        grace_admin_of = admin_of.companies.len(),
        "directory state"
    );
    info!(
        audit_entries = audit.total_entries,
        shared_invalidations = wiring.shared_cache.total_invalidations(),
        telemetry_dropped = wiring.telemetry.dropped(),
        "side effects"
    );

    Ok(())
}

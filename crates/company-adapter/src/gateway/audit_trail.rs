//! Audit sink backed by the in-process audit log

use std::sync::{Mutex, PoisonError};

use audit::{AuditEntry, AuditEventType, AuditLogger, AuditStats};
use company_domain::Company;
use company_usecase::port::{AuditAction, AuditEvent, AuditSink};
use serde_json::json;
use tracing::info;

#[derive(Debug)]
pub struct AuditTrail {
    logger: Mutex<AuditLogger>,
}

impl AuditTrail {
    pub fn new(max_entries: usize) -> Self {
        Self {
            logger: Mutex::new(AuditLogger::new(max_entries)),
        }
    }

    /// Most recent entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let logger = self.logger.lock().unwrap_or_else(PoisonError::into_inner);
        logger.get_recent(limit).into_iter().cloned().collect()
    }

    pub fn stats(&self) -> AuditStats {
        let logger = self.logger.lock().unwrap_or_else(PoisonError::into_inner);
        logger.get_stats()
    }

    pub fn export_json(&self) -> serde_json::Value {
        let logger = self.logger.lock().unwrap_or_else(PoisonError::into_inner);
        logger.export_json()
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self {
            logger: Mutex::new(AuditLogger::default()),
        }
    }
}

fn event_type(action: AuditAction) -> AuditEventType {
    match action {
        AuditAction::CompanyCreated => AuditEventType::CompanyCreated,
        AuditAction::CompanyUpdated => AuditEventType::CompanyUpdated,
        AuditAction::AdminAdded => AuditEventType::AdminAdded,
        AuditAction::AdminRemoved => AuditEventType::AdminRemoved,
    }
}

fn company_json(company: &Company) -> serde_json::Value {
    json!({
        "id": company.id().as_str(),
        "name": company.name(),
        "defaultDayWeekStarts": company.default_day_week_starts().index(),
        "defaultTimezone": company.default_timezone(),
    })
}

impl AuditSink for AuditTrail {
    fn record(&self, event: AuditEvent) {
        info!(
            action = event.action.message(),
            target_type = event.action.target_type(),
            target_id = %event.target_id,
            company_id = %event.company_id,
            actor = event.actor.as_deref().unwrap_or("anonymous"),
            "audit"
        );

        let mut logger = self.logger.lock().unwrap_or_else(PoisonError::into_inner);
        match event.action {
            AuditAction::CompanyCreated | AuditAction::CompanyUpdated => logger.log_company_change(
                event_type(event.action),
                event.action.message(),
                event.company_id.as_str(),
                event.actor.as_deref(),
                event.original.as_ref().map(company_json),
                event.updated.as_ref().map(company_json),
            ),
            AuditAction::AdminAdded | AuditAction::AdminRemoved => logger.log_admin_change(
                event_type(event.action),
                event.action.message(),
                event.company_id.as_str(),
                &event.target_id,
                event.actor.as_deref(),
            ),
        }
    }
}

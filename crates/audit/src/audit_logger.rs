//! AuditLogger - Audit trail for directory mutations

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub timestamp: String,
    pub event_type: AuditEventType,
    /// Human-readable action, e.g. "updated company"
    pub message: String,
    pub target_type: String,
    pub target_id: String,
    pub company_id: String,
    pub actor: Option<String>,
    pub original: Option<serde_json::Value>,
    pub updated: Option<serde_json::Value>,
}

/// Types of audit events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    CompanyCreated,
    CompanyUpdated,
    AdminAdded,
    AdminRemoved,
}

impl AuditEventType {
    pub fn is_admin_event(&self) -> bool {
        matches!(self, AuditEventType::AdminAdded | AuditEventType::AdminRemoved)
    }
}

/// Ring buffer of the most recent mutations
#[derive(Debug)]
pub struct AuditLogger {
    entries: VecDeque<AuditEntry>,
    max_entries: usize,
}

impl AuditLogger {
    /// Create a new AuditLogger
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: VecDeque::with_capacity(max_entries.min(1024)),
            max_entries,
        }
    }

    /// Log an audit entry, evicting the oldest one when full
    pub fn log(&mut self, entry: AuditEntry) {
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Log a company creation or update
    pub fn log_company_change(
        &mut self,
        event_type: AuditEventType,
        message: &str,
        company_id: &str,
        actor: Option<&str>,
        original: Option<serde_json::Value>,
        updated: Option<serde_json::Value>,
    ) {
        self.log(AuditEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            event_type,
            message: message.to_string(),
            target_type: "company".to_string(),
            target_id: company_id.to_string(),
            company_id: company_id.to_string(),
            actor: actor.map(|s| s.to_string()),
            original,
            updated,
        });
    }

    /// Log an admin added to or removed from a company
    pub fn log_admin_change(
        &mut self,
        event_type: AuditEventType,
        message: &str,
        company_id: &str,
        user_id: &str,
        actor: Option<&str>,
    ) {
        self.log(AuditEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            event_type,
            message: message.to_string(),
            target_type: "admin".to_string(),
            target_id: user_id.to_string(),
            company_id: company_id.to_string(),
            actor: actor.map(|s| s.to_string()),
            original: None,
            updated: None,
        });
    }

    /// Get recent entries, newest first
    pub fn get_recent(&self, limit: usize) -> Vec<&AuditEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Get recent entries touching one company, newest first
    pub fn get_recent_for_company(&self, company_id: &str, limit: usize) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.company_id == company_id)
            .take(limit)
            .collect()
    }

    /// Get statistics
    pub fn get_stats(&self) -> AuditStats {
        let total = self.entries.len();
        let admin_events = self
            .entries
            .iter()
            .filter(|e| e.event_type.is_admin_event())
            .count();

        AuditStats {
            total_entries: total,
            company_events: total - admin_events,
            admin_events,
        }
    }

    /// Export as JSON
    pub fn export_json(&self) -> serde_json::Value {
        serde_json::to_value(self.entries.iter().collect::<Vec<_>>()).unwrap_or_default()
    }
}

/// Audit statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditStats {
    pub total_entries: usize,
    pub company_events: usize,
    pub admin_events: usize,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new(10000)
    }
}

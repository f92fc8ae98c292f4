//! # Company Directory Audit
//!
//! Bounded, in-process audit trail of directory mutations.

mod audit_logger;

pub use audit_logger::{AuditEntry, AuditEventType, AuditLogger, AuditStats};

//! # Company Directory Use Case Layer
//!
//! Application-specific business rules.
//! This layer orchestrates the flow of data between the domain and adapters:
//! it owns the ports, sanitizes input, and sequences every mutation
//! against the store, the audit trail, telemetry and the caches.

pub mod context;
pub mod directory;
pub mod dto;
pub mod port;
pub mod sanitize;

mod admins;
mod companies;

#[cfg(test)]
mod testing;

pub use company_domain;

pub use context::RequestContext;
pub use directory::{Caching, CompanyDirectory, DirectoryPorts, DEFAULT_LIST_LIMIT};
pub use dto::{AdminOfList, CompanyDraft, CompanyList, CompanyUpdate, Page};
pub use port::{
    AccessPolicy, Action, AdminStore, AuditAction, AuditEvent, AuditSink, CompanyStore,
    DirectoryResolver, SharedCache, Telemetry, TelemetryEvent,
};

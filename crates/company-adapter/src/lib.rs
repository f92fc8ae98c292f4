//! # Company Directory Adapter Layer
//!
//! External system integrations (Hexagonal Architecture adapters).
//!
//! ## Structure
//!
//! - `gateway/` - Outbound adapters (shared cache, audit, telemetry, access)
//! - `repository/` - Canonical store and resolver implementations

pub mod gateway;
pub mod repository;

pub use gateway::{AuditTrail, InMemorySharedCache, PermitAll, QueuedTelemetry, TelemetryWorker};
pub use repository::{InMemoryAdminStore, InMemoryCompanyStore, InMemoryDirectoryResolver};

//! Outbound adapters for everything that is not canonical storage

pub mod access;
pub mod audit_trail;
pub mod shared_cache;
pub mod telemetry;

pub use access::PermitAll;
pub use audit_trail::AuditTrail;
pub use shared_cache::InMemorySharedCache;
pub use telemetry::{QueuedTelemetry, TelemetryWorker};

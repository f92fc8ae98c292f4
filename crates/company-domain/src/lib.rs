//! # Company Directory Domain Layer
//!
//! Companies, their admins, and the per-process versioned cache that
//! sits in front of the canonical store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (This Crate)                     │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  model/   - Entities & Value Objects                        ││
//! │  │  service/ - VersionedCache, coherence protocol              ││
//! │  │  error    - DirectoryError, RepositoryError                 ││
//! │  └─────────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Golden Rule
//!
//! **This crate has ZERO external dependencies.**
//!
//! Swapping MySQL for PostgreSQL, or gRPC for HTTP, never touches
//! this crate. Neither does replacing the shared cache service.

pub mod error;
pub mod model;
pub mod service;

// Re-export commonly used types
pub use error::{DirectoryError, ErrorKind, RepositoryError};

pub use model::{
    admin::{Admins, DirectoryEntry, UserId},
    company::{Company, CompanyId, DayOfWeek},
};

pub use service::{
    coherence::{CacheEffect, CoherenceMode, DirectoryCache},
    versioned_cache::{Populated, Removal, VersionedCache, VersionedEntry, WriteGeneration},
};

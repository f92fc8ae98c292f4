//! Persistence Adapters - Store implementations
//!
//! These implement the store and resolver ports from company-usecase.

pub mod in_memory;

pub use in_memory::{InMemoryAdminStore, InMemoryCompanyStore, InMemoryDirectoryResolver};

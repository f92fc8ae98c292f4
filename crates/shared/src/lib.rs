//! # Company Directory Shared
//!
//! Configuration and infrastructure errors used by the adapter and app crates.

pub mod config;
pub mod error;

// Re-exports
pub use config::*;
pub use error::*;

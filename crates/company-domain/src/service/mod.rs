//! Domain Services - Caching and coherence rules
//!
//! Pure, synchronous logic. Nothing here performs I/O; the use case
//! layer decides when to call in and what to do with the outcome.

pub mod coherence;
pub mod versioned_cache;

//! Domain Models - The vocabulary of the directory
//!
//! Companies, the users who administer them, and the identifiers
//! that tie the two together.

pub mod admin;
pub mod company;

//! Access policies

use company_usecase::port::{AccessPolicy, Action};

/// Allows every actor to perform every action
///
/// Placeholder until a real authorization backend is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAll;

impl AccessPolicy for PermitAll {
    fn permits(&self, _actor: Option<&str>, _action: &Action) -> bool {
        true
    }
}

//! Per-request context: who is calling and how long they will wait

use std::future::Future;
use std::time::Duration;

use company_domain::DirectoryError;
use tokio::time::Instant;
use tracing::warn;

/// Caller identity and deadline
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    actor: Option<String>,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Anonymous request without a deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the acting user
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Builder: give up on collaborator calls after `timeout` from now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Builder: give up on collaborator calls at an absolute instant
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Await a collaborator call, bounded by the request deadline
    pub async fn within_deadline<F>(&self, call: F) -> Result<F::Output, DirectoryError>
    where
        F: Future,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, call).await.map_err(|_| {
                warn!(actor = ?self.actor, "request deadline exceeded");
                DirectoryError::internal("deadline exceeded")
            }),
            None => Ok(call.await),
        }
    }
}

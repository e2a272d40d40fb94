use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::models::CancellationReason;

/// Shared cancellation signal handed to every task of a batch.
///
/// Clones observe the same token. Children created with [`child`],
/// [`with_timeout`] or [`with_deadline`] are cancelled together with their
/// parent but can be cancelled on their own without touching it. A deadline
/// never outlives the parent's.
///
/// [`child`]: CancellationContext::child
/// [`with_timeout`]: CancellationContext::with_timeout
/// [`with_deadline`]: CancellationContext::with_deadline
#[derive(Clone, Debug, Default)]
pub struct CancellationContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CancellationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// Explicit cancellation takes precedence over an elapsed deadline.
    pub fn reason(&self) -> Option<CancellationReason> {
        if self.token.is_cancelled() {
            return Some(CancellationReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Some(CancellationReason::DeadlineExceeded)
            }
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let effective = match self.deadline {
            Some(parent) => parent.min(deadline),
            None => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(effective),
        }
    }

    /// Resolves once this context is cancelled, explicitly or by deadline.
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }
}

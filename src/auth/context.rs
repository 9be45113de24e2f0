//! Per-call cancellation and deadline handling.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::errors::{Error, Result};

/// Carries the caller's cancellation signal, optional deadline and a
/// correlation id that ends up on every log line of the operation.
#[derive(Debug, Clone)]
pub struct OperationContext {
    correlation_id: Uuid,
    cancellation: CancellationToken,
    deadline: Option<Instant>,
    started: Instant,
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationContext {
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            cancellation: CancellationToken::new(),
            deadline: None,
            started: Instant::now(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let context = Self::new();
        let deadline = context.started + timeout;
        context.with_deadline(deadline)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Fail fast when the caller has already given up.
    pub fn ensure_active(&self, step: &str) -> Result<()> {
        if self.cancellation.is_cancelled() {
            return Err(Error::cancelled(step));
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(self.deadline_error(step, deadline)),
            _ => Ok(()),
        }
    }

    /// Drive `fut` until it completes, the context is cancelled or the deadline passes.
    pub async fn run<F: Future>(&self, step: &str, fut: F) -> Result<F::Output> {
        self.ensure_active(step)?;

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => Err(Error::cancelled(step)),
                output = fut => Ok(output),
            }
        };

        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, guarded)
                .await
                .unwrap_or_else(|_| Err(self.deadline_error(step, deadline))),
            None => guarded.await,
        }
    }

    fn deadline_error(&self, step: &str, deadline: Instant) -> Error {
        let budget = deadline.saturating_duration_since(self.started);
        Error::timeout(step, u64::try_from(budget.as_millis()).unwrap_or(u64::MAX))
    }
}

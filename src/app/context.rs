//! Per-call cancellation and deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::domain::TransportError;

/// Governs a single gateway call.
///
/// Cancelling the token aborts the in-flight request and surfaces
/// [`TransportError::Cancelled`]; an expired deadline surfaces
/// [`TransportError::Timeout`]. Clones share the same token.
///
/// # Example
///
/// ```ignore
/// let ctx = CallContext::background().with_timeout(Duration::from_secs(10));
/// let deposit = client.create_deposit(&ctx, &params).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Sets a deadline relative to now.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Uses an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Token that cancels calls made with this context.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drives `fut` until it completes, the token is cancelled or the deadline passes.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, TransportError>
    where
        F: Future<Output = Result<T, TransportError>>,
    {
        if self.token.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, fut)
                    .await
                    .unwrap_or_else(|_| {
                        Err(TransportError::Timeout("call deadline exceeded".to_string()))
                    }),
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(TransportError::Cancelled),
            result = bounded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn slow_ok() -> Result<u32, TransportError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(1)
    }

    #[tokio::test]
    async fn test_background_context_runs_to_completion() {
        let ctx = CallContext::background();
        let result = ctx.run(async { Ok::<_, TransportError>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_already_cancelled_context_short_circuits() {
        let ctx = CallContext::background();
        ctx.cancel();
        assert!(ctx.is_cancelled());

        let result = ctx.run(slow_ok()).await;
        assert_eq!(result, Err(TransportError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancellation_during_call() {
        let ctx = CallContext::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let started = std::time::Instant::now();
        let result = ctx.run(slow_ok()).await;
        assert_eq!(result, Err(TransportError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_deadline_yields_timeout_not_cancelled() {
        let ctx = CallContext::background().with_timeout(Duration::from_millis(20));
        let result = ctx.run(slow_ok()).await;
        assert!(matches!(result, Err(TransportError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_external_token_is_shared() {
        let token = CancellationToken::new();
        let ctx = CallContext::background().with_cancellation(token.clone());
        token.cancel();
        assert!(ctx.is_cancelled());
        assert!(ctx.token().is_cancelled());
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let ctx = CallContext::background().with_timeout(Duration::from_secs(5));
        let result: Result<(), _> = ctx
            .run(async { Err(TransportError::Connection("refused".to_string())) })
            .await;
        assert_eq!(result, Err(TransportError::Connection("refused".to_string())));
    }
}

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::DomainError;

/// Runs `operation` until it finishes or `token` fires.
///
/// When the token wins, the operation future is dropped before it completes
/// and the caller sees `DomainError::Cancelled`.
pub async fn cancellable<T, F>(token: &CancellationToken, operation: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    if token.is_cancelled() {
        return Err(DomainError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => {
            debug!("Operation cancelled before completion");
            Err(DomainError::Cancelled)
        }
        result = operation => result,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_completes_when_not_cancelled() {
        let token = CancellationToken::new();
        let value = cancellable(&token, async { Ok::<_, DomainError>(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_already_cancelled_token_skips_operation() {
        let token = CancellationToken::new();
        token.cancel();

        let ran = std::sync::atomic::AtomicBool::new(false);
        let result = cancellable(&token, async {
            ran.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok::<(), DomainError>(())
        })
        .await;
        assert!(matches!(result, Err(DomainError::Cancelled)));
        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_aborts_pending_operation() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result = cancellable(&token, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<(), DomainError>(())
        })
        .await;
        assert!(matches!(result, Err(DomainError::Cancelled)));
    }
}

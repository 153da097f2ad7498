//! Retry logic with exponential backoff
//!
//! Provides retry policies for handling transient failures
//! in Price List API calls and other network operations.

use crate::error::{IsRetryable, Result, ArchcostError};
use std::time::Duration;
use tracing::{info, warn};

/// Exponential backoff retry policy
pub struct ExponentialBackoffPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    jitter_factor: f64,
}

impl ExponentialBackoffPolicy {
    /// Create a new exponential backoff policy
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            jitter_factor: 0.1,
        }
    }

    /// Create policy for Price List API calls (3 attempts)
    pub fn for_pricing_api() -> Self {
        Self::new(3)
    }

    /// Calculate backoff delay for given attempt number
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let exponential = self.initial_delay.as_millis() as f64 * 2f64.powi(attempt as i32);
        let delay_ms = exponential.min(self.max_delay.as_millis() as f64);

        // Add jitter to prevent thundering herd
        let jitter = delay_ms * self.jitter_factor * fastrand::f64();
        Duration::from_millis((delay_ms + jitter) as u64)
    }

    /// Execute a function with retry logic
    pub async fn execute_with_retry<F, Fut, T>(&self, f: F) -> Result<T>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: std::future::Future<Output = Result<T>> + Send,
    {
        for attempt in 0..self.max_attempts {
            match f().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!("Operation succeeded after {} retries", attempt);
                    }
                    return Ok(result);
                }
                Err(e) => {
                    if !e.is_retryable() {
                        warn!("Non-retryable error, aborting: {}", e);
                        return Err(e);
                    }

                    if attempt == self.max_attempts - 1 {
                        warn!("Max retries ({}) reached", self.max_attempts);
                        return Err(ArchcostError::Retryable {
                            attempt: attempt + 1,
                            max_attempts: self.max_attempts,
                            reason: format!("{}", e),
                            source: Some(Box::new(e)),
                        });
                    }

                    let backoff = self.calculate_backoff(attempt);
                    warn!(
                        "Retryable error (attempt {}/{}), retrying in {:?}: {}",
                        attempt + 1,
                        self.max_attempts,
                        backoff,
                        e
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        // Only reachable with a zero-attempt policy
        Err(ArchcostError::Retryable {
            attempt: 0,
            max_attempts: self.max_attempts,
            reason: "no attempts were made".to_string(),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_first_try() {
        let policy = ExponentialBackoffPolicy::new(3);
        let result: Result<u32> = policy.execute_with_retry(|| async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let policy = ExponentialBackoffPolicy::new(3);
        let calls = AtomicU32::new(0);
        let result: Result<u32> = policy
            .execute_with_retry(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(ArchcostError::Catalog("connection reset".to_string()))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_structural_errors() {
        let policy = ExponentialBackoffPolicy::new(3);
        let calls = AtomicU32::new(0);
        let result: Result<u32> = policy
            .execute_with_retry(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ArchcostError::Structural("missing nodes".to_string())) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausts_retry_budget() {
        let policy = ExponentialBackoffPolicy::new(2);
        let result: Result<u32> = policy
            .execute_with_retry(|| async {
                Err(ArchcostError::Catalog("throttled".to_string()))
            })
            .await;
        match result {
            Err(ArchcostError::Retryable { max_attempts, .. }) => assert_eq!(max_attempts, 2),
            other => panic!("expected Retryable, got {:?}", other.map(|_| ())),
        }
    }
}

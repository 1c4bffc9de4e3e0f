//! Retrying execution of operations that may fail transiently.

use std::future::Future;
use std::time::Duration;

/// Decides whether and when a failed operation is retried.
pub trait ExecutionStrategy: Send + Sync {
	/// Whether `error` is transient.
	fn should_retry_on(&self, error: &sqlx::Error) -> bool;

	fn max_retry_count(&self) -> u32 {
		6
	}

	/// Delay before retry number `attempt` (zero-based).
	fn delay_for(&self, attempt: u32) -> Duration {
		let millis = 100u64.saturating_mul(1u64 << attempt.min(16));
		Duration::from_millis(millis).min(Duration::from_secs(30))
	}
}

/// Runs `operation` until it succeeds, fails permanently, or the strategy's
/// retry budget is exhausted. The closure receives the zero-based attempt number.
///
/// # Example
///
/// ```rust,ignore
/// let balance = execute_with_retry(&strategy, |_| async {
///     sqlx::query_scalar::<_, i64>("SELECT balance FROM accounts WHERE id = 1")
///         .fetch_one(&pool)
///         .await
/// })
/// .await?;
/// ```
pub async fn execute_with_retry<S, F, Fut, T>(strategy: &S, mut operation: F) -> Result<T, sqlx::Error>
where
	S: ExecutionStrategy + ?Sized,
	F: FnMut(u32) -> Fut,
	Fut: Future<Output = Result<T, sqlx::Error>>,
{
	let mut attempt = 0;
	loop {
		match operation(attempt).await {
			Ok(value) => return Ok(value),
			Err(error) if attempt < strategy.max_retry_count() && strategy.should_retry_on(&error) => {
				let delay = strategy.delay_for(attempt);
				tracing::warn!(attempt, ?delay, %error, "transient failure, retrying");
				tokio::time::sleep(delay).await;
				attempt += 1;
			}
			Err(error) => return Err(error),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::atomic::{AtomicU32, Ordering};

	struct RetryPoolTimeouts {
		max: u32,
	}

	impl ExecutionStrategy for RetryPoolTimeouts {
		fn should_retry_on(&self, error: &sqlx::Error) -> bool {
			matches!(error, sqlx::Error::PoolTimedOut)
		}

		fn max_retry_count(&self) -> u32 {
			self.max
		}

		fn delay_for(&self, _attempt: u32) -> Duration {
			Duration::ZERO
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_retries_transient_errors_until_success() {
		let calls = AtomicU32::new(0);
		let strategy = RetryPoolTimeouts { max: 5 };
		let result = execute_with_retry(&strategy, |attempt| {
			calls.fetch_add(1, Ordering::SeqCst);
			async move {
				if attempt < 2 {
					Err(sqlx::Error::PoolTimedOut)
				} else {
					Ok(attempt)
				}
			}
		})
		.await;
		assert_eq!(result.unwrap(), 2);
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[rstest]
	#[tokio::test]
	async fn test_gives_up_after_budget() {
		let calls = AtomicU32::new(0);
		let strategy = RetryPoolTimeouts { max: 2 };
		let result: Result<(), _> = execute_with_retry(&strategy, |_| {
			calls.fetch_add(1, Ordering::SeqCst);
			async { Err(sqlx::Error::PoolTimedOut) }
		})
		.await;
		assert!(matches!(result, Err(sqlx::Error::PoolTimedOut)));
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[rstest]
	#[tokio::test]
	async fn test_permanent_errors_are_not_retried() {
		let calls = AtomicU32::new(0);
		let strategy = RetryPoolTimeouts { max: 5 };
		let result: Result<(), _> = execute_with_retry(&strategy, |_| {
			calls.fetch_add(1, Ordering::SeqCst);
			async { Err(sqlx::Error::RowNotFound) }
		})
		.await;
		assert!(matches!(result, Err(sqlx::Error::RowNotFound)));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[rstest]
	fn test_default_delay_is_capped() {
		let strategy = RetryPoolTimeouts { max: 1 };
		assert_eq!(
			ExecutionStrategy::delay_for(&DefaultDelays, 0),
			Duration::from_millis(100)
		);
		assert_eq!(
			ExecutionStrategy::delay_for(&DefaultDelays, 3),
			Duration::from_millis(800)
		);
		assert_eq!(
			ExecutionStrategy::delay_for(&DefaultDelays, 20),
			Duration::from_secs(30)
		);
		assert_eq!(strategy.delay_for(3), Duration::ZERO);
	}

	struct DefaultDelays;

	impl ExecutionStrategy for DefaultDelays {
		fn should_retry_on(&self, _error: &sqlx::Error) -> bool {
			false
		}
	}
}

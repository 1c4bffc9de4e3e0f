//! Retrying execution strategy for transient PostgreSQL-wire failures.

use reinhardt_relational::execution::ExecutionStrategy;
use std::time::Duration;

/// SQLSTATE codes worth retrying: serialization failure, deadlock, too many
/// connections.
const TRANSIENT_SQL_STATES: &[&str] = &["40001", "40P01", "53300"];

/// Whether `error` is likely to succeed when retried.
///
/// Connection-class (`08xxx`) errors, I/O failures and pool timeouts are
/// transient too.
pub fn is_transient(error: &sqlx::Error) -> bool {
	match error {
		sqlx::Error::Database(db) => db
			.code()
			.is_some_and(|code| TRANSIENT_SQL_STATES.contains(&code.as_ref()) || code.starts_with("08")),
		sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => true,
		_ => false,
	}
}

#[derive(Debug, Clone)]
pub struct PostgresRetryingExecutionStrategy {
	max_retry_count: u32,
	max_retry_delay: Duration,
}

impl Default for PostgresRetryingExecutionStrategy {
	fn default() -> Self {
		Self::new(6, Duration::from_secs(30))
	}
}

impl PostgresRetryingExecutionStrategy {
	pub fn new(max_retry_count: u32, max_retry_delay: Duration) -> Self {
		Self {
			max_retry_count,
			max_retry_delay,
		}
	}
}

impl ExecutionStrategy for PostgresRetryingExecutionStrategy {
	fn should_retry_on(&self, error: &sqlx::Error) -> bool {
		is_transient(error)
	}

	fn max_retry_count(&self) -> u32 {
		self.max_retry_count
	}

	fn delay_for(&self, attempt: u32) -> Duration {
		let millis = 100u64.saturating_mul(1u64 << attempt.min(20));
		Duration::from_millis(millis).min(self.max_retry_delay)
	}
}

use reinhardt_cockroach::relational::RelationalError;
use thiserror::Error;

/// SQLSTATE CockroachDB reports when a transaction must be retried.
pub const SERIALIZATION_FAILURE: &str = "40001";

#[derive(Debug, Error)]
pub enum BankError {
	#[error("Account id={0} not found")]
	AccountNotFound(i64),

	#[error("Insufficient balance in account id={0}")]
	InsufficientBalance(i64),

	#[error("Database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error(transparent)]
	Relational(#[from] RelationalError),
}

impl BankError {
	/// Whether the transaction should be rolled back to its restart savepoint
	/// and tried again.
	pub fn is_serialization_failure(&self) -> bool {
		match self {
			Self::Database(sqlx::Error::Database(db)) => db.code().as_deref() == Some(SERIALIZATION_FAILURE),
			_ => false,
		}
	}

	/// Business-rule violations that abort a transfer without failing the run.
	pub fn is_data_error(&self) -> bool {
		matches!(self, Self::AccountNotFound(_) | Self::InsufficientBalance(_))
	}
}

pub type Result<T> = std::result::Result<T, BankError>;

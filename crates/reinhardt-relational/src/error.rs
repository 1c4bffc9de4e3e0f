//! Error types shared by the relational layer and its providers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelationalError {
	#[error("Invalid operation: {0}")]
	InvalidOperation(String),

	/// The operation is valid in general but the target server cannot run it.
	#[error("Not supported: {0}")]
	NotSupported(String),

	#[error("No type mapping found for {0}")]
	MissingTypeMapping(String),

	#[error("Configuration error: {0}")]
	Configuration(String),

	#[error("Service not registered: {0}")]
	ServiceNotRegistered(String),

	#[error("Command timed out after {0:?}")]
	Timeout(std::time::Duration),

	#[error("SQL error: {0}")]
	Sql(#[from] sqlx::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RelationalError>;

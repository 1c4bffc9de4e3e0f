//! File and environment configuration for a CockroachDB context.

use crate::options::UseCockroach;
use reinhardt_postgres::version::Version;
use reinhardt_relational::error::{RelationalError, Result};
use reinhardt_relational::options::DbContextOptionsBuilder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "postgresql://root@localhost:26257/defaultdb?sslmode=disable";

/// Connection and provider settings.
///
/// ```toml
/// database_url = "postgresql://root@localhost:26257/bank?sslmode=disable"
/// postgres_version = "13"
/// command_timeout_secs = 30
/// application_name = "bank"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CockroachSettings {
	pub database_url: String,
	/// Server version the generated SQL targets, e.g. `"13"` or `"12.4"`.
	pub postgres_version: Option<String>,
	pub reverse_null_ordering: bool,
	pub command_timeout_secs: Option<u64>,
	pub application_name: Option<String>,
}

impl Default for CockroachSettings {
	fn default() -> Self {
		Self {
			database_url: DEFAULT_DATABASE_URL.to_string(),
			postgres_version: None,
			reverse_null_ordering: false,
			command_timeout_secs: None,
			application_name: None,
		}
	}
}

impl CockroachSettings {
	pub fn from_toml(contents: &str) -> Result<Self> {
		toml::from_str(contents)
			.map_err(|e| RelationalError::Configuration(format!("TOML parse error: {}", e)))
	}

	/// Loads settings from a `.toml` or `.json` file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let contents = std::fs::read_to_string(path).map_err(|e| {
			RelationalError::Configuration(format!("Failed to read {}: {}", path.display(), e))
		})?;
		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Self::from_toml(&contents),
			Some("json") => Ok(serde_json::from_str(&contents)?),
			_ => Err(RelationalError::Configuration(format!(
				"unsupported settings format for {}; use .toml or .json",
				path.display()
			))),
		}
	}

	/// Reads the connection string from `DATABASE_URL`, falling back to
	/// `DATABASE_CONNECTION`.
	pub fn from_env() -> Self {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut settings = Self::default();
		if let Some(url) = lookup("DATABASE_URL").or_else(|| lookup("DATABASE_CONNECTION")) {
			settings.database_url = url;
		}
		settings
	}

	pub fn postgres_version(&self) -> Result<Option<Version>> {
		self.postgres_version.as_deref().map(str::parse).transpose()
	}

	pub fn command_timeout(&self) -> Option<Duration> {
		self.command_timeout_secs.map(Duration::from_secs)
	}

	/// Configures the PostgreSQL provider and the CockroachDB extension.
	pub fn apply<'a>(&self, builder: &'a mut DbContextOptionsBuilder) -> Result<&'a mut DbContextOptionsBuilder> {
		let version = self.postgres_version()?;
		builder.use_cockroach_with(&self.database_url, |crdb| {
			if let Some(version) = version {
				crdb.set_postgres_version(version);
			}
			if let Some(timeout) = self.command_timeout() {
				crdb.command_timeout(timeout);
			}
			if let Some(name) = self.application_name.as_deref() {
				crdb.application_name(name);
			}
			crdb.reverse_null_ordering(self.reverse_null_ordering);
		})
	}
}

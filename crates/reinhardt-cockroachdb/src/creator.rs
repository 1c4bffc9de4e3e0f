//! Database creator for CockroachDB.

use async_trait::async_trait;
use reinhardt_postgres::connection::ConnectionSettings;
use reinhardt_postgres::creator::{INVALID_CATALOG_NAME, PostgresDatabaseCreator, SYSTEM_SCHEMAS, sql_state};
use reinhardt_relational::creator::DatabaseCreator;
use reinhardt_relational::error::{RelationalError, Result};
use reinhardt_relational::migrations::MigrationsSqlGenerator;
use reinhardt_relational::operations::MigrationOperation;
use sqlx::{Connection, PgConnection};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Statement used to find out whether the database behind a connection exists.
pub const EXISTS_PROBE_SQL: &str = "SELECT count(*) FROM pg_catalog.pg_type";

/// CockroachDB schemas that never hold user tables.
pub const CRDB_SYSTEM_SCHEMAS: &[&str] = &["crdb_internal", "pg_extension"];

/// What went wrong while probing one host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeFailure {
	pub sql_state: Option<String>,
	pub io_kind: Option<io::ErrorKind>,
}

impl ProbeFailure {
	pub fn from_error(error: &RelationalError) -> Self {
		match error {
			RelationalError::Sql(sqlx::Error::Io(io)) => Self {
				sql_state: None,
				io_kind: Some(io.kind()),
			},
			RelationalError::Sql(error) => Self {
				sql_state: sql_state(error),
				io_kind: None,
			},
			_ => Self::default(),
		}
	}

	fn is_missing_database(&self) -> bool {
		self.sql_state.as_deref() == Some(INVALID_CATALOG_NAME)
	}
}

/// Whether the failures of every probed host mean the database is missing.
///
/// Any host reporting `3D000` settles it. A lone reset connection counts too,
/// since some server versions drop the connection instead of reporting the
/// missing database.
pub fn indicates_missing_database(failures: &[ProbeFailure]) -> bool {
	if failures.iter().any(ProbeFailure::is_missing_database) {
		return true;
	}
	matches!(failures, [only] if only.io_kind == Some(io::ErrorKind::ConnectionReset))
}

pub struct CockroachDatabaseCreator {
	postgres: PostgresDatabaseCreator,
}

impl CockroachDatabaseCreator {
	pub fn new(
		connection: ConnectionSettings,
		generator: Arc<dyn MigrationsSqlGenerator>,
		command_timeout: Option<Duration>,
	) -> Self {
		Self {
			postgres: PostgresDatabaseCreator::new(connection, generator).with_command_timeout(command_timeout),
		}
	}

	pub fn postgres(&self) -> &PostgresDatabaseCreator {
		&self.postgres
	}

	/// Schemas skipped when looking for user tables.
	pub fn excluded_schemas() -> Vec<&'static str> {
		SYSTEM_SCHEMAS.iter().chain(CRDB_SYSTEM_SCHEMAS).copied().collect()
	}

	/// Connects and runs [`EXISTS_PROBE_SQL`]. The connection is closed
	/// whatever the outcome.
	async fn probe(&self, options: &sqlx::postgres::PgConnectOptions) -> Result<()> {
		let mut connection = PgConnection::connect_with(options).await?;
		let result = self
			.postgres
			.timed(async {
				sqlx::query_scalar::<_, i64>(EXISTS_PROBE_SQL)
					.fetch_one(&mut connection)
					.await?;
				Ok(())
			})
			.await;
		if let Err(error) = connection.close().await {
			tracing::debug!(%error, "failed to close probe connection");
		}
		result
	}
}

#[async_trait]
impl DatabaseCreator for CockroachDatabaseCreator {
	/// CockroachDB accepts connections to a missing database and only fails
	/// once a statement runs, so each host is probed with a catalog query.
	async fn exists(&self) -> Result<bool> {
		let settings = self.postgres.connection().unpooled();
		let mut failures = Vec::new();
		let mut first_error = None;
		for (host, options) in settings.hosts().iter().zip(settings.connect_options()) {
			match self.probe(options).await {
				Ok(()) => {
					tracing::debug!(%host, "database exists");
					return Ok(true);
				}
				Err(error) => {
					tracing::debug!(%host, %error, "existence probe failed");
					failures.push(ProbeFailure::from_error(&error));
					if first_error.is_none() {
						first_error = Some(error);
					}
				}
			}
		}

		if indicates_missing_database(&failures) {
			return Ok(false);
		}
		match first_error {
			Some(error) => {
				tracing::warn!(%error, "could not determine whether the database exists");
				Err(error)
			}
			None => Err(RelationalError::Configuration(
				"connection string lists no hosts".to_string(),
			)),
		}
	}

	async fn has_tables(&self) -> Result<bool> {
		self.postgres
			.has_tables_excluding(&Self::excluded_schemas())
			.await
	}

	async fn create(&self) -> Result<()> {
		self.postgres.create().await
	}

	async fn delete(&self) -> Result<()> {
		self.postgres.delete().await
	}

	async fn create_tables(&self, operations: &[MigrationOperation]) -> Result<()> {
		self.postgres.create_tables(operations).await
	}
}

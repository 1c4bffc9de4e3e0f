//! Database creator for PostgreSQL.

use crate::connection::ConnectionSettings;
use crate::executor::MigrationCommandExecutor;
use async_trait::async_trait;
use reinhardt_relational::commands::MigrationCommand;
use reinhardt_relational::creator::DatabaseCreator;
use reinhardt_relational::error::{RelationalError, Result};
use reinhardt_relational::migrations::MigrationsSqlGenerator;
use reinhardt_relational::operations::{
	CreateDatabaseOperation, DropDatabaseOperation, MigrationOperation,
};
use sqlx::{Connection, PgConnection};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// SQLSTATE `invalid_catalog_name`, reported when the database does not exist.
pub const INVALID_CATALOG_NAME: &str = "3D000";

/// Schemas that never hold user tables.
pub const SYSTEM_SCHEMAS: &[&str] = &["pg_catalog", "information_schema"];

pub fn sql_state(error: &sqlx::Error) -> Option<String> {
	match error {
		sqlx::Error::Database(db) => db.code().map(|code| code.into_owned()),
		_ => None,
	}
}

pub fn is_missing_database(error: &sqlx::Error) -> bool {
	sql_state(error).as_deref() == Some(INVALID_CATALOG_NAME)
}

/// Query answering whether any base table exists outside `excluded_schemas`.
pub fn has_tables_sql(excluded_schemas: &[&str]) -> String {
	let excluded = excluded_schemas
		.iter()
		.map(|s| format!("'{}'", s.replace('\'', "''")))
		.collect::<Vec<_>>()
		.join(", ");
	format!(
		"SELECT EXISTS (SELECT 1 FROM pg_catalog.pg_class AS cls \
		JOIN pg_catalog.pg_namespace AS ns ON ns.oid = cls.relnamespace \
		WHERE cls.relkind IN ('r', 'p') AND ns.nspname NOT IN ({}))",
		excluded
	)
}

/// Opens a connection, trying each configured host in order.
pub async fn connect(settings: &ConnectionSettings) -> Result<PgConnection> {
	let mut last_error = None;
	for (host, options) in settings.hosts().iter().zip(settings.connect_options()) {
		match PgConnection::connect_with(options).await {
			Ok(connection) => return Ok(connection),
			Err(error) => {
				tracing::debug!(%host, %error, "connection attempt failed");
				last_error = Some(error);
			}
		}
	}
	match last_error {
		Some(error) => Err(error.into()),
		None => Err(RelationalError::Configuration(
			"connection string lists no hosts".to_string(),
		)),
	}
}

/// Settles a unit of work once its connection has been closed.
///
/// A failed close is logged and never replaces the outcome of the work.
pub fn settle<T>(result: Result<T>, closed: std::result::Result<(), sqlx::Error>) -> Result<T> {
	if let Err(error) = closed {
		tracing::debug!(%error, "failed to close connection");
	}
	result
}

pub struct PostgresDatabaseCreator {
	connection: ConnectionSettings,
	generator: Arc<dyn MigrationsSqlGenerator>,
	command_timeout: Option<Duration>,
}

impl PostgresDatabaseCreator {
	pub fn new(connection: ConnectionSettings, generator: Arc<dyn MigrationsSqlGenerator>) -> Self {
		Self {
			connection,
			generator,
			command_timeout: None,
		}
	}

	pub fn with_command_timeout(mut self, command_timeout: Option<Duration>) -> Self {
		self.command_timeout = command_timeout;
		self
	}

	pub fn connection(&self) -> &ConnectionSettings {
		&self.connection
	}

	pub fn generator(&self) -> &Arc<dyn MigrationsSqlGenerator> {
		&self.generator
	}

	pub fn database_name(&self) -> Result<&str> {
		self.connection.database().ok_or_else(|| {
			RelationalError::Configuration("connection string names no database".to_string())
		})
	}

	/// Applies the configured command timeout to `future`.
	pub async fn timed<F, T>(&self, future: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		match self.command_timeout {
			Some(timeout) => tokio::time::timeout(timeout, future)
				.await
				.map_err(|_| RelationalError::Timeout(timeout))?,
			None => future.await,
		}
	}

	/// Executes `commands` on a fresh connection built from `settings`.
	pub async fn execute_commands(&self, settings: &ConnectionSettings, commands: &[MigrationCommand]) -> Result<()> {
		let mut connection = connect(settings).await?;
		let result = self
			.timed(MigrationCommandExecutor::execute(&mut connection, commands))
			.await;
		settle(result, connection.close().await)
	}

	pub async fn has_tables_excluding(&self, excluded_schemas: &[&str]) -> Result<bool> {
		let sql = has_tables_sql(excluded_schemas);
		let mut connection = connect(&self.connection).await?;
		let result = self
			.timed(async {
				Ok(sqlx::query_scalar::<_, bool>(&sql)
					.fetch_one(&mut connection)
					.await?)
			})
			.await;
		settle(result, connection.close().await)
	}
}

#[async_trait]
impl DatabaseCreator for PostgresDatabaseCreator {
	async fn exists(&self) -> Result<bool> {
		match connect(&self.connection.unpooled()).await {
			Ok(connection) => settle(Ok(true), connection.close().await),
			Err(RelationalError::Sql(error)) if is_missing_database(&error) => Ok(false),
			Err(error) => Err(error),
		}
	}

	async fn has_tables(&self) -> Result<bool> {
		self.has_tables_excluding(SYSTEM_SCHEMAS).await
	}

	async fn create(&self) -> Result<()> {
		let name = self.database_name()?.to_string();
		tracing::info!(database = %name, "creating database");
		let operation = MigrationOperation::CreateDatabase(CreateDatabaseOperation {
			name,
			..Default::default()
		});
		let commands = self.generator.generate(&[operation], None)?;
		self.execute_commands(&self.connection.admin(), &commands).await
	}

	async fn delete(&self) -> Result<()> {
		let name = self.database_name()?.to_string();
		tracing::info!(database = %name, "dropping database");
		let operation = MigrationOperation::DropDatabase(DropDatabaseOperation { name });
		let commands = self.generator.generate(&[operation], None)?;
		self.execute_commands(&self.connection.admin(), &commands).await
	}

	async fn create_tables(&self, operations: &[MigrationOperation]) -> Result<()> {
		let commands = self.generator.generate(operations, None)?;
		self.execute_commands(&self.connection, &commands).await
	}
}

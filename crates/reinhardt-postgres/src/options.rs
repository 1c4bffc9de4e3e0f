//! PostgreSQL options extension and the `use_postgres` entry point.

use crate::connection::ConnectionSettings;
use crate::services::add_postgres_services;
use crate::version::Version;
use reinhardt_relational::error::Result;
use reinhardt_relational::options::{DbContextOptionsBuilder, ExtensionInfo, OptionsExtension};
use reinhardt_relational::services::ServiceCollection;
use std::any::Any;
use std::time::Duration;

/// Provider extension holding the connection and server-dependent settings.
#[derive(Debug, Clone)]
pub struct PostgresOptionsExtension {
	connection: ConnectionSettings,
	postgres_version: Option<Version>,
	reverse_null_ordering: bool,
	command_timeout: Option<Duration>,
	application_name: Option<String>,
}

impl PostgresOptionsExtension {
	pub fn new(connection: ConnectionSettings) -> Self {
		Self {
			connection,
			postgres_version: None,
			reverse_null_ordering: false,
			command_timeout: None,
			application_name: None,
		}
	}

	/// Connection settings with the configured application name applied.
	pub fn connection(&self) -> ConnectionSettings {
		match &self.application_name {
			Some(name) => self.connection.with_application_name(name),
			None => self.connection.clone(),
		}
	}

	/// Target server version; `None` assumes the newest.
	pub fn postgres_version(&self) -> Option<Version> {
		self.postgres_version
	}

	pub fn reverse_null_ordering(&self) -> bool {
		self.reverse_null_ordering
	}

	pub fn command_timeout(&self) -> Option<Duration> {
		self.command_timeout
	}

	pub fn application_name(&self) -> Option<&str> {
		self.application_name.as_deref()
	}
}

impl OptionsExtension for PostgresOptionsExtension {
	fn apply_services(&self, services: &mut ServiceCollection) {
		add_postgres_services(services);
	}

	fn info(&self) -> ExtensionInfo {
		let mut log_fragment = String::from("using Postgres");
		if let Some(version) = self.postgres_version {
			log_fragment.push_str(&format!(" SetPostgresVersion={}", version));
		}
		if self.reverse_null_ordering {
			log_fragment.push_str(" ReverseNullOrdering");
		}
		ExtensionInfo {
			log_fragment,
			is_database_provider: true,
			service_provider_hash: u64::from(self.reverse_null_ordering),
		}
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// Fluent configuration for [`PostgresOptionsExtension`].
#[derive(Debug, Clone)]
pub struct PostgresOptionsBuilder {
	extension: PostgresOptionsExtension,
}

impl PostgresOptionsBuilder {
	pub fn new(extension: PostgresOptionsExtension) -> Self {
		Self { extension }
	}

	pub fn set_postgres_version(&mut self, version: Version) -> &mut Self {
		self.extension.postgres_version = Some(version);
		self
	}

	pub fn reverse_null_ordering(&mut self, reverse: bool) -> &mut Self {
		self.extension.reverse_null_ordering = reverse;
		self
	}

	pub fn command_timeout(&mut self, timeout: Duration) -> &mut Self {
		self.extension.command_timeout = Some(timeout);
		self
	}

	pub fn application_name(&mut self, name: impl Into<String>) -> &mut Self {
		self.extension.application_name = Some(name.into());
		self
	}

	pub fn extension(&self) -> &PostgresOptionsExtension {
		&self.extension
	}

	pub fn into_extension(self) -> PostgresOptionsExtension {
		self.extension
	}
}

/// Registers the PostgreSQL provider on a [`DbContextOptionsBuilder`].
pub trait UsePostgres {
	/// Configures the context to connect to `url`.
	///
	/// Calling this again replaces the earlier connection but keeps nothing else
	/// from it.
	fn use_postgres<F>(&mut self, url: &str, configure: F) -> Result<&mut Self>
	where
		F: FnOnce(&mut PostgresOptionsBuilder);
}

impl UsePostgres for DbContextOptionsBuilder {
	fn use_postgres<F>(&mut self, url: &str, configure: F) -> Result<&mut Self>
	where
		F: FnOnce(&mut PostgresOptionsBuilder),
	{
		let connection = ConnectionSettings::parse(url)?;
		let mut builder = PostgresOptionsBuilder::new(PostgresOptionsExtension::new(connection));
		configure(&mut builder);
		tracing::debug!(hosts = builder.extension.connection.hosts().len(), "configured postgres provider");
		Ok(self.add_or_update_extension(builder.into_extension()))
	}
}

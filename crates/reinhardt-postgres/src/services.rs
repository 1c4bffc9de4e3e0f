//! Service registration for the PostgreSQL provider.

use crate::conventions::PostgresConventionSetBuilder;
use crate::creator::PostgresDatabaseCreator;
use crate::migrations::PostgresMigrationsSqlGenerator;
use crate::options::PostgresOptionsExtension;
use crate::type_mapping::PostgresTypeMappingSource;
use reinhardt_relational::error::{RelationalError, Result};
use reinhardt_relational::services::{ServiceCollection, ServiceDescriptor, ServiceProvider};
use std::sync::Arc;

/// The PostgreSQL options a provider was built from.
pub fn postgres_options(provider: &ServiceProvider) -> Result<&PostgresOptionsExtension> {
	provider
		.options()
		.find_extension::<PostgresOptionsExtension>()
		.ok_or_else(|| {
			RelationalError::Configuration(
				"the PostgreSQL provider has not been configured; call use_postgres first".to_string(),
			)
		})
}

/// Registers the PostgreSQL services that are not registered yet.
pub fn add_postgres_services(services: &mut ServiceCollection) {
	services
		.try_add(ServiceDescriptor::type_mapping_source(
			"PostgresTypeMappingSource",
			|_| Ok(Arc::new(PostgresTypeMappingSource::new())),
		))
		.try_add(ServiceDescriptor::migrations_sql_generator(
			"PostgresMigrationsSqlGenerator",
			|provider| {
				let version = postgres_options(provider)?.postgres_version();
				Ok(Arc::new(PostgresMigrationsSqlGenerator::new(
					provider.type_mapping_source()?,
					version,
				)?))
			},
		))
		.try_add(ServiceDescriptor::convention_set_builder(
			"PostgresConventionSetBuilder",
			|provider| {
				let version = postgres_options(provider)?.postgres_version();
				Ok(Arc::new(PostgresConventionSetBuilder::new(
					provider.type_mapping_source()?,
					version,
				)))
			},
		))
		.try_add(ServiceDescriptor::database_creator(
			"PostgresDatabaseCreator",
			|provider| {
				let options = postgres_options(provider)?;
				Ok(Arc::new(
					PostgresDatabaseCreator::new(options.connection(), provider.migrations_sql_generator()?)
						.with_command_timeout(options.command_timeout()),
				))
			},
		));
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::options::UsePostgres;
	use reinhardt_relational::options::DbContextOptionsBuilder;
	use reinhardt_relational::services::ServiceKind;
	use rstest::rstest;

	#[rstest]
	fn test_registers_provider_services() {
		let mut services = ServiceCollection::new();
		add_postgres_services(&mut services);
		assert_eq!(services.len(), 4);
		assert_eq!(
			services.implementation_of(ServiceKind::MigrationsSqlGenerator),
			Some("PostgresMigrationsSqlGenerator")
		);
		assert!(services.find(ServiceKind::DatabaseModelFactory).is_none());
	}

	#[rstest]
	fn test_services_resolve_from_options() {
		let mut builder = DbContextOptionsBuilder::new();
		builder
			.use_postgres("postgresql://postgres@localhost/bank", |_| {})
			.unwrap();
		let provider = builder.options().build_service_provider().unwrap();

		let source = provider.type_mapping_source().unwrap();
		assert!(source.string_mapping().is_ok());
		assert!(provider.migrations_sql_generator().is_ok());
		assert!(provider.convention_set_builder().is_ok());
		assert!(provider.database_creator().is_ok());
	}
}

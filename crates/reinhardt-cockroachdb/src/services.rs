//! Registration of the CockroachDB services.

use crate::conventions::CockroachConventionSetBuilder;
use crate::creator::CockroachDatabaseCreator;
use crate::migrations::CockroachMigrationsSqlGenerator;
use crate::type_mapping::CockroachTypeMappingSource;
use reinhardt_postgres::services::postgres_options;
use reinhardt_relational::services::{ServiceCollection, ServiceDescriptor, ServiceKind};
use std::sync::Arc;

/// Service kinds whose PostgreSQL implementations are replaced.
pub const REPLACED_SERVICES: [ServiceKind; 4] = [
	ServiceKind::TypeMappingSource,
	ServiceKind::DatabaseCreator,
	ServiceKind::ConventionSetBuilder,
	ServiceKind::MigrationsSqlGenerator,
];

/// Removes the PostgreSQL registrations of [`REPLACED_SERVICES`] and registers
/// the CockroachDB implementations in their place.
pub fn add_cockroach_services(services: &mut ServiceCollection) {
	let removed: usize = REPLACED_SERVICES
		.iter()
		.map(|kind| services.remove_kind(*kind))
		.sum();
	tracing::debug!(removed, "replacing provider services with CockroachDB services");

	services
		.try_add(ServiceDescriptor::type_mapping_source(
			"CockroachTypeMappingSource",
			|_| Ok(Arc::new(CockroachTypeMappingSource::new())),
		))
		.try_add(ServiceDescriptor::migrations_sql_generator(
			"CockroachMigrationsSqlGenerator",
			|provider| {
				let version = postgres_options(provider)?.postgres_version();
				Ok(Arc::new(CockroachMigrationsSqlGenerator::new(
					provider.type_mapping_source()?,
					version,
				)?))
			},
		))
		.try_add(ServiceDescriptor::convention_set_builder(
			"CockroachConventionSetBuilder",
			|provider| {
				let version = postgres_options(provider)?.postgres_version();
				Ok(Arc::new(CockroachConventionSetBuilder::new(
					provider.type_mapping_source()?,
					version,
				)))
			},
		))
		.try_add(ServiceDescriptor::database_creator(
			"CockroachDatabaseCreator",
			|provider| {
				let options = postgres_options(provider)?;
				Ok(Arc::new(CockroachDatabaseCreator::new(
					options.connection(),
					provider.migrations_sql_generator()?,
					options.command_timeout(),
				)))
			},
		));
}

#[cfg(test)]
mod tests {
	use super::*;
	use reinhardt_postgres::add_postgres_services;
	use rstest::rstest;

	#[rstest]
	fn test_replaces_postgres_services() {
		let mut services = ServiceCollection::new();
		add_postgres_services(&mut services);
		add_cockroach_services(&mut services);

		assert_eq!(services.len(), 4);
		for kind in REPLACED_SERVICES {
			assert_eq!(services.count(kind), 1);
		}
		assert_eq!(
			services.implementation_of(ServiceKind::TypeMappingSource),
			Some("CockroachTypeMappingSource")
		);
		assert_eq!(
			services.implementation_of(ServiceKind::DatabaseCreator),
			Some("CockroachDatabaseCreator")
		);
	}

	#[rstest]
	fn test_applying_twice_keeps_one_registration_per_kind() {
		let mut services = ServiceCollection::new();
		add_cockroach_services(&mut services);
		add_cockroach_services(&mut services);
		assert_eq!(services.len(), 4);
	}
}

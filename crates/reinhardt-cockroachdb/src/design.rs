//! Services used by design-time tooling such as reverse engineering.

use crate::scaffolding::CockroachDatabaseModelFactory;
use crate::services::add_cockroach_services;
use reinhardt_postgres::services::{add_postgres_services, postgres_options};
use reinhardt_relational::services::{ServiceCollection, ServiceDescriptor};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct CockroachDesignTimeServices;

impl CockroachDesignTimeServices {
	/// Registers the CockroachDB services on top of the PostgreSQL ones, plus
	/// the database model factory.
	pub fn configure_design_time_services(&self, services: &mut ServiceCollection) {
		add_postgres_services(services);
		add_cockroach_services(services);
		services.try_add(ServiceDescriptor::database_model_factory(
			"CockroachDatabaseModelFactory",
			|provider| {
				Ok(Arc::new(CockroachDatabaseModelFactory::new(
					postgres_options(provider)?.connection(),
				)))
			},
		));
	}
}

//! Provider service registration and resolution.

use crate::conventions::ConventionSetBuilder;
use crate::creator::DatabaseCreator;
use crate::error::{RelationalError, Result};
use crate::migrations::MigrationsSqlGenerator;
use crate::options::DbContextOptions;
use crate::scaffolding::DatabaseModelFactory;
use crate::type_mapping::TypeMappingSource;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// The replaceable provider services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
	TypeMappingSource,
	MigrationsSqlGenerator,
	ConventionSetBuilder,
	DatabaseCreator,
	DatabaseModelFactory,
}

type Factory<T> = Arc<dyn Fn(&ServiceProvider) -> Result<Arc<T>> + Send + Sync>;

#[derive(Clone)]
pub enum ServiceFactory {
	TypeMappingSource(Factory<dyn TypeMappingSource>),
	MigrationsSqlGenerator(Factory<dyn MigrationsSqlGenerator>),
	ConventionSetBuilder(Factory<dyn ConventionSetBuilder>),
	DatabaseCreator(Factory<dyn DatabaseCreator>),
	DatabaseModelFactory(Factory<dyn DatabaseModelFactory>),
}

impl ServiceFactory {
	pub fn kind(&self) -> ServiceKind {
		match self {
			Self::TypeMappingSource(_) => ServiceKind::TypeMappingSource,
			Self::MigrationsSqlGenerator(_) => ServiceKind::MigrationsSqlGenerator,
			Self::ConventionSetBuilder(_) => ServiceKind::ConventionSetBuilder,
			Self::DatabaseCreator(_) => ServiceKind::DatabaseCreator,
			Self::DatabaseModelFactory(_) => ServiceKind::DatabaseModelFactory,
		}
	}
}

/// A registered implementation of one [`ServiceKind`].
#[derive(Clone)]
pub struct ServiceDescriptor {
	implementation: &'static str,
	factory: ServiceFactory,
}

impl ServiceDescriptor {
	pub fn type_mapping_source<F>(implementation: &'static str, factory: F) -> Self
	where
		F: Fn(&ServiceProvider) -> Result<Arc<dyn TypeMappingSource>> + Send + Sync + 'static,
	{
		Self {
			implementation,
			factory: ServiceFactory::TypeMappingSource(Arc::new(factory)),
		}
	}

	pub fn migrations_sql_generator<F>(implementation: &'static str, factory: F) -> Self
	where
		F: Fn(&ServiceProvider) -> Result<Arc<dyn MigrationsSqlGenerator>> + Send + Sync + 'static,
	{
		Self {
			implementation,
			factory: ServiceFactory::MigrationsSqlGenerator(Arc::new(factory)),
		}
	}

	pub fn convention_set_builder<F>(implementation: &'static str, factory: F) -> Self
	where
		F: Fn(&ServiceProvider) -> Result<Arc<dyn ConventionSetBuilder>> + Send + Sync + 'static,
	{
		Self {
			implementation,
			factory: ServiceFactory::ConventionSetBuilder(Arc::new(factory)),
		}
	}

	pub fn database_creator<F>(implementation: &'static str, factory: F) -> Self
	where
		F: Fn(&ServiceProvider) -> Result<Arc<dyn DatabaseCreator>> + Send + Sync + 'static,
	{
		Self {
			implementation,
			factory: ServiceFactory::DatabaseCreator(Arc::new(factory)),
		}
	}

	pub fn database_model_factory<F>(implementation: &'static str, factory: F) -> Self
	where
		F: Fn(&ServiceProvider) -> Result<Arc<dyn DatabaseModelFactory>> + Send + Sync + 'static,
	{
		Self {
			implementation,
			factory: ServiceFactory::DatabaseModelFactory(Arc::new(factory)),
		}
	}

	pub fn kind(&self) -> ServiceKind {
		self.factory.kind()
	}

	/// Name of the implementing type, for diagnostics.
	pub fn implementation(&self) -> &'static str {
		self.implementation
	}

	pub fn factory(&self) -> &ServiceFactory {
		&self.factory
	}
}

impl fmt::Debug for ServiceDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ServiceDescriptor")
			.field("kind", &self.kind())
			.field("implementation", &self.implementation)
			.finish()
	}
}

/// Ordered set of service descriptors.
#[derive(Debug, Clone, Default)]
pub struct ServiceCollection {
	descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `descriptor` unless its kind is already registered.
	pub fn try_add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
		if self.find(descriptor.kind()).is_none() {
			self.descriptors.push(descriptor);
		} else {
			tracing::trace!(
				kind = ?descriptor.kind(),
				implementation = descriptor.implementation(),
				"service already registered, skipping"
			);
		}
		self
	}

	/// Adds `descriptor` unconditionally.
	pub fn add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
		self.descriptors.push(descriptor);
		self
	}

	/// Removes every descriptor of `kind`; returns how many were removed.
	pub fn remove_kind(&mut self, kind: ServiceKind) -> usize {
		let before = self.descriptors.len();
		self.descriptors.retain(|d| d.kind() != kind);
		before - self.descriptors.len()
	}

	/// First registered descriptor of `kind`.
	pub fn find(&self, kind: ServiceKind) -> Option<&ServiceDescriptor> {
		self.descriptors.iter().find(|d| d.kind() == kind)
	}

	pub fn implementation_of(&self, kind: ServiceKind) -> Option<&'static str> {
		self.find(kind).map(ServiceDescriptor::implementation)
	}

	pub fn count(&self, kind: ServiceKind) -> usize {
		self.descriptors.iter().filter(|d| d.kind() == kind).count()
	}

	pub fn len(&self) -> usize {
		self.descriptors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.descriptors.is_empty()
	}
}

/// Resolves services from a [`ServiceCollection`], creating each one at most once.
pub struct ServiceProvider {
	options: DbContextOptions,
	services: ServiceCollection,
	type_mapping_source: OnceCell<Arc<dyn TypeMappingSource>>,
	migrations_sql_generator: OnceCell<Arc<dyn MigrationsSqlGenerator>>,
	convention_set_builder: OnceCell<Arc<dyn ConventionSetBuilder>>,
	database_creator: OnceCell<Arc<dyn DatabaseCreator>>,
	database_model_factory: OnceCell<Arc<dyn DatabaseModelFactory>>,
}

impl ServiceProvider {
	pub fn new(options: DbContextOptions, services: ServiceCollection) -> Self {
		Self {
			options,
			services,
			type_mapping_source: OnceCell::new(),
			migrations_sql_generator: OnceCell::new(),
			convention_set_builder: OnceCell::new(),
			database_creator: OnceCell::new(),
			database_model_factory: OnceCell::new(),
		}
	}

	pub fn options(&self) -> &DbContextOptions {
		&self.options
	}

	pub fn services(&self) -> &ServiceCollection {
		&self.services
	}

	fn descriptor(&self, kind: ServiceKind) -> Result<&ServiceFactory> {
		self.services
			.find(kind)
			.map(ServiceDescriptor::factory)
			.ok_or_else(|| RelationalError::ServiceNotRegistered(format!("{:?}", kind)))
	}

	pub fn type_mapping_source(&self) -> Result<Arc<dyn TypeMappingSource>> {
		self.type_mapping_source
			.get_or_try_init(|| match self.descriptor(ServiceKind::TypeMappingSource)? {
				ServiceFactory::TypeMappingSource(factory) => factory(self),
				other => Err(mismatched(other.kind())),
			})
			.cloned()
	}

	pub fn migrations_sql_generator(&self) -> Result<Arc<dyn MigrationsSqlGenerator>> {
		self.migrations_sql_generator
			.get_or_try_init(|| match self.descriptor(ServiceKind::MigrationsSqlGenerator)? {
				ServiceFactory::MigrationsSqlGenerator(factory) => factory(self),
				other => Err(mismatched(other.kind())),
			})
			.cloned()
	}

	pub fn convention_set_builder(&self) -> Result<Arc<dyn ConventionSetBuilder>> {
		self.convention_set_builder
			.get_or_try_init(|| match self.descriptor(ServiceKind::ConventionSetBuilder)? {
				ServiceFactory::ConventionSetBuilder(factory) => factory(self),
				other => Err(mismatched(other.kind())),
			})
			.cloned()
	}

	pub fn database_creator(&self) -> Result<Arc<dyn DatabaseCreator>> {
		self.database_creator
			.get_or_try_init(|| match self.descriptor(ServiceKind::DatabaseCreator)? {
				ServiceFactory::DatabaseCreator(factory) => factory(self),
				other => Err(mismatched(other.kind())),
			})
			.cloned()
	}

	pub fn database_model_factory(&self) -> Result<Arc<dyn DatabaseModelFactory>> {
		self.database_model_factory
			.get_or_try_init(|| match self.descriptor(ServiceKind::DatabaseModelFactory)? {
				ServiceFactory::DatabaseModelFactory(factory) => factory(self),
				other => Err(mismatched(other.kind())),
			})
			.cloned()
	}
}

impl fmt::Debug for ServiceProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ServiceProvider")
			.field("options", &self.options)
			.field("services", &self.services)
			.finish_non_exhaustive()
	}
}

fn mismatched(kind: ServiceKind) -> RelationalError {
	RelationalError::ServiceNotRegistered(format!("descriptor of kind {:?} in the wrong slot", kind))
}

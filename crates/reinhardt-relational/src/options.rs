//! Context options and the extensions that populate them.

use crate::error::{RelationalError, Result};
use crate::services::{ServiceCollection, ServiceProvider};
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Diagnostic information about an options extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionInfo {
	pub log_fragment: String,
	/// Exactly one database provider must be configured per context.
	pub is_database_provider: bool,
	/// Contribution to the service provider cache key.
	pub service_provider_hash: u64,
}

/// Contributes services and settings to a context.
pub trait OptionsExtension: Any + Send + Sync + fmt::Debug {
	fn apply_services(&self, services: &mut ServiceCollection);

	fn validate(&self, _options: &DbContextOptions) -> Result<()> {
		Ok(())
	}

	fn info(&self) -> ExtensionInfo;

	fn as_any(&self) -> &dyn Any;
}

/// Immutable set of options extensions, one per extension type.
#[derive(Debug, Clone, Default)]
pub struct DbContextOptions {
	extensions: IndexMap<TypeId, Arc<dyn OptionsExtension>>,
}

impl DbContextOptions {
	pub fn find_extension<T: OptionsExtension>(&self) -> Option<&T> {
		self.extensions
			.get(&TypeId::of::<T>())
			.and_then(|extension| extension.as_any().downcast_ref::<T>())
	}

	pub fn extensions(&self) -> impl Iterator<Item = &Arc<dyn OptionsExtension>> {
		self.extensions.values()
	}

	/// Space-separated log fragments of every extension.
	pub fn log_fragment(&self) -> String {
		self.extensions()
			.map(|e| e.info().log_fragment)
			.filter(|f| !f.is_empty())
			.collect::<Vec<_>>()
			.join(" ")
	}

	/// Builds the service provider for these options.
	///
	/// The database provider applies its services first; the remaining
	/// extensions run afterwards so they can replace provider services.
	pub fn build_service_provider(&self) -> Result<ServiceProvider> {
		let providers: Vec<&Arc<dyn OptionsExtension>> = self
			.extensions()
			.filter(|e| e.info().is_database_provider)
			.collect();
		let provider = match providers.as_slice() {
			[provider] => *provider,
			[] => {
				return Err(RelationalError::Configuration(
					"No database provider has been configured".to_string(),
				));
			}
			many => {
				return Err(RelationalError::Configuration(format!(
					"{} database providers are configured; only one is allowed",
					many.len()
				)));
			}
		};

		for extension in self.extensions() {
			extension.validate(self)?;
		}

		let mut services = ServiceCollection::new();
		provider.apply_services(&mut services);
		for extension in self.extensions().filter(|e| !e.info().is_database_provider) {
			extension.apply_services(&mut services);
		}

		tracing::debug!(
			extensions = %self.log_fragment(),
			services = services.len(),
			"built service provider"
		);
		Ok(ServiceProvider::new(self.clone(), services))
	}
}

/// Mutable builder for [`DbContextOptions`].
#[derive(Debug, Clone, Default)]
pub struct DbContextOptionsBuilder {
	options: DbContextOptions,
}

impl DbContextOptionsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `extension`, replacing an existing extension of the same type in place.
	pub fn add_or_update_extension<T: OptionsExtension>(&mut self, extension: T) -> &mut Self {
		self.options
			.extensions
			.insert(TypeId::of::<T>(), Arc::new(extension));
		self
	}

	pub fn find_extension<T: OptionsExtension>(&self) -> Option<&T> {
		self.options.find_extension::<T>()
	}

	pub fn options(&self) -> &DbContextOptions {
		&self.options
	}

	pub fn build(self) -> DbContextOptions {
		self.options
	}
}

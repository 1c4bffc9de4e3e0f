//! The CockroachDB options extension and its registration helpers.

use crate::services::add_cockroach_services;
use reinhardt_postgres::options::{PostgresOptionsBuilder, UsePostgres};
use reinhardt_relational::error::Result;
use reinhardt_relational::options::{DbContextOptionsBuilder, ExtensionInfo, OptionsExtension};
use reinhardt_relational::services::ServiceCollection;
use std::any::Any;
use std::ops::{Deref, DerefMut};

/// Swaps PostgreSQL services for their CockroachDB counterparts.
///
/// This is not a database provider; it must be combined with the PostgreSQL
/// provider, whose services it replaces after they are registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CockroachOptionsExtension;

impl OptionsExtension for CockroachOptionsExtension {
	fn apply_services(&self, services: &mut ServiceCollection) {
		add_cockroach_services(services);
	}

	fn info(&self) -> ExtensionInfo {
		ExtensionInfo {
			log_fragment: "CockroachOptionsExtension".to_string(),
			is_database_provider: false,
			service_provider_hash: 0,
		}
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// PostgreSQL options seen through the CockroachDB entry point.
pub struct CockroachOptionsBuilder<'a> {
	postgres: &'a mut PostgresOptionsBuilder,
}

impl<'a> CockroachOptionsBuilder<'a> {
	pub fn new(postgres: &'a mut PostgresOptionsBuilder) -> Self {
		Self { postgres }
	}
}

impl Deref for CockroachOptionsBuilder<'_> {
	type Target = PostgresOptionsBuilder;

	fn deref(&self) -> &Self::Target {
		self.postgres
	}
}

impl DerefMut for CockroachOptionsBuilder<'_> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		self.postgres
	}
}

pub trait UseCockroach {
	/// Adds the CockroachDB extension, replacing an earlier one.
	///
	/// The PostgreSQL provider must be configured separately.
	fn use_cockroach(&mut self) -> &mut Self;

	/// Configures the PostgreSQL provider for `url` and adds the CockroachDB
	/// extension.
	///
	/// # Example
	///
	/// ```rust
	/// use reinhardt_cockroachdb::{CockroachOptionsExtension, UseCockroach};
	/// use reinhardt_relational::DbContextOptionsBuilder;
	///
	/// let mut builder = DbContextOptionsBuilder::new();
	/// builder
	///     .use_cockroach_with("postgresql://root@localhost:26257/bank", |crdb| {
	///         crdb.application_name("bank");
	///     })
	///     .unwrap();
	/// assert!(builder.find_extension::<CockroachOptionsExtension>().is_some());
	/// ```
	fn use_cockroach_with<F>(&mut self, url: &str, configure: F) -> Result<&mut Self>
	where
		F: FnOnce(&mut CockroachOptionsBuilder<'_>);
}

impl UseCockroach for DbContextOptionsBuilder {
	fn use_cockroach(&mut self) -> &mut Self {
		self.add_or_update_extension(CockroachOptionsExtension)
	}

	fn use_cockroach_with<F>(&mut self, url: &str, configure: F) -> Result<&mut Self>
	where
		F: FnOnce(&mut CockroachOptionsBuilder<'_>),
	{
		self.use_postgres(url, |postgres| {
			configure(&mut CockroachOptionsBuilder::new(postgres));
		})?;
		Ok(self.use_cockroach())
	}
}

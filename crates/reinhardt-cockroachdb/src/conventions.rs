//! Model conventions for CockroachDB.

use reinhardt_postgres::conventions::{PostgresConventionSetBuilder, PostgresModelFinalizingConvention, resolve_column_types};
use reinhardt_postgres::version::Version;
use reinhardt_relational::conventions::{Convention, ConventionSet, ConventionSetBuilder};
use reinhardt_relational::error::Result;
use reinhardt_relational::model::Model;
use reinhardt_relational::type_mapping::TypeMappingSource;
use std::fmt;
use std::sync::Arc;

/// Final model pass that resolves column types.
///
/// Unlike PostgreSQL there is no `xmin` system column, so row-version
/// properties stay ordinary columns.
pub struct CockroachModelFinalizingConvention {
	type_mapping_source: Arc<dyn TypeMappingSource>,
}

impl CockroachModelFinalizingConvention {
	pub const NAME: &'static str = "CockroachModelFinalizingConvention";

	pub fn new(type_mapping_source: Arc<dyn TypeMappingSource>) -> Self {
		Self { type_mapping_source }
	}
}

impl fmt::Debug for CockroachModelFinalizingConvention {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct(Self::NAME).finish_non_exhaustive()
	}
}

impl Convention for CockroachModelFinalizingConvention {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn process_model_finalizing(&self, model: &mut Model) -> Result<()> {
		resolve_column_types(self.type_mapping_source.as_ref(), model)
	}
}

/// PostgreSQL conventions with the finalizing convention swapped out.
pub struct CockroachConventionSetBuilder {
	postgres: PostgresConventionSetBuilder,
}

impl CockroachConventionSetBuilder {
	pub fn new(type_mapping_source: Arc<dyn TypeMappingSource>, postgres_version: Option<Version>) -> Self {
		Self {
			postgres: PostgresConventionSetBuilder::new(type_mapping_source, postgres_version),
		}
	}
}

impl ConventionSetBuilder for CockroachConventionSetBuilder {
	fn create_convention_set(&self) -> ConventionSet {
		let mut set = self.postgres.create_convention_set();
		let finalizing = Arc::new(CockroachModelFinalizingConvention::new(
			self.postgres.type_mapping_source().clone(),
		));
		ConventionSet::replace_convention(
			&mut set.model_finalizing,
			PostgresModelFinalizingConvention::NAME,
			finalizing,
		);
		set
	}
}

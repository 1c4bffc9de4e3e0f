//! # Reinhardt Cockroach
//!
//! Relational layer, PostgreSQL-wire provider and CockroachDB extension in one
//! crate.
//!
//! ## Feature Flags
//!
//! - `cockroachdb` (default) - the CockroachDB extension over the PostgreSQL provider
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use reinhardt_cockroach::prelude::*;
//!
//! let mut builder = DbContextOptionsBuilder::new();
//! builder.use_cockroach_with("postgresql://root@localhost:26257/bank", |crdb| {
//!     crdb.command_timeout(std::time::Duration::from_secs(30));
//! })?;
//!
//! let provider = builder.options().build_service_provider()?;
//! provider.database_creator()?.ensure_created(&model.create_operations()).await?;
//! ```

pub use reinhardt_postgres as postgres;
pub use reinhardt_relational as relational;

#[cfg(feature = "cockroachdb")]
pub use reinhardt_cockroachdb as cockroachdb;

pub mod prelude {
	pub use reinhardt_relational::{
		DatabaseCreator, DbContextOptions, DbContextOptionsBuilder, EntityType, ExecutionStrategy,
		MigrationsSqlGenerator, Model, Property, RelationalError, Result, ServiceProvider,
		ValueGenerated, ValueType, execute_with_retry,
	};

	pub use reinhardt_postgres::{
		PostgresRetryingExecutionStrategy, UsePostgres, Version, is_transient,
	};

	#[cfg(feature = "cockroachdb")]
	pub use reinhardt_cockroachdb::{CockroachSettings, UseCockroach};
}

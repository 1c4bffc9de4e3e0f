//! # Reinhardt PostgreSQL provider
//!
//! The PostgreSQL-wire database provider for `reinhardt-relational`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use reinhardt_postgres::UsePostgres;
//! use reinhardt_relational::DbContextOptionsBuilder;
//!
//! let mut builder = DbContextOptionsBuilder::new();
//! builder.use_postgres("postgresql://postgres@localhost:5432/bank", |pg| {
//!     pg.set_postgres_version("14".parse().unwrap());
//! })?;
//! let provider = builder.options().build_service_provider()?;
//! ```

pub mod annotations;
pub mod connection;
pub mod conventions;
pub mod creator;
pub mod executor;
pub mod migrations;
pub mod null_sort_order;
pub mod options;
pub mod retry;
pub mod services;
pub mod type_mapping;
pub mod version;

pub use annotations::{PostgresAnnotationNames, ValueGenerationStrategy};
pub use connection::ConnectionSettings;
pub use conventions::PostgresConventionSetBuilder;
pub use creator::PostgresDatabaseCreator;
pub use executor::MigrationCommandExecutor;
pub use migrations::PostgresMigrationsSqlGenerator;
pub use options::{PostgresOptionsBuilder, PostgresOptionsExtension, UsePostgres};
pub use retry::{PostgresRetryingExecutionStrategy, is_transient};
pub use services::add_postgres_services;
pub use type_mapping::PostgresTypeMappingSource;
pub use version::{Version, VersionExt};

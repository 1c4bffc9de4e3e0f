//! # Reinhardt CockroachDB
//!
//! CockroachDB support layered over the PostgreSQL provider.
//!
//! CockroachDB speaks the PostgreSQL wire protocol, so the PostgreSQL provider
//! does most of the work. This crate replaces the services whose behavior
//! differs: type mappings, migrations SQL, model conventions and the database
//! creator, and adds a model factory for reverse engineering.
//!
//! ## Differences from PostgreSQL
//!
//! - Schema changes run outside transactions in many cases; the generated
//!   commands are marked accordingly.
//! - Indexes carry extra columns with `STORING (...)` instead of `INCLUDE (...)`.
//! - `xmin` does not exist, so `u32` row versions are not mapped to it.
//! - Connecting to a missing database succeeds until the connection is used;
//!   [`CockroachDatabaseCreator`] probes with a catalog query.
//!
//! ## Example
//!
//! ```rust,ignore
//! use reinhardt_cockroachdb::UseCockroach;
//! use reinhardt_relational::DbContextOptionsBuilder;
//!
//! let mut builder = DbContextOptionsBuilder::new();
//! builder.use_cockroach_with("postgresql://root@localhost:26257/bank", |crdb| {
//!     crdb.application_name("bank");
//! })?;
//!
//! let provider = builder.options().build_service_provider()?;
//! let creator = provider.database_creator()?;
//! creator.ensure_created(&model.create_operations()).await?;
//! ```

pub mod annotations;
pub mod conventions;
pub mod creator;
pub mod design;
pub mod migrations;
pub mod options;
pub mod scaffolding;
pub mod services;
pub mod settings;
pub mod type_mapping;

pub use annotations::{CockroachAnnotationNames, InterleaveInParent};
pub use conventions::{CockroachConventionSetBuilder, CockroachModelFinalizingConvention};
pub use creator::CockroachDatabaseCreator;
pub use design::CockroachDesignTimeServices;
pub use migrations::CockroachMigrationsSqlGenerator;
pub use options::{CockroachOptionsBuilder, CockroachOptionsExtension, UseCockroach};
pub use scaffolding::CockroachDatabaseModelFactory;
pub use services::add_cockroach_services;
pub use settings::CockroachSettings;
pub use type_mapping::CockroachTypeMappingSource;

//! # Reinhardt Relational
//!
//! Contracts shared by the relational database providers.
//!
//! A provider plugs into the relational layer by registering services:
//!
//! - **Migrations SQL generation**: [`migrations::MigrationsSqlGenerator`] turns
//!   [`operations::MigrationOperation`] values into [`commands::MigrationCommand`]s
//! - **Type mapping**: [`type_mapping::TypeMappingSource`] resolves value types and
//!   store type names to [`type_mapping::TypeMapping`]s
//! - **Conventions**: [`conventions::ConventionSetBuilder`] shapes a [`model::Model`]
//!   before it is projected to operations
//! - **Database creation**: [`creator::DatabaseCreator`] probes, creates and drops databases
//! - **Scaffolding**: [`scaffolding::DatabaseModelFactory`] reverse-engineers a live schema
//!
//! Services are registered by [`options::OptionsExtension`]s into a
//! [`services::ServiceCollection`]; an extension applied after the provider may
//! replace any provider service.
//!
//! ## Example
//!
//! ```rust,ignore
//! use reinhardt_relational::options::DbContextOptionsBuilder;
//!
//! let mut builder = DbContextOptionsBuilder::new();
//! builder.add_or_update_extension(my_provider_extension);
//! let provider = builder.options().build_service_provider()?;
//! let commands = provider.migrations_sql_generator()?.generate(&operations, None)?;
//! ```

pub mod annotations;
pub mod commands;
pub mod conventions;
pub mod creator;
pub mod error;
pub mod execution;
pub mod migrations;
pub mod model;
pub mod operations;
pub mod options;
pub mod scaffolding;
pub mod services;
pub mod sql_generation;
pub mod type_mapping;

pub use annotations::{AnnotationValue, Annotations};
pub use commands::{MigrationCommand, MigrationCommandListBuilder};
pub use conventions::{Convention, ConventionSet, ConventionSetBuilder};
pub use creator::DatabaseCreator;
pub use error::{RelationalError, Result};
pub use execution::{ExecutionStrategy, execute_with_retry};
pub use migrations::MigrationsSqlGenerator;
pub use model::{EntityType, Model, Property, ValueGenerated};
pub use operations::MigrationOperation;
pub use options::{DbContextOptions, DbContextOptionsBuilder, ExtensionInfo, OptionsExtension};
pub use scaffolding::{DatabaseModel, DatabaseModelFactory, ModelFactoryOptions};
pub use services::{ServiceCollection, ServiceDescriptor, ServiceKind, ServiceProvider};
pub use sql_generation::SqlGenerationHelper;
pub use type_mapping::{SqlValue, TypeMapping, TypeMappingInfo, TypeMappingSource, ValueType};

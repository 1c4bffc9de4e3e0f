//! Migrations SQL generator for CockroachDB.
//!
//! Wraps [`PostgresMigrationsSqlGenerator`] and overrides the statements
//! CockroachDB handles differently. Most schema changes cannot share a
//! transaction with other statements on CockroachDB, so the overridden DDL is
//! emitted as transaction-suppressed commands.

use crate::annotations::InterleaveInParent;
use reinhardt_postgres::annotations::PostgresAnnotationNames;
use reinhardt_postgres::migrations::PostgresMigrationsSqlGenerator;
use reinhardt_postgres::version::{Version, VersionExt};
use reinhardt_relational::commands::MigrationCommandListBuilder;
use reinhardt_relational::error::{RelationalError, Result};
use reinhardt_relational::migrations::MigrationsSqlGenerator;
use reinhardt_relational::model::Model;
use reinhardt_relational::operations::*;
use reinhardt_relational::type_mapping::TypeMappingSource;
use std::sync::Arc;

/// Hidden columns CockroachDB adds to every table.
pub const SYSTEM_COLUMN_NAMES: &[&str] = &[
	"crdb_internal_mvcc_timestamp",
	"crdb_internal_origin_id",
	"crdb_internal_origin_timestamp",
	"tableoid",
];

/// Session setting required before changing a column's type.
pub const ALTER_COLUMN_TYPE_SETTING: &str = "SET enable_experimental_alter_column_type_general = true;";

pub struct CockroachMigrationsSqlGenerator {
	postgres: PostgresMigrationsSqlGenerator,
}

impl CockroachMigrationsSqlGenerator {
	pub fn new(type_mapping_source: Arc<dyn TypeMappingSource>, postgres_version: Option<Version>) -> Result<Self> {
		Ok(Self {
			postgres: PostgresMigrationsSqlGenerator::new(type_mapping_source, postgres_version)?,
		})
	}

	pub fn postgres(&self) -> &PostgresMigrationsSqlGenerator {
		&self.postgres
	}

	pub fn is_system_column(name: &str) -> bool {
		SYSTEM_COLUMN_NAMES.contains(&name)
	}

	fn interleave_clause(&self, interleave: &InterleaveInParent, builder: &mut MigrationCommandListBuilder) {
		builder
			.append_line("")
			.append("INTERLEAVE IN PARENT ")
			.append(self.postgres.delimit_in(
				&interleave.parent_table_name,
				interleave.parent_table_schema.as_deref(),
			))
			.append(" (")
			.append(self.postgres.column_list(&interleave.interleave_prefix))
			.append(")");
	}
}

impl MigrationsSqlGenerator for CockroachMigrationsSqlGenerator {
	fn ensure_schema(
		&self,
		operation: &EnsureSchemaOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		if operation.name == "public" {
			return Ok(());
		}
		// No procedural IF blocks; rely on IF NOT EXISTS.
		builder
			.append("CREATE SCHEMA IF NOT EXISTS ")
			.append(self.postgres.delimit(&operation.name))
			.append_line(";");
		builder.end_command(false);
		Ok(())
	}

	fn drop_schema(
		&self,
		operation: &DropSchemaOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		self.postgres.drop_schema(operation, model, builder)
	}

	fn create_table(
		&self,
		operation: &CreateTableOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		if !terminate && operation.comment.is_some() {
			return Err(RelationalError::InvalidOperation(
				"a table comment requires the CREATE TABLE statement to be terminated".to_string(),
			));
		}

		let columns: Vec<ColumnOperation> = operation
			.columns
			.iter()
			.filter(|c| !Self::is_system_column(&c.name))
			.cloned()
			.collect();

		builder.append("CREATE ");
		if operation.annotations.is_true(PostgresAnnotationNames::UNLOGGED_TABLE) {
			builder.append("UNLOGGED ");
		}
		builder
			.append("TABLE ")
			.append(self.postgres.delimit_in(&operation.name, operation.schema.as_deref()))
			.append_line(" (");
		builder.indented(|b| -> Result<()> {
			self.postgres.create_table_columns(self, &columns, model, b)?;
			self.postgres.create_table_constraints(operation, b);
			b.append_line("");
			Ok(())
		})?;
		builder.append(")");

		if let Some(interleave) = InterleaveInParent::from_annotations(&operation.annotations)? {
			self.interleave_clause(&interleave, builder);
		}
		self.postgres.storage_parameters_clause(&operation.annotations, builder);
		self.postgres.create_table_comments(operation, &columns, builder);

		if terminate {
			self.postgres.terminate_statement(builder, true);
		}
		Ok(())
	}

	fn alter_table(
		&self,
		operation: &AlterTableOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		if self.postgres.alter_table_statements(operation, builder)? {
			builder.end_command(true);
		}
		Ok(())
	}

	fn drop_table(
		&self,
		operation: &DropTableOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		self.postgres.drop_table(operation, model, builder, terminate)
	}

	fn rename_table(
		&self,
		operation: &RenameTableOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		self.postgres.rename_table(operation, model, builder)
	}

	fn add_column(
		&self,
		operation: &ColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		self.postgres.add_column_with(self, operation, model, builder, terminate)
	}

	/// A type change runs as its own suppressed command after enabling
	/// general column type changes for the session; the remaining changes
	/// follow as for PostgreSQL.
	fn alter_column(
		&self,
		operation: &AlterColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		let column = &operation.column;
		let old = &operation.old_column;
		let computed_changed =
			column.computed_column_sql != old.computed_column_sql || column.is_stored != old.is_stored;
		if computed_changed {
			return self.postgres.alter_column_with(self, operation, model, builder);
		}

		let new_type = self.postgres.column_type(column)?;
		let old_type = self.postgres.column_type(old).ok();
		if old_type.as_deref() == Some(new_type.as_str()) && column.collation == old.collation {
			return self.postgres.alter_column_with(self, operation, model, builder);
		}

		builder.append_line(ALTER_COLUMN_TYPE_SETTING);
		builder.end_command(true);

		builder
			.append("ALTER TABLE ")
			.append(self.postgres.delimit_in(&column.table, column.schema.as_deref()))
			.append(" ALTER COLUMN ")
			.append(self.postgres.delimit(&column.name))
			.append(" TYPE ")
			.append(&new_type);
		if let Some(collation) = column.collation.as_deref() {
			builder.append(" COLLATE ").append(self.postgres.delimit(collation));
		}
		self.postgres.terminate_statement(builder, true);

		let mut remaining = operation.clone();
		remaining.old_column.column_type = Some(new_type);
		remaining.old_column.collation = column.collation.clone();
		self.postgres.alter_column_with(self, &remaining, model, builder)
	}

	fn drop_column(
		&self,
		operation: &DropColumnOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		if Self::is_system_column(&operation.name) {
			return Ok(());
		}
		builder
			.append("ALTER TABLE ")
			.append(self.postgres.delimit_in(&operation.table, operation.schema.as_deref()))
			.append(" DROP COLUMN ")
			.append(self.postgres.delimit(&operation.name));
		if terminate {
			self.postgres.terminate_statement(builder, true);
		}
		Ok(())
	}

	fn rename_column(
		&self,
		operation: &RenameColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		self.postgres.rename_column(operation, model, builder)
	}

	fn add_primary_key(
		&self,
		operation: &PrimaryKeyOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		builder
			.append("ALTER TABLE ")
			.append(self.postgres.delimit_in(&operation.table, operation.schema.as_deref()))
			.append(" ADD ");
		self.postgres.primary_key_constraint(operation, builder);
		if terminate {
			self.postgres.terminate_statement(builder, true);
		}
		Ok(())
	}

	fn drop_primary_key(
		&self,
		operation: &DropConstraintOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		self.postgres.drop_primary_key(operation, model, builder, terminate)
	}

	fn add_foreign_key(
		&self,
		operation: &ForeignKeyOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		self.postgres.add_foreign_key(operation, model, builder, terminate)
	}

	fn drop_foreign_key(
		&self,
		operation: &DropConstraintOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		self.postgres.drop_constraint(operation, builder);
		if terminate {
			self.postgres.terminate_statement(builder, true);
		}
		Ok(())
	}

	fn add_unique_constraint(
		&self,
		operation: &UniqueConstraintOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		self.postgres.add_unique_constraint(operation, model, builder)
	}

	/// Unique constraints are backed by indexes and dropped through them.
	fn drop_unique_constraint(
		&self,
		operation: &DropConstraintOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		builder
			.append("DROP INDEX ")
			.append(self.postgres.delimit(&operation.name))
			.append(" CASCADE");
		self.postgres.terminate_statement(builder, true);
		Ok(())
	}

	fn add_check_constraint(
		&self,
		operation: &CheckConstraintOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		self.postgres.add_check_constraint(operation, model, builder)
	}

	fn drop_check_constraint(
		&self,
		operation: &DropConstraintOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		self.postgres.drop_constraint(operation, builder);
		self.postgres.terminate_statement(builder, true);
		Ok(())
	}

	fn create_index(
		&self,
		operation: &CreateIndexOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		self.postgres.create_index_with(self, operation, builder, terminate)
	}

	fn drop_index(
		&self,
		operation: &DropIndexOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		self.postgres.drop_index(operation, model, builder, terminate)
	}

	fn create_database(
		&self,
		operation: &CreateDatabaseOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		if operation.template.is_none() && operation.tablespace.is_none() {
			return self.postgres.create_database(operation, model, builder);
		}
		if let Some(template) = operation.template.as_deref() {
			tracing::warn!(database = %operation.name, %template, "database templates are not supported, ignoring");
		}
		if let Some(tablespace) = operation.tablespace.as_deref() {
			tracing::warn!(database = %operation.name, %tablespace, "tablespaces are not supported, ignoring");
		}
		let supported = CreateDatabaseOperation {
			template: None,
			tablespace: None,
			..operation.clone()
		};
		self.postgres.create_database(&supported, model, builder)
	}

	fn drop_database(
		&self,
		operation: &DropDatabaseOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		self.postgres.drop_database(operation, model, builder)
	}

	fn sql(
		&self,
		operation: &SqlOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		self.postgres.sql(operation, model, builder)
	}

	fn column_definition(
		&self,
		column: &ColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		self.postgres.column_definition_with(self, column, model, builder)
	}

	/// The expression is cast to the column type, which CockroachDB requires
	/// when the expression type differs.
	fn computed_column_definition(
		&self,
		column: &ColumnOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		if self.postgres.postgres_version().is_under(12, 0) {
			return Err(RelationalError::NotSupported(
				"computed columns require PostgreSQL 12 or later".to_string(),
			));
		}
		if column.is_stored != Some(true) {
			return Err(RelationalError::NotSupported(format!(
				"computed column '{}' must be stored; virtual computed columns are not supported",
				column.name
			)));
		}

		let column_type = self.postgres.column_type(column)?;
		let sql = column.computed_column_sql.as_deref().unwrap_or_default();
		builder
			.append(self.postgres.delimit(&column.name))
			.append(" ")
			.append(&column_type);
		if let Some(collation) = column.collation.as_deref() {
			builder.append(" COLLATE ").append(self.postgres.delimit(collation));
		}
		builder
			.append(" GENERATED ALWAYS AS ((")
			.append(sql)
			.append(")::")
			.append(&column_type)
			.append(") STORED");
		if !column.is_nullable {
			builder.append(" NOT NULL");
		}
		Ok(())
	}

	fn index_include_clause(
		&self,
		operation: &CreateIndexOperation,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		if operation.include.is_empty() {
			return Ok(());
		}
		builder
			.append(" STORING (")
			.append(self.postgres.column_list(&operation.include))
			.append(")");
		Ok(())
	}
}

//! PostgreSQL migrations SQL generator.
//!
//! Besides the [`MigrationsSqlGenerator`] implementation this module exposes the
//! building blocks (`*_with` helpers, constraint writers, storage parameter
//! handling) that wrapping generators reuse. Helpers taking a `this` argument
//! dispatch nested calls through it, so a wrapper that passes itself sees its
//! own overrides invoked from inside PostgreSQL statements.

use crate::annotations::{PostgresAnnotationNames, ValueGenerationStrategy};
use crate::null_sort_order::is_default_null_sort_order;
use crate::version::{Version, VersionExt};
use indexmap::IndexMap;
use reinhardt_relational::annotations::{AnnotationValue, Annotations};
use reinhardt_relational::commands::MigrationCommandListBuilder;
use reinhardt_relational::error::{RelationalError, Result};
use reinhardt_relational::migrations::MigrationsSqlGenerator;
use reinhardt_relational::model::Model;
use reinhardt_relational::operations::*;
use reinhardt_relational::sql_generation::SqlGenerationHelper;
use reinhardt_relational::type_mapping::{SqlValue, TypeMapping, TypeMappingInfo, TypeMappingSource};
use std::sync::Arc;

/// Columns every PostgreSQL table has implicitly.
pub const SYSTEM_COLUMN_NAMES: &[&str] = &["tableoid", "xmin", "cmin", "xmax", "cmax", "ctid"];

pub struct PostgresMigrationsSqlGenerator {
	helper: SqlGenerationHelper,
	type_mapping_source: Arc<dyn TypeMappingSource>,
	string_mapping: TypeMapping,
	postgres_version: Option<Version>,
}

impl PostgresMigrationsSqlGenerator {
	/// Fails when the type mapping source has no string mapping.
	pub fn new(
		type_mapping_source: Arc<dyn TypeMappingSource>,
		postgres_version: Option<Version>,
	) -> Result<Self> {
		let string_mapping = type_mapping_source.string_mapping()?;
		Ok(Self {
			helper: SqlGenerationHelper::new(),
			type_mapping_source,
			string_mapping,
			postgres_version,
		})
	}

	pub fn helper(&self) -> &SqlGenerationHelper {
		&self.helper
	}

	pub fn postgres_version(&self) -> Option<Version> {
		self.postgres_version
	}

	pub fn type_mapping_source(&self) -> &Arc<dyn TypeMappingSource> {
		&self.type_mapping_source
	}

	pub fn is_system_column(name: &str) -> bool {
		SYSTEM_COLUMN_NAMES.contains(&name)
	}

	pub fn delimit(&self, name: &str) -> String {
		self.helper.delimit_identifier(name)
	}

	pub fn delimit_in(&self, name: &str, schema: Option<&str>) -> String {
		self.helper.delimit_identifier_in(name, schema)
	}

	pub fn column_list(&self, columns: &[String]) -> String {
		columns
			.iter()
			.map(|c| self.delimit(c))
			.collect::<Vec<_>>()
			.join(", ")
	}

	/// Appends the statement terminator and closes the command.
	pub fn terminate_statement(&self, builder: &mut MigrationCommandListBuilder, suppress_transaction: bool) {
		builder.append_line(self.helper.statement_terminator());
		builder.end_command(suppress_transaction);
	}

	/// String literal for comments; `NULL` removes a comment.
	pub fn comment_literal(&self, comment: Option<&str>) -> String {
		self.string_mapping.generate_sql_literal(&SqlValue::from(comment))
	}

	/// Storage parameters annotated on a table or index, in annotation order.
	pub fn storage_parameters(annotations: &Annotations) -> IndexMap<String, String> {
		annotations
			.with_prefix(PostgresAnnotationNames::STORAGE_PARAMETER_PREFIX)
			.map(|(name, value)| (name.to_string(), Self::storage_parameter_value(value)))
			.collect()
	}

	/// Booleans are spelled `true`/`false`, strings are single-quoted.
	pub fn storage_parameter_value(value: &AnnotationValue) -> String {
		match value {
			AnnotationValue::Bool(true) => "true".to_string(),
			AnnotationValue::Bool(false) => "false".to_string(),
			AnnotationValue::String(s) => format!("'{}'", s.replace('\'', "''")),
			other => other.to_string(),
		}
	}

	/// `\nWITH (k=v, ...)` when any storage parameter is annotated.
	pub fn storage_parameters_clause(&self, annotations: &Annotations, builder: &mut MigrationCommandListBuilder) {
		let parameters = Self::storage_parameters(annotations);
		if parameters.is_empty() {
			return;
		}
		let rendered: Vec<String> = parameters
			.iter()
			.map(|(name, value)| format!("{}={}", name, value))
			.collect();
		builder
			.append_line("")
			.append("WITH (")
			.append(rendered.join(", "))
			.append(")");
	}

	/// Store type of `column`, resolved through the type mapping source when not explicit.
	pub fn column_type(&self, column: &ColumnOperation) -> Result<String> {
		if let Some(column_type) = &column.column_type {
			return Ok(column_type.clone());
		}
		let info = TypeMappingInfo::new(column.value_type.clone(), None)
			.with_size(column.max_length)
			.with_fixed_length(column.is_fixed_length);
		self.type_mapping_source
			.find_mapping(&info)
			.map(|mapping| mapping.store_type)
			.ok_or_else(|| {
				RelationalError::MissingTypeMapping(format!(
					"column '{}' of table '{}' ({})",
					column.name,
					column.table,
					info.describe()
				))
			})
	}

	fn value_generation_strategy(column: &ColumnOperation) -> Result<Option<ValueGenerationStrategy>> {
		column
			.annotations
			.get_str(PostgresAnnotationNames::VALUE_GENERATION_STRATEGY)
			.map(str::parse)
			.transpose()
	}

	/// Writes the column list of a `CREATE TABLE`, separated by `,` lines.
	pub fn create_table_columns(
		&self,
		this: &dyn MigrationsSqlGenerator,
		columns: &[ColumnOperation],
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		for (i, column) in columns.iter().enumerate() {
			if i > 0 {
				builder.append_line(",");
			}
			this.column_definition(column, model, builder)?;
		}
		Ok(())
	}

	/// Writes the inline constraints of a `CREATE TABLE`, each preceded by `,`.
	pub fn create_table_constraints(&self, operation: &CreateTableOperation, builder: &mut MigrationCommandListBuilder) {
		if let Some(primary_key) = &operation.primary_key {
			builder.append_line(",");
			self.primary_key_constraint(primary_key, builder);
		}
		for unique in &operation.unique_constraints {
			builder.append_line(",");
			self.unique_constraint(unique, builder);
		}
		for check in &operation.check_constraints {
			builder.append_line(",");
			self.check_constraint(check, builder);
		}
		for foreign_key in &operation.foreign_keys {
			builder.append_line(",");
			self.foreign_key_constraint(foreign_key, builder);
		}
	}

	fn constraint_name(&self, name: &str, builder: &mut MigrationCommandListBuilder) {
		if !name.is_empty() {
			builder
				.append("CONSTRAINT ")
				.append(self.delimit(name))
				.append(" ");
		}
	}

	pub fn primary_key_constraint(&self, operation: &PrimaryKeyOperation, builder: &mut MigrationCommandListBuilder) {
		self.constraint_name(&operation.name, builder);
		builder
			.append("PRIMARY KEY (")
			.append(self.column_list(&operation.columns))
			.append(")");
	}

	pub fn unique_constraint(&self, operation: &UniqueConstraintOperation, builder: &mut MigrationCommandListBuilder) {
		self.constraint_name(&operation.name, builder);
		builder
			.append("UNIQUE (")
			.append(self.column_list(&operation.columns))
			.append(")");
	}

	pub fn check_constraint(&self, operation: &CheckConstraintOperation, builder: &mut MigrationCommandListBuilder) {
		self.constraint_name(&operation.name, builder);
		builder.append("CHECK (").append(&operation.sql).append(")");
	}

	pub fn foreign_key_constraint(&self, operation: &ForeignKeyOperation, builder: &mut MigrationCommandListBuilder) {
		self.constraint_name(&operation.name, builder);
		let principal_schema = operation
			.principal_schema
			.as_deref()
			.or(operation.schema.as_deref());
		builder
			.append("FOREIGN KEY (")
			.append(self.column_list(&operation.columns))
			.append(") REFERENCES ")
			.append(self.delimit_in(&operation.principal_table, principal_schema))
			.append(" (")
			.append(self.column_list(&operation.principal_columns))
			.append(")");
		if operation.on_update != ReferentialAction::NoAction {
			builder.append(" ON UPDATE ").append(operation.on_update.as_sql());
		}
		if operation.on_delete != ReferentialAction::NoAction {
			builder.append(" ON DELETE ").append(operation.on_delete.as_sql());
		}
	}

	/// Appends `COMMENT ON` statements for the table and its commented columns.
	pub fn create_table_comments(
		&self,
		operation: &CreateTableOperation,
		columns: &[ColumnOperation],
		builder: &mut MigrationCommandListBuilder,
	) {
		let table = self.delimit_in(&operation.name, operation.schema.as_deref());
		if let Some(comment) = operation.comment.as_deref() {
			builder
				.append_line(self.helper.statement_terminator())
				.append("COMMENT ON TABLE ")
				.append(&table)
				.append(" IS ")
				.append(self.comment_literal(Some(comment)));
		}
		for column in columns.iter().filter(|c| c.comment.is_some()) {
			builder
				.append_line(self.helper.statement_terminator())
				.append("COMMENT ON COLUMN ")
				.append(&table)
				.append(".")
				.append(self.delimit(&column.name))
				.append(" IS ")
				.append(self.comment_literal(column.comment.as_deref()));
		}
	}

	/// Writes `ALTER TABLE` statements for storage parameter, comment and
	/// logging changes. Returns whether anything was written.
	pub fn alter_table_statements(
		&self,
		operation: &AlterTableOperation,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<bool> {
		let table = self.delimit_in(&operation.name, operation.schema.as_deref());
		let old_parameters = Self::storage_parameters(&operation.old_table.annotations);
		let new_parameters = Self::storage_parameters(&operation.annotations);
		let mut made_changes = false;

		let set: Vec<String> = new_parameters
			.iter()
			.filter(|(name, value)| old_parameters.get(*name) != Some(*value))
			.map(|(name, value)| format!("{}={}", name, value))
			.collect();
		if !set.is_empty() {
			builder
				.append("ALTER TABLE ")
				.append(&table)
				.append(" SET (")
				.append(set.join(", "))
				.append_line(");");
			made_changes = true;
		}

		let reset: Vec<&str> = old_parameters
			.keys()
			.filter(|name| !new_parameters.contains_key(*name))
			.map(String::as_str)
			.collect();
		if !reset.is_empty() {
			builder
				.append("ALTER TABLE ")
				.append(&table)
				.append(" RESET (")
				.append(reset.join(", "))
				.append_line(");");
			made_changes = true;
		}

		if operation.comment != operation.old_table.comment {
			builder
				.append("COMMENT ON TABLE ")
				.append(&table)
				.append(" IS ")
				.append(self.comment_literal(operation.comment.as_deref()))
				.append_line(";");
			made_changes = true;
		}

		let unlogged = operation.annotations.is_true(PostgresAnnotationNames::UNLOGGED_TABLE);
		let was_unlogged = operation
			.old_table
			.annotations
			.is_true(PostgresAnnotationNames::UNLOGGED_TABLE);
		if unlogged != was_unlogged {
			builder
				.append("ALTER TABLE ")
				.append(&table)
				.append(if unlogged { " SET UNLOGGED" } else { " SET LOGGED" })
				.append_line(";");
			made_changes = true;
		}

		Ok(made_changes)
	}

	pub fn add_column_with(
		&self,
		this: &dyn MigrationsSqlGenerator,
		operation: &ColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		let table = self.delimit_in(&operation.table, operation.schema.as_deref());
		builder.append("ALTER TABLE ").append(&table).append(" ADD ");
		this.column_definition(operation, model, builder)?;

		if terminate {
			if let Some(comment) = operation.comment.as_deref() {
				builder
					.append_line(self.helper.statement_terminator())
					.append("COMMENT ON COLUMN ")
					.append(&table)
					.append(".")
					.append(self.delimit(&operation.name))
					.append(" IS ")
					.append(self.comment_literal(Some(comment)));
			}
			self.terminate_statement(builder, false);
		}
		Ok(())
	}

	/// Column changes as separate `ALTER TABLE` statements in one command.
	///
	/// A change of the computed expression recreates the column through `this`.
	pub fn alter_column_with(
		&self,
		this: &dyn MigrationsSqlGenerator,
		operation: &AlterColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		let column = &operation.column;
		let old = &operation.old_column;

		if column.computed_column_sql != old.computed_column_sql || column.is_stored != old.is_stored {
			let drop = DropColumnOperation {
				name: column.name.clone(),
				table: column.table.clone(),
				schema: column.schema.clone(),
			};
			this.drop_column(&drop, model, builder, true)?;
			return this.add_column(column, model, builder, true);
		}

		let table = self.delimit_in(&column.table, column.schema.as_deref());
		let name = self.delimit(&column.name);
		let mut made_changes = false;

		let new_type = self.column_type(column)?;
		let old_type = self.column_type(old).ok();
		if old_type.as_deref() != Some(new_type.as_str()) || column.collation != old.collation {
			builder
				.append("ALTER TABLE ")
				.append(&table)
				.append(" ALTER COLUMN ")
				.append(&name)
				.append(" TYPE ")
				.append(&new_type);
			if let Some(collation) = column.collation.as_deref() {
				builder.append(" COLLATE ").append(self.delimit(collation));
			}
			builder.append_line(";");
			made_changes = true;
		}

		if column.is_nullable != old.is_nullable {
			builder
				.append("ALTER TABLE ")
				.append(&table)
				.append(" ALTER COLUMN ")
				.append(&name)
				.append(if column.is_nullable {
					" DROP NOT NULL"
				} else {
					" SET NOT NULL"
				})
				.append_line(";");
			made_changes = true;
		}

		if column.default_value_sql != old.default_value_sql {
			builder
				.append("ALTER TABLE ")
				.append(&table)
				.append(" ALTER COLUMN ")
				.append(&name);
			match column.default_value_sql.as_deref() {
				Some(default) => builder.append(" SET DEFAULT ").append(default),
				None => builder.append(" DROP DEFAULT"),
			};
			builder.append_line(";");
			made_changes = true;
		}

		if column.comment != old.comment {
			builder
				.append("COMMENT ON COLUMN ")
				.append(&table)
				.append(".")
				.append(&name)
				.append(" IS ")
				.append(self.comment_literal(column.comment.as_deref()))
				.append_line(";");
			made_changes = true;
		}

		if made_changes {
			builder.end_command(false);
		}
		Ok(())
	}

	/// Key columns of an index with direction and null ordering.
	pub fn index_columns(&self, operation: &CreateIndexOperation) -> String {
		let descending = |i: usize| match operation.is_descending.as_deref() {
			Some([]) => true,
			Some(flags) => flags.get(i).copied().unwrap_or(false),
			None => false,
		};
		let explicit_nulls = !is_default_null_sort_order(
			operation.null_sort_order.as_deref(),
			operation.is_descending.as_deref(),
		);

		operation
			.columns
			.iter()
			.enumerate()
			.map(|(i, column)| {
				let mut rendered = self.delimit(column);
				if descending(i) {
					rendered.push_str(" DESC");
				}
				if explicit_nulls {
					match operation.null_sort_order.as_deref().and_then(|o| o.get(i)) {
						Some(NullSortOrder::NullsFirst) => rendered.push_str(" NULLS FIRST"),
						Some(NullSortOrder::NullsLast) => rendered.push_str(" NULLS LAST"),
						_ => {}
					}
				}
				rendered
			})
			.collect::<Vec<_>>()
			.join(", ")
	}

	pub fn create_index_with(
		&self,
		this: &dyn MigrationsSqlGenerator,
		operation: &CreateIndexOperation,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		builder.append("CREATE ");
		if operation.is_unique {
			builder.append("UNIQUE ");
		}
		builder.append("INDEX ");
		if operation.concurrently {
			builder.append("CONCURRENTLY ");
		}
		builder
			.append(self.delimit(&operation.name))
			.append(" ON ")
			.append(self.delimit_in(&operation.table, operation.schema.as_deref()));
		if let Some(method) = operation.method.as_deref() {
			builder.append(" USING ").append(method);
		}
		builder
			.append(" (")
			.append(self.index_columns(operation))
			.append(")");

		this.index_include_clause(operation, builder)?;

		let parameters = Self::storage_parameters(&operation.annotations);
		if !parameters.is_empty() {
			let rendered: Vec<String> = parameters
				.iter()
				.map(|(name, value)| format!("{}={}", name, value))
				.collect();
			builder.append(" WITH (").append(rendered.join(", ")).append(")");
		}

		if let Some(filter) = operation.filter.as_deref() {
			builder.append(" WHERE ").append(filter);
		}

		if terminate {
			// Concurrent builds cannot run inside a transaction block.
			self.terminate_statement(builder, operation.concurrently);
		}
		Ok(())
	}

	pub fn column_definition_with(
		&self,
		this: &dyn MigrationsSqlGenerator,
		column: &ColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		if column.computed_column_sql.is_some() {
			return this.computed_column_definition(column, model, builder);
		}

		let strategy = Self::value_generation_strategy(column)?;
		let mut column_type = self.column_type(column)?;
		if strategy == Some(ValueGenerationStrategy::SerialColumn) {
			column_type = match column_type.as_str() {
				"smallint" | "int2" => "smallserial".to_string(),
				"integer" | "int" | "int4" => "serial".to_string(),
				"bigint" | "int8" => "bigserial".to_string(),
				other => {
					return Err(RelationalError::InvalidOperation(format!(
						"serial column '{}' must be an integer type, not '{}'",
						column.name, other
					)));
				}
			};
		}

		builder
			.append(self.delimit(&column.name))
			.append(" ")
			.append(&column_type);
		if let Some(collation) = column.collation.as_deref() {
			builder.append(" COLLATE ").append(self.delimit(collation));
		}

		match strategy {
			Some(ValueGenerationStrategy::IdentityByDefaultColumn) => {
				builder.append(" GENERATED BY DEFAULT AS IDENTITY");
			}
			Some(ValueGenerationStrategy::IdentityAlwaysColumn) => {
				builder.append(" GENERATED ALWAYS AS IDENTITY");
			}
			_ => {
				if !column.is_nullable {
					builder.append(" NOT NULL");
				}
				if let Some(default) = column.default_value_sql.as_deref() {
					builder.append(" DEFAULT ").append(default);
				}
			}
		}
		Ok(())
	}
}

impl MigrationsSqlGenerator for PostgresMigrationsSqlGenerator {
	fn ensure_schema(
		&self,
		operation: &EnsureSchemaOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		if operation.name == "public" {
			return Ok(());
		}

		builder.append_line("DO $EF$").append_line("BEGIN");
		builder.indented(|b| {
			b.append("IF NOT EXISTS(SELECT 1 FROM pg_namespace WHERE nspname = ")
				.append(self.helper.string_literal(&operation.name))
				.append_line(") THEN");
			b.indented(|b| {
				b.append("CREATE SCHEMA ")
					.append(self.delimit(&operation.name))
					.append_line(";");
			});
			b.append_line("END IF;");
		});
		builder.append_line("END $EF$;");
		builder.end_command(false);
		Ok(())
	}

	fn drop_schema(
		&self,
		operation: &DropSchemaOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		builder
			.append("DROP SCHEMA ")
			.append(self.delimit(&operation.name));
		self.terminate_statement(builder, false);
		Ok(())
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
			.append(self.delimit_in(&operation.name, operation.schema.as_deref()))
			.append_line(" (");
		builder.indented(|b| -> Result<()> {
			self.create_table_columns(self, &columns, model, b)?;
			self.create_table_constraints(operation, b);
			b.append_line("");
			Ok(())
		})?;
		builder.append(")");

		self.storage_parameters_clause(&operation.annotations, builder);
		self.create_table_comments(operation, &columns, builder);

		if terminate {
			self.terminate_statement(builder, false);
		}
		Ok(())
	}

	fn alter_table(
		&self,
		operation: &AlterTableOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		if self.alter_table_statements(operation, builder)? {
			builder.end_command(false);
		}
		Ok(())
	}

	fn drop_table(
		&self,
		operation: &DropTableOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		builder
			.append("DROP TABLE ")
			.append(self.delimit_in(&operation.name, operation.schema.as_deref()));
		if terminate {
			self.terminate_statement(builder, false);
		}
		Ok(())
	}

	fn rename_table(
		&self,
		operation: &RenameTableOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		let mut name = operation.name.clone();
		if let Some(new_name) = operation.new_name.as_deref().filter(|n| *n != operation.name) {
			builder
				.append("ALTER TABLE ")
				.append(self.delimit_in(&operation.name, operation.schema.as_deref()))
				.append(" RENAME TO ")
				.append(self.delimit(new_name))
				.append_line(";");
			name = new_name.to_string();
		}
		if let Some(new_schema) = operation
			.new_schema
			.as_deref()
			.filter(|s| Some(*s) != operation.schema.as_deref())
		{
			builder
				.append("ALTER TABLE ")
				.append(self.delimit_in(&name, operation.schema.as_deref()))
				.append(" SET SCHEMA ")
				.append(self.delimit(new_schema))
				.append_line(";");
		}
		builder.end_command(false);
		Ok(())
	}

	fn add_column(
		&self,
		operation: &ColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		self.add_column_with(self, operation, model, builder, terminate)
	}

	fn alter_column(
		&self,
		operation: &AlterColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		self.alter_column_with(self, operation, model, builder)
	}

	fn drop_column(
		&self,
		operation: &DropColumnOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		builder
			.append("ALTER TABLE ")
			.append(self.delimit_in(&operation.table, operation.schema.as_deref()))
			.append(" DROP COLUMN ")
			.append(self.delimit(&operation.name));
		if terminate {
			self.terminate_statement(builder, false);
		}
		Ok(())
	}

	fn rename_column(
		&self,
		operation: &RenameColumnOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		builder
			.append("ALTER TABLE ")
			.append(self.delimit_in(&operation.table, operation.schema.as_deref()))
			.append(" RENAME COLUMN ")
			.append(self.delimit(&operation.name))
			.append(" TO ")
			.append(self.delimit(&operation.new_name));
		self.terminate_statement(builder, false);
		Ok(())
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
			.append(self.delimit_in(&operation.table, operation.schema.as_deref()))
			.append(" ADD ");
		self.primary_key_constraint(operation, builder);
		if terminate {
			self.terminate_statement(builder, false);
		}
		Ok(())
	}

	fn drop_primary_key(
		&self,
		operation: &DropConstraintOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		self.drop_constraint(operation, builder);
		if terminate {
			self.terminate_statement(builder, false);
		}
		Ok(())
	}

	fn add_foreign_key(
		&self,
		operation: &ForeignKeyOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		builder
			.append("ALTER TABLE ")
			.append(self.delimit_in(&operation.table, operation.schema.as_deref()))
			.append(" ADD ");
		self.foreign_key_constraint(operation, builder);
		if terminate {
			self.terminate_statement(builder, false);
		}
		Ok(())
	}

	fn drop_foreign_key(
		&self,
		operation: &DropConstraintOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		self.drop_constraint(operation, builder);
		if terminate {
			self.terminate_statement(builder, false);
		}
		Ok(())
	}

	fn add_unique_constraint(
		&self,
		operation: &UniqueConstraintOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		builder
			.append("ALTER TABLE ")
			.append(self.delimit_in(&operation.table, operation.schema.as_deref()))
			.append(" ADD ");
		self.unique_constraint(operation, builder);
		self.terminate_statement(builder, false);
		Ok(())
	}

	fn drop_unique_constraint(
		&self,
		operation: &DropConstraintOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		self.drop_constraint(operation, builder);
		self.terminate_statement(builder, false);
		Ok(())
	}

	fn add_check_constraint(
		&self,
		operation: &CheckConstraintOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		builder
			.append("ALTER TABLE ")
			.append(self.delimit_in(&operation.table, operation.schema.as_deref()))
			.append(" ADD ");
		self.check_constraint(operation, builder);
		self.terminate_statement(builder, false);
		Ok(())
	}

	fn drop_check_constraint(
		&self,
		operation: &DropConstraintOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		self.drop_constraint(operation, builder);
		self.terminate_statement(builder, false);
		Ok(())
	}

	fn create_index(
		&self,
		operation: &CreateIndexOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		self.create_index_with(self, operation, builder, terminate)
	}

	fn drop_index(
		&self,
		operation: &DropIndexOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()> {
		builder
			.append("DROP INDEX ")
			.append(self.delimit_in(&operation.name, operation.schema.as_deref()));
		if terminate {
			self.terminate_statement(builder, false);
		}
		Ok(())
	}

	fn create_database(
		&self,
		operation: &CreateDatabaseOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		builder
			.append("CREATE DATABASE ")
			.append(self.delimit(&operation.name));
		if let Some(template) = operation.template.as_deref() {
			builder.append(" TEMPLATE ").append(self.delimit(template));
		}
		if let Some(collation) = operation.collation.as_deref() {
			builder
				.append(" LC_COLLATE ")
				.append(self.helper.string_literal(collation));
		}
		if let Some(tablespace) = operation.tablespace.as_deref() {
			builder.append(" TABLESPACE ").append(self.delimit(tablespace));
		}
		self.terminate_statement(builder, true);
		Ok(())
	}

	fn drop_database(
		&self,
		operation: &DropDatabaseOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		let name = self.delimit(&operation.name);
		builder
			.append("REVOKE CONNECT ON DATABASE ")
			.append(&name)
			.append_line(" FROM PUBLIC;")
			.end_command(true);
		builder.append("DROP DATABASE ").append(&name);
		self.terminate_statement(builder, true);
		Ok(())
	}

	fn sql(
		&self,
		operation: &SqlOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		builder.append_lines(&operation.sql);
		builder.end_command(operation.suppress_transaction);
		Ok(())
	}

	fn column_definition(
		&self,
		column: &ColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		self.column_definition_with(self, column, model, builder)
	}

	fn computed_column_definition(
		&self,
		column: &ColumnOperation,
		_model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		if self.postgres_version.is_under(12, 0) {
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

		let sql = column.computed_column_sql.as_deref().unwrap_or_default();
		builder
			.append(self.delimit(&column.name))
			.append(" ")
			.append(self.column_type(column)?);
		if let Some(collation) = column.collation.as_deref() {
			builder.append(" COLLATE ").append(self.delimit(collation));
		}
		builder
			.append(" GENERATED ALWAYS AS (")
			.append(sql)
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
		if self.postgres_version.is_under(11, 0) {
			return Err(RelationalError::NotSupported(
				"INCLUDE columns require PostgreSQL 11 or later".to_string(),
			));
		}
		builder
			.append(" INCLUDE (")
			.append(self.column_list(&operation.include))
			.append(")");
		Ok(())
	}
}

impl PostgresMigrationsSqlGenerator {
	pub fn drop_constraint(&self, operation: &DropConstraintOperation, builder: &mut MigrationCommandListBuilder) {
		builder
			.append("ALTER TABLE ")
			.append(self.delimit_in(&operation.table, operation.schema.as_deref()))
			.append(" DROP CONSTRAINT ")
			.append(self.delimit(&operation.name));
	}
}

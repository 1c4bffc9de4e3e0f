//! Migrations SQL generator contract.
//!
//! One method per operation kind. Operations that may be embedded into a larger
//! statement take a `terminate` flag; when it is `false` the implementation must
//! leave the statement open so the caller can append to it.
//!
//! Implementations that build on another generator pass themselves as the
//! `this` argument of the inner generator's helpers, so that nested calls
//! (column definitions inside `CREATE TABLE`, the include clause inside
//! `CREATE INDEX`) reach the outer implementation.

use crate::commands::{MigrationCommand, MigrationCommandListBuilder};
use crate::error::Result;
use crate::model::Model;
use crate::operations::*;

pub trait MigrationsSqlGenerator: Send + Sync {
	/// Generates the commands for `operations`, in order.
	fn generate(
		&self,
		operations: &[MigrationOperation],
		model: Option<&Model>,
	) -> Result<Vec<MigrationCommand>> {
		let mut builder = MigrationCommandListBuilder::new();
		for operation in operations {
			self.generate_operation(operation, model, &mut builder)?;
		}
		let commands = builder.into_commands();
		for command in &commands {
			tracing::debug!(
				transaction_suppressed = command.transaction_suppressed,
				sql = %command.command_text.trim_end(),
				"generated migration command"
			);
		}
		Ok(commands)
	}

	fn generate_operation(
		&self,
		operation: &MigrationOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()> {
		match operation {
			MigrationOperation::EnsureSchema(op) => self.ensure_schema(op, model, builder),
			MigrationOperation::DropSchema(op) => self.drop_schema(op, model, builder),
			MigrationOperation::CreateTable(op) => self.create_table(op, model, builder, true),
			MigrationOperation::AlterTable(op) => self.alter_table(op, model, builder),
			MigrationOperation::DropTable(op) => self.drop_table(op, model, builder, true),
			MigrationOperation::RenameTable(op) => self.rename_table(op, model, builder),
			MigrationOperation::AddColumn(op) => self.add_column(op, model, builder, true),
			MigrationOperation::AlterColumn(op) => self.alter_column(op, model, builder),
			MigrationOperation::DropColumn(op) => self.drop_column(op, model, builder, true),
			MigrationOperation::RenameColumn(op) => self.rename_column(op, model, builder),
			MigrationOperation::AddPrimaryKey(op) => self.add_primary_key(op, model, builder, true),
			MigrationOperation::DropPrimaryKey(op) => {
				self.drop_primary_key(op, model, builder, true)
			}
			MigrationOperation::AddForeignKey(op) => self.add_foreign_key(op, model, builder, true),
			MigrationOperation::DropForeignKey(op) => {
				self.drop_foreign_key(op, model, builder, true)
			}
			MigrationOperation::AddUniqueConstraint(op) => {
				self.add_unique_constraint(op, model, builder)
			}
			MigrationOperation::DropUniqueConstraint(op) => {
				self.drop_unique_constraint(op, model, builder)
			}
			MigrationOperation::AddCheckConstraint(op) => {
				self.add_check_constraint(op, model, builder)
			}
			MigrationOperation::DropCheckConstraint(op) => {
				self.drop_check_constraint(op, model, builder)
			}
			MigrationOperation::CreateIndex(op) => self.create_index(op, model, builder, true),
			MigrationOperation::DropIndex(op) => self.drop_index(op, model, builder, true),
			MigrationOperation::CreateDatabase(op) => self.create_database(op, model, builder),
			MigrationOperation::DropDatabase(op) => self.drop_database(op, model, builder),
			MigrationOperation::Sql(op) => self.sql(op, model, builder),
		}
	}

	fn ensure_schema(
		&self,
		operation: &EnsureSchemaOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	fn drop_schema(
		&self,
		operation: &DropSchemaOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	fn create_table(
		&self,
		operation: &CreateTableOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()>;

	fn alter_table(
		&self,
		operation: &AlterTableOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	fn drop_table(
		&self,
		operation: &DropTableOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()>;

	fn rename_table(
		&self,
		operation: &RenameTableOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	fn add_column(
		&self,
		operation: &ColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()>;

	fn alter_column(
		&self,
		operation: &AlterColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	fn drop_column(
		&self,
		operation: &DropColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()>;

	fn rename_column(
		&self,
		operation: &RenameColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	fn add_primary_key(
		&self,
		operation: &PrimaryKeyOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()>;

	fn drop_primary_key(
		&self,
		operation: &DropConstraintOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()>;

	fn add_foreign_key(
		&self,
		operation: &ForeignKeyOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()>;

	fn drop_foreign_key(
		&self,
		operation: &DropConstraintOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()>;

	fn add_unique_constraint(
		&self,
		operation: &UniqueConstraintOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	fn drop_unique_constraint(
		&self,
		operation: &DropConstraintOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	fn add_check_constraint(
		&self,
		operation: &CheckConstraintOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	fn drop_check_constraint(
		&self,
		operation: &DropConstraintOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	fn create_index(
		&self,
		operation: &CreateIndexOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()>;

	fn drop_index(
		&self,
		operation: &DropIndexOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
		terminate: bool,
	) -> Result<()>;

	fn create_database(
		&self,
		operation: &CreateDatabaseOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	fn drop_database(
		&self,
		operation: &DropDatabaseOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	fn sql(
		&self,
		operation: &SqlOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	/// Writes one column definition (no trailing separator).
	fn column_definition(
		&self,
		column: &ColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	/// Writes a generated (computed) column definition.
	fn computed_column_definition(
		&self,
		column: &ColumnOperation,
		model: Option<&Model>,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;

	/// Writes the clause listing non-key columns carried by an index.
	fn index_include_clause(
		&self,
		operation: &CreateIndexOperation,
		builder: &mut MigrationCommandListBuilder,
	) -> Result<()>;
}

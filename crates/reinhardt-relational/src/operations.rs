//! Migration operation descriptors.
//!
//! Operations describe *what* should change in a schema; a
//! [`MigrationsSqlGenerator`](crate::migrations::MigrationsSqlGenerator) decides
//! *how* that change is spelled for a given server.

use crate::annotations::Annotations;
use crate::type_mapping::ValueType;
use serde::{Deserialize, Serialize};

/// Column description used by `CREATE TABLE`, `ADD COLUMN` and `ALTER COLUMN`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnOperation {
	pub name: String,
	pub table: String,
	pub schema: Option<String>,
	/// Explicit store type; resolved through the type mapping source when absent.
	pub column_type: Option<String>,
	pub value_type: Option<ValueType>,
	pub is_nullable: bool,
	pub default_value_sql: Option<String>,
	pub computed_column_sql: Option<String>,
	pub is_stored: Option<bool>,
	pub collation: Option<String>,
	pub comment: Option<String>,
	pub max_length: Option<u32>,
	pub is_fixed_length: Option<bool>,
	#[serde(default)]
	pub annotations: Annotations,
}

impl ColumnOperation {
	pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			table: table.into(),
			..Default::default()
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}

	pub fn with_type(mut self, column_type: impl Into<String>) -> Self {
		self.column_type = Some(column_type.into());
		self
	}

	pub fn with_value_type(mut self, value_type: ValueType) -> Self {
		self.value_type = Some(value_type);
		self
	}

	pub fn nullable(mut self, is_nullable: bool) -> Self {
		self.is_nullable = is_nullable;
		self
	}

	pub fn with_default_sql(mut self, sql: impl Into<String>) -> Self {
		self.default_value_sql = Some(sql.into());
		self
	}

	pub fn with_computed_sql(mut self, sql: impl Into<String>, stored: Option<bool>) -> Self {
		self.computed_column_sql = Some(sql.into());
		self.is_stored = stored;
		self
	}

	pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
		self.collation = Some(collation.into());
		self
	}

	pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
		self.comment = Some(comment.into());
		self
	}

	pub fn with_max_length(mut self, max_length: u32) -> Self {
		self.max_length = Some(max_length);
		self
	}

	pub fn with_annotation(
		mut self,
		name: impl Into<String>,
		value: impl Into<crate::annotations::AnnotationValue>,
	) -> Self {
		self.annotations.set(name, value);
		self
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsureSchemaOperation {
	pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSchemaOperation {
	pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyOperation {
	pub name: String,
	pub table: String,
	pub schema: Option<String>,
	pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraintOperation {
	pub name: String,
	pub table: String,
	pub schema: Option<String>,
	pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConstraintOperation {
	pub name: String,
	pub table: String,
	pub schema: Option<String>,
	pub sql: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferentialAction {
	#[default]
	NoAction,
	Restrict,
	Cascade,
	SetNull,
	SetDefault,
}

impl ReferentialAction {
	pub fn as_sql(&self) -> &'static str {
		match self {
			Self::NoAction => "NO ACTION",
			Self::Restrict => "RESTRICT",
			Self::Cascade => "CASCADE",
			Self::SetNull => "SET NULL",
			Self::SetDefault => "SET DEFAULT",
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyOperation {
	pub name: String,
	pub table: String,
	pub schema: Option<String>,
	pub columns: Vec<String>,
	pub principal_table: String,
	pub principal_schema: Option<String>,
	pub principal_columns: Vec<String>,
	pub on_update: ReferentialAction,
	pub on_delete: ReferentialAction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateTableOperation {
	pub name: String,
	pub schema: Option<String>,
	pub columns: Vec<ColumnOperation>,
	pub primary_key: Option<PrimaryKeyOperation>,
	#[serde(default)]
	pub unique_constraints: Vec<UniqueConstraintOperation>,
	#[serde(default)]
	pub check_constraints: Vec<CheckConstraintOperation>,
	#[serde(default)]
	pub foreign_keys: Vec<ForeignKeyOperation>,
	pub comment: Option<String>,
	#[serde(default)]
	pub annotations: Annotations,
}

impl CreateTableOperation {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Default::default()
		}
	}
}

/// Table state before an `ALTER TABLE`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
	pub comment: Option<String>,
	#[serde(default)]
	pub annotations: Annotations,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlterTableOperation {
	pub name: String,
	pub schema: Option<String>,
	pub comment: Option<String>,
	#[serde(default)]
	pub annotations: Annotations,
	#[serde(default)]
	pub old_table: TableSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTableOperation {
	pub name: String,
	pub schema: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTableOperation {
	pub name: String,
	pub schema: Option<String>,
	pub new_name: Option<String>,
	pub new_schema: Option<String>,
}

/// Column change; `old_column` holds the state being replaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlterColumnOperation {
	pub column: ColumnOperation,
	pub old_column: ColumnOperation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumnOperation {
	pub name: String,
	pub table: String,
	pub schema: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameColumnOperation {
	pub name: String,
	pub table: String,
	pub schema: Option<String>,
	pub new_name: String,
}

/// Drop of a named constraint (primary key, foreign key, unique or check).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropConstraintOperation {
	pub name: String,
	pub table: String,
	pub schema: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullSortOrder {
	#[default]
	Unspecified,
	NullsFirst,
	NullsLast,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateIndexOperation {
	pub name: String,
	pub table: String,
	pub schema: Option<String>,
	pub columns: Vec<String>,
	pub is_unique: bool,
	/// Per-column descending flags; an empty list means every column is descending.
	pub is_descending: Option<Vec<bool>>,
	pub null_sort_order: Option<Vec<NullSortOrder>>,
	/// Non-key columns carried in the index.
	#[serde(default)]
	pub include: Vec<String>,
	pub filter: Option<String>,
	pub method: Option<String>,
	#[serde(default)]
	pub concurrently: bool,
	#[serde(default)]
	pub annotations: Annotations,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropIndexOperation {
	pub name: String,
	pub table: Option<String>,
	pub schema: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDatabaseOperation {
	pub name: String,
	pub template: Option<String>,
	pub tablespace: Option<String>,
	pub collation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropDatabaseOperation {
	pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlOperation {
	pub sql: String,
	#[serde(default)]
	pub suppress_transaction: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MigrationOperation {
	EnsureSchema(EnsureSchemaOperation),
	DropSchema(DropSchemaOperation),
	CreateTable(CreateTableOperation),
	AlterTable(AlterTableOperation),
	DropTable(DropTableOperation),
	RenameTable(RenameTableOperation),
	AddColumn(ColumnOperation),
	AlterColumn(AlterColumnOperation),
	DropColumn(DropColumnOperation),
	RenameColumn(RenameColumnOperation),
	AddPrimaryKey(PrimaryKeyOperation),
	DropPrimaryKey(DropConstraintOperation),
	AddForeignKey(ForeignKeyOperation),
	DropForeignKey(DropConstraintOperation),
	AddUniqueConstraint(UniqueConstraintOperation),
	DropUniqueConstraint(DropConstraintOperation),
	AddCheckConstraint(CheckConstraintOperation),
	DropCheckConstraint(DropConstraintOperation),
	CreateIndex(CreateIndexOperation),
	DropIndex(DropIndexOperation),
	CreateDatabase(CreateDatabaseOperation),
	DropDatabase(DropDatabaseOperation),
	Sql(SqlOperation),
}

impl MigrationOperation {
	/// Short operation name, used in log output.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::EnsureSchema(_) => "EnsureSchema",
			Self::DropSchema(_) => "DropSchema",
			Self::CreateTable(_) => "CreateTable",
			Self::AlterTable(_) => "AlterTable",
			Self::DropTable(_) => "DropTable",
			Self::RenameTable(_) => "RenameTable",
			Self::AddColumn(_) => "AddColumn",
			Self::AlterColumn(_) => "AlterColumn",
			Self::DropColumn(_) => "DropColumn",
			Self::RenameColumn(_) => "RenameColumn",
			Self::AddPrimaryKey(_) => "AddPrimaryKey",
			Self::DropPrimaryKey(_) => "DropPrimaryKey",
			Self::AddForeignKey(_) => "AddForeignKey",
			Self::DropForeignKey(_) => "DropForeignKey",
			Self::AddUniqueConstraint(_) => "AddUniqueConstraint",
			Self::DropUniqueConstraint(_) => "DropUniqueConstraint",
			Self::AddCheckConstraint(_) => "AddCheckConstraint",
			Self::DropCheckConstraint(_) => "DropCheckConstraint",
			Self::CreateIndex(_) => "CreateIndex",
			Self::DropIndex(_) => "DropIndex",
			Self::CreateDatabase(_) => "CreateDatabase",
			Self::DropDatabase(_) => "DropDatabase",
			Self::Sql(_) => "Sql",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_operations_are_tagged_by_type() {
		let op = MigrationOperation::EnsureSchema(EnsureSchemaOperation {
			name: "bank".to_string(),
		});
		let json = serde_json::to_value(&op).unwrap();
		assert_eq!(json["type"], "EnsureSchema");
		assert_eq!(json["name"], "bank");

		let back: MigrationOperation = serde_json::from_value(json).unwrap();
		assert_eq!(back, op);
	}

	#[rstest]
	fn test_create_table_deserializes_with_defaults() {
		let op: MigrationOperation = serde_json::from_str(
			r#"{"type":"CreateTable","name":"accounts","schema":null,"columns":[],"primary_key":null,"comment":null}"#,
		)
		.unwrap();
		match op {
			MigrationOperation::CreateTable(table) => {
				assert_eq!(table.name, "accounts");
				assert!(table.annotations.is_empty());
				assert!(table.foreign_keys.is_empty());
			}
			other => panic!("unexpected operation {}", other.kind()),
		}
	}
}

//! Reverse engineering of CockroachDB schemas.
//!
//! Columns come from `information_schema.columns`, which CockroachDB extends
//! with `crdb_sql_type` (the type as written in DDL) and `is_hidden`. Hidden
//! columns such as the implicit `rowid` are skipped, and so are primary keys
//! that consist only of hidden columns.

use crate::creator::CRDB_SYSTEM_SCHEMAS;
use async_trait::async_trait;
use indexmap::IndexMap;
use reinhardt_postgres::connection::ConnectionSettings;
use reinhardt_postgres::creator::{SYSTEM_SCHEMAS, connect};
use reinhardt_relational::error::Result;
use reinhardt_relational::scaffolding::{
	DatabaseColumn, DatabaseModel, DatabaseModelFactory, DatabasePrimaryKey, DatabaseTable,
	ModelFactoryOptions,
};
use sqlx::Connection;

pub const COLUMNS_SQL: &str = "SELECT table_schema, table_name, column_name, crdb_sql_type, \
	is_nullable, column_default, generation_expression, is_generated, is_hidden \
	FROM information_schema.columns \
	ORDER BY table_schema, table_name, ordinal_position";

pub const PRIMARY_KEYS_SQL: &str = "SELECT tc.table_schema, tc.table_name, tc.constraint_name, kcu.column_name \
	FROM information_schema.table_constraints AS tc \
	JOIN information_schema.key_column_usage AS kcu \
	ON kcu.constraint_schema = tc.constraint_schema \
	AND kcu.constraint_name = tc.constraint_name \
	AND kcu.table_name = tc.table_name \
	WHERE tc.constraint_type = 'PRIMARY KEY' \
	ORDER BY tc.table_schema, tc.table_name, kcu.ordinal_position";

const DEFAULT_SCHEMA: &str = "public";

/// One row of [`COLUMNS_SQL`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnRow {
	pub table_schema: String,
	pub table_name: String,
	pub column_name: String,
	pub crdb_sql_type: String,
	pub is_nullable: String,
	pub column_default: Option<String>,
	pub generation_expression: Option<String>,
	pub is_generated: String,
	pub is_hidden: String,
}

type ColumnTuple = (
	String,
	String,
	String,
	String,
	String,
	Option<String>,
	Option<String>,
	String,
	String,
);

impl From<ColumnTuple> for ColumnRow {
	fn from(row: ColumnTuple) -> Self {
		Self {
			table_schema: row.0,
			table_name: row.1,
			column_name: row.2,
			crdb_sql_type: row.3,
			is_nullable: row.4,
			column_default: row.5,
			generation_expression: row.6,
			is_generated: row.7,
			is_hidden: row.8,
		}
	}
}

impl ColumnRow {
	fn is_hidden(&self) -> bool {
		self.is_hidden.eq_ignore_ascii_case("YES")
	}

	fn into_column(self) -> DatabaseColumn {
		let generated = self.is_generated.eq_ignore_ascii_case("ALWAYS");
		let computed_column_sql = self
			.generation_expression
			.filter(|sql| generated && !sql.is_empty());
		DatabaseColumn {
			name: self.column_name,
			store_type: Some(self.crdb_sql_type),
			is_nullable: self.is_nullable.eq_ignore_ascii_case("YES"),
			default_value_sql: if computed_column_sql.is_some() {
				None
			} else {
				self.column_default
			},
			is_stored: computed_column_sql.as_ref().map(|_| true),
			computed_column_sql,
		}
	}
}

/// One row of [`PRIMARY_KEYS_SQL`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyColumnRow {
	pub table_schema: String,
	pub table_name: String,
	pub constraint_name: String,
	pub column_name: String,
}

impl From<(String, String, String, String)> for KeyColumnRow {
	fn from(row: (String, String, String, String)) -> Self {
		Self {
			table_schema: row.0,
			table_name: row.1,
			constraint_name: row.2,
			column_name: row.3,
		}
	}
}

fn is_system_schema(schema: &str) -> bool {
	SYSTEM_SCHEMAS.contains(&schema) || CRDB_SYSTEM_SCHEMAS.contains(&schema)
}

/// Assembles a [`DatabaseModel`] from catalog rows.
pub fn build_database_model(
	database_name: Option<&str>,
	columns: Vec<ColumnRow>,
	keys: Vec<KeyColumnRow>,
	options: &ModelFactoryOptions,
) -> DatabaseModel {
	let mut tables: IndexMap<(String, String), DatabaseTable> = IndexMap::new();
	for row in columns {
		if is_system_schema(&row.table_schema) || !options.includes(&row.table_schema, &row.table_name) {
			continue;
		}
		if row.is_hidden() {
			tracing::debug!(table = %row.table_name, column = %row.column_name, "skipping hidden column");
			continue;
		}
		let table = tables
			.entry((row.table_schema.clone(), row.table_name.clone()))
			.or_insert_with(|| DatabaseTable {
				schema: Some(row.table_schema.clone()),
				name: row.table_name.clone(),
				..Default::default()
			});
		table.columns.push(row.into_column());
	}

	for key in keys {
		let Some(table) = tables.get_mut(&(key.table_schema, key.table_name)) else {
			continue;
		};
		if table.column(&key.column_name).is_none() {
			continue;
		}
		table
			.primary_key
			.get_or_insert_with(|| DatabasePrimaryKey {
				name: key.constraint_name,
				columns: Vec::new(),
			})
			.columns
			.push(key.column_name);
	}

	DatabaseModel {
		database_name: database_name.map(str::to_string),
		default_schema: Some(DEFAULT_SCHEMA.to_string()),
		tables: tables.into_values().collect(),
	}
}

pub struct CockroachDatabaseModelFactory {
	connection: ConnectionSettings,
}

impl CockroachDatabaseModelFactory {
	pub fn new(connection: ConnectionSettings) -> Self {
		Self { connection }
	}
}

#[async_trait]
impl DatabaseModelFactory for CockroachDatabaseModelFactory {
	async fn create(&self, options: &ModelFactoryOptions) -> Result<DatabaseModel> {
		let mut connection = connect(&self.connection).await?;
		let columns = sqlx::query_as::<_, ColumnTuple>(COLUMNS_SQL)
			.fetch_all(&mut connection)
			.await;
		let keys = sqlx::query_as::<_, (String, String, String, String)>(PRIMARY_KEYS_SQL)
			.fetch_all(&mut connection)
			.await;
		connection.close().await?;

		let columns: Vec<ColumnRow> = columns?.into_iter().map(ColumnRow::from).collect();
		let keys: Vec<KeyColumnRow> = keys?.into_iter().map(KeyColumnRow::from).collect();
		tracing::debug!(columns = columns.len(), keys = keys.len(), "read catalog rows");
		Ok(build_database_model(
			self.connection.database(),
			columns,
			keys,
			options,
		))
	}
}

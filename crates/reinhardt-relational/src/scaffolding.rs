//! Reverse engineering of a live schema into a [`DatabaseModel`].

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseColumn {
	pub name: String,
	pub store_type: Option<String>,
	pub is_nullable: bool,
	pub default_value_sql: Option<String>,
	pub computed_column_sql: Option<String>,
	pub is_stored: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabasePrimaryKey {
	pub name: String,
	pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseTable {
	pub schema: Option<String>,
	pub name: String,
	pub columns: Vec<DatabaseColumn>,
	pub primary_key: Option<DatabasePrimaryKey>,
}

impl DatabaseTable {
	pub fn column(&self, name: &str) -> Option<&DatabaseColumn> {
		self.columns.iter().find(|c| c.name == name)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseModel {
	pub database_name: Option<String>,
	pub default_schema: Option<String>,
	pub tables: Vec<DatabaseTable>,
}

impl DatabaseModel {
	pub fn table(&self, schema: Option<&str>, name: &str) -> Option<&DatabaseTable> {
		self.tables
			.iter()
			.find(|t| t.name == name && (schema.is_none() || t.schema.as_deref() == schema))
	}
}

/// Restricts which tables are scaffolded. Empty filters select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelFactoryOptions {
	/// Table names, optionally qualified as `schema.table`.
	pub tables: Vec<String>,
	pub schemas: Vec<String>,
}

impl ModelFactoryOptions {
	pub fn includes(&self, schema: &str, table: &str) -> bool {
		if self.tables.is_empty() && self.schemas.is_empty() {
			return true;
		}
		self.schemas.iter().any(|s| s == schema)
			|| self
				.tables
				.iter()
				.any(|t| t == table || *t == format!("{}.{}", schema, table))
	}
}

#[async_trait]
pub trait DatabaseModelFactory: Send + Sync {
	async fn create(&self, options: &ModelFactoryOptions) -> Result<DatabaseModel>;
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(vec![], vec![], "public", "accounts", true)]
	#[case(vec!["accounts"], vec![], "public", "accounts", true)]
	#[case(vec!["bank.accounts"], vec![], "public", "accounts", false)]
	#[case(vec!["bank.accounts"], vec![], "bank", "accounts", true)]
	#[case(vec![], vec!["bank"], "public", "accounts", false)]
	fn test_includes(
		#[case] tables: Vec<&str>,
		#[case] schemas: Vec<&str>,
		#[case] schema: &str,
		#[case] table: &str,
		#[case] expected: bool,
	) {
		let options = ModelFactoryOptions {
			tables: tables.into_iter().map(String::from).collect(),
			schemas: schemas.into_iter().map(String::from).collect(),
		};
		assert_eq!(options.includes(schema, table), expected);
	}
}

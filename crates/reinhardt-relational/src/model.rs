//! Relational model metadata.
//!
//! The model is built by application code, shaped by the provider's
//! [`ConventionSet`](crate::conventions::ConventionSet), and finally projected
//! to migration operations with [`Model::create_operations`].

use crate::annotations::{AnnotationValue, Annotations};
use crate::operations::{
	ColumnOperation, CreateTableOperation, EnsureSchemaOperation, MigrationOperation,
	PrimaryKeyOperation,
};
use crate::type_mapping::ValueType;
use serde::{Deserialize, Serialize};

/// When the database generates a value for a property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueGenerated {
	#[default]
	Never,
	OnAdd,
	OnAddOrUpdate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
	pub name: String,
	pub value_type: ValueType,
	pub column_name: Option<String>,
	pub column_type: Option<String>,
	pub is_nullable: bool,
	pub is_concurrency_token: bool,
	pub is_row_version: bool,
	pub value_generated: ValueGenerated,
	pub max_length: Option<u32>,
	pub is_fixed_length: Option<bool>,
	pub default_value_sql: Option<String>,
	pub computed_column_sql: Option<String>,
	pub is_stored: Option<bool>,
	pub comment: Option<String>,
	#[serde(default)]
	pub annotations: Annotations,
}

impl Property {
	pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
		Self {
			name: name.into(),
			value_type,
			column_name: None,
			column_type: None,
			is_nullable: false,
			is_concurrency_token: false,
			is_row_version: false,
			value_generated: ValueGenerated::Never,
			max_length: None,
			is_fixed_length: None,
			default_value_sql: None,
			computed_column_sql: None,
			is_stored: None,
			comment: None,
			annotations: Annotations::new(),
		}
	}

	pub fn column_name(&self) -> &str {
		self.column_name.as_deref().unwrap_or(&self.name)
	}

	pub fn with_column_name(mut self, column_name: impl Into<String>) -> Self {
		self.column_name = Some(column_name.into());
		self
	}

	pub fn with_column_type(mut self, column_type: impl Into<String>) -> Self {
		self.column_type = Some(column_type.into());
		self
	}

	pub fn nullable(mut self, is_nullable: bool) -> Self {
		self.is_nullable = is_nullable;
		self
	}

	pub fn value_generated(mut self, value_generated: ValueGenerated) -> Self {
		self.value_generated = value_generated;
		self
	}

	/// Optimistic-concurrency token regenerated by the database on every write.
	pub fn row_version(mut self) -> Self {
		self.is_row_version = true;
		self.is_concurrency_token = true;
		self.value_generated = ValueGenerated::OnAddOrUpdate;
		self
	}

	pub fn with_max_length(mut self, max_length: u32) -> Self {
		self.max_length = Some(max_length);
		self
	}

	pub fn with_default_sql(mut self, sql: impl Into<String>) -> Self {
		self.default_value_sql = Some(sql.into());
		self
	}

	pub fn with_computed_sql(mut self, sql: impl Into<String>, stored: bool) -> Self {
		self.computed_column_sql = Some(sql.into());
		self.is_stored = Some(stored);
		self
	}

	pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
		self.comment = Some(comment.into());
		self
	}

	pub fn with_annotation(mut self, name: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
		self.annotations.set(name, value);
		self
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
	pub name: String,
	pub table: Option<String>,
	pub schema: Option<String>,
	pub properties: Vec<Property>,
	pub primary_key: Vec<String>,
	pub comment: Option<String>,
	#[serde(default)]
	pub annotations: Annotations,
}

impl EntityType {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			table: None,
			schema: None,
			properties: Vec::new(),
			primary_key: Vec::new(),
			comment: None,
			annotations: Annotations::new(),
		}
	}

	pub fn table_name(&self) -> &str {
		self.table.as_deref().unwrap_or(&self.name)
	}

	pub fn with_table(mut self, table: impl Into<String>) -> Self {
		self.table = Some(table.into());
		self
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}

	pub fn with_property(mut self, property: Property) -> Self {
		self.properties.push(property);
		self
	}

	pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.primary_key = columns.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_annotation(mut self, name: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
		self.annotations.set(name, value);
		self
	}

	pub fn property(&self, name: &str) -> Option<&Property> {
		self.properties.iter().find(|p| p.name == name)
	}

	pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
		self.properties.iter_mut().find(|p| p.name == name)
	}

	/// The key property when the primary key has exactly one property.
	pub fn single_key_property(&self) -> Option<&Property> {
		match self.primary_key.as_slice() {
			[key] => self.property(key),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
	pub entity_types: Vec<EntityType>,
	#[serde(default)]
	pub annotations: Annotations,
	pub max_identifier_length: Option<usize>,
}

impl Model {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_entity_type(mut self, entity_type: EntityType) -> Self {
		self.entity_types.push(entity_type);
		self
	}

	pub fn entity_type(&self, name: &str) -> Option<&EntityType> {
		self.entity_types.iter().find(|e| e.name == name)
	}

	/// Projects the model to the operations that create its schema from scratch.
	///
	/// Schemas are ensured first (in first-use order), then one `CREATE TABLE`
	/// per entity type with its primary key named `PK_<table>`.
	pub fn create_operations(&self) -> Vec<MigrationOperation> {
		let mut operations = Vec::new();
		let mut schemas: Vec<&str> = Vec::new();
		for entity in &self.entity_types {
			if let Some(schema) = entity.schema.as_deref() {
				if !schemas.contains(&schema) {
					schemas.push(schema);
					operations.push(MigrationOperation::EnsureSchema(EnsureSchemaOperation {
						name: schema.to_string(),
					}));
				}
			}
		}

		for entity in &self.entity_types {
			let table = entity.table_name().to_string();
			let columns = entity
				.properties
				.iter()
				.map(|property| ColumnOperation {
					name: property.column_name().to_string(),
					table: table.clone(),
					schema: entity.schema.clone(),
					column_type: property.column_type.clone(),
					value_type: Some(property.value_type.clone()),
					is_nullable: property.is_nullable,
					default_value_sql: property.default_value_sql.clone(),
					computed_column_sql: property.computed_column_sql.clone(),
					is_stored: property.is_stored,
					collation: None,
					comment: property.comment.clone(),
					max_length: property.max_length,
					is_fixed_length: property.is_fixed_length,
					annotations: property.annotations.clone(),
				})
				.collect();

			let primary_key = (!entity.primary_key.is_empty()).then(|| PrimaryKeyOperation {
				name: format!("PK_{}", table),
				table: table.clone(),
				schema: entity.schema.clone(),
				columns: entity
					.primary_key
					.iter()
					.map(|key| {
						entity
							.property(key)
							.map_or_else(|| key.clone(), |p| p.column_name().to_string())
					})
					.collect(),
			});

			operations.push(MigrationOperation::CreateTable(CreateTableOperation {
				name: table,
				schema: entity.schema.clone(),
				columns,
				primary_key,
				comment: entity.comment.clone(),
				annotations: entity.annotations.clone(),
				..Default::default()
			}));
		}
		operations
	}
}

//! Model-building conventions of the PostgreSQL provider.

use crate::annotations::{PostgresAnnotationNames, ValueGenerationStrategy};
use crate::version::{Version, VersionExt};
use reinhardt_relational::conventions::{Convention, ConventionSet, ConventionSetBuilder};
use reinhardt_relational::error::{RelationalError, Result};
use reinhardt_relational::model::{Model, Property, ValueGenerated};
use reinhardt_relational::type_mapping::{TypeMappingInfo, TypeMappingSource, ValueType};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Longest identifier PostgreSQL keeps without truncation.
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Picks the key generation strategy: identity columns from PostgreSQL 10,
/// serial columns before that.
#[derive(Debug, Clone)]
pub struct ValueGenerationStrategyConvention {
	postgres_version: Option<Version>,
}

impl ValueGenerationStrategyConvention {
	pub const NAME: &'static str = "ValueGenerationStrategyConvention";

	pub fn new(postgres_version: Option<Version>) -> Self {
		Self { postgres_version }
	}

	pub fn default_strategy(&self) -> ValueGenerationStrategy {
		if self.postgres_version.at_least(10, 0) {
			ValueGenerationStrategy::IdentityByDefaultColumn
		} else {
			ValueGenerationStrategy::SerialColumn
		}
	}
}

impl Convention for ValueGenerationStrategyConvention {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn process_model_initialized(&self, model: &mut Model) -> Result<()> {
		if !model
			.annotations
			.contains(PostgresAnnotationNames::VALUE_GENERATION_STRATEGY)
		{
			model.annotations.set(
				PostgresAnnotationNames::VALUE_GENERATION_STRATEGY,
				self.default_strategy().as_str(),
			);
		}
		Ok(())
	}

	/// Applies the model strategy to single integer keys generated on add.
	fn process_model_finalizing(&self, model: &mut Model) -> Result<()> {
		let strategy = match model
			.annotations
			.get_str(PostgresAnnotationNames::VALUE_GENERATION_STRATEGY)
		{
			Some(s) => s.parse()?,
			None => self.default_strategy(),
		};
		if strategy == ValueGenerationStrategy::None {
			return Ok(());
		}

		for entity in &mut model.entity_types {
			let [key] = entity.primary_key.as_slice() else {
				continue;
			};
			let key = key.clone();
			let Some(property) = entity.property_mut(&key) else {
				continue;
			};
			let eligible = property.value_type.is_integer()
				&& property.value_generated == ValueGenerated::OnAdd
				&& property.default_value_sql.is_none()
				&& property.computed_column_sql.is_none()
				&& !property
					.annotations
					.contains(PostgresAnnotationNames::VALUE_GENERATION_STRATEGY);
			if eligible {
				property.annotations.set(
					PostgresAnnotationNames::VALUE_GENERATION_STRATEGY,
					strategy.as_str(),
				);
			}
		}
		Ok(())
	}
}

/// Truncates table and column names to the server identifier limit.
///
/// Truncated names end in `~`; clashes within a table get a numeric suffix.
#[derive(Debug, Clone)]
pub struct MaxIdentifierLengthConvention {
	max_length: usize,
}

impl MaxIdentifierLengthConvention {
	pub const NAME: &'static str = "MaxIdentifierLengthConvention";

	pub fn new(max_length: usize) -> Self {
		Self { max_length }
	}

	pub fn max_length(&self) -> usize {
		self.max_length
	}

	pub fn truncate(name: &str, max_length: usize) -> String {
		if name.chars().count() <= max_length {
			return name.to_string();
		}
		let kept: String = name.chars().take(max_length.saturating_sub(1)).collect();
		format!("{}~", kept)
	}

	fn uniquify(name: &str, max_length: usize, taken: &HashSet<String>) -> String {
		let candidate = Self::truncate(name, max_length);
		if !taken.contains(&candidate) {
			return candidate;
		}
		(1..)
			.map(|n| {
				let suffix = n.to_string();
				let kept: String = name
					.chars()
					.take(max_length.saturating_sub(suffix.len() + 1))
					.collect();
				format!("{}~{}", kept, suffix)
			})
			.find(|c| !taken.contains(c))
			.unwrap_or(candidate)
	}
}

impl Convention for MaxIdentifierLengthConvention {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn process_model_initialized(&self, model: &mut Model) -> Result<()> {
		model.max_identifier_length = Some(self.max_length);
		Ok(())
	}

	fn process_model_finalizing(&self, model: &mut Model) -> Result<()> {
		let max_length = model.max_identifier_length.unwrap_or(self.max_length);
		for entity in &mut model.entity_types {
			if entity.table_name().chars().count() > max_length {
				entity.table = Some(Self::truncate(entity.table_name(), max_length));
			}

			let mut taken = HashSet::new();
			for property in &mut entity.properties {
				let column = property.column_name().to_string();
				if column.chars().count() > max_length {
					let truncated = Self::uniquify(&column, max_length, &taken);
					tracing::debug!(%column, %truncated, "truncated column name");
					property.column_name = Some(truncated);
				}
				taken.insert(property.column_name().to_string());
			}
		}
		Ok(())
	}
}

/// Rejects properties configured with conflicting store generation.
#[derive(Debug, Clone, Default)]
pub struct StoreGenerationConvention;

impl StoreGenerationConvention {
	pub const NAME: &'static str = "StoreGenerationConvention";
}

impl Convention for StoreGenerationConvention {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn process_model_finalizing(&self, model: &mut Model) -> Result<()> {
		for entity in &model.entity_types {
			for property in &entity.properties {
				let identity = property
					.annotations
					.get_str(PostgresAnnotationNames::VALUE_GENERATION_STRATEGY)
					.and_then(|s| s.parse::<ValueGenerationStrategy>().ok())
					.is_some_and(|s| s != ValueGenerationStrategy::None);
				let conflicts = [
					property.default_value_sql.is_some().then_some("a default value"),
					property.computed_column_sql.is_some().then_some("a computed column SQL"),
					identity.then_some("a value generation strategy"),
				];
				let configured: Vec<&str> = conflicts.into_iter().flatten().collect();
				if let [first, second, ..] = configured.as_slice() {
					return Err(RelationalError::InvalidOperation(format!(
						"property '{}.{}' has both {} and {} configured",
						entity.name, property.name, first, second
					)));
				}
			}
		}
		Ok(())
	}
}

/// Resolves column store types through `type_mapping_source`.
pub fn resolve_column_types(type_mapping_source: &dyn TypeMappingSource, model: &mut Model) -> Result<()> {
	for entity in &mut model.entity_types {
		let entity_name = entity.name.clone();
		for property in &mut entity.properties {
			if property.column_type.is_some() {
				continue;
			}
			let info = TypeMappingInfo::for_value_type(property.value_type.clone())
				.with_size(property.max_length)
				.with_fixed_length(property.is_fixed_length)
				.with_row_version(property.is_row_version);
			let mapping = type_mapping_source.find_mapping(&info).ok_or_else(|| {
				RelationalError::MissingTypeMapping(format!(
					"property '{}.{}' ({})",
					entity_name,
					property.name,
					info.describe()
				))
			})?;
			property.column_type = Some(mapping.store_type);
		}
	}
	Ok(())
}

/// Concurrency tokens the server regenerates on every write, stored as `u32`.
pub fn is_row_version_candidate(property: &Property) -> bool {
	property.is_concurrency_token
		&& property.value_generated == ValueGenerated::OnAddOrUpdate
		&& property.value_type == ValueType::U32
		&& property.column_type.is_none()
}

/// Final model pass: maps `u32` row versions to the `xmin` system column and
/// resolves every remaining column type.
pub struct PostgresModelFinalizingConvention {
	type_mapping_source: Arc<dyn TypeMappingSource>,
}

impl PostgresModelFinalizingConvention {
	pub const NAME: &'static str = "PostgresModelFinalizingConvention";

	pub fn new(type_mapping_source: Arc<dyn TypeMappingSource>) -> Self {
		Self { type_mapping_source }
	}

	pub fn process_row_version_property(property: &mut Property) {
		property.column_name = Some("xmin".to_string());
		property.column_type = Some("xid".to_string());
	}
}

impl fmt::Debug for PostgresModelFinalizingConvention {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct(Self::NAME).finish_non_exhaustive()
	}
}

impl Convention for PostgresModelFinalizingConvention {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn process_model_finalizing(&self, model: &mut Model) -> Result<()> {
		for entity in &mut model.entity_types {
			for property in entity.properties.iter_mut().filter(|p| is_row_version_candidate(p)) {
				Self::process_row_version_property(property);
			}
		}
		resolve_column_types(self.type_mapping_source.as_ref(), model)
	}
}

pub struct PostgresConventionSetBuilder {
	type_mapping_source: Arc<dyn TypeMappingSource>,
	postgres_version: Option<Version>,
}

impl PostgresConventionSetBuilder {
	pub fn new(type_mapping_source: Arc<dyn TypeMappingSource>, postgres_version: Option<Version>) -> Self {
		Self {
			type_mapping_source,
			postgres_version,
		}
	}

	pub fn type_mapping_source(&self) -> &Arc<dyn TypeMappingSource> {
		&self.type_mapping_source
	}

	pub fn postgres_version(&self) -> Option<Version> {
		self.postgres_version
	}
}

impl ConventionSetBuilder for PostgresConventionSetBuilder {
	fn create_convention_set(&self) -> ConventionSet {
		let value_generation: Arc<dyn Convention> =
			Arc::new(ValueGenerationStrategyConvention::new(self.postgres_version));
		let max_identifier_length: Arc<dyn Convention> =
			Arc::new(MaxIdentifierLengthConvention::new(MAX_IDENTIFIER_LENGTH));

		ConventionSet {
			model_initialized: vec![value_generation.clone(), max_identifier_length.clone()],
			model_finalizing: vec![
				Arc::new(StoreGenerationConvention),
				value_generation,
				max_identifier_length,
				Arc::new(PostgresModelFinalizingConvention::new(
					self.type_mapping_source.clone(),
				)),
			],
			model_finalized: Vec::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::type_mapping::PostgresTypeMappingSource;
	use reinhardt_relational::model::EntityType;
	use rstest::rstest;

	fn account_model() -> Model {
		Model::new().with_entity_type(
			EntityType::new("Account")
				.with_table("accounts")
				.with_property(
					Property::new("Id", ValueType::I64).value_generated(ValueGenerated::OnAdd),
				)
				.with_property(Property::new("Balance", ValueType::I64))
				.with_property(Property::new("Version", ValueType::U32).row_version())
				.with_primary_key(["Id"]),
		)
	}

	fn build(model: &mut Model, version: Option<Version>) -> Result<()> {
		let set = PostgresConventionSetBuilder::new(Arc::new(PostgresTypeMappingSource::new()), version)
			.create_convention_set();
		set.initialize_model(model)?;
		set.finalize_model(model)
	}

	#[rstest]
	#[case(None, "IdentityByDefaultColumn")]
	#[case(Some(Version::new(10, 0)), "IdentityByDefaultColumn")]
	#[case(Some(Version::new(9, 6)), "SerialColumn")]
	fn test_key_strategy_by_version(#[case] version: Option<Version>, #[case] expected: &str) {
		let mut model = account_model();
		build(&mut model, version).unwrap();
		let id = model.entity_types[0].property("Id").unwrap();
		assert_eq!(
			id.annotations
				.get_str(PostgresAnnotationNames::VALUE_GENERATION_STRATEGY),
			Some(expected)
		);
		let balance = model.entity_types[0].property("Balance").unwrap();
		assert!(!balance
			.annotations
			.contains(PostgresAnnotationNames::VALUE_GENERATION_STRATEGY));
	}

	#[rstest]
	fn test_row_version_maps_to_xmin() {
		let mut model = account_model();
		build(&mut model, None).unwrap();
		let version = model.entity_types[0].property("Version").unwrap();
		assert_eq!(version.column_name(), "xmin");
		assert_eq!(version.column_type.as_deref(), Some("xid"));
		let balance = model.entity_types[0].property("Balance").unwrap();
		assert_eq!(balance.column_type.as_deref(), Some("bigint"));
	}

	#[rstest]
	fn test_conflicting_store_generation_is_rejected() {
		let mut model = Model::new().with_entity_type(
			EntityType::new("Account").with_property(
				Property::new("Total", ValueType::I64)
					.with_default_sql("0")
					.with_computed_sql("1 + 1", true),
			),
		);
		assert!(matches!(
			build(&mut model, None),
			Err(RelationalError::InvalidOperation(_))
		));
	}

	#[rstest]
	fn test_long_identifiers_are_truncated() {
		let long = "a".repeat(70);
		let mut model = Model::new().with_entity_type(
			EntityType::new(long.clone())
				.with_property(Property::new(format!("{}1", long), ValueType::I32))
				.with_property(Property::new(format!("{}2", long), ValueType::I32)),
		);
		build(&mut model, None).unwrap();

		let entity = &model.entity_types[0];
		assert_eq!(entity.table_name(), format!("{}~", "a".repeat(62)));
		let columns: Vec<&str> = entity.properties.iter().map(|p| p.column_name()).collect();
		assert_eq!(columns[0], format!("{}~", "a".repeat(62)));
		assert_eq!(columns[1], format!("{}~1", "a".repeat(61)));
		assert!(columns.iter().all(|c| c.chars().count() <= MAX_IDENTIFIER_LENGTH));
	}

	#[rstest]
	fn test_convention_names_in_finalizing_order() {
		let set = PostgresConventionSetBuilder::new(Arc::new(PostgresTypeMappingSource::new()), None)
			.create_convention_set();
		assert_eq!(
			ConventionSet::names(&set.model_finalizing),
			vec![
				StoreGenerationConvention::NAME,
				ValueGenerationStrategyConvention::NAME,
				MaxIdentifierLengthConvention::NAME,
				PostgresModelFinalizingConvention::NAME,
			]
		);
	}
}

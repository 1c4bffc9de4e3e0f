//! CockroachDB type mappings.
//!
//! Starts from the PostgreSQL tables and adjusts them for CockroachDB: `json`
//! is an alias of `jsonb`, `string` an alias of `text`, and there is no `xid`
//! type for `u32` values.

use reinhardt_postgres::type_mapping::{MAX_VARCHAR_LENGTH, PostgresTypeMappingSource};
use reinhardt_relational::type_mapping::{
	LiteralStyle, TypeMapping, TypeMappingInfo, TypeMappingSource, ValueType,
};

#[derive(Debug, Clone)]
pub struct CockroachTypeMappingSource {
	postgres: PostgresTypeMappingSource,
	varchar: TypeMapping,
	character: TypeMapping,
	single_char: TypeMapping,
	bit: TypeMapping,
	varbit: TypeMapping,
	text: TypeMapping,
}

impl Default for CockroachTypeMappingSource {
	fn default() -> Self {
		Self::new()
	}
}

impl CockroachTypeMappingSource {
	pub fn new() -> Self {
		let mut postgres = PostgresTypeMappingSource::new();

		let jsonb = postgres
			.store_type_mappings()
			.get("jsonb")
			.cloned()
			.unwrap_or_default();
		let text = TypeMapping::new("text", ValueType::String, LiteralStyle::Text);
		let store = postgres.store_type_mappings_mut();
		store.insert("json".to_string(), jsonb);
		store.insert("string".to_string(), vec![text.clone()]);

		postgres.value_type_mappings_mut().insert(
			ValueType::U32,
			TypeMapping::new("bigint", ValueType::U32, LiteralStyle::Numeric),
		);

		Self {
			postgres,
			varchar: TypeMapping::new("character varying", ValueType::String, LiteralStyle::Text),
			character: TypeMapping::new("character", ValueType::String, LiteralStyle::Text).fixed_length(true),
			single_char: TypeMapping::new("character(1)", ValueType::Char, LiteralStyle::Text).fixed_length(true),
			bit: TypeMapping::new("bit", ValueType::BitVec, LiteralStyle::Bits).fixed_length(true),
			varbit: TypeMapping::new("bit varying", ValueType::BitVec, LiteralStyle::Bits),
			text,
		}
	}

	/// The underlying PostgreSQL tables.
	pub fn postgres(&self) -> &PostgresTypeMappingSource {
		&self.postgres
	}

	/// Picks a mapping from those registered for one store name.
	///
	/// Without a value type the first mapping wins. A value type with no
	/// registered mapping maps to `jsonb` when the store type is a JSON type.
	fn from_store_list(mappings: &[TypeMapping], store_type: &str, info: &TypeMappingInfo) -> Option<TypeMapping> {
		let Some(value_type) = &info.value_type else {
			return mappings.first().cloned();
		};
		if let Some(mapping) = mappings.iter().find(|m| &m.value_type == value_type) {
			return Some(mapping.clone());
		}
		match store_type {
			"jsonb" | "json" => Some(TypeMapping::new("jsonb", value_type.clone(), LiteralStyle::Cast)),
			_ => None,
		}
	}

	/// `character` alone and `character(1)` hold one character; wider ones hold strings.
	fn character_mapping(&self, info: &TypeMappingInfo) -> Option<TypeMapping> {
		let single_size = matches!(info.size, None | Some(1));
		match &info.value_type {
			None if single_size => Some(self.single_char.clone_with(info)),
			Some(ValueType::Char) => Some(self.single_char.clone_with(info)),
			None | Some(ValueType::String) => Some(self.character.clone_with(info)),
			_ => None,
		}
	}

	/// Applies the size facet of strings and bit vectors.
	fn sized_value_mapping(&self, mapping: &TypeMapping, info: &TypeMappingInfo) -> TypeMapping {
		let Some(size) = info.size.filter(|s| *s > 0) else {
			return mapping.clone();
		};
		let fixed = info.is_fixed_length.unwrap_or(false);
		match mapping.value_type {
			ValueType::String if size > MAX_VARCHAR_LENGTH => self.text.clone(),
			ValueType::String => {
				let base = if fixed { &self.character } else { &self.varchar };
				base.with_store_type_and_size(format!("{}({})", base.store_type, size), Some(size))
			}
			ValueType::BitVec => {
				let base = if fixed { &self.bit } else { &self.varbit };
				base.with_store_type_and_size(format!("{}({})", base.store_type, size), Some(size))
			}
			_ => mapping.clone(),
		}
	}
}

impl TypeMappingSource for CockroachTypeMappingSource {
	fn find_mapping(&self, info: &TypeMappingInfo) -> Option<TypeMapping> {
		let store_type_mappings = self.postgres.store_type_mappings();

		if let Some(store) = info.store_type_name.as_deref() {
			if let Some(mappings) = store_type_mappings.get(store) {
				return Self::from_store_list(mappings, store, info);
			}

			let base = info.store_type_name_base.as_deref().unwrap_or(store);
			if matches!(base, "character" | "char") {
				if let Some(mapping) = self.character_mapping(info) {
					return Some(mapping);
				}
			} else if let Some(mappings) = store_type_mappings.get(base) {
				return Self::from_store_list(mappings, base, info).map(|m| m.clone_with(info));
			}

			if store.ends_with("[]") {
				if let Some(collection) = self.postgres.find_collection_mapping(info) {
					return Some(collection);
				}
			}
			// Unknown store names may be domains over a known type; fall back
			// to the value type.
		}

		let value_type = info.value_type.as_ref()?;
		if let Some(mapping) = self.postgres.value_type_mappings().get(value_type) {
			return Some(self.sized_value_mapping(mapping, info));
		}
		if let ValueType::Array(_) = value_type {
			return self.postgres.find_collection_mapping(info);
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("json", "jsonb")]
	#[case("jsonb", "jsonb")]
	#[case("string", "text")]
	#[case("int8", "bigint")]
	fn test_store_aliases(#[case] store_type: &str, #[case] expected: &str) {
		let source = CockroachTypeMappingSource::new();
		assert_eq!(
			source.mapping_for_store_type(store_type).unwrap().store_type,
			expected
		);
	}

	#[rstest]
	fn test_json_store_type_accepts_any_value_type() {
		let source = CockroachTypeMappingSource::new();
		let info = TypeMappingInfo::new(Some(ValueType::User("Address".into())), Some("json"));
		let mapping = source.find_mapping(&info).unwrap();
		assert_eq!(mapping.store_type, "jsonb");
		assert_eq!(mapping.value_type, ValueType::User("Address".into()));
	}

	#[rstest]
	fn test_store_type_with_mismatched_value_type_has_no_mapping() {
		let source = CockroachTypeMappingSource::new();
		let info = TypeMappingInfo::new(Some(ValueType::Uuid), Some("integer"));
		assert!(source.find_mapping(&info).is_none());
	}

	#[rstest]
	#[case(None, "character(1)", ValueType::Char)]
	#[case(Some("character(1)"), "character(1)", ValueType::Char)]
	#[case(Some("character(10)"), "character(10)", ValueType::String)]
	#[case(Some("char(3)"), "char(3)", ValueType::String)]
	fn test_character_store_types(
		#[case] store_type: Option<&str>,
		#[case] expected: &str,
		#[case] value_type: ValueType,
	) {
		let source = CockroachTypeMappingSource::new();
		let mapping = match store_type {
			Some(store_type) => source.mapping_for_store_type(store_type).unwrap(),
			None => source.mapping_for_value_type(&ValueType::Char).unwrap(),
		};
		assert_eq!(mapping.store_type, expected);
		assert_eq!(mapping.value_type, value_type);
	}

	#[rstest]
	#[case(Some(32), None, "character varying(32)")]
	#[case(Some(32), Some(true), "character(32)")]
	#[case(Some(MAX_VARCHAR_LENGTH + 1), None, "text")]
	#[case(None, None, "text")]
	fn test_string_size_facets(
		#[case] size: Option<u32>,
		#[case] fixed: Option<bool>,
		#[case] expected: &str,
	) {
		let source = CockroachTypeMappingSource::new();
		let info = TypeMappingInfo::for_value_type(ValueType::String)
			.with_size(size)
			.with_fixed_length(fixed);
		assert_eq!(source.find_mapping(&info).unwrap().store_type, expected);
	}

	#[rstest]
	fn test_bit_vector_size_facets() {
		let source = CockroachTypeMappingSource::new();
		let info = TypeMappingInfo::for_value_type(ValueType::BitVec).with_size(Some(8));
		assert_eq!(source.find_mapping(&info).unwrap().store_type, "bit varying(8)");
		let fixed = info.with_fixed_length(Some(true));
		assert_eq!(source.find_mapping(&fixed).unwrap().store_type, "bit(8)");
	}

	#[rstest]
	fn test_bytes_and_collections() {
		let source = CockroachTypeMappingSource::new();
		assert_eq!(
			source.mapping_for_value_type(&ValueType::Bytes).unwrap().store_type,
			"bytea"
		);

		let smallints = TypeMappingInfo::new(Some(ValueType::Bytes), Some("smallint[]"));
		assert_eq!(source.find_mapping(&smallints).unwrap().store_type, "smallint[]");

		let uuids = source
			.mapping_for_value_type(&ValueType::array_of(ValueType::Uuid))
			.unwrap();
		assert_eq!(uuids.store_type, "uuid[]");
	}

	#[rstest]
	fn test_u32_has_no_xid_mapping() {
		let source = CockroachTypeMappingSource::new();
		assert_eq!(
			source.mapping_for_value_type(&ValueType::U32).unwrap().store_type,
			"bigint"
		);
		let row_version = TypeMappingInfo::for_value_type(ValueType::U32).with_row_version(true);
		assert_eq!(source.find_mapping(&row_version).unwrap().store_type, "bigint");
	}

	#[rstest]
	fn test_unknown_store_type_falls_back_to_value_type() {
		let source = CockroachTypeMappingSource::new();
		let info = TypeMappingInfo::new(Some(ValueType::I32), Some("positive_int"));
		assert_eq!(source.find_mapping(&info).unwrap().store_type, "integer");
	}
}

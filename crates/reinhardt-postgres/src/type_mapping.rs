//! PostgreSQL type mappings.

use indexmap::IndexMap;
use reinhardt_relational::type_mapping::{
	LiteralStyle, TypeMapping, TypeMappingInfo, TypeMappingSource, ValueType,
};
use std::collections::HashMap;

/// Largest `character varying(n)` length accepted by the server.
pub const MAX_VARCHAR_LENGTH: u32 = 10_485_760;

/// Store-type and value-type lookup tables for PostgreSQL.
///
/// Store names map to every mapping registered for them (first is the default);
/// value types map to their default store mapping.
#[derive(Debug, Clone)]
pub struct PostgresTypeMappingSource {
	store_type_mappings: IndexMap<String, Vec<TypeMapping>>,
	value_type_mappings: HashMap<ValueType, TypeMapping>,
	xid: TypeMapping,
}

fn mapping(store_type: &str, value_type: ValueType, style: LiteralStyle) -> TypeMapping {
	TypeMapping::new(store_type, value_type, style)
}

impl Default for PostgresTypeMappingSource {
	fn default() -> Self {
		Self::new()
	}
}

impl PostgresTypeMappingSource {
	pub fn new() -> Self {
		use LiteralStyle::*;

		let int2 = mapping("smallint", ValueType::I16, Numeric);
		let int4 = mapping("integer", ValueType::I32, Numeric);
		let int8 = mapping("bigint", ValueType::I64, Numeric);
		let boolean = mapping("boolean", ValueType::Bool, Boolean);
		let float4 = mapping("real", ValueType::F32, Numeric);
		let float8 = mapping("double precision", ValueType::F64, Numeric);
		let numeric = mapping("numeric", ValueType::Decimal, Numeric);
		let text = mapping("text", ValueType::String, Text);
		let varchar = mapping("character varying", ValueType::String, Text);
		let character = mapping("character", ValueType::String, Text).fixed_length(true);
		let single_char = mapping("character(1)", ValueType::Char, Text).fixed_length(true);
		let bytea = mapping("bytea", ValueType::Bytes, Bytes);
		let uuid = mapping("uuid", ValueType::Uuid, Cast);
		let date = mapping("date", ValueType::Date, Cast);
		let time = mapping("time without time zone", ValueType::Time, Cast);
		let timestamp = mapping("timestamp without time zone", ValueType::Timestamp, Cast);
		let timestamptz = mapping("timestamp with time zone", ValueType::TimestampTz, Cast);
		let interval = mapping("interval", ValueType::Interval, Cast);
		let json = mapping("json", ValueType::JsonValue, Cast);
		let json_string = mapping("json", ValueType::String, Cast);
		let jsonb = mapping("jsonb", ValueType::JsonValue, Cast);
		let jsonb_string = mapping("jsonb", ValueType::String, Cast);
		let bit = mapping("bit", ValueType::BitVec, Bits).fixed_length(true);
		let varbit = mapping("bit varying", ValueType::BitVec, Bits);
		let xid = mapping("xid", ValueType::U32, Numeric);

		let mut store_type_mappings: IndexMap<String, Vec<TypeMapping>> = IndexMap::new();
		let mut register = |names: &[&str], mappings: Vec<TypeMapping>| {
			for name in names {
				store_type_mappings.insert((*name).to_string(), mappings.clone());
			}
		};
		register(&["smallint", "int2"], vec![int2.clone()]);
		register(&["integer", "int", "int4"], vec![int4.clone()]);
		register(&["bigint", "int8"], vec![int8.clone()]);
		register(&["boolean", "bool"], vec![boolean.clone()]);
		register(&["real", "float4"], vec![float4.clone()]);
		register(&["double precision", "float8"], vec![float8.clone()]);
		register(&["numeric", "decimal"], vec![numeric.clone()]);
		register(&["text"], vec![text.clone()]);
		register(&["character varying", "varchar"], vec![varchar.clone()]);
		register(&["character", "char"], vec![character.clone(), single_char.clone()]);
		register(&["bytea"], vec![bytea.clone()]);
		register(&["uuid"], vec![uuid.clone()]);
		register(&["date"], vec![date.clone()]);
		register(&["time without time zone", "time"], vec![time.clone()]);
		register(&["timestamp without time zone", "timestamp"], vec![timestamp.clone()]);
		register(&["timestamp with time zone", "timestamptz"], vec![timestamptz.clone()]);
		register(&["interval"], vec![interval.clone()]);
		register(&["json"], vec![json, json_string]);
		register(&["jsonb"], vec![jsonb.clone(), jsonb_string]);
		register(&["bit"], vec![bit]);
		register(&["bit varying", "varbit"], vec![varbit.clone()]);
		register(&["xid"], vec![xid.clone()]);

		let value_type_mappings: HashMap<ValueType, TypeMapping> = [
			int2, int4, int8, boolean, float4, float8, numeric, text, single_char, bytea, uuid, date,
			time, timestamp, timestamptz, interval, jsonb, varbit, xid.clone(),
		]
		.into_iter()
		.map(|m| (m.value_type.clone(), m))
		.collect();

		Self {
			store_type_mappings,
			value_type_mappings,
			xid,
		}
	}

	pub fn store_type_mappings(&self) -> &IndexMap<String, Vec<TypeMapping>> {
		&self.store_type_mappings
	}

	pub fn store_type_mappings_mut(&mut self) -> &mut IndexMap<String, Vec<TypeMapping>> {
		&mut self.store_type_mappings
	}

	pub fn value_type_mappings(&self) -> &HashMap<ValueType, TypeMapping> {
		&self.value_type_mappings
	}

	pub fn value_type_mappings_mut(&mut self) -> &mut HashMap<ValueType, TypeMapping> {
		&mut self.value_type_mappings
	}

	/// First registered mapping for `store_type`.
	pub fn store_mapping(&self, store_type: &str) -> Option<&TypeMapping> {
		self.store_type_mappings.get(store_type).and_then(|m| m.first())
	}

	/// Array mapping for `info`.
	///
	/// The element comes from the store name without its `[]` suffix, or from
	/// the element of an array value type. A `bytes` value stored as
	/// `smallint[]` is a collection of `i16`.
	pub fn find_collection_mapping(&self, info: &TypeMappingInfo) -> Option<TypeMapping> {
		let element_value_type = match &info.value_type {
			Some(ValueType::Array(element)) => Some((**element).clone()),
			Some(ValueType::Bytes) => Some(ValueType::I16),
			_ => None,
		};

		let element_info = match info.store_type_name.as_deref() {
			Some(store) => {
				let element_store = store.strip_suffix("[]")?;
				TypeMappingInfo::new(element_value_type, Some(element_store))
			}
			None => TypeMappingInfo::new(Some(element_value_type?), None),
		};

		let element = self.find_mapping(&element_info)?;
		let value_type = info
			.value_type
			.clone()
			.unwrap_or_else(|| ValueType::array_of(element.value_type.clone()));
		Some(TypeMapping::array(element, value_type))
	}

	fn from_store_list(mappings: &[TypeMapping], info: &TypeMappingInfo) -> Option<TypeMapping> {
		match &info.value_type {
			None => mappings.first().cloned(),
			Some(value_type) => mappings.iter().find(|m| &m.value_type == value_type).cloned(),
		}
	}

	fn sized_value_mapping(&self, mapping: &TypeMapping, info: &TypeMappingInfo) -> TypeMapping {
		let Some(size) = info.size.filter(|s| *s > 0) else {
			return mapping.clone();
		};
		match mapping.value_type {
			ValueType::String if size <= MAX_VARCHAR_LENGTH => {
				let base = if info.is_fixed_length == Some(true) {
					"character"
				} else {
					"character varying"
				};
				let mut sized = mapping.with_store_type_and_size(format!("{}({})", base, size), Some(size));
				sized.is_fixed_length = info.is_fixed_length == Some(true);
				sized
			}
			ValueType::BitVec => {
				let base = if info.is_fixed_length == Some(true) {
					"bit"
				} else {
					"bit varying"
				};
				mapping.with_store_type_and_size(format!("{}({})", base, size), Some(size))
			}
			_ => mapping.clone(),
		}
	}
}

impl TypeMappingSource for PostgresTypeMappingSource {
	fn find_mapping(&self, info: &TypeMappingInfo) -> Option<TypeMapping> {
		if info.is_row_version == Some(true) && info.value_type == Some(ValueType::U32) {
			return Some(self.xid.clone());
		}

		if let Some(store) = info.store_type_name.as_deref() {
			if let Some(mappings) = self.store_type_mappings.get(store) {
				return Self::from_store_list(mappings, info);
			}
			if let Some(mappings) = info
				.store_type_name_base
				.as_deref()
				.and_then(|base| self.store_type_mappings.get(base))
			{
				return Self::from_store_list(mappings, info).map(|m| m.clone_with(info));
			}
			if store.ends_with("[]") {
				return self.find_collection_mapping(info);
			}
			return None;
		}

		match info.value_type.as_ref()? {
			ValueType::Array(_) => self.find_collection_mapping(info),
			value_type => self
				.value_type_mappings
				.get(value_type)
				.map(|m| self.sized_value_mapping(m, info)),
		}
	}
}

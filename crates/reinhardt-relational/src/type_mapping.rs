//! Type mapping contract: value types, store types and SQL literals.

use crate::error::{RelationalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application-level value type of a property or column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
	Bool,
	I16,
	I32,
	I64,
	U32,
	F32,
	F64,
	Decimal,
	String,
	Char,
	Bytes,
	Uuid,
	Date,
	Time,
	Timestamp,
	TimestampTz,
	Interval,
	/// An untyped JSON document.
	JsonValue,
	BitVec,
	/// A user type stored as serialized JSON.
	User(String),
	Array(Box<ValueType>),
}

impl ValueType {
	pub fn array_of(element: ValueType) -> Self {
		Self::Array(Box::new(element))
	}

	pub fn element_type(&self) -> Option<&ValueType> {
		match self {
			Self::Array(element) => Some(element),
			_ => None,
		}
	}

	pub fn is_integer(&self) -> bool {
		matches!(self, Self::I16 | Self::I32 | Self::I64)
	}
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::User(name) => f.write_str(name),
			Self::Array(element) => write!(f, "{}[]", element),
			other => write!(f, "{:?}", other),
		}
	}
}

/// How a mapping renders literal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralStyle {
	Boolean,
	Numeric,
	Text,
	Bytes,
	/// Quoted text followed by a `::store_type` cast.
	Cast,
	Bits,
	Array,
}

/// A value to render as an SQL literal.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Text(String),
	Bytes(Vec<u8>),
	Array(Vec<SqlValue>),
}

impl From<Option<&str>> for SqlValue {
	fn from(value: Option<&str>) -> Self {
		value.map_or(Self::Null, |s| Self::Text(s.to_string()))
	}
}

impl From<&str> for SqlValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

/// Association between a value type and a store type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMapping {
	pub store_type: String,
	pub store_type_name_base: String,
	pub value_type: ValueType,
	pub size: Option<u32>,
	pub is_fixed_length: bool,
	pub literal_style: LiteralStyle,
	pub element: Option<Box<TypeMapping>>,
}

impl TypeMapping {
	pub fn new(store_type: impl Into<String>, value_type: ValueType, literal_style: LiteralStyle) -> Self {
		let store_type = store_type.into();
		let (base, size, _, _) = parse_store_type(&store_type);
		Self {
			store_type_name_base: base,
			store_type,
			value_type,
			size,
			is_fixed_length: false,
			literal_style,
			element: None,
		}
	}

	pub fn fixed_length(mut self, is_fixed_length: bool) -> Self {
		self.is_fixed_length = is_fixed_length;
		self
	}

	/// Array mapping over `element`.
	pub fn array(element: TypeMapping, value_type: ValueType) -> Self {
		let mut mapping = Self::new(
			format!("{}[]", element.store_type),
			value_type,
			LiteralStyle::Array,
		);
		mapping.element = Some(Box::new(element));
		mapping
	}

	/// Same mapping under another store type name and size.
	pub fn with_store_type_and_size(&self, store_type: impl Into<String>, size: Option<u32>) -> Self {
		let store_type = store_type.into();
		let (base, _, _, _) = parse_store_type(&store_type);
		Self {
			store_type,
			store_type_name_base: base,
			size,
			..self.clone()
		}
	}

	/// Applies the facets carried by `info` (explicit store type name, size).
	pub fn clone_with(&self, info: &TypeMappingInfo) -> Self {
		let mut mapping = match (&info.store_type_name, info.size) {
			(Some(name), size) => self.with_store_type_and_size(name.clone(), size.or(self.size)),
			(None, Some(size)) => {
				self.with_store_type_and_size(format!("{}({})", self.store_type_name_base, size), Some(size))
			}
			(None, None) => self.clone(),
		};
		if let Some(fixed) = info.is_fixed_length {
			mapping.is_fixed_length = fixed;
		}
		mapping
	}

	pub fn generate_sql_literal(&self, value: &SqlValue) -> String {
		match value {
			SqlValue::Null => "NULL".to_string(),
			SqlValue::Bool(true) => "TRUE".to_string(),
			SqlValue::Bool(false) => "FALSE".to_string(),
			SqlValue::Int(i) => match self.literal_style {
				LiteralStyle::Cast => format!("'{}'::{}", i, self.store_type),
				_ => i.to_string(),
			},
			SqlValue::Float(f) if f.is_nan() => format!("'NaN'::{}", self.store_type),
			SqlValue::Float(f) if f.is_infinite() => {
				let sign = if *f < 0.0 { "-" } else { "" };
				format!("'{}Infinity'::{}", sign, self.store_type)
			}
			SqlValue::Float(f) => f.to_string(),
			SqlValue::Text(s) => {
				let quoted = format!("'{}'", s.replace('\'', "''"));
				match self.literal_style {
					LiteralStyle::Cast => format!("{}::{}", quoted, self.store_type),
					LiteralStyle::Bits => format!("B{}", quoted),
					_ => quoted,
				}
			}
			SqlValue::Bytes(bytes) => {
				let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
				format!("'\\x{}'::bytea", hex)
			}
			SqlValue::Array(items) => {
				let rendered: Vec<String> = items
					.iter()
					.map(|item| match &self.element {
						Some(element) => element.generate_sql_literal(item),
						None => TypeMapping::new("text", ValueType::String, LiteralStyle::Text)
							.generate_sql_literal(item),
					})
					.collect();
				format!("ARRAY[{}]::{}", rendered.join(","), self.store_type)
			}
		}
	}
}

/// Lookup key for [`TypeMappingSource::find_mapping`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeMappingInfo {
	pub value_type: Option<ValueType>,
	pub store_type_name: Option<String>,
	pub store_type_name_base: Option<String>,
	pub size: Option<u32>,
	pub precision: Option<u32>,
	pub scale: Option<u32>,
	pub is_fixed_length: Option<bool>,
	pub is_row_version: Option<bool>,
}

impl TypeMappingInfo {
	pub fn new(value_type: Option<ValueType>, store_type_name: Option<&str>) -> Self {
		let mut info = Self {
			value_type,
			..Default::default()
		};
		if let Some(name) = store_type_name {
			let (base, size, precision, scale) = parse_store_type(name);
			info.store_type_name = Some(name.trim().to_string());
			info.store_type_name_base = Some(base);
			info.size = size;
			info.precision = precision;
			info.scale = scale;
		}
		info
	}

	pub fn for_value_type(value_type: ValueType) -> Self {
		Self::new(Some(value_type), None)
	}

	pub fn for_store_type(store_type_name: &str) -> Self {
		Self::new(None, Some(store_type_name))
	}

	pub fn with_size(mut self, size: Option<u32>) -> Self {
		if size.is_some() {
			self.size = size;
		}
		self
	}

	pub fn with_fixed_length(mut self, is_fixed_length: Option<bool>) -> Self {
		self.is_fixed_length = is_fixed_length;
		self
	}

	pub fn with_row_version(mut self, is_row_version: bool) -> Self {
		self.is_row_version = Some(is_row_version);
		self
	}

	/// Describes what is being looked up, for error messages.
	pub fn describe(&self) -> String {
		match (&self.store_type_name, &self.value_type) {
			(Some(store), Some(value)) => format!("store type '{}' with value type {}", store, value),
			(Some(store), None) => format!("store type '{}'", store),
			(None, Some(value)) => format!("value type {}", value),
			(None, None) => "an empty mapping request".to_string(),
		}
	}
}

/// Splits `name(a[,b])` into its base name and facets.
///
/// Returns `(base, size, precision, scale)`. A single facet is a size; two
/// facets are precision and scale. Text after the closing parenthesis is kept
/// in the base name, so `timestamp(3) with time zone` has base
/// `timestamp with time zone`.
pub fn parse_store_type(name: &str) -> (String, Option<u32>, Option<u32>, Option<u32>) {
	let name = name.trim();
	let (Some(open), Some(close)) = (name.find('('), name.rfind(')')) else {
		return (name.to_string(), None, None, None);
	};
	if close < open {
		return (name.to_string(), None, None, None);
	}

	let head = name[..open].trim();
	let tail = name[close + 1..].trim();
	let base = if tail.is_empty() {
		head.to_string()
	} else {
		format!("{} {}", head, tail)
	};

	let facets: Vec<Option<u32>> = name[open + 1..close]
		.split(',')
		.map(|facet| facet.trim().parse().ok())
		.collect();
	match facets.as_slice() {
		[size] => (base, *size, None, None),
		[precision, scale] => (base, None, *precision, *scale),
		_ => (base, None, None, None),
	}
}

/// Resolves [`TypeMapping`]s for a provider.
pub trait TypeMappingSource: Send + Sync {
	fn find_mapping(&self, info: &TypeMappingInfo) -> Option<TypeMapping>;

	fn mapping_for_value_type(&self, value_type: &ValueType) -> Option<TypeMapping> {
		self.find_mapping(&TypeMappingInfo::for_value_type(value_type.clone()))
	}

	fn mapping_for_store_type(&self, store_type_name: &str) -> Option<TypeMapping> {
		self.find_mapping(&TypeMappingInfo::for_store_type(store_type_name))
	}

	/// Mapping used to render string literals (comments, defaults).
	fn string_mapping(&self) -> Result<TypeMapping> {
		self.mapping_for_value_type(&ValueType::String)
			.ok_or_else(|| RelationalError::MissingTypeMapping("value type String".to_string()))
	}
}

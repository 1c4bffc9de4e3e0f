//! Ordered name/value annotations attached to models and migration operations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single annotation value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	Json(serde_json::Value),
}

impl AnnotationValue {
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}
}

impl fmt::Display for AnnotationValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(b) => write!(f, "{}", b),
			Self::Int(i) => write!(f, "{}", i),
			Self::Float(x) => write!(f, "{}", x),
			Self::String(s) => f.write_str(s),
			Self::Json(v) => write!(f, "{}", v),
		}
	}
}

impl From<bool> for AnnotationValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i32> for AnnotationValue {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<i64> for AnnotationValue {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<f64> for AnnotationValue {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<&str> for AnnotationValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for AnnotationValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<serde_json::Value> for AnnotationValue {
	fn from(value: serde_json::Value) -> Self {
		Self::Json(value)
	}
}

/// Annotation map preserving insertion order.
///
/// Order matters: storage parameters are emitted in the order they were annotated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(IndexMap<String, AnnotationValue>);

impl Annotations {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, name: &str) -> Option<&AnnotationValue> {
		self.0.get(name)
	}

	pub fn get_str(&self, name: &str) -> Option<&str> {
		self.get(name).and_then(AnnotationValue::as_str)
	}

	/// `true` only when the annotation exists and holds `Bool(true)`.
	pub fn is_true(&self, name: &str) -> bool {
		self.get(name).and_then(AnnotationValue::as_bool) == Some(true)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	pub fn set(&mut self, name: impl Into<String>, value: impl Into<AnnotationValue>) -> &mut Self {
		self.0.insert(name.into(), value.into());
		self
	}

	/// Builder-style variant of [`Annotations::set`].
	pub fn with(mut self, name: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
		self.set(name, value);
		self
	}

	pub fn remove(&mut self, name: &str) -> Option<AnnotationValue> {
		self.0.shift_remove(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &AnnotationValue)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Annotations whose name starts with `prefix`, yielded with the prefix stripped.
	pub fn with_prefix<'a>(
		&'a self,
		prefix: &'a str,
	) -> impl Iterator<Item = (&'a str, &'a AnnotationValue)> + 'a {
		self.0
			.iter()
			.filter_map(move |(k, v)| k.strip_prefix(prefix).map(|suffix| (suffix, v)))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<K, V> FromIterator<(K, V)> for Annotations
where
	K: Into<String>,
	V: Into<AnnotationValue>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

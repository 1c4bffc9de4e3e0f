//! CockroachDB-specific annotations.

use reinhardt_relational::annotations::Annotations;
use reinhardt_relational::error::{RelationalError, Result};
use serde::{Deserialize, Serialize};

pub struct CockroachAnnotationNames;

impl CockroachAnnotationNames {
	pub const PREFIX: &'static str = "Cockroach:";
	/// JSON-encoded [`InterleaveInParent`] on a table.
	pub const INTERLEAVE_IN_PARENT: &'static str = "Cockroach:InterleaveInParent";
}

/// Stores a child table's rows together with the rows of its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterleaveInParent {
	#[serde(default)]
	pub parent_table_schema: Option<String>,
	pub parent_table_name: String,
	/// Leading primary key columns shared with the parent.
	pub interleave_prefix: Vec<String>,
}

impl InterleaveInParent {
	pub fn new<I, S>(parent_table_name: impl Into<String>, interleave_prefix: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			parent_table_schema: None,
			parent_table_name: parent_table_name.into(),
			interleave_prefix: interleave_prefix.into_iter().map(Into::into).collect(),
		}
	}

	pub fn with_parent_schema(mut self, schema: impl Into<String>) -> Self {
		self.parent_table_schema = Some(schema.into());
		self
	}

	/// Reads the annotation; `None` when absent or not a string.
	pub fn from_annotations(annotations: &Annotations) -> Result<Option<Self>> {
		annotations
			.get_str(CockroachAnnotationNames::INTERLEAVE_IN_PARENT)
			.map(|json| serde_json::from_str(json).map_err(RelationalError::from))
			.transpose()
	}

	/// Writes the annotation onto `annotations`.
	pub fn apply(&self, annotations: &mut Annotations) -> Result<()> {
		annotations.set(
			CockroachAnnotationNames::INTERLEAVE_IN_PARENT,
			serde_json::to_string(self)?,
		);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_interleave_annotation_round_trips_through_annotations() {
		let interleave = InterleaveInParent::new("customers", ["customer_id"]).with_parent_schema("sales");
		let mut annotations = Annotations::new();
		interleave.apply(&mut annotations).unwrap();

		let read = InterleaveInParent::from_annotations(&annotations).unwrap();
		assert_eq!(read, Some(interleave));
	}

	#[rstest]
	fn test_missing_and_malformed_annotations() {
		assert_eq!(InterleaveInParent::from_annotations(&Annotations::new()).unwrap(), None);

		let malformed = Annotations::new().with(CockroachAnnotationNames::INTERLEAVE_IN_PARENT, "{");
		assert!(InterleaveInParent::from_annotations(&malformed).is_err());
	}
}

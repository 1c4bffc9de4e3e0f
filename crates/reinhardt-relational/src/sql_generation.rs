//! Identifier quoting and statement punctuation.

/// Quote an identifier with double quotes, doubling embedded quotes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlGenerationHelper;

impl SqlGenerationHelper {
	pub fn new() -> Self {
		Self
	}

	pub fn statement_terminator(&self) -> &'static str {
		";"
	}

	pub fn delimit_identifier(&self, identifier: &str) -> String {
		format!("\"{}\"", identifier.replace('"', "\"\""))
	}

	/// `"schema"."name"` when a schema is given, otherwise `"name"`.
	pub fn delimit_identifier_in(&self, name: &str, schema: Option<&str>) -> String {
		match schema {
			Some(schema) if !schema.is_empty() => {
				format!(
					"{}.{}",
					self.delimit_identifier(schema),
					self.delimit_identifier(name)
				)
			}
			_ => self.delimit_identifier(name),
		}
	}

	/// Single-quoted SQL string literal.
	pub fn string_literal(&self, value: &str) -> String {
		format!("'{}'", value.replace('\'', "''"))
	}
}

//! Annotation names understood by the PostgreSQL provider.

use reinhardt_relational::error::{RelationalError, Result};
use std::fmt;
use std::str::FromStr;

pub struct PostgresAnnotationNames;

impl PostgresAnnotationNames {
	pub const PREFIX: &'static str = "Postgres:";
	/// Prefix of table storage parameters, e.g. `Postgres:StorageParameter:fillfactor`.
	pub const STORAGE_PARAMETER_PREFIX: &'static str = "Postgres:StorageParameter:";
	pub const UNLOGGED_TABLE: &'static str = "Postgres:UnloggedTable";
	pub const VALUE_GENERATION_STRATEGY: &'static str = "Postgres:ValueGenerationStrategy";
}

/// How the server generates key values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueGenerationStrategy {
	None,
	SerialColumn,
	IdentityAlwaysColumn,
	IdentityByDefaultColumn,
}

impl ValueGenerationStrategy {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::None => "None",
			Self::SerialColumn => "SerialColumn",
			Self::IdentityAlwaysColumn => "IdentityAlwaysColumn",
			Self::IdentityByDefaultColumn => "IdentityByDefaultColumn",
		}
	}

	pub fn is_identity(&self) -> bool {
		matches!(self, Self::IdentityAlwaysColumn | Self::IdentityByDefaultColumn)
	}
}

impl fmt::Display for ValueGenerationStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ValueGenerationStrategy {
	type Err = RelationalError;

	fn from_str(s: &str) -> Result<Self> {
		match s {
			"None" => Ok(Self::None),
			"SerialColumn" => Ok(Self::SerialColumn),
			"IdentityAlwaysColumn" => Ok(Self::IdentityAlwaysColumn),
			"IdentityByDefaultColumn" => Ok(Self::IdentityByDefaultColumn),
			other => Err(RelationalError::InvalidOperation(format!(
				"unknown value generation strategy '{}'",
				other
			))),
		}
	}
}

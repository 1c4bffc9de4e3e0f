//! Server version and version comparisons.

use reinhardt_relational::error::{RelationalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `major.minor` server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
	pub major: u32,
	pub minor: u32,
}

impl Version {
	pub const fn new(major: u32, minor: u32) -> Self {
		Self { major, minor }
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.major, self.minor)
	}
}

impl FromStr for Version {
	type Err = RelationalError;

	/// Accepts `12`, `13.4`, `13.4.1` and a leading `v`.
	fn from_str(s: &str) -> Result<Self> {
		let invalid = || RelationalError::Configuration(format!("invalid server version '{}'", s));
		let trimmed = s.trim().trim_start_matches('v');
		let mut parts = trimmed.split('.');
		let major = parts
			.next()
			.filter(|p| !p.is_empty())
			.ok_or_else(invalid)?
			.parse()
			.map_err(|_| invalid())?;
		let minor = match parts.next() {
			Some(minor) => minor.parse().map_err(|_| invalid())?,
			None => 0,
		};
		Ok(Self { major, minor })
	}
}

/// Comparisons where an unknown version means "latest".
pub trait VersionExt {
	/// `true` when unknown.
	fn at_least(&self, major: u32, minor: u32) -> bool;

	/// `false` when unknown.
	fn is_under(&self, major: u32, minor: u32) -> bool;
}

impl VersionExt for Option<Version> {
	fn at_least(&self, major: u32, minor: u32) -> bool {
		match self {
			Some(version) => *version >= Version::new(major, minor),
			None => true,
		}
	}

	fn is_under(&self, major: u32, minor: u32) -> bool {
		match self {
			Some(version) => *version < Version::new(major, minor),
			None => false,
		}
	}
}

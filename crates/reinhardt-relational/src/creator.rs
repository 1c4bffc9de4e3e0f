//! Database creation contract.

use crate::error::Result;
use crate::operations::MigrationOperation;
use async_trait::async_trait;

/// Creates, probes and drops the database a context points at.
#[async_trait]
pub trait DatabaseCreator: Send + Sync {
	/// Whether the database exists; connection failures other than a missing
	/// database are errors.
	async fn exists(&self) -> Result<bool>;

	/// Whether the database contains any user table.
	async fn has_tables(&self) -> Result<bool>;

	async fn create(&self) -> Result<()>;

	async fn delete(&self) -> Result<()>;

	/// Executes `operations` against the (existing) database.
	async fn create_tables(&self, operations: &[MigrationOperation]) -> Result<()>;

	/// Creates the database and its tables when missing.
	///
	/// Returns `true` when anything was created.
	async fn ensure_created(&self, operations: &[MigrationOperation]) -> Result<bool> {
		if !self.exists().await? {
			tracing::info!("database does not exist, creating it");
			self.create().await?;
			self.create_tables(operations).await?;
			return Ok(true);
		}
		if !self.has_tables().await? {
			tracing::info!("database has no tables, creating schema");
			self.create_tables(operations).await?;
			return Ok(true);
		}
		Ok(false)
	}

	/// Drops the database when it exists. Returns `true` when it was dropped.
	async fn ensure_deleted(&self) -> Result<bool> {
		if self.exists().await? {
			self.delete().await?;
			return Ok(true);
		}
		Ok(false)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::Mutex;

	#[derive(Default)]
	struct Recording {
		exists: bool,
		has_tables: bool,
		calls: Mutex<Vec<&'static str>>,
	}

	#[async_trait]
	impl DatabaseCreator for Recording {
		async fn exists(&self) -> Result<bool> {
			Ok(self.exists)
		}

		async fn has_tables(&self) -> Result<bool> {
			Ok(self.has_tables)
		}

		async fn create(&self) -> Result<()> {
			self.calls.lock().unwrap().push("create");
			Ok(())
		}

		async fn delete(&self) -> Result<()> {
			self.calls.lock().unwrap().push("delete");
			Ok(())
		}

		async fn create_tables(&self, _operations: &[MigrationOperation]) -> Result<()> {
			self.calls.lock().unwrap().push("create_tables");
			Ok(())
		}
	}

	#[rstest]
	#[case(false, false, true, vec!["create", "create_tables"])]
	#[case(true, false, true, vec!["create_tables"])]
	#[case(true, true, false, vec![])]
	#[tokio::test]
	async fn test_ensure_created(
		#[case] exists: bool,
		#[case] has_tables: bool,
		#[case] created: bool,
		#[case] calls: Vec<&'static str>,
	) {
		let creator = Recording {
			exists,
			has_tables,
			..Default::default()
		};
		assert_eq!(creator.ensure_created(&[]).await.unwrap(), created);
		assert_eq!(*creator.calls.lock().unwrap(), calls);
	}

	#[rstest]
	#[case(true, true)]
	#[case(false, false)]
	#[tokio::test]
	async fn test_ensure_deleted(#[case] exists: bool, #[case] deleted: bool) {
		let creator = Recording {
			exists,
			..Default::default()
		};
		assert_eq!(creator.ensure_deleted().await.unwrap(), deleted);
	}
}

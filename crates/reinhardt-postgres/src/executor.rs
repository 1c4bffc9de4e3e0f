//! Runs generated migration commands against a connection.

use reinhardt_relational::commands::MigrationCommand;
use reinhardt_relational::error::Result;
use sqlx::{Connection, Executor, PgConnection};

/// A run of commands executed together.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandBatch<'a> {
	/// Consecutive commands sharing one transaction.
	Transactional(Vec<&'a MigrationCommand>),
	/// A command that must run on its own, outside a transaction.
	Suppressed(&'a MigrationCommand),
}

/// Splits `commands` into batches, preserving order.
pub fn plan_batches(commands: &[MigrationCommand]) -> Vec<CommandBatch<'_>> {
	let mut batches = Vec::new();
	let mut pending: Vec<&MigrationCommand> = Vec::new();
	for command in commands {
		if command.transaction_suppressed {
			if !pending.is_empty() {
				batches.push(CommandBatch::Transactional(std::mem::take(&mut pending)));
			}
			batches.push(CommandBatch::Suppressed(command));
		} else {
			pending.push(command);
		}
	}
	if !pending.is_empty() {
		batches.push(CommandBatch::Transactional(pending));
	}
	batches
}

pub struct MigrationCommandExecutor;

impl MigrationCommandExecutor {
	/// Executes `commands` in order on `connection`.
	///
	/// A failing command aborts the run; the open transaction, if any, is
	/// rolled back when dropped.
	pub async fn execute(connection: &mut PgConnection, commands: &[MigrationCommand]) -> Result<()> {
		for batch in plan_batches(commands) {
			match batch {
				CommandBatch::Transactional(batch) => {
					let mut tx = connection.begin().await?;
					for command in batch {
						tracing::debug!(sql = %command.command_text.trim_end(), "executing migration command");
						(&mut *tx).execute(command.command_text.as_str()).await?;
					}
					tx.commit().await?;
				}
				CommandBatch::Suppressed(command) => {
					tracing::debug!(
						sql = %command.command_text.trim_end(),
						"executing migration command outside transaction"
					);
					(&mut *connection)
						.execute(command.command_text.as_str())
						.await?;
				}
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_suppressed_commands_split_transactions() {
		let commands = vec![
			MigrationCommand::new("CREATE TABLE a ();", false),
			MigrationCommand::new("CREATE TABLE b ();", false),
			MigrationCommand::new("CREATE INDEX CONCURRENTLY i ON a ();", true),
			MigrationCommand::new("DROP TABLE b;", false),
		];

		let batches = plan_batches(&commands);
		assert_eq!(
			batches,
			vec![
				CommandBatch::Transactional(vec![&commands[0], &commands[1]]),
				CommandBatch::Suppressed(&commands[2]),
				CommandBatch::Transactional(vec![&commands[3]]),
			]
		);
	}

	#[rstest]
	fn test_empty_command_list() {
		assert!(plan_batches(&[]).is_empty());
	}
}

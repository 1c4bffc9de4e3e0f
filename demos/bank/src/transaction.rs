//! Transfers funds inside a transaction using CockroachDB's client-side
//! retry protocol: a `cockroach_restart` savepoint is rolled back to whenever
//! the transaction hits a serialization failure.

use crate::accounts::{self, Account};
use crate::error::{BankError, Result};
use sqlx::{PgConnection, PgPool};

pub const RESTART_SAVEPOINT: &str = "cockroach_restart";

async fn transfer_funds(connection: &mut PgConnection, from: i64, to: i64, amount: i64) -> Result<()> {
	let source = accounts::find(connection, from)
		.await?
		.ok_or(BankError::AccountNotFound(from))?;
	let target = accounts::find(connection, to)
		.await?
		.ok_or(BankError::AccountNotFound(to))?;
	if source.balance < amount {
		return Err(BankError::InsufficientBalance(from));
	}

	accounts::set_balance(connection, source.id, source.balance - amount).await?;
	accounts::set_balance(connection, target.id, target.balance + amount).await?;
	Ok(())
}

async fn transfer_with_restarts(pool: &PgPool, from: i64, to: i64, amount: i64) -> Result<()> {
	let mut transaction = pool.begin().await?;
	sqlx::query(&format!("SAVEPOINT {}", RESTART_SAVEPOINT))
		.execute(&mut *transaction)
		.await?;

	let mut attempt = 0_u32;
	loop {
		match transfer_funds(&mut transaction, from, to, amount).await {
			Ok(()) => {
				sqlx::query(&format!("RELEASE SAVEPOINT {}", RESTART_SAVEPOINT))
					.execute(&mut *transaction)
					.await?;
				transaction.commit().await?;
				return Ok(());
			}
			Err(error) if error.is_serialization_failure() => {
				attempt += 1;
				tracing::warn!(attempt, %error, "serialization failure, restarting transaction");
				sqlx::query(&format!("ROLLBACK TO SAVEPOINT {}", RESTART_SAVEPOINT))
					.execute(&mut *transaction)
					.await?;
			}
			Err(error) => return Err(error),
		}
	}
}

pub async fn run(pool: &PgPool) -> Result<()> {
	for account in [Account::new(1, 1000), Account::new(2, 250)] {
		accounts::insert(pool, &account).await?;
	}
	accounts::print_balances("Initial balances", &accounts::all(pool).await?);

	match transfer_with_restarts(pool, 1, 2, 100).await {
		Ok(()) => {}
		Err(error) if error.is_data_error() => println!("{}", error),
		Err(error) => return Err(error),
	}

	accounts::print_balances("Final balances", &accounts::all(pool).await?);
	Ok(())
}

//! Inserts, updates and queries accounts, retrying transient failures.

use crate::accounts::{self, Account};
use crate::error::Result;
use reinhardt_cockroach::postgres::PostgresRetryingExecutionStrategy;
use reinhardt_cockroach::relational::execute_with_retry;
use sqlx::PgPool;

pub async fn run(pool: &PgPool) -> Result<()> {
	let strategy = PostgresRetryingExecutionStrategy::default();

	for account in &[Account::new(1, 1000), Account::new(2, 250)] {
		execute_with_retry(&strategy, move |_| accounts::insert(pool, account)).await?;
	}
	let initial = accounts::all(pool).await?;
	accounts::print_balances("Initial balances", &initial);

	if let Some(first) = initial.first() {
		let id = first.id;
		execute_with_retry(&strategy, move |_| async move {
			sqlx::query("UPDATE \"Accounts\" SET \"Balance\" = $1 WHERE \"Id\" = $2")
				.bind(1500_i64)
				.bind(id)
				.execute(pool)
				.await
		})
		.await?;
	}

	let added = Account::new(3, 5000);
	let added = &added;
	execute_with_retry(&strategy, move |_| accounts::insert(pool, added)).await?;

	let large = accounts::with_balance_at_least(pool, 1500).await?;
	accounts::print_balances("Final balances", &large);
	Ok(())
}

//! The `Accounts` table and the queries the examples run against it.

use crate::error::Result;
use reinhardt_cockroach::relational::{EntityType, Model, Property, ValueType};
use sqlx::{PgConnection, PgPool};

pub const TABLE: &str = "Accounts";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Account {
	#[sqlx(rename = "Id")]
	pub id: i64,
	#[sqlx(rename = "Balance")]
	pub balance: i64,
}

impl Account {
	pub fn new(id: i64, balance: i64) -> Self {
		Self { id, balance }
	}
}

pub fn bank_model() -> Model {
	Model::new().with_entity_type(
		EntityType::new("Account")
			.with_table(TABLE)
			.with_property(Property::new("Id", ValueType::I64))
			.with_property(Property::new("Balance", ValueType::I64))
			.with_primary_key(["Id"]),
	)
}

pub async fn truncate(pool: &PgPool) -> Result<()> {
	sqlx::query("TRUNCATE TABLE \"Accounts\"").execute(pool).await?;
	Ok(())
}

pub async fn insert(pool: &PgPool, account: &Account) -> std::result::Result<(), sqlx::Error> {
	sqlx::query("INSERT INTO \"Accounts\" (\"Id\", \"Balance\") VALUES ($1, $2)")
		.bind(account.id)
		.bind(account.balance)
		.execute(pool)
		.await?;
	Ok(())
}

pub async fn all(pool: &PgPool) -> Result<Vec<Account>> {
	Ok(
		sqlx::query_as::<_, Account>("SELECT \"Id\", \"Balance\" FROM \"Accounts\" ORDER BY \"Id\"")
			.fetch_all(pool)
			.await?,
	)
}

pub async fn with_balance_at_least(pool: &PgPool, minimum: i64) -> Result<Vec<Account>> {
	Ok(sqlx::query_as::<_, Account>(
		"SELECT \"Id\", \"Balance\" FROM \"Accounts\" WHERE \"Balance\" >= $1 ORDER BY \"Id\"",
	)
	.bind(minimum)
	.fetch_all(pool)
	.await?)
}

pub async fn find(connection: &mut PgConnection, id: i64) -> Result<Option<Account>> {
	Ok(
		sqlx::query_as::<_, Account>("SELECT \"Id\", \"Balance\" FROM \"Accounts\" WHERE \"Id\" = $1")
			.bind(id)
			.fetch_optional(connection)
			.await?,
	)
}

pub async fn set_balance(connection: &mut PgConnection, id: i64, balance: i64) -> Result<()> {
	sqlx::query("UPDATE \"Accounts\" SET \"Balance\" = $1 WHERE \"Id\" = $2")
		.bind(balance)
		.bind(id)
		.execute(connection)
		.await?;
	Ok(())
}

pub fn print_balances(heading: &str, accounts: &[Account]) {
	println!("{}:", heading);
	for account in accounts {
		println!("\taccount {}: {}", account.id, account.balance);
	}
}

//! Bank account examples for CockroachDB.
//!
//! ```bash
//! DATABASE_CONNECTION=postgresql://root@localhost:26257/Bank?sslmode=disable \
//!     cargo run -p demo-bank -- transaction
//! ```

mod accounts;
mod error;
mod simple;
mod transaction;

use clap::{Parser, Subcommand};
use reinhardt_cockroach::cockroachdb::CockroachSettings;
use reinhardt_cockroach::postgres::services::postgres_options;
use reinhardt_cockroach::prelude::*;
use reinhardt_cockroach::relational::ConventionSetBuilder;
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONNECTION: &str = "postgresql://root@localhost:26257/Bank?sslmode=disable";

#[derive(Parser)]
#[command(name = "demo-bank")]
#[command(about = "Bank account examples against CockroachDB", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Option<Example>,

	/// Settings file (.toml or .json); overrides the environment
	#[arg(long, value_name = "PATH")]
	config: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Copy, Default)]
enum Example {
	/// Insert, update and query accounts
	#[default]
	Simple,
	/// Transfer funds with the restart-savepoint protocol
	Transaction,
}

fn settings(cli: &Cli) -> Result<CockroachSettings> {
	if let Some(path) = &cli.config {
		return CockroachSettings::from_file(path);
	}
	let lookup = |key: &str| std::env::var(key).ok();
	if lookup("DATABASE_URL").is_none() && lookup("DATABASE_CONNECTION").is_none() {
		return Ok(CockroachSettings {
			database_url: DEFAULT_CONNECTION.to_string(),
			..Default::default()
		});
	}
	Ok(CockroachSettings::from_lookup(lookup))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let cli = Cli::parse();
	let mut settings = settings(&cli)?;
	if settings.application_name.is_none() {
		settings.application_name = Some("demo-bank".to_string());
	}

	let mut builder = DbContextOptionsBuilder::new();
	settings.apply(&mut builder)?;
	let provider = builder.options().build_service_provider()?;

	let mut model = accounts::bank_model();
	let conventions = provider.convention_set_builder()?.create_convention_set();
	conventions.initialize_model(&mut model)?;
	conventions.finalize_model(&mut model)?;
	if provider
		.database_creator()?
		.ensure_created(&model.create_operations())
		.await?
	{
		tracing::info!("created the bank schema");
	}

	let connection = postgres_options(&provider)?.connection();
	let connect_options = connection
		.connect_options()
		.first()
		.cloned()
		.ok_or_else(|| anyhow::anyhow!("connection string lists no hosts"))?;
	let pool = PgPoolOptions::new()
		.max_connections(4)
		.connect_with(connect_options)
		.await?;
	accounts::truncate(&pool).await?;

	match cli.command.unwrap_or_default() {
		Example::Simple => simple::run(&pool).await?,
		Example::Transaction => transaction::run(&pool).await?,
	}

	pool.close().await;
	Ok(())
}

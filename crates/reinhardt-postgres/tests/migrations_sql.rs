//! SQL emitted by the PostgreSQL migrations generator.

use reinhardt_postgres::annotations::PostgresAnnotationNames;
use reinhardt_postgres::{PostgresMigrationsSqlGenerator, PostgresTypeMappingSource, Version};
use reinhardt_relational::annotations::Annotations;
use reinhardt_relational::commands::MigrationCommand;
use reinhardt_relational::error::RelationalError;
use reinhardt_relational::migrations::MigrationsSqlGenerator;
use reinhardt_relational::operations::*;
use reinhardt_relational::type_mapping::ValueType;
use rstest::{fixture, rstest};
use std::sync::Arc;

fn generator_for(version: Option<Version>) -> PostgresMigrationsSqlGenerator {
	PostgresMigrationsSqlGenerator::new(Arc::new(PostgresTypeMappingSource::new()), version).unwrap()
}

#[fixture]
fn generator() -> PostgresMigrationsSqlGenerator {
	generator_for(None)
}

fn generate(generator: &PostgresMigrationsSqlGenerator, operation: MigrationOperation) -> Vec<MigrationCommand> {
	generator.generate(&[operation], None).unwrap()
}

fn storage(name: &str) -> String {
	format!("{}{}", PostgresAnnotationNames::STORAGE_PARAMETER_PREFIX, name)
}

fn accounts_table() -> CreateTableOperation {
	CreateTableOperation {
		name: "accounts".to_string(),
		columns: vec![
			ColumnOperation::new("accounts", "id")
				.with_value_type(ValueType::I64)
				.with_annotation(
					PostgresAnnotationNames::VALUE_GENERATION_STRATEGY,
					"IdentityByDefaultColumn",
				),
			ColumnOperation::new("accounts", "balance").with_value_type(ValueType::I64),
		],
		primary_key: Some(PrimaryKeyOperation {
			name: "PK_accounts".to_string(),
			table: "accounts".to_string(),
			schema: None,
			columns: vec!["id".to_string()],
		}),
		..Default::default()
	}
}

#[rstest]
fn test_create_table(generator: PostgresMigrationsSqlGenerator) {
	let commands = generate(&generator, MigrationOperation::CreateTable(accounts_table()));
	assert_eq!(commands.len(), 1);
	assert_eq!(
		commands[0].command_text,
		"CREATE TABLE \"accounts\" (\n    \"id\" bigint GENERATED BY DEFAULT AS IDENTITY,\n    \"balance\" bigint NOT NULL,\n    CONSTRAINT \"PK_accounts\" PRIMARY KEY (\"id\")\n);\n"
	);
	assert!(!commands[0].transaction_suppressed);
}

#[rstest]
fn test_create_table_skips_system_columns(generator: PostgresMigrationsSqlGenerator) {
	let mut table = accounts_table();
	table
		.columns
		.push(ColumnOperation::new("accounts", "xmin").with_type("xid"));
	let commands = generate(&generator, MigrationOperation::CreateTable(table));
	assert!(!commands[0].command_text.contains("xmin"));
}

#[rstest]
fn test_create_table_with_storage_parameters_and_comments(generator: PostgresMigrationsSqlGenerator) {
	let mut table = accounts_table();
	table.comment = Some("Accounts".to_string());
	table.columns[1].comment = Some("Current balance".to_string());
	table.annotations = Annotations::new()
		.with(PostgresAnnotationNames::UNLOGGED_TABLE, true)
		.with(storage("fillfactor"), 70)
		.with(storage("autovacuum_enabled"), false);

	let commands = generate(&generator, MigrationOperation::CreateTable(table));
	let text = &commands[0].command_text;
	assert!(text.starts_with("CREATE UNLOGGED TABLE \"accounts\" (\n"));
	assert!(text.ends_with(
		")\nWITH (fillfactor=70, autovacuum_enabled=false);\nCOMMENT ON TABLE \"accounts\" IS 'Accounts';\nCOMMENT ON COLUMN \"accounts\".\"balance\" IS 'Current balance';\n"
	));
}

#[rstest]
fn test_create_table_comment_requires_termination(generator: PostgresMigrationsSqlGenerator) {
	let mut table = accounts_table();
	table.comment = Some("Accounts".to_string());
	let mut builder = reinhardt_relational::MigrationCommandListBuilder::new();
	let result = generator.create_table(&table, None, &mut builder, false);
	assert!(matches!(result, Err(RelationalError::InvalidOperation(_))));
}

#[rstest]
fn test_ensure_schema_uses_procedural_block(generator: PostgresMigrationsSqlGenerator) {
	let commands = generate(
		&generator,
		MigrationOperation::EnsureSchema(EnsureSchemaOperation {
			name: "bank".to_string(),
		}),
	);
	assert_eq!(
		commands[0].command_text,
		"DO $EF$\nBEGIN\n    IF NOT EXISTS(SELECT 1 FROM pg_namespace WHERE nspname = 'bank') THEN\n        CREATE SCHEMA \"bank\";\n    END IF;\nEND $EF$;\n"
	);
}

#[rstest]
fn test_ensure_public_schema_is_noop(generator: PostgresMigrationsSqlGenerator) {
	let commands = generate(
		&generator,
		MigrationOperation::EnsureSchema(EnsureSchemaOperation {
			name: "public".to_string(),
		}),
	);
	assert!(commands.is_empty());
}

#[rstest]
fn test_alter_table_storage_parameters_and_logging(generator: PostgresMigrationsSqlGenerator) {
	let operation = AlterTableOperation {
		name: "accounts".to_string(),
		annotations: Annotations::new()
			.with(storage("fillfactor"), 80)
			.with(PostgresAnnotationNames::UNLOGGED_TABLE, true),
		old_table: TableSnapshot {
			comment: None,
			annotations: Annotations::new()
				.with(storage("fillfactor"), 70)
				.with(storage("autovacuum_enabled"), false),
		},
		..Default::default()
	};

	let commands = generate(&generator, MigrationOperation::AlterTable(operation));
	assert_eq!(commands.len(), 1);
	assert_eq!(
		commands[0].command_text,
		"ALTER TABLE \"accounts\" SET (fillfactor=80);\nALTER TABLE \"accounts\" RESET (autovacuum_enabled);\nALTER TABLE \"accounts\" SET UNLOGGED;\n"
	);
	assert!(!commands[0].transaction_suppressed);
}

#[rstest]
fn test_alter_table_without_changes_emits_nothing(generator: PostgresMigrationsSqlGenerator) {
	let commands = generate(
		&generator,
		MigrationOperation::AlterTable(AlterTableOperation {
			name: "accounts".to_string(),
			..Default::default()
		}),
	);
	assert!(commands.is_empty());
}

#[rstest]
fn test_create_index_with_include_and_null_ordering(generator: PostgresMigrationsSqlGenerator) {
	let operation = CreateIndexOperation {
		name: "IX_accounts_balance".to_string(),
		table: "accounts".to_string(),
		columns: vec!["balance".to_string(), "id".to_string()],
		is_unique: true,
		is_descending: Some(vec![true, false]),
		null_sort_order: Some(vec![NullSortOrder::NullsLast, NullSortOrder::NullsLast]),
		include: vec!["owner".to_string()],
		filter: Some("\"balance\" > 0".to_string()),
		..Default::default()
	};

	let commands = generate(&generator, MigrationOperation::CreateIndex(operation));
	assert_eq!(
		commands[0].command_text,
		"CREATE UNIQUE INDEX \"IX_accounts_balance\" ON \"accounts\" (\"balance\" DESC NULLS LAST, \"id\" NULLS LAST) INCLUDE (\"owner\") WHERE \"balance\" > 0;\n"
	);
}

#[rstest]
fn test_concurrent_index_suppresses_transaction(generator: PostgresMigrationsSqlGenerator) {
	let operation = CreateIndexOperation {
		name: "IX_accounts_balance".to_string(),
		table: "accounts".to_string(),
		columns: vec!["balance".to_string()],
		concurrently: true,
		..Default::default()
	};
	let commands = generate(&generator, MigrationOperation::CreateIndex(operation));
	assert_eq!(
		commands[0].command_text,
		"CREATE INDEX CONCURRENTLY \"IX_accounts_balance\" ON \"accounts\" (\"balance\");\n"
	);
	assert!(commands[0].transaction_suppressed);
}

#[rstest]
fn test_include_requires_version_11() {
	let generator = generator_for(Some(Version::new(10, 0)));
	let operation = CreateIndexOperation {
		name: "IX".to_string(),
		table: "accounts".to_string(),
		columns: vec!["id".to_string()],
		include: vec!["balance".to_string()],
		..Default::default()
	};
	let result = generator.generate(&[MigrationOperation::CreateIndex(operation)], None);
	assert!(matches!(result, Err(RelationalError::NotSupported(_))));
}

fn computed_column(stored: Option<bool>) -> ColumnOperation {
	ColumnOperation::new("accounts", "total")
		.with_value_type(ValueType::I64)
		.with_computed_sql("\"a\" + \"b\"", stored)
}

#[rstest]
fn test_add_computed_column(generator: PostgresMigrationsSqlGenerator) {
	let commands = generate(&generator, MigrationOperation::AddColumn(computed_column(Some(true))));
	assert_eq!(
		commands[0].command_text,
		"ALTER TABLE \"accounts\" ADD \"total\" bigint GENERATED ALWAYS AS (\"a\" + \"b\") STORED NOT NULL;\n"
	);
}

#[rstest]
#[case(Some(Version::new(11, 0)), Some(true))]
#[case(None, Some(false))]
#[case(None, None)]
fn test_unsupported_computed_columns(#[case] version: Option<Version>, #[case] stored: Option<bool>) {
	let generator = generator_for(version);
	let result = generator.generate(&[MigrationOperation::AddColumn(computed_column(stored))], None);
	assert!(matches!(result, Err(RelationalError::NotSupported(_))));
}

#[rstest]
#[case("integer", "serial")]
#[case("bigint", "bigserial")]
#[case("smallint", "smallserial")]
fn test_serial_columns(#[case] column_type: &str, #[case] serial: &str) {
	let generator = generator_for(Some(Version::new(9, 6)));
	let column = ColumnOperation::new("accounts", "id")
		.with_type(column_type)
		.with_annotation(PostgresAnnotationNames::VALUE_GENERATION_STRATEGY, "SerialColumn");
	let commands = generate(&generator, MigrationOperation::AddColumn(column));
	assert_eq!(
		commands[0].command_text,
		format!("ALTER TABLE \"accounts\" ADD \"id\" {} NOT NULL;\n", serial)
	);
}

#[rstest]
fn test_alter_column_nullability_and_default(generator: PostgresMigrationsSqlGenerator) {
	let old = ColumnOperation::new("accounts", "balance").with_value_type(ValueType::I64);
	let new = old.clone().nullable(true).with_default_sql("0");
	let commands = generate(
		&generator,
		MigrationOperation::AlterColumn(AlterColumnOperation {
			column: new,
			old_column: old,
		}),
	);
	assert_eq!(commands.len(), 1);
	assert_eq!(
		commands[0].command_text,
		"ALTER TABLE \"accounts\" ALTER COLUMN \"balance\" DROP NOT NULL;\nALTER TABLE \"accounts\" ALTER COLUMN \"balance\" SET DEFAULT 0;\n"
	);
}

#[rstest]
fn test_alter_column_type(generator: PostgresMigrationsSqlGenerator) {
	let old = ColumnOperation::new("accounts", "balance").with_value_type(ValueType::I32);
	let new = ColumnOperation::new("accounts", "balance").with_value_type(ValueType::I64);
	let commands = generate(
		&generator,
		MigrationOperation::AlterColumn(AlterColumnOperation {
			column: new,
			old_column: old,
		}),
	);
	assert_eq!(
		commands[0].command_text,
		"ALTER TABLE \"accounts\" ALTER COLUMN \"balance\" TYPE bigint;\n"
	);
	assert!(!commands[0].transaction_suppressed);
}

#[rstest]
fn test_drop_database_revokes_connections_first(generator: PostgresMigrationsSqlGenerator) {
	let commands = generate(
		&generator,
		MigrationOperation::DropDatabase(DropDatabaseOperation {
			name: "bank".to_string(),
		}),
	);
	assert_eq!(
		commands,
		vec![
			MigrationCommand::new("REVOKE CONNECT ON DATABASE \"bank\" FROM PUBLIC;\n", true),
			MigrationCommand::new("DROP DATABASE \"bank\";\n", true),
		]
	);
}

#[rstest]
fn test_create_database_with_template(generator: PostgresMigrationsSqlGenerator) {
	let commands = generate(
		&generator,
		MigrationOperation::CreateDatabase(CreateDatabaseOperation {
			name: "bank".to_string(),
			template: Some("template0".to_string()),
			..Default::default()
		}),
	);
	assert_eq!(
		commands,
		vec![MigrationCommand::new(
			"CREATE DATABASE \"bank\" TEMPLATE \"template0\";\n",
			true
		)]
	);
}

#[rstest]
fn test_drop_constraints(generator: PostgresMigrationsSqlGenerator) {
	let drop = DropConstraintOperation {
		name: "FK_accounts_owners".to_string(),
		table: "accounts".to_string(),
		schema: Some("bank".to_string()),
	};
	let commands = generator
		.generate(
			&[
				MigrationOperation::DropForeignKey(drop.clone()),
				MigrationOperation::DropUniqueConstraint(drop),
			],
			None,
		)
		.unwrap();
	assert_eq!(commands.len(), 2);
	for command in &commands {
		assert_eq!(
			command.command_text,
			"ALTER TABLE \"bank\".\"accounts\" DROP CONSTRAINT \"FK_accounts_owners\";\n"
		);
		assert!(!command.transaction_suppressed);
	}
}

#[rstest]
fn test_missing_type_mapping_is_reported(generator: PostgresMigrationsSqlGenerator) {
	let column = ColumnOperation::new("accounts", "mystery");
	let result = generator.generate(&[MigrationOperation::AddColumn(column)], None);
	assert!(matches!(result, Err(RelationalError::MissingTypeMapping(_))));
}

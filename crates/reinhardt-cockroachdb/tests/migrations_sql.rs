//! SQL emitted by the CockroachDB migrations generator.

use reinhardt_cockroachdb::{CockroachMigrationsSqlGenerator, CockroachTypeMappingSource, InterleaveInParent};
use reinhardt_postgres::annotations::PostgresAnnotationNames;
use reinhardt_postgres::Version;
use reinhardt_relational::annotations::Annotations;
use reinhardt_relational::commands::{MigrationCommand, MigrationCommandListBuilder};
use reinhardt_relational::error::RelationalError;
use reinhardt_relational::migrations::MigrationsSqlGenerator;
use reinhardt_relational::operations::*;
use reinhardt_relational::type_mapping::ValueType;
use rstest::{fixture, rstest};
use std::sync::Arc;

#[fixture]
fn generator() -> CockroachMigrationsSqlGenerator {
	CockroachMigrationsSqlGenerator::new(Arc::new(CockroachTypeMappingSource::new()), None).unwrap()
}

fn generate(generator: &CockroachMigrationsSqlGenerator, operation: MigrationOperation) -> Vec<MigrationCommand> {
	generator.generate(&[operation], None).unwrap()
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

fn drop_constraint(name: &str) -> DropConstraintOperation {
	DropConstraintOperation {
		name: name.to_string(),
		table: "accounts".to_string(),
		schema: None,
	}
}

#[rstest]
fn test_create_table_runs_outside_transaction(generator: CockroachMigrationsSqlGenerator) {
	let commands = generate(&generator, MigrationOperation::CreateTable(accounts_table()));
	assert_eq!(
		commands,
		vec![MigrationCommand::new(
			"CREATE TABLE \"accounts\" (\n    \"id\" bigint GENERATED BY DEFAULT AS IDENTITY,\n    \"balance\" bigint NOT NULL,\n    CONSTRAINT \"PK_accounts\" PRIMARY KEY (\"id\")\n);\n",
			true
		)]
	);
}

#[rstest]
fn test_create_table_interleaved_in_parent(generator: CockroachMigrationsSqlGenerator) {
	let mut annotations = Annotations::new().with(
		format!("{}fillfactor", PostgresAnnotationNames::STORAGE_PARAMETER_PREFIX),
		70,
	);
	InterleaveInParent::new("customers", ["customer_id"])
		.with_parent_schema("sales")
		.apply(&mut annotations)
		.unwrap();
	let table = CreateTableOperation {
		name: "orders".to_string(),
		columns: vec![
			ColumnOperation::new("orders", "customer_id").with_value_type(ValueType::I64),
			ColumnOperation::new("orders", "id").with_value_type(ValueType::I64),
		],
		primary_key: Some(PrimaryKeyOperation {
			name: "PK_orders".to_string(),
			table: "orders".to_string(),
			schema: None,
			columns: vec!["customer_id".to_string(), "id".to_string()],
		}),
		comment: Some("Orders".to_string()),
		annotations,
		..Default::default()
	};

	let commands = generate(&generator, MigrationOperation::CreateTable(table));
	assert_eq!(commands.len(), 1);
	assert_eq!(
		commands[0].command_text,
		"CREATE TABLE \"orders\" (\n    \"customer_id\" bigint NOT NULL,\n    \"id\" bigint NOT NULL,\n    CONSTRAINT \"PK_orders\" PRIMARY KEY (\"customer_id\", \"id\")\n)\nINTERLEAVE IN PARENT \"sales\".\"customers\" (\"customer_id\")\nWITH (fillfactor=70);\nCOMMENT ON TABLE \"orders\" IS 'Orders';\n"
	);
	assert!(commands[0].transaction_suppressed);
}

#[rstest]
fn test_create_table_comment_requires_termination(generator: CockroachMigrationsSqlGenerator) {
	let mut table = accounts_table();
	table.comment = Some("Accounts".to_string());
	let mut builder = MigrationCommandListBuilder::new();
	let result = generator.create_table(&table, None, &mut builder, false);
	assert!(matches!(result, Err(RelationalError::InvalidOperation(_))));
}

#[rstest]
fn test_system_columns_are_never_touched(generator: CockroachMigrationsSqlGenerator) {
	let mut table = accounts_table();
	table.columns.push(
		ColumnOperation::new("accounts", "crdb_internal_mvcc_timestamp").with_type("decimal"),
	);
	let commands = generate(&generator, MigrationOperation::CreateTable(table));
	assert!(!commands[0].command_text.contains("crdb_internal"));

	let drop = DropColumnOperation {
		name: "crdb_internal_mvcc_timestamp".to_string(),
		table: "accounts".to_string(),
		schema: None,
	};
	assert!(generate(&generator, MigrationOperation::DropColumn(drop)).is_empty());
}

#[rstest]
fn test_drop_column_runs_outside_transaction(generator: CockroachMigrationsSqlGenerator) {
	let drop = DropColumnOperation {
		name: "balance".to_string(),
		table: "accounts".to_string(),
		schema: Some("bank".to_string()),
	};
	assert_eq!(
		generate(&generator, MigrationOperation::DropColumn(drop)),
		vec![MigrationCommand::new(
			"ALTER TABLE \"bank\".\"accounts\" DROP COLUMN \"balance\";\n",
			true
		)]
	);
}

#[rstest]
#[case("public", vec![])]
#[case("bank", vec![MigrationCommand::new("CREATE SCHEMA IF NOT EXISTS \"bank\";\n", false)])]
fn test_ensure_schema(
	generator: CockroachMigrationsSqlGenerator,
	#[case] schema: &str,
	#[case] expected: Vec<MigrationCommand>,
) {
	let commands = generate(
		&generator,
		MigrationOperation::EnsureSchema(EnsureSchemaOperation {
			name: schema.to_string(),
		}),
	);
	assert_eq!(commands, expected);
}

#[rstest]
fn test_alter_table_runs_outside_transaction(generator: CockroachMigrationsSqlGenerator) {
	let operation = AlterTableOperation {
		name: "accounts".to_string(),
		comment: Some("Bank accounts".to_string()),
		..Default::default()
	};
	assert_eq!(
		generate(&generator, MigrationOperation::AlterTable(operation)),
		vec![MigrationCommand::new(
			"COMMENT ON TABLE \"accounts\" IS 'Bank accounts';\n",
			true
		)]
	);

	let unchanged = AlterTableOperation {
		name: "accounts".to_string(),
		..Default::default()
	};
	assert!(generate(&generator, MigrationOperation::AlterTable(unchanged)).is_empty());
}

#[rstest]
fn test_alter_column_type_is_split_out(generator: CockroachMigrationsSqlGenerator) {
	let old = ColumnOperation::new("accounts", "balance").with_value_type(ValueType::I32);
	let new = ColumnOperation::new("accounts", "balance")
		.with_value_type(ValueType::I64)
		.nullable(true);
	let commands = generate(
		&generator,
		MigrationOperation::AlterColumn(AlterColumnOperation {
			column: new,
			old_column: old,
		}),
	);
	assert_eq!(
		commands,
		vec![
			MigrationCommand::new("SET enable_experimental_alter_column_type_general = true;\n", true),
			MigrationCommand::new("ALTER TABLE \"accounts\" ALTER COLUMN \"balance\" TYPE bigint;\n", true),
			MigrationCommand::new("ALTER TABLE \"accounts\" ALTER COLUMN \"balance\" DROP NOT NULL;\n", false),
		]
	);
}

#[rstest]
fn test_alter_column_collation_is_split_out(generator: CockroachMigrationsSqlGenerator) {
	let old = ColumnOperation::new("accounts", "owner").with_type("text");
	let new = old.clone().with_collation("en-US");
	let commands = generate(
		&generator,
		MigrationOperation::AlterColumn(AlterColumnOperation {
			column: new,
			old_column: old,
		}),
	);
	assert_eq!(
		commands,
		vec![
			MigrationCommand::new("SET enable_experimental_alter_column_type_general = true;\n", true),
			MigrationCommand::new(
				"ALTER TABLE \"accounts\" ALTER COLUMN \"owner\" TYPE text COLLATE \"en-US\";\n",
				true
			),
		]
	);
}

#[rstest]
fn test_alter_column_without_type_change_delegates(generator: CockroachMigrationsSqlGenerator) {
	let old = ColumnOperation::new("accounts", "balance").with_value_type(ValueType::I64);
	let new = old.clone().with_default_sql("0");
	let commands = generate(
		&generator,
		MigrationOperation::AlterColumn(AlterColumnOperation {
			column: new,
			old_column: old,
		}),
	);
	assert_eq!(
		commands,
		vec![MigrationCommand::new(
			"ALTER TABLE \"accounts\" ALTER COLUMN \"balance\" SET DEFAULT 0;\n",
			false
		)]
	);
}

#[rstest]
fn test_constraint_changes_run_outside_transaction(generator: CockroachMigrationsSqlGenerator) {
	let commands = generator
		.generate(
			&[
				MigrationOperation::DropForeignKey(drop_constraint("FK_accounts_owners")),
				MigrationOperation::DropCheckConstraint(drop_constraint("CK_balance")),
				MigrationOperation::DropUniqueConstraint(drop_constraint("UQ_accounts_number")),
				MigrationOperation::AddPrimaryKey(PrimaryKeyOperation {
					name: "PK_accounts".to_string(),
					table: "accounts".to_string(),
					schema: None,
					columns: vec!["id".to_string()],
				}),
			],
			None,
		)
		.unwrap();

	let texts: Vec<&str> = commands.iter().map(|c| c.command_text.as_str()).collect();
	assert_eq!(
		texts,
		vec![
			"ALTER TABLE \"accounts\" DROP CONSTRAINT \"FK_accounts_owners\";\n",
			"ALTER TABLE \"accounts\" DROP CONSTRAINT \"CK_balance\";\n",
			"DROP INDEX \"UQ_accounts_number\" CASCADE;\n",
			"ALTER TABLE \"accounts\" ADD CONSTRAINT \"PK_accounts\" PRIMARY KEY (\"id\");\n",
		]
	);
	assert!(commands.iter().all(|c| c.transaction_suppressed));
}

#[rstest]
fn test_computed_column_casts_expression(generator: CockroachMigrationsSqlGenerator) {
	let column = ColumnOperation::new("accounts", "total")
		.with_value_type(ValueType::I64)
		.with_collation("C")
		.with_computed_sql("\"a\" + \"b\"", Some(true));
	let commands = generate(&generator, MigrationOperation::AddColumn(column));
	assert_eq!(
		commands[0].command_text,
		"ALTER TABLE \"accounts\" ADD \"total\" bigint COLLATE \"C\" GENERATED ALWAYS AS ((\"a\" + \"b\")::bigint) STORED NOT NULL;\n"
	);
}

#[rstest]
#[case(Some(Version::new(11, 0)), Some(true))]
#[case(None, Some(false))]
fn test_unsupported_computed_columns(#[case] version: Option<Version>, #[case] stored: Option<bool>) {
	let generator =
		CockroachMigrationsSqlGenerator::new(Arc::new(CockroachTypeMappingSource::new()), version).unwrap();
	let column = ColumnOperation::new("accounts", "total")
		.with_value_type(ValueType::I64)
		.with_computed_sql("1", stored);
	let result = generator.generate(&[MigrationOperation::AddColumn(column)], None);
	assert!(matches!(result, Err(RelationalError::NotSupported(_))));
}

#[rstest]
fn test_index_stores_included_columns(generator: CockroachMigrationsSqlGenerator) {
	let operation = CreateIndexOperation {
		name: "IX_accounts_owner".to_string(),
		table: "accounts".to_string(),
		columns: vec!["owner".to_string()],
		include: vec!["balance".to_string()],
		..Default::default()
	};
	let commands = generate(&generator, MigrationOperation::CreateIndex(operation));
	assert_eq!(
		commands[0].command_text,
		"CREATE INDEX \"IX_accounts_owner\" ON \"accounts\" (\"owner\") STORING (\"balance\");\n"
	);
}

#[rstest]
fn test_create_database_ignores_template_and_tablespace(generator: CockroachMigrationsSqlGenerator) {
	let commands = generate(
		&generator,
		MigrationOperation::CreateDatabase(CreateDatabaseOperation {
			name: "bank".to_string(),
			template: Some("template0".to_string()),
			tablespace: Some("fast".to_string()),
			collation: None,
		}),
	);
	assert_eq!(commands, vec![MigrationCommand::new("CREATE DATABASE \"bank\";\n", true)]);
}

#[rstest]
fn test_drop_database(generator: CockroachMigrationsSqlGenerator) {
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

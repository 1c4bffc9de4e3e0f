//! Database creator and model factory against a real CockroachDB node.
//!
//! Requires Docker. Run with `cargo test --features integration-tests`.

#![cfg(feature = "integration-tests")]

use reinhardt_cockroachdb::{CockroachDesignTimeServices, UseCockroach};
use reinhardt_relational::model::{EntityType, Model, Property};
use reinhardt_relational::options::DbContextOptionsBuilder;
use reinhardt_relational::scaffolding::ModelFactoryOptions;
use reinhardt_relational::services::{ServiceCollection, ServiceProvider};
use reinhardt_relational::type_mapping::ValueType;
use rstest::*;
use serial_test::serial;
use testcontainers::{
	ContainerAsync, GenericImage, ImageExt,
	core::{IntoContainerPort, WaitFor},
	runners::AsyncRunner,
};

async fn cockroachdb_container() -> (ContainerAsync<GenericImage>, u16) {
	let container = GenericImage::new("cockroachdb/cockroach", "v23.1.0")
		.with_exposed_port(26257.tcp())
		.with_wait_for(WaitFor::message_on_stderr("initialized new cluster"))
		.with_cmd(vec![
			"start-single-node".to_string(),
			"--insecure".to_string(),
			"--store=type=mem,size=1GiB".to_string(),
		])
		.start()
		.await
		.expect("Failed to start CockroachDB container");
	let port = container
		.get_host_port_ipv4(26257)
		.await
		.expect("Failed to get CockroachDB port");
	(container, port)
}

fn bank_model() -> Model {
	Model::new().with_entity_type(
		EntityType::new("Account")
			.with_table("accounts")
			.with_property(Property::new("Id", ValueType::I64))
			.with_property(Property::new("Balance", ValueType::Decimal))
			.with_primary_key(["Id"]),
	)
}

fn provider(port: u16) -> ServiceProvider {
	let url = format!("postgresql://root@127.0.0.1:{}/itest_bank?sslmode=disable", port);
	let mut builder = DbContextOptionsBuilder::new();
	builder
		.use_cockroach_with(&url, |crdb| {
			crdb.application_name("reinhardt-cockroachdb-tests");
		})
		.expect("valid connection string");
	builder.options().build_service_provider().expect("provider")
}

#[rstest]
#[tokio::test]
#[serial(cockroachdb)]
async fn test_creator_lifecycle() {
	let (_container, port) = cockroachdb_container().await;
	let provider = provider(port);
	let creator = provider.database_creator().unwrap();

	assert!(!creator.exists().await.unwrap());
	creator.create().await.unwrap();
	assert!(creator.exists().await.unwrap());
	assert!(!creator.has_tables().await.unwrap());

	creator
		.create_tables(&bank_model().create_operations())
		.await
		.unwrap();
	assert!(creator.has_tables().await.unwrap());
	assert!(!creator.ensure_created(&[]).await.unwrap());

	creator.delete().await.unwrap();
	assert!(!creator.exists().await.unwrap());
	assert!(!creator.ensure_deleted().await.unwrap());
}

#[rstest]
#[tokio::test]
#[serial(cockroachdb)]
async fn test_model_factory_reads_created_tables() {
	let (_container, port) = cockroachdb_container().await;
	let creator = provider(port).database_creator().unwrap();
	assert!(creator.ensure_created(&bank_model().create_operations()).await.unwrap());

	let mut services = ServiceCollection::new();
	CockroachDesignTimeServices.configure_design_time_services(&mut services);
	let design = ServiceProvider::new(provider(port).options().clone(), services);
	let model = design
		.database_model_factory()
		.unwrap()
		.create(&ModelFactoryOptions::default())
		.await
		.unwrap();

	let accounts = model.table(Some("public"), "accounts").unwrap();
	let names: Vec<_> = accounts.columns.iter().map(|c| c.name.as_str()).collect();
	assert_eq!(names, vec!["Id", "Balance"]);
	let key = accounts.primary_key.as_ref().unwrap();
	assert_eq!(key.columns, vec!["Id".to_string()]);
	assert!(model.tables.iter().all(|t| t.schema.as_deref() == Some("public")));
}

// Integration tests for SeedLoader
// Loads CSV fixtures from a temp directory into the test database

mod common;

use raw_data_loader::db::TableRepository;
use raw_data_loader::importers::CsvImportError;
use raw_data_loader::services::{LoadError, SeedLoader, SEED_TABLES};
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CUSTOMERS_CSV: &str = "\
customer_id,zipcode,city,state_code,datetime_created,datetime_updated
82,01310,sao paulo,SP,2017-10-01 00:00:00,2017-10-01 00:00:00
83,20040,rio de janeiro,RJ,2017-10-02 00:00:00,2017-10-02 00:00:00
84,30110,belo horizonte,MG,2017-10-03 00:00:00,2017-10-03 00:00:00
";

const ORDERS_CSV: &str = "\
order_id,customer_id,order_status,order_purchase_timestamp
1,82,delivered,2017-10-02 10:56:33
2,83,shipped,2017-10-03 11:00:00
";

const STATE_CSV: &str = "\
state_code,state_name
SP,Sao Paulo
RJ,Rio de Janeiro
MG,Minas Gerais
RS,Rio Grande do Sul
";

fn write_seed_files(dir: &Path, customers: &str, orders: &str, state: &str) {
    fs::write(dir.join("customers.csv"), customers).unwrap();
    fs::write(dir.join("orders.csv"), orders).unwrap();
    fs::write(dir.join("state.csv"), state).unwrap();
}

async fn drop_seed_tables(pool: &sqlx::PgPool) {
    for table in SEED_TABLES {
        common::drop_table(pool, table).await;
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_load_all_creates_three_tables() {
    let pool = common::test_pool().await;
    drop_seed_tables(&pool).await;

    let dir = TempDir::new().unwrap();
    write_seed_files(dir.path(), CUSTOMERS_CSV, ORDERS_CSV, STATE_CSV);

    let report = SeedLoader::new(pool.clone(), dir.path())
        .load_all()
        .await
        .unwrap();

    let loaded: Vec<(&str, usize)> = report
        .tables
        .iter()
        .map(|t| (t.table.as_str(), t.rows))
        .collect();
    assert_eq!(loaded, vec![("customers", 3), ("orders", 2), ("state", 4)]);
    assert_eq!(report.total_rows(), 9);

    let repo = TableRepository::new(pool.clone());
    assert_eq!(repo.count_rows("customers").await.unwrap(), 3);
    assert_eq!(repo.count_rows("orders").await.unwrap(), 2);
    assert_eq!(repo.count_rows("state").await.unwrap(), 4);
    assert_eq!(
        repo.column_names("customers").await.unwrap(),
        vec![
            "customer_id",
            "zipcode",
            "city",
            "state_code",
            "datetime_created",
            "datetime_updated"
        ]
    );
    assert_eq!(
        repo.column_names("state").await.unwrap(),
        vec!["state_code", "state_name"]
    );

    drop_seed_tables(&pool).await;
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_reload_replaces_previous_rows() {
    let pool = common::test_pool().await;
    drop_seed_tables(&pool).await;

    let dir = TempDir::new().unwrap();
    write_seed_files(dir.path(), CUSTOMERS_CSV, ORDERS_CSV, STATE_CSV);
    let loader = SeedLoader::new(pool.clone(), dir.path());
    loader.load_all().await.unwrap();

    let new_state = "state_code,state_name\nBA,Bahia\n";
    write_seed_files(dir.path(), CUSTOMERS_CSV, ORDERS_CSV, new_state);
    loader.load_all().await.unwrap();

    let codes: Vec<String> = sqlx::query_scalar("SELECT state_code FROM state")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(codes, vec!["BA".to_string()]);

    drop_seed_tables(&pool).await;
}

#[tokio::test]
#[serial]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_missing_file_writes_nothing() {
    let pool = common::test_pool().await;
    drop_seed_tables(&pool).await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("customers.csv"), CUSTOMERS_CSV).unwrap();
    fs::write(dir.path().join("orders.csv"), ORDERS_CSV).unwrap();

    let err = SeedLoader::new(pool.clone(), dir.path())
        .load_all()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LoadError::Import(CsvImportError::Io { ref path, .. }) if path.ends_with("state.csv")
    ));

    // customers.csv parsed fine but must not have been written
    let repo = TableRepository::new(pool.clone());
    assert!(repo.describe_table("customers").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_file_reports_path() {
    // Parsing fails before any write, so no live server is needed
    let pool = common::lazy_pool();

    let dir = TempDir::new().unwrap();
    write_seed_files(
        dir.path(),
        CUSTOMERS_CSV,
        "order_id,customer_id\n1,82,unexpected\n",
        STATE_CSV,
    );

    let err = SeedLoader::new(pool, dir.path())
        .load_all()
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("orders.csv"), "unexpected message: {message}");
    assert!(message.contains("expected 2 fields in line 2, saw 3"));
}

#[tokio::test]
async fn test_read_datasets_in_load_order() {
    let pool = common::lazy_pool();

    let dir = TempDir::new().unwrap();
    write_seed_files(dir.path(), CUSTOMERS_CSV, ORDERS_CSV, STATE_CSV);
    let loader = SeedLoader::new(pool, dir.path());
    assert_eq!(loader.seed_path("orders"), dir.path().join("orders.csv"));

    let datasets = loader.read_datasets().unwrap();
    let summary: Vec<(&str, usize)> = datasets
        .iter()
        .map(|(table, dataset)| (*table, dataset.row_count()))
        .collect();
    assert_eq!(summary, vec![("customers", 3), ("orders", 2), ("state", 4)]);
}

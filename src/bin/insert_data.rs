use clap::Parser;
use raw_data_loader::config::{DbArgs, DbConfig, DEFAULT_RAW_DATA_DIR};
use raw_data_loader::db;
use raw_data_loader::services::{LoadError, LoadReport, SeedLoader};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "insert-data")]
#[command(about = "Load customers.csv, orders.csv and state.csv into PostgreSQL, replacing existing tables", long_about = None)]
struct Cli {
    /// Directory containing the raw seed CSV files
    #[arg(long, env = "RAW_DATA_DIR", default_value = DEFAULT_RAW_DATA_DIR)]
    data_dir: PathBuf,

    #[command(flatten)]
    db: DbArgs,
}

async fn run(cli: Cli) -> Result<LoadReport, LoadError> {
    let config = DbConfig::from(cli.db);
    info!("Using database {}", config.redacted_url());
    let options = config.connect_options()?;
    let pool = db::connect(options).await?;

    SeedLoader::new(pool, cli.data_dir).load_all().await
}

#[tokio::main]
async fn main() {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Failures are reported but never change the exit status
    match run(cli).await {
        Ok(report) => {
            for table in &report.tables {
                info!(
                    "{}: {} rows, {} columns",
                    table.table, table.rows, table.columns
                );
            }
            println!("Data inserted successfully!");
        }
        Err(e) => {
            error!("Seed load failed: {}", e);
            println!("Error: {e}");
        }
    }
}

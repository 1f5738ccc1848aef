use clap::Parser;
use raw_data_loader::config::{DbArgs, DbConfig};
use raw_data_loader::db;
use raw_data_loader::services::{CustomerUpdater, UpdateError};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "update-data")]
#[command(about = "Apply the fixed customer address corrections in one transaction", long_about = None)]
struct Cli {
    #[command(flatten)]
    db: DbArgs,
}

async fn update_records(cli: Cli) -> Result<u64, UpdateError> {
    let config = DbConfig::from(cli.db);
    info!("Using database {}", config.redacted_url());
    let pool = db::connect(config.connect_options()?).await?;

    CustomerUpdater::new(pool).update_records().await
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match update_records(cli).await {
        Ok(affected) => {
            info!("{} customer rows updated", affected);
            println!("Records updated successfully.");
        }
        Err(e) => {
            error!("Customer update rolled back: {}", e);
            println!("An error occurred while updating records: {e}");
        }
    }
}

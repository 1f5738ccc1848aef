use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::db::DbError;

/// Open a small connection pool and check that the server answers
#[instrument(skip(options))]
pub async fn connect(options: PgConnectOptions) -> Result<PgPool, DbError> {
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    info!("Database connection established");
    Ok(pool)
}

use sqlx::PgPool;
use tracing::{info, instrument};

use crate::config::ConfigError;
use crate::db::{CustomerRepository, DbError};

/// Address corrections for customers 82 to 86, applied as one batch
pub const CUSTOMER_UPDATES: [&str; 5] = [
    "UPDATE customers SET zipcode = '24120', city = 'niteroi', state_code = 'RJ', datetime_created = '2017-10-18 00:00:00', datetime_updated = '2017-10-18 00:10:00' WHERE customer_id = 82",
    "UPDATE customers SET zipcode = '24120', city = 'niteroi', state_code = 'RJ', datetime_created = '2017-10-18 00:00:00', datetime_updated = '2017-10-18 01:20:00' WHERE customer_id = 83",
    "UPDATE customers SET zipcode = '24120', city = 'niteroi', state_code = 'RJ', datetime_created = '2017-10-18 00:00:00', datetime_updated = '2017-10-18 02:00:00' WHERE customer_id = 84",
    "UPDATE customers SET zipcode = '24120', city = 'niteroi', state_code = 'RJ', datetime_created = '2017-10-18 00:00:00', datetime_updated = '2017-10-18 03:00:00' WHERE customer_id = 85",
    "UPDATE customers SET zipcode = '24120', city = 'niteroi', state_code = 'RJ', datetime_created = '2017-10-18 00:00:00', datetime_updated = '2017-10-18 04:00:00' WHERE customer_id = 86",
];

/// Errors from the database layer; configuration problems count as
/// connection failures here
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Database(#[from] DbError),
}

#[derive(Clone)]
pub struct CustomerUpdater {
    customer_repo: CustomerRepository,
}

impl CustomerUpdater {
    pub fn new(pool: PgPool) -> Self {
        Self {
            customer_repo: CustomerRepository::new(pool),
        }
    }

    /// Apply [`CUSTOMER_UPDATES`] all-or-nothing
    #[instrument(skip(self))]
    pub async fn update_records(&self) -> Result<u64, UpdateError> {
        info!("Applying {} customer updates", CUSTOMER_UPDATES.len());
        let affected = self.customer_repo.apply_updates(&CUSTOMER_UPDATES).await?;
        Ok(affected)
    }
}

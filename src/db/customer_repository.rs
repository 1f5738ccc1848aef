use sqlx::PgPool;
use tracing::{debug, info, instrument};

use crate::db::DbError;

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run literal statements in a single transaction.
    ///
    /// The transaction is only committed once every statement has succeeded;
    /// on the first error it is dropped, which rolls back the earlier ones.
    /// Returns the total number of rows affected.
    #[instrument(skip(self, statements), fields(count = statements.len()))]
    pub async fn apply_updates(&self, statements: &[&str]) -> Result<u64, DbError> {
        debug!(
            "Beginning transaction to apply {} statements",
            statements.len()
        );
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for (idx, statement) in statements.iter().enumerate() {
            let result = sqlx::query(statement).execute(&mut *tx).await?;
            debug!(
                "Statement {} affected {} rows",
                idx + 1,
                result.rows_affected()
            );
            affected += result.rows_affected();
        }

        tx.commit().await?;
        info!(
            "Committed {} statements, {} rows affected",
            statements.len(),
            affected
        );
        Ok(affected)
    }
}

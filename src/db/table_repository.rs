use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};

use crate::db::{DbError, TableColumn};
use crate::importers::{Cell, Column, Dataset};

/// PostgreSQL rejects statements with more bind parameters than this
const MAX_BIND_PARAMS: usize = 65_535;

/// Writes whole datasets as tables, replacing whatever was there before
#[derive(Clone)]
pub struct TableRepository {
    pool: PgPool,
}

impl TableRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Drop `table` if it exists, recreate it from the dataset's columns and
    /// insert every row. All of it happens in one transaction.
    #[instrument(skip(self, dataset), fields(rows = dataset.row_count(), columns = dataset.columns.len()))]
    pub async fn replace_table(&self, table: &str, dataset: &Dataset) -> Result<usize, DbError> {
        let table_ident = quote_identifier(table)?;
        let create_sql = create_table_sql(&table_ident, &dataset.columns)?;
        let column_list = dataset
            .columns
            .iter()
            .map(|c| quote_identifier(&c.name))
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {table_ident}"))
            .execute(&mut *tx)
            .await?;
        debug!("Creating table: {}", create_sql);
        sqlx::query(&create_sql).execute(&mut *tx).await?;

        let mut inserted = 0;
        if !dataset.columns.is_empty() {
            let rows_per_statement = (MAX_BIND_PARAMS / dataset.columns.len()).max(1);
            for chunk in dataset.rows.chunks(rows_per_statement) {
                let mut builder: QueryBuilder<Postgres> =
                    QueryBuilder::new(format!("INSERT INTO {table_ident} ({column_list}) "));
                builder.push_values(chunk, |mut values, row| {
                    for cell in row {
                        match cell {
                            Cell::BigInt(v) => values.push_bind(*v),
                            Cell::Double(v) => values.push_bind(*v),
                            Cell::Boolean(v) => values.push_bind(*v),
                            Cell::Text(v) => values.push_bind(v.clone()),
                        };
                    }
                });

                let result = builder.build().execute(&mut *tx).await?;
                inserted += result.rows_affected() as usize;
                debug!("Inserted chunk of {} rows into {}", chunk.len(), table);
            }
        }

        tx.commit().await?;
        info!("Replaced table {} with {} rows", table, inserted);
        Ok(inserted)
    }

    #[instrument(skip(self))]
    pub async fn count_rows(&self, table: &str) -> Result<i64, DbError> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table)?);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Columns of `table` in the current schema, in definition order.
    /// Empty when the table does not exist.
    #[instrument(skip(self))]
    pub async fn describe_table(&self, table: &str) -> Result<Vec<TableColumn>, DbError> {
        let columns = sqlx::query_as::<_, TableColumn>(
            r#"
            SELECT column_name::text AS column_name, data_type::text AS data_type
            FROM information_schema.columns
            WHERE table_schema = current_schema() AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        Ok(columns)
    }

    pub async fn column_names(&self, table: &str) -> Result<Vec<String>, DbError> {
        Ok(self
            .describe_table(table)
            .await?
            .into_iter()
            .map(|c| c.column_name)
            .collect())
    }
}

/// Double-quote an identifier so CSV headers keep their exact spelling
pub fn quote_identifier(name: &str) -> Result<String, DbError> {
    if name.is_empty() || name.contains('\0') {
        return Err(DbError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

fn create_table_sql(table_ident: &str, columns: &[Column]) -> Result<String, DbError> {
    let definitions = columns
        .iter()
        .map(|c| -> Result<String, DbError> {
            Ok(format!("{} {}", quote_identifier(&c.name)?, c.column_type.sql_type()))
        })
        .collect::<Result<Vec<String>, DbError>>()?;
    Ok(format!("CREATE TABLE {} ({})", table_ident, definitions.join(", ")))
}

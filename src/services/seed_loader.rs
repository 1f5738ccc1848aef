use sqlx::PgPool;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, instrument};

use crate::config::ConfigError;
use crate::db::{DbError, TableRepository};
use crate::importers::{CsvImportError, CsvImporter, Dataset};

/// Tables loaded by the seeder, each from `<table>.csv`, in load order
pub const SEED_TABLES: [&str; 3] = ["customers", "orders", "state"];

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Import(#[from] CsvImportError),

    #[error(transparent)]
    Database(#[from] DbError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLoad {
    pub table: String,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub tables: Vec<TableLoad>,
}

impl LoadReport {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Loads the raw CSV seed files into full-replace tables
#[derive(Clone)]
pub struct SeedLoader {
    data_dir: PathBuf,
    table_repo: TableRepository,
}

impl SeedLoader {
    pub fn new(pool: PgPool, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            table_repo: TableRepository::new(pool),
        }
    }

    pub fn seed_path(&self, table: &str) -> PathBuf {
        self.data_dir.join(format!("{table}.csv"))
    }

    /// Parse every seed file. Nothing is written unless all of them parse.
    pub fn read_datasets(&self) -> Result<Vec<(&'static str, Dataset)>, CsvImportError> {
        SEED_TABLES
            .iter()
            .map(|table| -> Result<(&'static str, Dataset), CsvImportError> {
                let dataset = CsvImporter::new(self.seed_path(table)).read_dataset()?;
                Ok((*table, dataset))
            })
            .collect()
    }

    /// Read all seed files, then replace each table in turn.
    ///
    /// Every table is replaced in its own transaction, so a failure on a
    /// later table leaves the earlier ones loaded.
    #[instrument(skip(self), fields(data_dir = %self.data_dir.display()))]
    pub async fn load_all(&self) -> Result<LoadReport, LoadError> {
        let start_time = Instant::now();
        let datasets = self.read_datasets()?;

        let mut report = LoadReport::default();
        for (table, dataset) in &datasets {
            let rows = self.table_repo.replace_table(table, dataset).await?;
            report.tables.push(TableLoad {
                table: table.to_string(),
                rows,
                columns: dataset.columns.len(),
            });
        }

        info!(
            "Loaded {} rows into {} tables in {:.2}s",
            report.total_rows(),
            report.tables.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(report)
    }
}

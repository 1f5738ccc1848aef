//! Readers for the raw seed data files

pub mod csv_importer;

pub use csv_importer::{Cell, Column, ColumnType, CsvImportError, CsvImporter, Dataset};

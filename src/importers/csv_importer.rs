use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Cell contents read as NULL, same set a dataframe CSV reader treats as missing
pub const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_VALUES: &[&str] = &["True", "TRUE", "true"];
const FALSE_VALUES: &[&str] = &["False", "FALSE", "false"];

#[derive(Error, Debug)]
pub enum CsvImportError {
    #[error("Failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("No columns to parse from file {}", path.display())]
    EmptyFile { path: PathBuf },

    #[error("Error tokenizing data in {}: expected {expected} fields in line {line}, saw {found}", path.display())]
    RowTooLong {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// SQL type a CSV column is written as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Double,
    Boolean,
    Text,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::BigInt => "BIGINT",
            ColumnType::Double => "DOUBLE PRECISION",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Text => "TEXT",
        }
    }
}

/// A single typed value; `None` is SQL NULL
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    BigInt(Option<i64>),
    Double(Option<f64>),
    Boolean(Option<bool>),
    Text(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

/// Header plus rows of a CSV file, with every cell converted to its column's type
#[derive(Debug, Clone)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Reader for the raw seed CSV files (header row followed by records)
pub struct CsvImporter {
    path: PathBuf,
}

impl CsvImporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read_dataset(&self) -> Result<Dataset, CsvImportError> {
        info!("Reading CSV file: {}", self.path.display());
        let file = File::open(&self.path).map_err(|source| CsvImportError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.read_from(file)
    }

    /// Parse CSV content from any reader; `self.path` is only used in errors
    pub fn read_from<R: Read>(&self, input: R) -> Result<Dataset, CsvImportError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(input);
        let mut records = reader.records();

        let header = match records.next() {
            Some(record) => record.map_err(|source| self.csv_error(source))?,
            None => {
                return Err(CsvImportError::EmptyFile {
                    path: self.path.clone(),
                })
            }
        };
        let names = normalize_headers(&header);
        let width = names.len();

        let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
        for record in records {
            let record = record.map_err(|source| self.csv_error(source))?;
            if record.len() > width {
                let line = record
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(raw_rows.len() as u64 + 2);
                return Err(CsvImportError::RowTooLong {
                    path: self.path.clone(),
                    line,
                    expected: width,
                    found: record.len(),
                });
            }

            let mut row: Vec<Option<String>> = record.iter().map(null_if_missing).collect();
            // Short rows are padded with NULLs
            row.resize(width, None);
            raw_rows.push(row);
        }

        let column_types: Vec<ColumnType> = (0..width)
            .map(|idx| infer_column_type(raw_rows.iter().map(|row| row[idx].as_deref())))
            .collect();

        let rows = raw_rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&column_types)
                    .map(|(value, column_type)| to_cell(*column_type, value))
                    .collect()
            })
            .collect::<Vec<Vec<Cell>>>();

        let columns: Vec<Column> = names
            .into_iter()
            .zip(column_types)
            .map(|(name, column_type)| Column { name, column_type })
            .collect();

        for column in &columns {
            debug!("Column {} inferred as {}", column.name, column.column_type.sql_type());
        }
        info!(
            "Parsed {} rows with {} columns from {}",
            rows.len(),
            columns.len(),
            self.path.display()
        );

        Ok(Dataset { columns, rows })
    }

    fn csv_error(&self, source: csv::Error) -> CsvImportError {
        CsvImportError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

fn null_if_missing(field: &str) -> Option<String> {
    if NULL_MARKERS.contains(&field) {
        None
    } else {
        Some(field.to_string())
    }
}

/// Blank headers become `Unnamed: <index>`, repeats get `.1`, `.2`, ... suffixes
fn normalize_headers(header: &StringRecord) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (idx, raw) in header.iter().enumerate() {
        let base = if raw.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            raw.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        names.push(name);
    }
    names
}

fn infer_column_type<'a>(values: impl Iterator<Item = Option<&'a str>>) -> ColumnType {
    let mut has_value = false;
    let mut has_null = false;
    let mut all_int = true;
    let mut all_float = true;
    let mut all_bool = true;

    for value in values {
        let Some(value) = value else {
            has_null = true;
            continue;
        };
        has_value = true;
        let trimmed = value.trim();
        if all_int && trimmed.parse::<i64>().is_err() {
            all_int = false;
        }
        if all_float && trimmed.parse::<f64>().is_err() {
            all_float = false;
        }
        if all_bool && parse_bool(value).is_none() {
            all_bool = false;
        }
    }

    if !has_value {
        return ColumnType::Text;
    }
    match (all_int, all_float, all_bool) {
        (true, _, _) if !has_null => ColumnType::BigInt,
        (_, true, _) => ColumnType::Double,
        (_, _, true) if !has_null => ColumnType::Boolean,
        _ => ColumnType::Text,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    if TRUE_VALUES.contains(&value) {
        Some(true)
    } else if FALSE_VALUES.contains(&value) {
        Some(false)
    } else {
        None
    }
}

fn to_cell(column_type: ColumnType, value: Option<String>) -> Cell {
    match column_type {
        ColumnType::BigInt => Cell::BigInt(value.and_then(|v| v.trim().parse().ok())),
        ColumnType::Double => Cell::Double(value.and_then(|v| v.trim().parse().ok())),
        ColumnType::Boolean => Cell::Boolean(value.as_deref().and_then(parse_bool)),
        ColumnType::Text => Cell::Text(value),
    }
}

// CSV loading for the sales table

use crate::data::{Dataset, Record};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open '{path}': {source}")]
    Open { path: String, source: io::Error },

    #[error("failed to read CSV header: {0}")]
    Header(#[source] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("malformed row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },
}

pub const REQUIRED_COLUMNS: [&str; 6] = [
    "platform",
    "genre",
    "year",
    "global_sales",
    "sales_region",
    "sales_amount",
];

/// Read the whole table from any reader. Any malformed row aborts the load.
pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(LoadError::Header)?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }

    let mut records = Vec::new();
    for (idx, result) in rdr.deserialize::<Record>().enumerate() {
        let record = result.map_err(|source| LoadError::Row { row: idx + 1, source })?;
        records.push(record);
    }

    tracing::debug!(rows = records.len(), "loaded sales table");
    Ok(Dataset::new(records))
}

pub fn read_dataset_from_path(path: &Path) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })?;
    read_dataset(file)
}

pub fn read_dataset_from_stdin() -> Result<Dataset, LoadError> {
    read_dataset(io::stdin().lock())
}

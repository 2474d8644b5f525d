//! Reading and writing the CSV report.

use std::path::Path;
use std::str::FromStr;

use indexmap::IndexSet;

use crate::dedup;
use crate::error::ReportError;
use crate::row::{OutputRow, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Merge into the rows already in the report.
    Append,
    /// Replace the report with this run's rows.
    Overwrite,
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "append" => Ok(WriteMode::Append),
            "o" | "overwrite" => Ok(WriteMode::Overwrite),
            other => Err(format!("unknown write mode '{other}'")),
        }
    }
}

/// A report as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Report {
    pub fn has_key_columns(&self) -> bool {
        dedup::has_key_columns(self.columns.iter().map(String::as_str))
    }
}

pub fn read_report(path: &Path) -> Result<Report, ReportError> {
    let csv_err = |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;
    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = vec![];
    for result in reader.records() {
        let row = result.map_err(csv_err)?;
        let record: Record = columns
            .iter()
            .cloned()
            .zip(row.iter().map(str::to_string))
            .collect();
        records.push(record);
    }

    Ok(Report { columns, records })
}

/// Union of all records' columns, in first-seen order.
pub fn column_union<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut columns = IndexSet::new();
    for record in records {
        for column in record.keys() {
            if !columns.contains(column) {
                columns.insert(column.clone());
            }
        }
    }
    columns.into_iter().collect()
}

/// Writes `records` to `path`, replacing its contents. Columns are
/// `leading` followed by any column only present in the records.
pub fn write_records(path: &Path, leading: &[String], records: &[Record]) -> Result<(), ReportError> {
    let csv_err = |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut columns: IndexSet<String> = leading.iter().cloned().collect();
    columns.extend(column_union(records));

    let mut csv_writer = csv::Writer::from_path(path).map_err(csv_err)?;
    csv_writer.write_record(&columns).map_err(csv_err)?;
    for record in records {
        csv_writer
            .write_record(
                columns
                    .iter()
                    .map(|c| record.get(c).map(String::as_str).unwrap_or_default()),
            )
            .map_err(csv_err)?;
    }
    csv_writer.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Persists this run's rows. In append mode they are merged after the rows
/// of `existing`; in both modes the result is deduplicated keep-last before
/// writing. Returns the number of rows in the written report.
pub fn write(
    rows: &[OutputRow],
    path: &Path,
    mode: WriteMode,
    existing: Option<Report>,
) -> Result<usize, ReportError> {
    let new_records: Vec<Record> = rows.iter().map(OutputRow::to_record).collect();

    let (leading, records) = match (mode, existing) {
        (WriteMode::Append, Some(report)) => {
            (report.columns, dedup::merge(report.records, new_records))
        }
        _ => (vec![], dedup::dedup_keep_last(new_records)),
    };

    write_records(path, &leading, &records)?;
    tracing::info!(path = %path.display(), rows = records.len(), ?mode, "report written");
    Ok(records.len())
}

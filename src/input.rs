use std::path::Path;

use crate::error::InputError;

pub const DEFAULT_LINK_COLUMN: &str = "Product Link";

/// Loads product paths in file order, dropping blank entries.
///
/// A `.csv` file is read as a table and `column` is taken from each row;
/// anything else is treated as one path per line.
pub fn load_product_paths(path: &Path, column: &str) -> Result<Vec<String>, InputError> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        load_from_csv(path, column)
    } else {
        load_from_lines(path)
    }
}

fn load_from_lines(path: &Path) -> Result<Vec<String>, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn load_from_csv(path: &Path, column: &str) -> Result<Vec<String>, InputError> {
    let csv_err = |source| InputError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;
    let idx = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| InputError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })?;

    let mut paths = vec![];
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        if let Some(value) = record.get(idx).map(str::trim).filter(|v| !v.is_empty()) {
            paths.push(value.to_string());
        }
    }
    Ok(paths)
}

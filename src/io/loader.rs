use crate::data::ObservationTable;
use crate::error::{LingamError, Result};
use log::debug;
use nalgebra::DMatrix;
use std::path::Path;

/// Load an observation table: one sample per line, one variable per column
pub fn load_table(path: impl AsRef<Path>) -> Result<ObservationTable> {
    let path = path.as_ref();
    let rows = read_rows(path)?;
    let table = ObservationTable::from_rows(&rows)?;
    debug!(
        "Loaded {} samples x {} variables from {}",
        table.n_samples(),
        table.n_variables(),
        path.display()
    );
    Ok(table)
}

/// Load any numeric matrix with the same rules as [`load_table`]
pub fn load_matrix(path: impl AsRef<Path>) -> Result<DMatrix<f64>> {
    let rows = read_rows(path.as_ref())?;
    let ncols = rows.first().map(|r| r.len()).unwrap_or(0);
    Ok(DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j]))
}

fn read_rows(path: &Path) -> Result<Vec<Vec<f64>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(rows.len() as u64 + 1);
        let mut row = Vec::with_capacity(record.len());
        for (col, field) in record.iter().enumerate() {
            row.push(parse_field(path, line, col + 1, field)?);
        }
        rows.push(row);
    }
    Ok(rows)
}

fn parse_field(path: &Path, line: u64, column: usize, field: &str) -> Result<f64> {
    let parse_error = |message: String| LingamError::Parse {
        path: path.to_path_buf(),
        line,
        column,
        message,
    };
    if field.is_empty() {
        return Err(parse_error("empty field".into()));
    }
    let value: f64 = field
        .parse()
        .map_err(|e| parse_error(format!("'{}' is not a number ({})", field, e)))?;
    if !value.is_finite() {
        return Err(parse_error(format!("'{}' is not a finite number", field)));
    }
    Ok(value)
}

fn csv_error(path: &Path, err: csv::Error) -> LingamError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    match err.into_kind() {
        csv::ErrorKind::Io(source) => LingamError::io(path, source),
        csv::ErrorKind::UnequalLengths { expected_len, len, .. } => LingamError::Parse {
            path: path.to_path_buf(),
            line,
            column: 0,
            message: format!("expected {} fields, found {}", expected_len, len),
        },
        csv::ErrorKind::Utf8 { err, .. } => LingamError::Parse {
            path: path.to_path_buf(),
            line,
            column: err.field() + 1,
            message: "invalid UTF-8".into(),
        },
        other => LingamError::Parse {
            path: path.to_path_buf(),
            line,
            column: 0,
            message: format!("{:?}", other),
        },
    }
}

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use ndarray::Array1;
use std::fs::File;
use std::path::Path;
use tracing::info;

use crate::error::{CalibratorError, Result};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Rows of a delimited file, kept as text until a column is asked for.
#[derive(Debug, Clone)]
pub struct SignalTable {
    pub headers: Vec<String>,
    pub records: Vec<StringRecord>,
    /// Parsed datetime column, when one was requested at load time
    pub timestamps: Option<Vec<NaiveDateTime>>,
}

impl SignalTable {
    pub fn n_rows(&self) -> usize {
        self.records.len()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CalibratorError::MissingColumn(name.to_string()))
    }

    /// Numeric column as a signal.
    pub fn column(&self, name: &str) -> Result<Array1<f64>> {
        let idx = self.column_index(name)?;
        let mut values = Vec::with_capacity(self.records.len());
        for (row, rec) in self.records.iter().enumerate() {
            let raw = rec.get(idx).unwrap_or("").trim();
            let v = raw.parse::<f64>().map_err(|_| CalibratorError::ParseValue {
                column: name.to_string(),
                row,
                value: raw.to_string(),
            })?;
            values.push(v);
        }
        Ok(Array1::from(values))
    }
}

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Load a CSV with a header row. If `datetime_column` is given, that column is
/// parsed as timestamps; everything else stays as read.
pub fn load_csv<P: AsRef<Path>>(path: P, datetime_column: Option<&str>) -> Result<SignalTable> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader.headers()?.iter().map(|h| h.trim().to_string()).collect::<Vec<_>>();
    let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = SignalTable { headers, records, timestamps: None };

    if let Some(col) = datetime_column {
        let idx = table.column_index(col)?;
        let mut stamps = Vec::with_capacity(table.n_rows());
        for (row, rec) in table.records.iter().enumerate() {
            let raw = rec.get(idx).unwrap_or("");
            let ts = parse_datetime(raw).ok_or_else(|| CalibratorError::ParseDatetime {
                column: col.to_string(),
                row,
                value: raw.to_string(),
            })?;
            stamps.push(ts);
        }
        table.timestamps = Some(stamps);
    }

    info!(path = %path.display(), rows = table.n_rows(), columns = table.headers.len(), "loaded CSV");
    Ok(table)
}

/// Load `path` and pull out `value_column` as the base signal.
pub fn load_signal<P: AsRef<Path>>(path: P, value_column: &str, datetime_column: Option<&str>) -> Result<Array1<f64>> {
    load_csv(path, datetime_column)?.column(value_column)
}

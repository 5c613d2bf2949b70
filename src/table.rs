use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use polars::datatypes::TimeUnit;
use polars::prelude::StrptimeOptions;
use polars::prelude::*;
use tracing::info;

use crate::error::DashboardError;
use crate::schema::wide;

/// Options for loading a cleaned telemetry CSV.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Name of the timestamp column (default: `Fecha`).
    pub timestamp_column: String,
    /// strftime format of the timestamp column (default: `%Y-%m-%d %H:%M:%S`).
    pub timestamp_format: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timestamp_column: wide::TIMESTAMP.to_string(),
            timestamp_format: wide::TIMESTAMP_FORMAT.to_string(),
        }
    }
}

/// Wide telemetry table: one row per timestamp, one column per instrument.
///
/// The timestamp column is a Datetime column and instrument columns are
/// numeric-or-null. The table is never mutated once built.
#[derive(Debug, Clone)]
pub struct WideTable {
    frame: DataFrame,
    timestamp_column: String,
}

impl WideTable {
    /// Wrap an already-coerced DataFrame.
    pub fn new(frame: DataFrame, timestamp_column: &str) -> Result<Self, DashboardError> {
        let table = Self {
            frame,
            timestamp_column: timestamp_column.to_string(),
        };
        if !table.has_column(timestamp_column) {
            return Err(timestamp_not_found(timestamp_column));
        }
        match table.frame.column(timestamp_column)?.dtype() {
            DataType::Datetime(_, _) => Ok(table),
            other => Err(DashboardError::InvalidData(format!(
                "Timestamp column '{timestamp_column}' must be Datetime, found {other}"
            ))),
        }
    }

    /// Build a table from in-memory values. Every column must have one value
    /// per timestamp.
    pub fn from_values(
        timestamp_column: &str,
        timestamps: &[NaiveDateTime],
        columns: &[(&str, Vec<Option<f64>>)],
    ) -> Result<Self, DashboardError> {
        let micros: Vec<i64> = timestamps
            .iter()
            .map(|dt| dt.and_utc().timestamp_micros())
            .collect();
        let ts = Series::new(timestamp_column.into(), &micros)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;

        let mut frame_columns: Vec<Column> = vec![ts.into()];
        for (name, values) in columns {
            frame_columns.push(Series::new((*name).into(), values.as_slice()).into());
        }

        Self::new(DataFrame::new(frame_columns)?, timestamp_column)
    }

    /// Load a cleaned CSV: header row, one timestamp column, instrument
    /// columns. Unparseable timestamps and values become null.
    pub fn load_csv(path: &Path, options: &LoadOptions) -> Result<Self, DashboardError> {
        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0)) // all columns as String
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        let trimmed: Vec<String> = df
            .get_column_names_str()
            .iter()
            .map(|c| c.trim().to_string())
            .collect();
        df.set_column_names(trimmed.as_slice())?;

        let ts_name = options.timestamp_column.as_str();
        if !trimmed.iter().any(|c| c == ts_name) {
            return Err(timestamp_not_found(ts_name));
        }

        let coerced: Vec<Expr> = trimmed
            .iter()
            .map(|name| {
                let stripped = col(name.as_str()).str().strip_chars(lit(" \t\r\n"));
                if name == ts_name {
                    stripped.str().to_datetime(
                        Some(TimeUnit::Microseconds),
                        None,
                        StrptimeOptions {
                            format: Some(options.timestamp_format.as_str().into()),
                            strict: false,
                            ..Default::default()
                        },
                        lit("raise"),
                    )
                } else {
                    stripped.cast(DataType::Float64)
                }
            })
            .collect();

        let df = df.lazy().with_columns(coerced).collect()?;
        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "loaded telemetry table"
        );
        Self::new(df, ts_name)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Fail with every absent column named, not just the first.
    pub fn require_columns<S: AsRef<str>>(&self, required: &[S]) -> Result<(), DashboardError> {
        let missing: Vec<String> = required
            .iter()
            .map(|c| c.as_ref())
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DashboardError::MissingColumns(missing))
        }
    }

    /// Timestamps in row order; null cells stay `None`.
    pub fn timestamps(&self) -> Result<Vec<Option<NaiveDateTime>>, DashboardError> {
        let micros = self
            .frame
            .column(&self.timestamp_column)?
            .as_materialized_series()
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?
            .cast(&DataType::Int64)?;
        Ok(micros
            .i64()?
            .into_iter()
            .map(|v| v.and_then(DateTime::<Utc>::from_timestamp_micros).map(|dt| dt.naive_utc()))
            .collect())
    }

    /// Numeric values of one column in row order. Nulls and NaNs are `None`.
    pub fn values(&self, column: &str) -> Result<Vec<Option<f64>>, DashboardError> {
        self.require_columns(&[column])?;
        let series = self
            .frame
            .column(column)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        Ok(series
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }
}

fn timestamp_not_found(name: &str) -> DashboardError {
    DashboardError::InvalidData(format!("Timestamp column '{name}' not found"))
}

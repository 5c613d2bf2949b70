use chrono::NaiveDateTime;
use polars::datatypes::TimeUnit;
use polars::prelude::*;
use tracing::{debug, warn};

use crate::error::DashboardError;
use crate::metric::{classify, MetricType};
use crate::schema::long_form;
use crate::sections::Section;
use crate::table::WideTable;

/// One observation of one instrument at one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub timestamp: Option<NaiveDateTime>,
    pub instrument: String,
    /// `None` when the source cell was missing or unparseable.
    pub value: Option<f64>,
    pub metric_type: MetricType,
}

/// Melt the section's columns of `table` into long-form records.
///
/// Records come out row by row, and within a row in the section's declared
/// instrument order, so the output has exactly `rows * instruments` entries.
/// Every section column must exist in the table; all missing columns are
/// reported together.
pub fn reshape(table: &WideTable, section: &Section) -> Result<Vec<LongRecord>, DashboardError> {
    if let Err(err) = table.require_columns(section.instruments()) {
        warn!(section = %section.name(), "{err}");
        return Err(err);
    }

    let timestamps = table.timestamps()?;
    let columns: Vec<(&str, MetricType, Vec<Option<f64>>)> = section
        .instruments()
        .iter()
        .map(|name| Ok((name.as_str(), classify(name), table.values(name)?)))
        .collect::<Result<_, DashboardError>>()?;

    let mut records = Vec::with_capacity(timestamps.len() * columns.len());
    for (row, timestamp) in timestamps.iter().enumerate() {
        for (instrument, metric_type, values) in &columns {
            records.push(LongRecord {
                timestamp: *timestamp,
                instrument: instrument.to_string(),
                value: values[row],
                metric_type: *metric_type,
            });
        }
    }

    debug!(
        section = %section.name(),
        rows = timestamps.len(),
        instruments = columns.len(),
        records = records.len(),
        "reshaped section to long form"
    );
    Ok(records)
}

/// Long-form records as a DataFrame: timestamp, `metric`, `valor`, `tipo`.
pub fn records_to_frame(
    records: &[LongRecord],
    timestamp_column: &str,
) -> Result<DataFrame, DashboardError> {
    let micros: Vec<Option<i64>> = records
        .iter()
        .map(|r| r.timestamp.map(|dt| dt.and_utc().timestamp_micros()))
        .collect();
    let instruments: Vec<&str> = records.iter().map(|r| r.instrument.as_str()).collect();
    let values: Vec<Option<f64>> = records.iter().map(|r| r.value).collect();
    let types: Vec<&str> = records.iter().map(|r| r.metric_type.label()).collect();

    let ts = Series::new(timestamp_column.into(), &micros)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;

    let df = DataFrame::new(vec![
        ts.into(),
        Column::new(long_form::METRIC.into(), &instruments),
        Column::new(long_form::VALUE.into(), &values),
        Column::new(long_form::METRIC_TYPE.into(), &types),
    ])?;
    Ok(df)
}

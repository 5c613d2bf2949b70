use std::collections::HashMap;

use polars::prelude::*;

use crate::error::DashboardError;
use crate::metric::{classify, MetricType};
use crate::reshape::LongRecord;
use crate::schema::{distribution, long_form, stats};

/// Descriptive statistics for one (metric type, instrument) group.
///
/// Everything except `count` is computed over non-missing values only and
/// is `None` when undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticRow {
    pub metric_type: MetricType,
    pub instrument: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Sample standard deviation (n - 1); needs at least two values.
    pub std: Option<f64>,
}

/// Box-and-whisker summary of one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub instrument: String,
    pub metric_type: MetricType,
    pub count: usize,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

/// Group records by (metric type, instrument) and summarize each group.
///
/// Rows are sorted by metric type, then instrument id.
pub fn aggregate(records: &[LongRecord]) -> Result<Vec<StatisticRow>, DashboardError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let grouped = values_frame(records)?
        .lazy()
        .group_by([col(long_form::METRIC_TYPE), col(long_form::METRIC)])
        .agg([
            col(long_form::VALUE)
                .count()
                .cast(DataType::UInt64)
                .alias(stats::COUNT),
            col(long_form::VALUE).mean().alias(stats::MEAN),
            col(long_form::VALUE).min().alias(stats::MIN),
            col(long_form::VALUE).max().alias(stats::MAX),
            col(long_form::VALUE).std(1).alias(stats::STD),
        ])
        .collect()?;

    let types = str_column(&grouped, long_form::METRIC_TYPE)?;
    let instruments = str_column(&grouped, long_form::METRIC)?;
    let counts = count_column(&grouped)?;
    let means = f64_column(&grouped, stats::MEAN)?;
    let mins = f64_column(&grouped, stats::MIN)?;
    let maxs = f64_column(&grouped, stats::MAX)?;
    let stds = f64_column(&grouped, stats::STD)?;

    let mut rows = Vec::with_capacity(grouped.height());
    for i in 0..grouped.height() {
        let label = types[i].as_deref().unwrap_or_default();
        let metric_type = label
            .parse::<MetricType>()
            .map_err(DashboardError::InvalidData)?;
        let count = counts[i];
        rows.push(StatisticRow {
            metric_type,
            instrument: instruments[i].clone().unwrap_or_default(),
            count,
            mean: means[i],
            min: mins[i],
            max: maxs[i],
            std: if count < 2 { None } else { stds[i] },
        });
    }
    rows.sort_by(|a, b| {
        (a.metric_type, a.instrument.as_str()).cmp(&(b.metric_type, b.instrument.as_str()))
    });
    Ok(rows)
}

/// Per-instrument distribution summaries, in `instruments` order.
///
/// Quartiles use linear interpolation between closest ranks. An instrument
/// with no values (or absent from `records`) reports `count = 0`.
pub fn distributions(
    records: &[LongRecord],
    instruments: &[String],
) -> Result<Vec<Distribution>, DashboardError> {
    let quartile = |q: f64, name: &str| {
        col(long_form::VALUE)
            .quantile(lit(q), QuantileMethod::Linear)
            .alias(name)
    };

    let grouped = values_frame(records)?
        .lazy()
        .group_by([col(long_form::METRIC)])
        .agg([
            col(long_form::VALUE)
                .count()
                .cast(DataType::UInt64)
                .alias(stats::COUNT),
            col(long_form::VALUE).min().alias(stats::MIN),
            quartile(0.25, distribution::Q1),
            quartile(0.5, distribution::MEDIAN),
            quartile(0.75, distribution::Q3),
            col(long_form::VALUE).max().alias(stats::MAX),
            col(long_form::VALUE).mean().alias(stats::MEAN),
        ])
        .collect()?;

    let names = str_column(&grouped, long_form::METRIC)?;
    let counts = count_column(&grouped)?;
    let mins = f64_column(&grouped, stats::MIN)?;
    let q1s = f64_column(&grouped, distribution::Q1)?;
    let medians = f64_column(&grouped, distribution::MEDIAN)?;
    let q3s = f64_column(&grouped, distribution::Q3)?;
    let maxs = f64_column(&grouped, stats::MAX)?;
    let means = f64_column(&grouped, stats::MEAN)?;

    let by_instrument: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .filter_map(|(i, name)| name.as_deref().map(|n| (n, i)))
        .collect();

    Ok(instruments
        .iter()
        .map(|instrument| {
            let metric_type = classify(instrument);
            match by_instrument.get(instrument.as_str()) {
                Some(&i) => Distribution {
                    instrument: instrument.clone(),
                    metric_type,
                    count: counts[i],
                    min: mins[i],
                    q1: q1s[i],
                    median: medians[i],
                    q3: q3s[i],
                    max: maxs[i],
                    mean: means[i],
                },
                None => Distribution {
                    instrument: instrument.clone(),
                    metric_type,
                    count: 0,
                    min: None,
                    q1: None,
                    median: None,
                    q3: None,
                    max: None,
                    mean: None,
                },
            }
        })
        .collect())
}

/// `tipo`, `metric`, `valor` for the records, with NaN values nulled out so
/// polars skips them like any other missing value.
fn values_frame(records: &[LongRecord]) -> Result<DataFrame, DashboardError> {
    let types: Vec<&str> = records.iter().map(|r| r.metric_type.label()).collect();
    let instruments: Vec<&str> = records.iter().map(|r| r.instrument.as_str()).collect();
    let values: Vec<Option<f64>> = records
        .iter()
        .map(|r| r.value.filter(|v| !v.is_nan()))
        .collect();

    let df = DataFrame::new(vec![
        Column::new(long_form::METRIC_TYPE.into(), &types),
        Column::new(long_form::METRIC.into(), &instruments),
        Column::new(long_form::VALUE.into(), &values),
    ])?;
    Ok(df)
}

fn str_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, DashboardError> {
    let values = df
        .column(name)?
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

fn count_column(df: &DataFrame) -> Result<Vec<usize>, DashboardError> {
    let values = df
        .column(stats::COUNT)?
        .as_materialized_series()
        .u64()?
        .into_iter()
        .map(|v| v.unwrap_or(0) as usize)
        .collect();
    Ok(values)
}

/// Float column with NaN read back as `None`.
fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, DashboardError> {
    let values = df
        .column(name)?
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

// ── DataFrame views ─────────────────────────────────────────────────────────

/// Statistic rows as a DataFrame: `tipo`, `metric`, count, mean, min, max, std.
pub fn statistics_to_frame(rows: &[StatisticRow]) -> Result<DataFrame, DashboardError> {
    let types: Vec<&str> = rows.iter().map(|r| r.metric_type.label()).collect();
    let instruments: Vec<&str> = rows.iter().map(|r| r.instrument.as_str()).collect();
    let counts: Vec<u64> = rows.iter().map(|r| r.count as u64).collect();
    let means: Vec<Option<f64>> = rows.iter().map(|r| r.mean).collect();
    let mins: Vec<Option<f64>> = rows.iter().map(|r| r.min).collect();
    let maxs: Vec<Option<f64>> = rows.iter().map(|r| r.max).collect();
    let stds: Vec<Option<f64>> = rows.iter().map(|r| r.std).collect();

    let df = DataFrame::new(vec![
        Column::new(long_form::METRIC_TYPE.into(), &types),
        Column::new(long_form::METRIC.into(), &instruments),
        Column::new(stats::COUNT.into(), &counts),
        Column::new(stats::MEAN.into(), &means),
        Column::new(stats::MIN.into(), &mins),
        Column::new(stats::MAX.into(), &maxs),
        Column::new(stats::STD.into(), &stds),
    ])?;
    Ok(df)
}

pub fn distributions_to_frame(rows: &[Distribution]) -> Result<DataFrame, DashboardError> {
    let instruments: Vec<&str> = rows.iter().map(|r| r.instrument.as_str()).collect();
    let types: Vec<&str> = rows.iter().map(|r| r.metric_type.label()).collect();
    let counts: Vec<u64> = rows.iter().map(|r| r.count as u64).collect();
    let column = |name: &str, f: fn(&Distribution) -> Option<f64>| {
        let values: Vec<Option<f64>> = rows.iter().map(f).collect();
        Column::new(name.into(), &values)
    };

    let df = DataFrame::new(vec![
        Column::new(long_form::METRIC.into(), &instruments),
        Column::new(long_form::METRIC_TYPE.into(), &types),
        Column::new(stats::COUNT.into(), &counts),
        column(stats::MIN, |d| d.min),
        column(distribution::Q1, |d| d.q1),
        column(distribution::MEDIAN, |d| d.median),
        column(distribution::Q3, |d| d.q3),
        column(stats::MAX, |d| d.max),
        column(stats::MEAN, |d| d.mean),
    ])?;
    Ok(df)
}

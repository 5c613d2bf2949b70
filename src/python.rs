use std::path::Path;

use pyo3::prelude::*;
use pyo3::types::PyModule;
use pyo3_polars::PyDataFrame;

use crate::aggregation::{distributions_to_frame, statistics_to_frame};
use crate::dashboard::Dashboard;
use crate::error::DashboardError;
use crate::metric::{classify, MetricType};
use crate::pairing::{RelationKind, RelationalPair};
use crate::palette::{present_palette, PALETTE};
use crate::schema;
use crate::sections::SectionRegistry;
use crate::table::{LoadOptions, WideTable};

#[pyclass(name = "PumpDashboard")]
pub struct PyDashboard {
    registry: SectionRegistry,
    dashboard: Option<Dashboard>,
}

#[pymethods]
impl PyDashboard {
    /// Create a dashboard over the built-in plant sections, or over the
    /// sections of a TOML registry file.
    #[new]
    #[pyo3(signature = (sections_path=None))]
    fn new(sections_path: Option<&str>) -> PyResult<Self> {
        let registry = match sections_path {
            Some(path) => SectionRegistry::load(Path::new(path))?,
            None => SectionRegistry::builtin(),
        };
        Ok(Self {
            registry,
            dashboard: None,
        })
    }

    // ── Registry ────────────────────────────────────────────────────────────

    fn section_names(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }

    fn instruments(&self, section: &str) -> PyResult<Vec<String>> {
        Ok(self.registry.get(section)?.instruments().to_vec())
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load a cleaned telemetry CSV. The timestamp column is parsed with
    /// `timestamp_format` and all other columns are cast to Float64.
    #[pyo3(signature = (path, timestamp_column=None, timestamp_format=None))]
    fn load_csv(
        &mut self,
        path: &str,
        timestamp_column: Option<String>,
        timestamp_format: Option<String>,
    ) -> PyResult<PyDataFrame> {
        let defaults = LoadOptions::default();
        let options = LoadOptions {
            timestamp_column: timestamp_column.unwrap_or(defaults.timestamp_column),
            timestamp_format: timestamp_format.unwrap_or(defaults.timestamp_format),
        };
        let table = WideTable::load_csv(Path::new(path), &options)?;
        let df = table.frame().clone();
        self.dashboard = Some(Dashboard::new(self.registry.clone(), table));
        Ok(PyDataFrame(df))
    }

    /// Use an already-coerced DataFrame as the wide table.
    #[pyo3(signature = (df, timestamp_column=None))]
    fn set_table(&mut self, df: PyDataFrame, timestamp_column: Option<&str>) -> PyResult<()> {
        let table = WideTable::new(df.0, timestamp_column.unwrap_or(schema::wide::TIMESTAMP))?;
        self.dashboard = Some(Dashboard::new(self.registry.clone(), table));
        Ok(())
    }

    // ── Section views ───────────────────────────────────────────────────────

    /// Long-form records: timestamp, metric, valor, tipo.
    fn long_form(&self, section: &str) -> PyResult<PyDataFrame> {
        let dashboard = self.dashboard()?;
        let view = dashboard.view(section)?;
        Ok(PyDataFrame(dashboard.records_frame(&view)?))
    }

    fn statistics(&self, section: &str) -> PyResult<PyDataFrame> {
        let view = self.dashboard()?.view(section)?;
        Ok(PyDataFrame(statistics_to_frame(&view.statistics)?))
    }

    fn distributions(&self, section: &str) -> PyResult<PyDataFrame> {
        let view = self.dashboard()?.view(section)?;
        Ok(PyDataFrame(distributions_to_frame(&view.distributions)?))
    }

    /// Relational pairs as (flow, target, kind) tuples, flow-power first.
    fn pairs(&self, section: &str) -> PyResult<Vec<(String, String, String)>> {
        let section = self.registry.get(section)?;
        Ok(crate::pairing::pairs_for(section)
            .iter()
            .map(|p| (p.flow.clone(), p.target.clone(), p.kind.to_string()))
            .collect())
    }

    fn pair_frame(&self, flow: &str, target: &str) -> PyResult<PyDataFrame> {
        let kind = match classify(target) {
            MetricType::Level => RelationKind::Level,
            _ => RelationKind::Power,
        };
        let pair = RelationalPair {
            flow: flow.to_string(),
            target: target.to_string(),
            kind,
        };
        Ok(PyDataFrame(self.dashboard()?.pair_frame(&pair)?))
    }

    /// Legend domain/range for the section's time-series view.
    fn present_palette(&self, section: &str) -> PyResult<Vec<(String, String)>> {
        let view = self.dashboard()?.view(section)?;
        Ok(present_palette(&view.records)
            .into_iter()
            .map(|(t, c)| (t.label().to_string(), c.to_string()))
            .collect())
    }

    // ── Static lookups ──────────────────────────────────────────────────────

    #[staticmethod]
    fn classify(instrument: &str) -> String {
        classify(instrument).label().to_string()
    }

    #[staticmethod]
    fn palette() -> Vec<(String, String)> {
        PALETTE
            .iter()
            .map(|(t, c)| (t.label().to_string(), c.to_string()))
            .collect()
    }
}

impl PyDashboard {
    fn dashboard(&self) -> Result<&Dashboard, DashboardError> {
        self.dashboard
            .as_ref()
            .ok_or_else(|| DashboardError::NotLoaded("telemetry table".into()))
    }
}

/// Export schema constants as Python submodules
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Wide table
    let wide = PyModule::new(m.py(), "wide")?;
    wide.add("TIMESTAMP", schema::wide::TIMESTAMP)?;
    wide.add("TIMESTAMP_FORMAT", schema::wide::TIMESTAMP_FORMAT)?;
    m.add_submodule(&wide)?;

    // Long form
    let long_form = PyModule::new(m.py(), "long_form")?;
    long_form.add("METRIC", schema::long_form::METRIC)?;
    long_form.add("VALUE", schema::long_form::VALUE)?;
    long_form.add("METRIC_TYPE", schema::long_form::METRIC_TYPE)?;
    m.add_submodule(&long_form)?;

    // Statistics
    let stats = PyModule::new(m.py(), "stats")?;
    stats.add("COUNT", schema::stats::COUNT)?;
    stats.add("MEAN", schema::stats::MEAN)?;
    stats.add("MIN", schema::stats::MIN)?;
    stats.add("MAX", schema::stats::MAX)?;
    stats.add("STD", schema::stats::STD)?;
    m.add_submodule(&stats)?;

    // Distribution
    let distribution = PyModule::new(m.py(), "distribution")?;
    distribution.add("Q1", schema::distribution::Q1)?;
    distribution.add("MEDIAN", schema::distribution::MEDIAN)?;
    distribution.add("Q3", schema::distribution::Q3)?;
    m.add_submodule(&distribution)?;

    // Relation
    let relation = PyModule::new(m.py(), "relation")?;
    relation.add("POWER", schema::relation::POWER)?;
    relation.add("LEVEL", schema::relation::LEVEL)?;
    m.add_submodule(&relation)?;

    Ok(())
}

#[pymodule]
fn pump_telemetry(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyDashboard>()?;
    add_schema_exports(m)?;
    Ok(())
}

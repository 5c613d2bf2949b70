use polars::prelude::DataFrame;
use tracing::info;

use crate::aggregation::{aggregate, distributions, Distribution, StatisticRow};
use crate::error::DashboardError;
use crate::metric::MetricType;
use crate::pairing::{pair_frame, pairs_for, PairSet, RelationalPair};
use crate::palette::present_palette;
use crate::reshape::{records_to_frame, reshape, LongRecord};
use crate::sections::{Section, SectionRegistry};
use crate::table::WideTable;

/// One analysis session: a section registry and the loaded wide table.
///
/// Both are read-only; every view is recomputed from them on request.
#[derive(Debug, Clone)]
pub struct Dashboard {
    registry: SectionRegistry,
    table: WideTable,
}

/// Everything the rendering layer needs for one selected section.
#[derive(Debug, Clone)]
pub struct SectionView {
    pub section: Section,
    pub records: Vec<LongRecord>,
    pub statistics: Vec<StatisticRow>,
    pub distributions: Vec<Distribution>,
    pub pairs: PairSet,
    /// Metric types present in `records` with their color tokens.
    pub palette: Vec<(MetricType, &'static str)>,
}

impl Dashboard {
    pub fn new(registry: SectionRegistry, table: WideTable) -> Self {
        Self { registry, table }
    }

    /// Reshape, aggregate and pair one section.
    pub fn view(&self, section_name: &str) -> Result<SectionView, DashboardError> {
        let section = self.registry.get(section_name)?;
        let records = reshape(&self.table, section)?;
        let statistics = aggregate(&records)?;
        let distributions = distributions(&records, section.instruments())?;
        let pairs = pairs_for(section);
        let palette = present_palette(&records);

        info!(
            section = %section.name(),
            records = records.len(),
            statistics = statistics.len(),
            flow_power_pairs = pairs.flow_power.len(),
            flow_level_pairs = pairs.flow_level.len(),
            "built section view"
        );

        Ok(SectionView {
            section: section.clone(),
            records,
            statistics,
            distributions,
            pairs,
            palette,
        })
    }

    pub fn records_frame(&self, view: &SectionView) -> Result<DataFrame, DashboardError> {
        records_to_frame(&view.records, self.table.timestamp_column())
    }

    pub fn pair_frame(&self, pair: &RelationalPair) -> Result<DataFrame, DashboardError> {
        pair_frame(&self.table, pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 12)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn relaves_dashboard() -> Dashboard {
        let table = WideTable::from_values(
            "Fecha",
            &[ts(0), ts(1)],
            &[
                ("NivelTH002_Percent", vec![Some(40.0), Some(42.0)]),
                ("FlujoDescargaPU071_m3xhr", vec![Some(120.0), Some(125.0)]),
                ("DensisdadPU071_Kgxm3", vec![Some(1400.0), None]),
                ("VelocidadMotorPU071_Percent", vec![Some(60.0), Some(61.0)]),
                ("VelocidadPU071_rpm", vec![Some(900.0), Some(910.0)]),
                ("PotenciaPU071_kW", vec![Some(300.0), Some(305.0)]),
            ],
        )
        .unwrap();
        Dashboard::new(SectionRegistry::builtin(), table)
    }

    #[test]
    fn builds_full_view_for_section() {
        let dashboard = relaves_dashboard();
        let view = dashboard.view("U/F ESPESADOR DE RELAVES").unwrap();

        assert_eq!(view.records.len(), 2 * 6);
        assert_eq!(view.statistics.len(), 6);
        assert_eq!(view.distributions.len(), 6);
        assert_eq!(view.pairs.flow_power.len(), 1);
        assert_eq!(view.pairs.flow_level.len(), 1);
        assert_eq!(view.palette.first(), Some(&(MetricType::Level, "#1f77b4")));
        assert_eq!(view.palette.len(), 6);

        let frame = dashboard.records_frame(&view).unwrap();
        assert_eq!(frame.height(), 12);

        assert_eq!(view.section.name(), "U/F ESPESADOR DE RELAVES");
        let ordered: Vec<&str> = view
            .distributions
            .iter()
            .map(|d| d.instrument.as_str())
            .collect();
        assert_eq!(ordered, view.section.instruments());
    }

    #[test]
    fn unknown_section_is_reported() {
        let err = relaves_dashboard().view("SECCION X").unwrap_err();
        assert!(matches!(err, DashboardError::UnknownSection(_)));
    }

    #[test]
    fn section_absent_from_table_is_missing_columns() {
        let err = relaves_dashboard()
            .view("SISTEMA SPARGING FC-21")
            .unwrap_err();
        match err {
            DashboardError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["VelocidadPU023_Percent", "PotenciaPU023_kW"])
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }
}

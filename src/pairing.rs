use std::fmt;

use polars::prelude::*;

use crate::error::DashboardError;
use crate::metric::{classify, MetricType};
use crate::schema::relation;
use crate::sections::Section;
use crate::table::WideTable;

/// Which target a flow instrument is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Power,
    Level,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Power => relation::POWER,
            RelationKind::Level => relation::LEVEL,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flow instrument paired with a power or level instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationalPair {
    pub flow: String,
    pub target: String,
    pub kind: RelationKind,
}

impl fmt::Display for RelationalPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.flow, self.target)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairSet {
    pub flow_power: Vec<RelationalPair>,
    pub flow_level: Vec<RelationalPair>,
}

impl PairSet {
    pub fn is_empty(&self) -> bool {
        self.flow_power.is_empty() && self.flow_level.is_empty()
    }

    /// Flow-power pairs first, then flow-level.
    pub fn iter(&self) -> impl Iterator<Item = &RelationalPair> {
        self.flow_power.iter().chain(self.flow_level.iter())
    }
}

/// Cross products flow x power and flow x level over a section's instruments.
///
/// Flow covers both `Flow` and `FoamFlow`. Pairs are ordered flow-major,
/// each side in section order. A missing side gives an empty relation.
pub fn pairs_for(section: &Section) -> PairSet {
    let mut flows = Vec::new();
    let mut powers = Vec::new();
    let mut levels = Vec::new();
    for instrument in section.instruments() {
        match classify(instrument) {
            t if t.is_flow() => flows.push(instrument),
            MetricType::Power => powers.push(instrument),
            MetricType::Level => levels.push(instrument),
            _ => {}
        }
    }

    let cross = |targets: &[&String], kind: RelationKind| -> Vec<RelationalPair> {
        flows
            .iter()
            .flat_map(|flow| {
                targets.iter().map(move |target| RelationalPair {
                    flow: flow.to_string(),
                    target: target.to_string(),
                    kind,
                })
            })
            .collect()
    };

    PairSet {
        flow_power: cross(&powers, RelationKind::Power),
        flow_level: cross(&levels, RelationKind::Level),
    }
}

/// The raw values behind one pair: timestamp, flow column, target column.
pub fn pair_frame(table: &WideTable, pair: &RelationalPair) -> Result<DataFrame, DashboardError> {
    table.require_columns(&[pair.flow.as_str(), pair.target.as_str()])?;
    let df = table
        .frame()
        .select([table.timestamp_column(), pair.flow.as_str(), pair.target.as_str()])?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn section(instruments: &[&str]) -> Section {
        Section::new("S", instruments.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn names(pairs: &[RelationalPair]) -> Vec<(&str, &str)> {
        pairs
            .iter()
            .map(|p| (p.flow.as_str(), p.target.as_str()))
            .collect()
    }

    #[test]
    fn one_flow_two_powers_no_levels() {
        let pairs = pairs_for(&section(&[
            "PotenciaPU243_kW",
            "FlujoDescargaPU101_m3xhr",
            "VelocidadPU243_Percent",
            "PotenciaPU244_kW",
        ]));
        assert_eq!(
            names(&pairs.flow_power),
            vec![
                ("FlujoDescargaPU101_m3xhr", "PotenciaPU243_kW"),
                ("FlujoDescargaPU101_m3xhr", "PotenciaPU244_kW"),
            ]
        );
        assert!(pairs.flow_power.iter().all(|p| p.kind == RelationKind::Power));
        assert!(pairs.flow_level.is_empty());
    }

    #[test]
    fn relation_kinds_render_as_schema_labels() {
        assert_eq!(RelationKind::Power.to_string(), relation::POWER);
        assert_eq!(RelationKind::Level.as_str(), relation::LEVEL);
    }

    #[test]
    fn foam_flow_counts_as_flow_and_order_is_flow_major() {
        let builtin = crate::sections::SectionRegistry::builtin();
        let remolienda = builtin.get("ALIMENTACIÓN REMOLIENDA").unwrap();
        let pairs = pairs_for(remolienda);

        assert_eq!(
            names(&pairs.flow_power),
            vec![
                ("FlujoDescargaEspumadoPU010_m3xhr", "PotenciaPU010_kW"),
                ("FlujoDescargaPU010_m3xhr2", "PotenciaPU010_kW"),
            ]
        );
        assert_eq!(
            names(&pairs.flow_level),
            vec![
                ("FlujoDescargaEspumadoPU010_m3xhr", "NivelCajonHP010_Percent"),
                ("FlujoDescargaPU010_m3xhr2", "NivelCajonHP010_Percent"),
            ]
        );
        assert_eq!(pairs.iter().count(), 4);
    }

    #[test]
    fn no_flow_means_no_pairs() {
        let pairs = pairs_for(&section(&["VelocidadPU023_Percent", "PotenciaPU023_kW"]));
        assert!(pairs.is_empty());
    }

    #[test]
    fn pair_frame_selects_raw_columns() {
        let t0 = NaiveDate::from_ymd_opt(2025, 3, 12)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let table = WideTable::from_values(
            "Fecha",
            &[t0],
            &[
                ("FlujoDescargaPU071_m3xhr", vec![Some(120.0)]),
                ("NivelTH002_Percent", vec![Some(40.0)]),
                ("PotenciaPU071_kW", vec![Some(300.0)]),
            ],
        )
        .unwrap();
        let pair = RelationalPair {
            flow: "FlujoDescargaPU071_m3xhr".into(),
            target: "NivelTH002_Percent".into(),
            kind: RelationKind::Level,
        };
        let df = pair_frame(&table, &pair).unwrap();
        assert_eq!(
            df.get_column_names_str(),
            vec!["Fecha", "FlujoDescargaPU071_m3xhr", "NivelTH002_Percent"]
        );
        assert_eq!(pair.to_string(), "FlujoDescargaPU071_m3xhr vs NivelTH002_Percent");

        let missing = RelationalPair {
            target: "NivelOtro".into(),
            ..pair
        };
        assert!(matches!(
            pair_frame(&table, &missing),
            Err(DashboardError::MissingColumns(_))
        ));
    }
}

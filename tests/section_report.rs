use std::io::Write;

use pump_telemetry::{
    aggregate, pairs_for, reshape, Dashboard, DashboardError, LoadOptions, MetricType,
    SectionRegistry, WideTable,
};

fn write_sparging_csv() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "Fecha,VelocidadPU023_Percent,PotenciaPU023_kW,NivelTK062_Percent").unwrap();
    writeln!(file, "2025-03-12 00:00:00,80.0,30.0,50").unwrap();
    writeln!(file, "2025-03-12 00:15:00,82.0,,51").unwrap();
    writeln!(file, "2025-03-12 00:30:00,84.0,34.0,52").unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn sparging_section_end_to_end() {
    let file = write_sparging_csv();
    let table = WideTable::load_csv(file.path(), &LoadOptions::default()).unwrap();
    let registry = SectionRegistry::builtin();
    let section = registry.get("SISTEMA SPARGING FC-21").unwrap();

    let records = reshape(&table, section).unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0].metric_type, MetricType::Speed);
    assert_eq!(records[1].metric_type, MetricType::Power);
    assert_eq!(records[3].value, None);

    let stats = aggregate(&records).unwrap();
    assert_eq!(stats.len(), 2);
    let power = stats
        .iter()
        .find(|s| s.metric_type == MetricType::Power)
        .unwrap();
    assert_eq!(power.count, 2);
    assert_eq!(power.mean, Some(32.0));
    assert_eq!(power.std.map(|s| (s * s).round()), Some(8.0));

    let pairs = pairs_for(section);
    assert!(pairs.flow_power.is_empty());
    assert!(pairs.flow_level.is_empty());
}

#[test]
fn dashboard_view_matches_individual_operations() {
    let file = write_sparging_csv();
    let table = WideTable::load_csv(file.path(), &LoadOptions::default()).unwrap();
    let dashboard = Dashboard::new(SectionRegistry::builtin(), table);

    let view = dashboard.view("SISTEMA SPARGING FC-21").unwrap();
    assert_eq!(view.records.len(), 6);
    assert_eq!(view.statistics.len(), 2);
    assert!(view.pairs.is_empty());
    assert_eq!(
        view.palette,
        vec![(MetricType::Speed, "#2ca02c"), (MetricType::Power, "#d62728")]
    );
}

#[test]
fn switching_to_a_section_outside_the_table_fails_cleanly() {
    let file = write_sparging_csv();
    let table = WideTable::load_csv(file.path(), &LoadOptions::default()).unwrap();
    let dashboard = Dashboard::new(SectionRegistry::builtin(), table);

    match dashboard.view("TK DE FILTRADO") {
        Err(DashboardError::MissingColumns(cols)) => {
            assert_eq!(cols, vec!["VelocidadPU062_Percent", "PotenciaPU062_kW"])
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }

    // The session is still usable afterwards.
    assert!(dashboard.view("SISTEMA SPARGING FC-21").is_ok());
    assert!(matches!(
        dashboard.view("NO EXISTE"),
        Err(DashboardError::UnknownSection(_))
    ));
}

#[test]
fn custom_registry_from_toml_file() {
    let mut registry_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        registry_file,
        r#"
[[section]]
name = "PRUEBA"
instruments = ["NivelTK062_Percent", "PotenciaPU023_kW"]
"#
    )
    .unwrap();
    registry_file.flush().unwrap();

    let registry = SectionRegistry::load(registry_file.path()).unwrap();
    let file = write_sparging_csv();
    let table = WideTable::load_csv(file.path(), &LoadOptions::default()).unwrap();
    let view = Dashboard::new(registry, table).view("PRUEBA").unwrap();

    assert_eq!(view.records.len(), 6);
    let level = &view.statistics[0];
    assert_eq!(level.metric_type, MetricType::Level);
    assert_eq!(level.min, Some(50.0));
    assert_eq!(level.max, Some(52.0));
    let std = level.std.expect("three values give a defined std");
    assert!((std - 1.0).abs() < 1e-9, "std was {std}");
}

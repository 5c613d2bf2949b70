use std::fmt;
use std::str::FromStr;

/// Semantic type of an instrument column, derived from its name only.
///
/// Variant order is the order the classification rules are tried in, and
/// the order statistic rows are sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricType {
    Level,
    MotorSpeed,
    Speed,
    Power,
    FoamFlow,
    Flow,
    Density,
    Other,
}

impl MetricType {
    pub const ALL: [MetricType; 8] = [
        MetricType::Level,
        MetricType::MotorSpeed,
        MetricType::Speed,
        MetricType::Power,
        MetricType::FoamFlow,
        MetricType::Flow,
        MetricType::Density,
        MetricType::Other,
    ];

    /// Plant display label, as written to the `tipo` column.
    pub fn label(self) -> &'static str {
        match self {
            MetricType::Level => "Nivel",
            MetricType::MotorSpeed => "VelocidadMotor",
            MetricType::Speed => "Velocidad",
            MetricType::Power => "Potencia",
            MetricType::FoamFlow => "FlujoEspumado",
            MetricType::Flow => "Flujo",
            MetricType::Density => "Densidad",
            MetricType::Other => "Otros",
        }
    }

    /// Both foam and plain discharge flows count as flow for relational views.
    pub fn is_flow(self) -> bool {
        matches!(self, MetricType::Flow | MetricType::FoamFlow)
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MetricType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricType::ALL
            .into_iter()
            .find(|t| t.label() == s)
            .ok_or_else(|| format!("Unknown metric type: '{s}'"))
    }
}

/// Classify an instrument column by its naming pattern.
///
/// First matching rule wins:
///   Nivel*                          -> Level
///   VelocidadMotor*                 -> MotorSpeed
///   *_rpm, or Velocidad* w/o Motor  -> Speed
///   Potencia*                       -> Power
///   FlujoDescargaEspumado*          -> FoamFlow
///   FlujoDescarga*                  -> Flow
///   *Densidad*                      -> Density
///   anything else                   -> Other
pub fn classify(instrument: &str) -> MetricType {
    if instrument.starts_with("Nivel") {
        MetricType::Level
    } else if instrument.starts_with("VelocidadMotor") {
        MetricType::MotorSpeed
    } else if instrument.ends_with("_rpm")
        // The Motor guard keeps this rule disjoint from MotorSpeed.
        || (instrument.starts_with("Velocidad") && !instrument.contains("Motor"))
    {
        MetricType::Speed
    } else if instrument.starts_with("Potencia") {
        MetricType::Power
    } else if instrument.starts_with("FlujoDescargaEspumado") {
        MetricType::FoamFlow
    } else if instrument.starts_with("FlujoDescarga") {
        MetricType::Flow
    } else if instrument.contains("Densidad") {
        MetricType::Density
    } else {
        MetricType::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_plant_instruments() {
        let cases = [
            ("NivelCajonHP003_Percent", MetricType::Level),
            ("NivelTH101_Percent2", MetricType::Level),
            ("VelocidadMotorPU003_Percent", MetricType::MotorSpeed),
            ("VelocidadPU003_rpm", MetricType::Speed),
            ("VelocidadPU023_Percent", MetricType::Speed),
            ("PotenciaPU003_kW", MetricType::Power),
            ("FlujoDescargaEspumadoPU010_m3xhr", MetricType::FoamFlow),
            ("FlujoDescargaPU010_m3xhr2", MetricType::Flow),
            ("Densidad6625_Kgxm3", MetricType::Density),
            ("DensidadPU131_Kgxm3", MetricType::Density),
        ];
        for (name, expected) in cases {
            assert_eq!(classify(name), expected, "{name}");
        }
    }

    #[test]
    fn motor_speed_wins_over_speed_prefix() {
        assert_eq!(
            classify("VelocidadMotorPU003_Percent"),
            MetricType::MotorSpeed
        );
    }

    #[test]
    fn foam_flow_wins_over_flow_prefix() {
        assert_eq!(
            classify("FlujoDescargaEspumadoPU010_m3xhr"),
            MetricType::FoamFlow
        );
    }

    #[test]
    fn rpm_suffix_is_speed_regardless_of_prefix() {
        assert_eq!(classify("Bomba7_rpm"), MetricType::Speed);
        // Level rule is tried before the rpm suffix.
        assert_eq!(classify("NivelRaro_rpm"), MetricType::Level);
    }

    #[test]
    fn misspelled_density_is_other() {
        assert_eq!(classify("Densisdad6415_Kgxm3"), MetricType::Other);
        assert_eq!(classify("DensisdadPU071_Kgxm3"), MetricType::Other);
    }

    #[test]
    fn density_match_is_case_sensitive() {
        assert_eq!(classify("densidad_x"), MetricType::Other);
        assert_eq!(classify("XDensidadY"), MetricType::Density);
    }

    #[test]
    fn unmatched_names_fall_back_to_other() {
        assert_eq!(classify(""), MetricType::Other);
        assert_eq!(classify("Fecha"), MetricType::Other);
        assert_eq!(classify("Temperatura_C"), MetricType::Other);
    }

    #[test]
    fn classification_is_stable_across_calls() {
        for name in ["VelocidadPU061_Percent", "PotenciaPU061_kW", "Otro"] {
            assert_eq!(classify(name), classify(name));
        }
    }

    #[test]
    fn labels_parse_back() {
        for t in MetricType::ALL {
            assert_eq!(t.label().parse::<MetricType>(), Ok(t));
        }
        assert!("Caudal".parse::<MetricType>().is_err());
    }
}

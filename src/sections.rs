/// Section registry for the pump dashboard.
///
/// A section is a named plant subsystem owning an ordered list of
/// instrument columns. The built-in registry mirrors the concentrator
/// plant layout; a TOML file can replace it without recompiling.
use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Built-in sections
// ---------------------------------------------------------------------------

/// Plant sections in dashboard order. Instrument names are the flattened
/// Excel headers and keep their original spelling (e.g. `Densisdad`).
pub static BUILTIN_SECTIONS: &[(&str, &[&str])] = &[
    (
        "CONCENTRADO ROUGHER",
        &[
            "NivelCajonHP003_Percent",
            "VelocidadMotorPU003_Percent",
            "VelocidadPU003_rpm",
            "PotenciaPU003_kW",
        ],
    ),
    (
        "ALIMENTACIÓN REMOLIENDA",
        &[
            "NivelCajonHP010_Percent",
            "FlujoDescargaEspumadoPU010_m3xhr",
            "FlujoDescargaPU010_m3xhr2",
            "VelocidadMotorPU010_Percent",
            "VelocidadPU010_rpm",
            "PotenciaPU010_kW",
        ],
    ),
    (
        "CONCENTRADO A CLEANER 2",
        &[
            "NivelCajonHP011_Percent",
            "VelocidadMotorPU011_Percent",
            "VelocidadPU011_rpm",
            "PotenciaPU011_kW",
        ],
    ),
    (
        "CLEANER SCAVENGER",
        &[
            "NivelCajonHP015_Percent",
            "VelocidadMotorPU015_Percent",
            "VelocidadPU015_rpm",
            "PotenciaPU015_kW",
        ],
    ),
    (
        "COLAS CLEANER 2 A CLEANER 1",
        &[
            "NivelCajonHP022_Percent",
            "VelocidadMotorPU022_Percent",
            "VelocidadPU022_rpm",
            "PotenciaPU022_kW",
        ],
    ),
    (
        "SISTEMA SPARGING FC-21",
        &["VelocidadPU023_Percent", "PotenciaPU023_kW"],
    ),
    (
        "SISTEMA SPARGING FC-22",
        &["VelocidadPU024_Percent", "PotenciaPU024_kW"],
    ),
    (
        "CONCENTRADO SCAVENGER A CLEANER 3",
        &[
            "NivelCajonHP031_Percent",
            "VelocidadMotorPU031_Percent",
            "VelocidadPU031_rpm",
            "PotenciaPU031_kW",
        ],
    ),
    (
        "SISTEMA SPARGING FC-31",
        &["VelocidadPU217_Percent", "PotenciaPU217_kW"],
    ),
    (
        "CONCENTRADO A FILTRO",
        &[
            "NivelTK061_Percent",
            "VelocidadPU061_Percent",
            "VelocidadPU061_rpm",
            "PotenciaPU061_kW",
        ],
    ),
    (
        "TK DE FILTRADO",
        &[
            "NivelTK062_Percent",
            "VelocidadPU062_Percent",
            "PotenciaPU062_kW",
        ],
    ),
    (
        "DISTRIBUCIÓN DE CAL",
        &[
            "NivelTK242_Percent",
            "VelocidadPU243_Percent",
            "PotenciaPU243_kW",
            "VelocidadPU244_Percent",
            "PotenciaPU244_kW",
        ],
    ),
    (
        "ALIMENTACIÓN CICLONES PLANTA DE ARENA",
        &[
            "NivelCajonHP101_Percent",
            "VelocidadMotorPU101_Percent",
            "VelocidadPU101_rpm",
            "FlujoDescargaPU101_m3xhr",
            "Densisdad6415_Kgxm3",
            "PotenciaPU101_kW",
        ],
    ),
    (
        "BOMBA 1 U/F ESPESADOR",
        &[
            "NivelTH101_Percent",
            "Densisdad6712_Kgxm3",
            "VelocidadPU200_Percent",
            "PotenciaPU200_kW",
        ],
    ),
    (
        "BOMBA 2 U/F ESPESADOR",
        &[
            "NivelTH101_Percent2",
            "VelocidadPU205_Percent",
            "PotenciaPU205_kW",
        ],
    ),
    (
        "DISTRIBUCIÓN DE ARENA",
        &[
            "NivelHP102_Percent",
            "Densidad6625_Kgxm3",
            "Densidad6601_Kgxm3",
            "VelocidadMotorPU111_Percent",
            "VelocidadPU111_rpm",
            "PotenciaPU111_kW",
            "VelocidadPU112_Percent",
            "PotenciaPU112_kW",
            "VelocidadPU113_Percent",
            "PotenciaPU113_kW",
        ],
    ),
    (
        "DISTRIBUCIÓN DE LAMAS T1",
        &[
            "NivelHP103_Percent",
            "DensidadPU131_Kgxm3",
            "VelocidadPU131_rpm",
            "PotenciaPU131_kW",
        ],
    ),
    (
        "U/F ESPESADOR DE RELAVES",
        &[
            "NivelTH002_Percent",
            "FlujoDescargaPU071_m3xhr",
            "DensisdadPU071_Kgxm3",
            "VelocidadMotorPU071_Percent",
            "VelocidadPU071_rpm",
            "PotenciaPU071_kW",
        ],
    ),
];

// ---------------------------------------------------------------------------
// Registry types
// ---------------------------------------------------------------------------

/// A named subsystem and its instrument columns, in display order.
///
/// A section always lists at least one instrument and never lists the same
/// instrument twice.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSection")]
pub struct Section {
    name: String,
    instruments: Vec<String>,
}

impl Section {
    pub fn new<S: Into<String>>(
        name: S,
        instruments: Vec<String>,
    ) -> Result<Self, DashboardError> {
        let name = name.into();
        if instruments.is_empty() {
            return Err(DashboardError::InvalidSection(format!(
                "section '{name}' has no instruments"
            )));
        }
        let mut seen = HashSet::new();
        for instrument in &instruments {
            if !seen.insert(instrument.as_str()) {
                return Err(DashboardError::InvalidSection(format!(
                    "section '{name}' lists '{instrument}' more than once"
                )));
            }
        }
        Ok(Self { name, instruments })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }
}

#[derive(Debug, Deserialize)]
struct RawSection {
    name: String,
    instruments: Vec<String>,
}

impl TryFrom<RawSection> for Section {
    type Error = DashboardError;

    fn try_from(raw: RawSection) -> Result<Self, Self::Error> {
        Section::new(raw.name, raw.instruments)
    }
}

/// On-disk layout of a registry file: a list of `[[section]]` tables.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default, rename = "section")]
    sections: Vec<Section>,
}

/// Immutable, ordered set of sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    /// Build a registry, rejecting duplicate section names. Instruments may
    /// be shared between sections.
    pub fn new(sections: Vec<Section>) -> Result<Self, DashboardError> {
        let mut names = HashSet::new();
        for section in &sections {
            if !names.insert(section.name()) {
                return Err(DashboardError::InvalidSection(format!(
                    "duplicate section name '{}'",
                    section.name()
                )));
            }
        }
        Ok(Self { sections })
    }

    /// The plant's built-in layout.
    pub fn builtin() -> Self {
        let sections = BUILTIN_SECTIONS
            .iter()
            .map(|(name, instruments)| Section {
                name: name.to_string(),
                instruments: instruments.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        Self { sections }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, DashboardError> {
        let file: RegistryFile = toml::from_str(content)?;
        Self::new(file.sections)
    }

    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        let content = std::fs::read_to_string(path)?;
        let registry = Self::from_toml_str(&content)?;
        debug!(
            path = %path.display(),
            sections = registry.len(),
            "loaded section registry"
        );
        Ok(registry)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn get(&self, name: &str) -> Result<&Section, DashboardError> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| DashboardError::UnknownSection(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

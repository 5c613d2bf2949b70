use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Data not loaded: {0}")]
    NotLoaded(String),

    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Missing column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid section: {0}")]
    InvalidSection(String),

    #[error("Config: {0}")]
    Config(String),

    #[error("InvalidData: {0}")]
    InvalidData(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for DashboardError {
    fn from(err: toml::de::Error) -> Self {
        DashboardError::Config(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<DashboardError> for pyo3::PyErr {
    fn from(err: DashboardError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};

        match err {
            DashboardError::UnknownSection(_) => PyKeyError::new_err(err.to_string()),
            DashboardError::MissingColumns(_) | DashboardError::InvalidSection(_) => {
                PyValueError::new_err(err.to_string())
            }
            other => PyRuntimeError::new_err(other.to_string()),
        }
    }
}

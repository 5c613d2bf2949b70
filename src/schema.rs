/// Column-name constants for pump telemetry frames.
/// Single source of truth - exported to Python via PyO3.

// ── Wide table columns ──────────────────────────────────────────────────────
pub mod wide {
    pub const TIMESTAMP: &str = "Fecha";
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
}

// ── Long-form record columns ────────────────────────────────────────────────
pub mod long_form {
    pub const METRIC: &str = "metric";
    pub const VALUE: &str = "valor";
    pub const METRIC_TYPE: &str = "tipo";
}

// ── Statistic columns ───────────────────────────────────────────────────────
pub mod stats {
    pub const COUNT: &str = "count";
    pub const MEAN: &str = "mean";
    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const STD: &str = "std";
}

// ── Distribution columns ────────────────────────────────────────────────────
pub mod distribution {
    pub const Q1: &str = "q1";
    pub const MEDIAN: &str = "median";
    pub const Q3: &str = "q3";
}

// ── Relational pair values ──────────────────────────────────────────────────
pub mod relation {
    pub const POWER: &str = "power";
    pub const LEVEL: &str = "level";
}

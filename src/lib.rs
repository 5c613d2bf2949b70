//! Reshaping and summary engine for wide-format pump telemetry.
//!
//! Instrument columns are grouped into plant sections, tagged with a
//! metric type from their names, melted into long-form records, and
//! summarized into statistics and flow-vs-power / flow-vs-level pairs for
//! a rendering layer to draw.

pub mod aggregation;
pub mod dashboard;
pub mod error;
pub mod metric;
pub mod pairing;
pub mod palette;
pub mod reshape;
pub mod schema;
pub mod sections;
pub mod table;

#[cfg(feature = "python")]
mod python;

pub use aggregation::{aggregate, distributions, Distribution, StatisticRow};
pub use dashboard::{Dashboard, SectionView};
pub use error::DashboardError;
pub use metric::{classify, MetricType};
pub use pairing::{pairs_for, PairSet, RelationKind, RelationalPair};
pub use palette::{color_token, present_palette, PALETTE};
pub use reshape::{reshape, LongRecord};
pub use sections::{Section, SectionRegistry};
pub use table::{LoadOptions, WideTable};

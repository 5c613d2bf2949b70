//! Metric type to display color tokens, consumed verbatim by rendering.

use crate::metric::MetricType;
use crate::reshape::LongRecord;

pub const fn color_token(metric_type: MetricType) -> &'static str {
    match metric_type {
        MetricType::Level => "#1f77b4",
        MetricType::MotorSpeed => "#ff7f0e",
        MetricType::Speed => "#2ca02c",
        MetricType::Power => "#d62728",
        MetricType::FoamFlow => "#9467bd",
        MetricType::Flow => "#8c564b",
        MetricType::Density => "#e377c2",
        MetricType::Other => "#7f7f7f",
    }
}

/// Every metric type with its token, in `MetricType::ALL` order.
pub const PALETTE: [(MetricType, &str); 8] = [
    (MetricType::Level, color_token(MetricType::Level)),
    (MetricType::MotorSpeed, color_token(MetricType::MotorSpeed)),
    (MetricType::Speed, color_token(MetricType::Speed)),
    (MetricType::Power, color_token(MetricType::Power)),
    (MetricType::FoamFlow, color_token(MetricType::FoamFlow)),
    (MetricType::Flow, color_token(MetricType::Flow)),
    (MetricType::Density, color_token(MetricType::Density)),
    (MetricType::Other, color_token(MetricType::Other)),
];

/// Metric types present in `records`, in first-appearance order, with their
/// color tokens. This is the legend domain/range of the time-series view.
pub fn present_palette(records: &[LongRecord]) -> Vec<(MetricType, &'static str)> {
    let mut present: Vec<(MetricType, &'static str)> = Vec::new();
    for record in records {
        if !present.iter().any(|(t, _)| *t == record.metric_type) {
            present.push((record.metric_type, color_token(record.metric_type)));
        }
    }
    present
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(instrument: &str) -> LongRecord {
        LongRecord {
            timestamp: None,
            instrument: instrument.to_string(),
            value: None,
            metric_type: crate::metric::classify(instrument),
        }
    }

    #[test]
    fn one_distinct_token_per_type() {
        let mut tokens: Vec<&str> = MetricType::ALL.iter().map(|t| color_token(*t)).collect();
        tokens.sort();
        tokens.dedup();
        assert_eq!(tokens.len(), 8);
        assert_eq!(color_token(MetricType::Power), "#d62728");
        assert_eq!(color_token(MetricType::Other), "#7f7f7f");
    }

    #[test]
    fn palette_table_matches_color_token() {
        assert_eq!(PALETTE.len(), MetricType::ALL.len());
        for ((t, token), expected) in PALETTE.iter().zip(MetricType::ALL) {
            assert_eq!(*t, expected);
            assert_eq!(*token, color_token(expected));
        }
    }

    #[test]
    fn present_palette_keeps_first_appearance_order() {
        let records = vec![
            record("PotenciaPU023_kW"),
            record("VelocidadPU023_Percent"),
            record("PotenciaPU023_kW"),
        ];
        assert_eq!(
            present_palette(&records),
            vec![
                (MetricType::Power, "#d62728"),
                (MetricType::Speed, "#2ca02c"),
            ]
        );
        assert!(present_palette(&[]).is_empty());
    }
}

//! Trend classification, alerting and the end-to-end analyzer.
//!
//! [`TrendAnalyzer`] ties the crate together: it aggregates scored samples
//! into windows, classifies the overall direction by least-squares slope,
//! runs one change detector and filters its change points into [`Alert`]s.

mod alert;
mod analyzer;
mod direction;

pub use alert::{
    percent_change, segment_change_rate, Alert, AlertGenerator, AlertSettings, RateFormula,
};
pub use analyzer::{TrendAnalyzer, TrendResult, TrendSummary};
pub use direction::{linear_trend, TrendDirection, SLOPE_TOLERANCE};

//! # sentiment-trend
//!
//! Time-series trend and change point analysis for scored sentiment data.
//!
//! Classified items arrive as (positive, negative, neutral) score triples.
//! They are reduced to one signed sentiment value, bucketed into fixed-width
//! time windows, and scanned by one of five change detectors (simple
//! threshold, CUSUM, Z-score, Bayesian, and PELT-based segmentation). Large before/after shifts become
//! alerts. Everything is synchronous and in-memory; no I/O happens during
//! analysis.

#![allow(clippy::needless_range_loop)]

pub mod aggregation;
pub mod changepoint;
pub mod config;
pub mod core;
pub mod error;
pub mod trend;
pub mod utils;

pub use error::{Result, TrendError};

pub mod prelude {
    pub use crate::aggregation::{AggregatedWindow, TimeWindowAggregator};
    pub use crate::changepoint::{
        ChangeDetector, ChangePoint, ChangeType, DetectorConfig, DetectorKind,
    };
    pub use crate::config::TrendConfig;
    pub use crate::core::{scalarize, ScalarPoint, SentimentScoreTriple, WindowWidth};
    pub use crate::error::{Result, TrendError};
    pub use crate::trend::{
        Alert, AlertSettings, TrendAnalyzer, TrendDirection, TrendResult, TrendSummary,
    };
}

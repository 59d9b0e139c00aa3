//! Time-window aggregation of scored samples.
//!
//! Samples are bucketed by flooring their timestamp to a multiple of the
//! window width. Each non-empty bucket becomes one [`AggregatedWindow`]
//! (mean, population standard deviation and count of the scalar sentiment),
//! and windows are returned in ascending order of their start.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use sentiment_trend::aggregation::TimeWindowAggregator;
//! use sentiment_trend::core::{SentimentScoreTriple, WindowWidth};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let samples: Vec<_> = (0..30)
//!     .map(|i| SentimentScoreTriple::new(start + Duration::minutes(i), 0.7, 0.2, 0.1))
//!     .collect();
//!
//! let aggregator = TimeWindowAggregator::new(WindowWidth::minutes(10).unwrap());
//! let windows = aggregator.aggregate(&samples);
//!
//! assert_eq!(windows.len(), 3);
//! assert!(windows.iter().all(|w| w.count == 10));
//! ```

mod windows;

pub use windows::{
    aggregate_windows, window_series, AggregatedWindow, ComponentMeans, TimeWindowAggregator,
};

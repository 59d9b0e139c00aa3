//! Change point detection over scalar sentiment series.
//!
//! All detectors implement [`ChangeDetector`] and report [`ChangePoint`]s in
//! ascending time order.
//!
//! # Available Detectors
//!
//! - **Simple**: relative change between consecutive time windows
//! - **CUSUM**: two-sided cumulative sums for sustained mean shifts
//! - **Z-score**: adjacent windows compared against local volatility
//! - **Bayesian**: heuristic posterior from a sigmoid likelihood and a prior
//! - **Advanced**: PELT segmentation, sliding windows or a moving average,
//!   scored by the standardized mean shift
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use sentiment_trend::changepoint::{ChangeDetector, ChangeType, SimpleDetector};
//! use sentiment_trend::core::ScalarPoint;
//!
//! // Sentiment drops from 0.8 to -0.8 after ten minutes
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let series: Vec<_> = (0..20)
//!     .map(|i| {
//!         let value = if i < 10 { 0.8 } else { -0.8 };
//!         ScalarPoint::new(start + Duration::minutes(i), value)
//!     })
//!     .collect();
//!
//! let change_points = SimpleDetector::default().detect_changes(&series);
//!
//! assert_eq!(change_points.len(), 1);
//! assert_eq!(change_points[0].change_type, ChangeType::Decrease);
//! ```

pub mod advanced;
pub mod bayesian;
pub mod cusum;
mod detector;
pub mod simple;
mod types;
pub mod zscore;

pub use advanced::{
    centered_moving_average, pelt_segment, AdvancedConfig, AdvancedDetector, AdvancedMethod,
    Segmentation,
};
pub use bayesian::{BayesianConfig, BayesianDetector};
pub use cusum::{CusumConfig, CusumDetector, CusumStatistics};
pub use detector::{BoxedDetector, ChangeDetector, DetectorConfig, SeriesInput};
pub use simple::{window_change_rate, SimpleConfig, SimpleDetector};
pub use types::{
    relative_change, ChangePoint, ChangeType, DetectionDetail, DetectorKind, RATE_EPSILON,
};
pub use zscore::{ZScoreConfig, ZScoreDetector};

//! Threshold detector over consecutive time windows.
//!
//! The series is bucketed into windows of the detector's own width; every
//! consecutive pair whose relative change exceeds the threshold is reported.
//! Adjacent crossings are not merged, so a steady ramp yields one change
//! point per window.

use super::detector::{ensure_non_negative, ChangeDetector, SeriesInput};
use super::types::{ChangePoint, ChangeType, DetectionDetail, DetectorKind};
use crate::aggregation::TimeWindowAggregator;
use crate::core::{ScalarPoint, WindowWidth};
use crate::error::Result;

/// Below this previous-window magnitude the absolute change is used instead
/// of the relative change.
pub const NEAR_ZERO: f64 = 0.01;

/// Configuration for the simple threshold detector.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleConfig {
    /// Width of the windows compared against each other
    pub window: WindowWidth,
    /// Fractional change rate a window must exceed to be reported
    pub threshold: f64,
}

impl Default for SimpleConfig {
    fn default() -> Self {
        Self {
            window: WindowWidth::TEN_MINUTES,
            threshold: 0.3,
        }
    }
}

impl SimpleConfig {
    /// Set the window width.
    pub fn window(mut self, window: WindowWidth) -> Self {
        self.window = window;
        self
    }

    /// Set the change-rate threshold.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("threshold", self.threshold)
    }
}

/// Compares the mean sentiment of each window with the one before it.
#[derive(Debug, Clone, Default)]
pub struct SimpleDetector {
    config: SimpleConfig,
}

impl SimpleDetector {
    pub fn new(config: SimpleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimpleConfig {
        &self.config
    }
}

/// Relative change between windows, falling back to the absolute change
/// when the previous mean is near zero.
pub fn window_change_rate(previous: f64, current: f64) -> f64 {
    let delta = (current - previous).abs();
    if previous.abs() > NEAR_ZERO {
        delta / previous.abs()
    } else {
        delta
    }
}

impl ChangeDetector for SimpleDetector {
    fn detect_changes(&self, series: &[ScalarPoint]) -> Vec<ChangePoint> {
        let windows = TimeWindowAggregator::new(self.config.window).aggregate_points(series);
        if windows.len() < 2 {
            log::trace!("simple: {} window(s), need at least 2", windows.len());
            return Vec::new();
        }

        windows
            .windows(2)
            .filter_map(|pair| {
                let (prev, curr) = (&pair[0], &pair[1]);
                let change_rate = window_change_rate(prev.mean_sentiment, curr.mean_sentiment);
                (change_rate > self.config.threshold).then(|| ChangePoint {
                    timestamp: curr.window_start,
                    previous_score: prev.mean_sentiment,
                    current_score: curr.mean_sentiment,
                    change_rate,
                    change_type: ChangeType::from_scores(prev.mean_sentiment, curr.mean_sentiment),
                    method: DetectorKind::Simple,
                    detail: DetectionDetail::Simple {
                        previous_window: prev.window_start,
                    },
                })
            })
            .collect()
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Simple
    }

    fn input(&self) -> SeriesInput {
        SeriesInput::Samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap()
    }

    /// One point per window, at the start of each 10-minute window.
    fn windowed(values: &[f64]) -> Vec<ScalarPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| ScalarPoint::new(base() + Duration::minutes(10 * i as i64), v))
            .collect()
    }

    #[test]
    fn fewer_than_two_windows_is_empty() {
        let detector = SimpleDetector::default();
        assert!(detector.detect_changes(&[]).is_empty());

        // Several samples inside one window
        let points: Vec<_> = (0..5)
            .map(|i| ScalarPoint::new(base() + Duration::minutes(i), i as f64))
            .collect();
        assert!(detector.detect_changes(&points).is_empty());
    }

    #[test]
    fn threshold_boundary() {
        let detector = SimpleDetector::default();

        // |0.66 - 0.5| / 0.5 = 0.32 > 0.3
        let cps = detector.detect_changes(&windowed(&[0.5, 0.66]));
        assert_eq!(cps.len(), 1);
        assert_relative_eq!(cps[0].change_rate, 0.32, epsilon = 1e-9);
        assert_eq!(cps[0].change_type, ChangeType::Increase);

        // |0.64 - 0.5| / 0.5 = 0.28 < 0.3
        assert!(detector.detect_changes(&windowed(&[0.5, 0.64])).is_empty());
    }

    #[test]
    fn threshold_boundary_around_one() {
        let detector = SimpleDetector::default();
        let eps = 1e-6;
        assert_eq!(detector.detect_changes(&windowed(&[1.0, 1.3 + eps])).len(), 1);
        assert!(detector.detect_changes(&windowed(&[1.0, 1.3 - eps])).is_empty());
    }

    #[test]
    fn near_zero_previous_uses_absolute_change() {
        assert_relative_eq!(window_change_rate(0.005, 0.405), 0.4, epsilon = 1e-12);
        assert_relative_eq!(window_change_rate(0.5, 0.25), 0.5, epsilon = 1e-12);

        let cps = SimpleDetector::default().detect_changes(&windowed(&[0.0, 0.35]));
        assert_eq!(cps.len(), 1);
        assert_relative_eq!(cps[0].change_rate, 0.35, epsilon = 1e-12);
    }

    #[test]
    fn reports_current_window_and_previous_window() {
        let cps = SimpleDetector::default().detect_changes(&windowed(&[0.6, 0.6, -0.2]));
        assert_eq!(cps.len(), 1);
        assert_eq!(cps[0].timestamp, base() + Duration::minutes(20));
        assert_eq!(
            cps[0].detail,
            DetectionDetail::Simple {
                previous_window: base() + Duration::minutes(10)
            }
        );
        assert_eq!(cps[0].change_type, ChangeType::Decrease);
        assert_eq!(cps[0].method, DetectorKind::Simple);
    }

    #[test]
    fn ramp_reports_every_crossing() {
        let cps = SimpleDetector::default().detect_changes(&windowed(&[0.1, 0.2, 0.4, 0.8]));
        assert_eq!(cps.len(), 3);
        assert!(cps.iter().all(|cp| cp.change_type == ChangeType::Increase));
    }

    #[test]
    fn regroups_by_own_window_width() {
        // Two 5-minute halves of the same 10-minute window are merged
        let points = vec![
            ScalarPoint::new(base(), 0.8),
            ScalarPoint::new(base() + Duration::minutes(5), -0.8),
            ScalarPoint::new(base() + Duration::minutes(10), 0.0),
        ];
        let cps = SimpleDetector::default().detect_changes(&points);
        assert!(cps.is_empty());

        let five = SimpleConfig::default().window(WindowWidth::minutes(5).unwrap());
        let cps = SimpleDetector::new(five).unwrap().detect_changes(&points);
        assert_eq!(cps.len(), 2);
    }

    #[test]
    fn rejects_negative_threshold() {
        assert!(SimpleDetector::new(SimpleConfig::default().threshold(-0.1)).is_err());
        assert!(SimpleDetector::new(SimpleConfig::default().threshold(f64::NAN)).is_err());
    }
}

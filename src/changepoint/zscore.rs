//! Adjacent-window Z-score detector.
//!
//! For each index `i` in `[w, n - w)` the mean of the following window
//! `[i, i + w)` is compared with the mean of the preceding window
//! `[i - w, i)`, measured in units of the preceding window's population
//! standard deviation. Shifts are therefore judged relative to local
//! volatility: the same step counts for more in a calm period than in a
//! noisy one.

use super::detector::{ensure_non_negative, ChangeDetector};
use super::types::{relative_change, ChangePoint, ChangeType, DetectionDetail, DetectorKind};
use crate::core::ScalarPoint;
use crate::error::{Result, TrendError};
use crate::utils::stats::{mean, population_std_dev};

/// Configuration for the Z-score detector.
#[derive(Debug, Clone, PartialEq)]
pub struct ZScoreConfig {
    /// Z-score a window shift must exceed
    pub z_threshold: f64,
    /// Number of samples in each of the two compared windows
    pub window_size: usize,
}

impl Default for ZScoreConfig {
    fn default() -> Self {
        Self {
            z_threshold: 2.5,
            window_size: 10,
        }
    }
}

impl ZScoreConfig {
    /// Set the Z-score threshold.
    pub fn z_threshold(mut self, z_threshold: f64) -> Self {
        self.z_threshold = z_threshold;
        self
    }

    /// Set the window size.
    pub fn window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("z_threshold", self.z_threshold)?;
        if self.window_size == 0 {
            return Err(TrendError::InvalidParameter(
                "window_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ZScoreDetector {
    config: ZScoreConfig,
}

impl ZScoreDetector {
    pub fn new(config: ZScoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ZScoreConfig {
        &self.config
    }
}

impl ChangeDetector for ZScoreDetector {
    fn detect_changes(&self, series: &[ScalarPoint]) -> Vec<ChangePoint> {
        let w = self.config.window_size;
        let n = series.len();
        if n < 2 * w {
            log::trace!("zscore: series of {} shorter than 2 x {}", n, w);
            return Vec::new();
        }

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let mut change_points = Vec::new();

        for i in w..(n - w) {
            let previous = &values[i - w..i];
            let prev_sd = population_std_dev(previous);
            if prev_sd < 1e-8 {
                continue;
            }

            let prev_mean = mean(previous);
            let curr_mean = mean(&values[i..i + w]);
            let z_score = (curr_mean - prev_mean).abs() / prev_sd;

            if z_score > self.config.z_threshold {
                change_points.push(ChangePoint {
                    timestamp: series[i].timestamp,
                    previous_score: prev_mean,
                    current_score: curr_mean,
                    change_rate: relative_change(prev_mean, curr_mean),
                    change_type: ChangeType::from_scores(prev_mean, curr_mean),
                    method: DetectorKind::ZScore,
                    detail: DetectionDetail::ZScore { z_score },
                });
            }
        }

        change_points
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::ZScore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn series(values: &[f64]) -> Vec<ScalarPoint> {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| ScalarPoint::new(base + Duration::hours(i as i64), v))
            .collect()
    }

    /// Alternating +-0.1 around `level`.
    fn noisy(level: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| level + if i % 2 == 0 { 0.1 } else { -0.1 })
            .collect()
    }

    #[test]
    fn short_series_is_empty() {
        let detector = ZScoreDetector::default();
        assert!(detector.detect_changes(&series(&noisy(0.0, 19))).is_empty());
    }

    #[test]
    fn flat_preceding_window_is_skipped() {
        // Only index 10 is in range, and its preceding window is constant
        let mut values = vec![0.3; 10];
        values.extend(vec![0.9; 11]);
        let cps = ZScoreDetector::default().detect_changes(&series(&values));
        assert!(cps.is_empty());
    }

    #[test]
    fn detects_step_relative_to_local_noise() {
        let mut values = noisy(0.0, 15);
        values.extend(noisy(0.8, 15));
        let cps = ZScoreDetector::default().detect_changes(&series(&values));

        assert!(!cps.is_empty());
        let at_step = cps
            .iter()
            .find(|cp| cp.timestamp == series(&values)[15].timestamp)
            .unwrap();
        // Preceding window [5, 15) has sd 0.1, following window [15, 25) mean 0.8
        assert_relative_eq!(at_step.previous_score, 0.0, epsilon = 1e-12);
        assert_relative_eq!(at_step.current_score, 0.8, epsilon = 1e-12);
        assert_relative_eq!(at_step.z_score().unwrap(), 8.0, epsilon = 1e-9);
        assert_eq!(at_step.change_type, ChangeType::Increase);
    }

    #[test]
    fn small_step_in_noise_is_ignored() {
        let mut values = noisy(0.0, 15);
        values.extend(noisy(0.2, 15));
        let cps = ZScoreDetector::default().detect_changes(&series(&values));
        assert!(cps.is_empty());
    }

    #[test]
    fn negated_series_flips_change_types() {
        let mut values = noisy(0.1, 15);
        values.extend(noisy(-0.6, 15));
        let negated: Vec<f64> = values.iter().map(|v| -v).collect();

        let detector = ZScoreDetector::default();
        let cps = detector.detect_changes(&series(&values));
        let flipped = detector.detect_changes(&series(&negated));

        assert_eq!(cps.len(), flipped.len());
        for (a, b) in cps.iter().zip(&flipped) {
            assert_eq!(a.timestamp, b.timestamp);
            assert_eq!(a.change_type, b.change_type.flipped());
            assert_relative_eq!(a.z_score().unwrap(), b.z_score().unwrap(), epsilon = 1e-12);
        }
    }

    #[test]
    fn rejects_zero_window() {
        assert!(ZScoreDetector::new(ZScoreConfig::default().window_size(0)).is_err());
        assert!(ZScoreDetector::new(ZScoreConfig::default().z_threshold(-1.0)).is_err());
    }
}

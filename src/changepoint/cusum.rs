//! Two-sided CUSUM (cumulative sum) detector for sustained mean shifts.
//!
//! The series is standardized by its own mean and population standard
//! deviation, then two running sums accumulate deviations above and below
//! the mean:
//!
//! ```text
//! S+[i] = max(0, S+[i-1] + z[i] - k)
//! S-[i] = max(0, S-[i-1] - z[i] - k)
//! ```
//!
//! with `S+[0] = S-[0] = 0`. Every index where either sum exceeds the
//! threshold `h` is reported. The drift `k` keeps pure noise from
//! accumulating, so only persistent shifts reach the threshold.
//!
//! A crossing of `S+` is reported as an increase and a crossing of `S-` as a
//! decrease, whatever the order of the reported neighbourhood scores.

use super::detector::{ensure_non_negative, ChangeDetector};
use super::types::{relative_change, ChangePoint, ChangeType, DetectionDetail, DetectorKind};
use crate::core::ScalarPoint;
use crate::error::Result;
use crate::utils::stats::{mean, population_std_dev};

/// Minimum series length for CUSUM detection.
pub const MIN_SAMPLES: usize = 3;

/// Number of samples on each side averaged for the reported scores.
pub const REPORT_RADIUS: usize = 5;

/// Configuration for the CUSUM detector.
#[derive(Debug, Clone, PartialEq)]
pub struct CusumConfig {
    /// Decision threshold `h`, in standard deviations
    pub threshold: f64,
    /// Allowance `k` subtracted at every step
    pub drift: f64,
}

impl Default for CusumConfig {
    fn default() -> Self {
        Self {
            threshold: 5.0,
            drift: 0.5,
        }
    }
}

impl CusumConfig {
    /// Set the decision threshold.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the drift allowance.
    pub fn drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("cusum threshold", self.threshold)?;
        ensure_non_negative("cusum drift", self.drift)
    }
}

/// Running CUSUM statistics for a standardized series.
#[derive(Debug, Clone, PartialEq)]
pub struct CusumStatistics {
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Two-sided CUSUM detector.
///
/// `change_type` follows the crossing statistic, not the scores: with global
/// standardization a long stretch below the mean crosses `S-` even while the
/// level is already rising, so a `Decrease` can carry
/// `current_score > previous_score`.
#[derive(Debug, Clone, Default)]
pub struct CusumDetector {
    config: CusumConfig,
}

impl CusumDetector {
    pub fn new(config: CusumConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CusumConfig {
        &self.config
    }

    /// Compute `S+` and `S-` for `values`.
    ///
    /// Returns `None` when the series is shorter than [`MIN_SAMPLES`] or has
    /// no variance.
    pub fn statistics(&self, values: &[f64]) -> Option<CusumStatistics> {
        let n = values.len();
        if n < MIN_SAMPLES {
            return None;
        }

        let m = mean(values);
        let sd = population_std_dev(values);
        if sd < 1e-8 {
            return None;
        }

        let k = self.config.drift;
        let mut upper = vec![0.0; n];
        let mut lower = vec![0.0; n];
        for i in 1..n {
            let z = (values[i] - m) / sd;
            upper[i] = (upper[i - 1] + z - k).max(0.0);
            lower[i] = (lower[i - 1] - z - k).max(0.0);
        }

        Some(CusumStatistics { upper, lower })
    }
}

impl ChangeDetector for CusumDetector {
    fn detect_changes(&self, series: &[ScalarPoint]) -> Vec<ChangePoint> {
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let Some(stats) = self.statistics(&values) else {
            log::trace!("cusum: skipped series of {} (too short or constant)", values.len());
            return Vec::new();
        };

        let n = values.len();
        let h = self.config.threshold;
        let mut change_points = Vec::new();

        for i in 1..n {
            let (change_type, change_magnitude) = if stats.upper[i] > h {
                (ChangeType::Increase, stats.upper[i])
            } else if stats.lower[i] > h {
                (ChangeType::Decrease, stats.lower[i])
            } else {
                continue;
            };

            let previous_score = mean(&values[i.saturating_sub(REPORT_RADIUS)..i]);
            let current_score = mean(&values[i..(i + REPORT_RADIUS).min(n)]);

            change_points.push(ChangePoint {
                timestamp: series[i].timestamp,
                previous_score,
                current_score,
                change_rate: relative_change(previous_score, current_score),
                change_type,
                method: DetectorKind::Cusum,
                detail: DetectionDetail::Cusum { change_magnitude },
            });
        }

        change_points
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Cusum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn series(values: &[f64]) -> Vec<ScalarPoint> {
        let base = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| ScalarPoint::new(base + Duration::hours(i as i64), v))
            .collect()
    }

    fn step(before: usize, low: f64, after: usize, high: f64) -> Vec<f64> {
        let mut v = vec![low; before];
        v.extend(vec![high; after]);
        v
    }

    #[test]
    fn short_series_is_empty() {
        let detector = CusumDetector::default();
        assert!(detector.detect_changes(&series(&[0.1, 0.9])).is_empty());
    }

    #[test]
    fn constant_series_is_empty() {
        let detector = CusumDetector::new(CusumConfig::default().threshold(0.0).drift(0.0)).unwrap();
        assert!(detector.detect_changes(&series(&[0.4; 30])).is_empty());
        assert!(detector.statistics(&[0.4; 30]).is_none());
    }

    #[test]
    fn statistics_start_at_zero_and_stay_non_negative() {
        let values: Vec<f64> = (0..20).map(|i| ((i * 7) % 5) as f64 / 5.0 - 0.4).collect();
        let stats = CusumDetector::default().statistics(&values).unwrap();
        assert_relative_eq!(stats.upper[0], 0.0);
        assert_relative_eq!(stats.lower[0], 0.0);
        assert!(stats.upper.iter().chain(&stats.lower).all(|&s| s >= 0.0));
    }

    /// 40 samples at 0.0 followed by 10 samples at `level`.
    ///
    /// Mean 0.2 |level|, standard deviation 0.4 |level|: the baseline
    /// standardizes to -0.5 (or +0.5) and the shift to +2 (or -2).
    fn late_shift(level: f64) -> Vec<f64> {
        step(40, 0.0, 10, level)
    }

    #[test]
    fn detects_upward_shift() {
        let values = late_shift(1.0);
        let cps = CusumDetector::default().detect_changes(&series(&values));

        // S+ grows by 1.5 per shifted sample: 1.5, 3.0, 4.5, 6.0, ...
        assert_eq!(cps.len(), 7);
        assert_eq!(cps[0].timestamp, series(&values)[43].timestamp);
        assert!(cps.iter().all(|cp| cp.change_type == ChangeType::Increase));
        assert!(cps.iter().all(|cp| cp.cusum_magnitude().unwrap() > 5.0));
    }

    #[test]
    fn detects_downward_shift() {
        let values = late_shift(-1.0);
        let cps = CusumDetector::default().detect_changes(&series(&values));
        assert_eq!(cps.len(), 7);
        assert!(cps.iter().all(|cp| cp.change_type == ChangeType::Decrease));
    }

    #[test]
    fn balanced_step_flags_both_sides_of_the_global_mean() {
        // Standardized values are -1 then +1; the first half drifts below the
        // global mean long enough for S- to cross before the shift happens.
        let values = step(20, -0.5, 20, 0.5);
        let cps = CusumDetector::default().detect_changes(&series(&values));

        let decreases: Vec<_> = cps
            .iter()
            .filter(|cp| cp.change_type == ChangeType::Decrease)
            .collect();
        let increases: Vec<_> = cps
            .iter()
            .filter(|cp| cp.change_type == ChangeType::Increase)
            .collect();
        assert_eq!(decreases.len(), 11);
        assert_eq!(increases.len(), 10);
        assert_eq!(decreases[0].timestamp, series(&values)[11].timestamp);
        assert_eq!(increases[0].timestamp, series(&values)[30].timestamp);
    }

    #[test]
    fn change_type_names_the_crossing_statistic() {
        // S- is still above h for two steps after the level rises at index 20
        let values = step(20, -0.5, 20, 0.5);
        let points = series(&values);
        let cps = CusumDetector::default().detect_changes(&points);

        for idx in [20, 21] {
            let cp = cps.iter().find(|cp| cp.timestamp == points[idx].timestamp).unwrap();
            assert_eq!(cp.change_type, ChangeType::Decrease);
            assert_relative_eq!(cp.previous_score, -0.5, epsilon = 1e-12);
            assert_relative_eq!(cp.current_score, 0.5, epsilon = 1e-12);
            assert_ne!(
                cp.change_type,
                ChangeType::from_scores(cp.previous_score, cp.current_score)
            );
        }
        assert!(cps.iter().all(|cp| cp.timestamp != points[22].timestamp));
    }

    #[test]
    fn reported_scores_average_neighbourhood() {
        let values = late_shift(1.0);
        let cps = CusumDetector::default().detect_changes(&series(&values));

        // Index 43: previous = mean([0, 0, 1, 1, 1]), current = mean([1; 5])
        let first = &cps[0];
        assert_relative_eq!(first.previous_score, 0.6, epsilon = 1e-12);
        assert_relative_eq!(first.current_score, 1.0, epsilon = 1e-12);
        assert_relative_eq!(first.change_rate, 0.4 / 0.6, epsilon = 1e-6);

        // Last index: current window clamps to the final sample
        let last = cps.last().unwrap();
        assert_eq!(last.timestamp, series(&values)[49].timestamp);
        assert_relative_eq!(last.current_score, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn lower_threshold_reports_earlier() {
        let values = late_shift(1.0);
        let strict = CusumDetector::default().detect_changes(&series(&values));
        let loose = CusumDetector::new(CusumConfig::default().threshold(2.0))
            .unwrap()
            .detect_changes(&series(&values));
        assert!(loose.len() > strict.len());
        assert_eq!(loose[0].timestamp, series(&values)[41].timestamp);
    }

    #[test]
    fn rejects_negative_parameters() {
        assert!(CusumDetector::new(CusumConfig::default().threshold(-5.0)).is_err());
        assert!(CusumDetector::new(CusumConfig::default().drift(-0.1)).is_err());
    }
}

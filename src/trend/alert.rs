//! Alerts: change points whose whole-series before/after shift is large.
//!
//! The alert pass is independent of the detector that produced the change
//! points. Each change point splits the aggregated windows into everything
//! before it and everything from it onward, and the percent change between
//! the two means is compared against the alert threshold. The advanced
//! detector's alerts measure that change against an exact baseline
//! ([`RateFormula::Exact`]); every other detector pads the baseline.

use crate::aggregation::AggregatedWindow;
use crate::changepoint::{ChangeType, DetectorKind};
use crate::error::{Result, TrendError};
use crate::utils::stats::mean;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A change point that passed the alert threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub change_point: DateTime<Utc>,
    pub change_type: ChangeType,
    /// Absolute percent change between the before and after means.
    pub change_rate: f64,
    pub previous_sentiment: f64,
    pub current_sentiment: f64,
}

/// Whether alerts are produced, and the fractional change that triggers one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertSettings {
    pub enabled: bool,
    /// Fractional change rate; 0.5 alerts on a 50% shift.
    pub threshold: f64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.5,
        }
    }
}

impl AlertSettings {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(TrendError::InvalidParameter(format!(
                "alert threshold must be a finite non-negative number, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Signed percent change from `before` to `after`,
/// `(after - before) / (|before| + 1e-8) * 100`.
pub fn percent_change(before: f64, after: f64) -> f64 {
    (after - before) / (before.abs() + 1e-8) * 100.0
}

/// Signed percent change from `before` to `after` against an exact
/// baseline, `(after - before) / |before| * 100`, or 0 when `before` is 0.
pub fn segment_change_rate(before: f64, after: f64) -> f64 {
    if before == 0.0 {
        return 0.0;
    }
    (after - before) / before.abs() * 100.0
}

/// Which percent-change formula an alert pass uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateFormula {
    /// [`percent_change`]
    #[default]
    Padded,
    /// [`segment_change_rate`]
    Exact,
}

impl RateFormula {
    /// The formula used for change points from `kind`.
    pub fn for_detector(kind: DetectorKind) -> Self {
        match kind {
            DetectorKind::Advanced => RateFormula::Exact,
            _ => RateFormula::Padded,
        }
    }

    pub fn apply(&self, before: f64, after: f64) -> f64 {
        match self {
            RateFormula::Padded => percent_change(before, after),
            RateFormula::Exact => segment_change_rate(before, after),
        }
    }
}

/// Turns change points into alerts by comparing the window means on each side.
///
/// # Example
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use sentiment_trend::aggregation::AggregatedWindow;
/// use sentiment_trend::changepoint::ChangeType;
/// use sentiment_trend::trend::AlertGenerator;
///
/// let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
/// let windows: Vec<_> = [0.6, 0.6, -0.2, -0.2]
///     .iter()
///     .enumerate()
///     .map(|(i, &m)| AggregatedWindow {
///         window_start: start + Duration::hours(i as i64),
///         mean_sentiment: m,
///         stdev_sentiment: 0.0,
///         count: 1,
///         components: None,
///     })
///     .collect();
///
/// let alerts = AlertGenerator::generate(&windows, &[start + Duration::hours(2)], 0.5);
/// assert_eq!(alerts.len(), 1);
/// assert_eq!(alerts[0].change_type, ChangeType::Decrease);
/// ```
pub struct AlertGenerator;

impl AlertGenerator {
    /// Alerts for every change point whose before/after percent change is at
    /// least `threshold * 100` in magnitude.
    ///
    /// Change points with no window on one side are skipped.
    pub fn generate(
        windows: &[AggregatedWindow],
        change_points: &[DateTime<Utc>],
        threshold: f64,
    ) -> Vec<Alert> {
        Self::generate_by(RateFormula::Padded, windows, change_points, threshold)
    }

    /// [`AlertGenerator::generate`] with an explicit rate formula.
    pub fn generate_by(
        formula: RateFormula,
        windows: &[AggregatedWindow],
        change_points: &[DateTime<Utc>],
        threshold: f64,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for &cp in change_points {
            let (before, after): (Vec<&AggregatedWindow>, Vec<&AggregatedWindow>) =
                windows.iter().partition(|w| w.window_start < cp);
            if before.is_empty() || after.is_empty() {
                log::trace!("alert: change point {} has an empty side", cp);
                continue;
            }

            let before_mean = mean(&before.iter().map(|w| w.mean_sentiment).collect::<Vec<_>>());
            let after_mean = mean(&after.iter().map(|w| w.mean_sentiment).collect::<Vec<_>>());
            let pct = formula.apply(before_mean, after_mean);

            if pct.abs() >= threshold * 100.0 {
                let change_type = if pct > 0.0 {
                    ChangeType::Increase
                } else {
                    ChangeType::Decrease
                };
                alerts.push(Alert {
                    change_point: cp,
                    change_type,
                    change_rate: pct.abs(),
                    previous_sentiment: before_mean,
                    current_sentiment: after_mean,
                });
            }
        }

        alerts
    }

    /// Apply [`AlertGenerator::generate_by`] under `settings`, yielding
    /// nothing when alerts are disabled.
    pub fn generate_with(
        settings: &AlertSettings,
        formula: RateFormula,
        windows: &[AggregatedWindow],
        change_points: &[DateTime<Utc>],
    ) -> Vec<Alert> {
        if !settings.enabled {
            return Vec::new();
        }
        Self::generate_by(formula, windows, change_points, settings.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    fn windows(means: &[f64]) -> Vec<AggregatedWindow> {
        means
            .iter()
            .enumerate()
            .map(|(i, &m)| AggregatedWindow {
                window_start: base() + Duration::hours(i as i64),
                mean_sentiment: m,
                stdev_sentiment: 0.0,
                count: 1,
                components: None,
            })
            .collect()
    }

    #[test]
    fn percent_change_formula() {
        assert_relative_eq!(percent_change(0.5, 0.25), -50.0, epsilon = 1e-5);
        assert_relative_eq!(percent_change(-0.4, 0.4), 200.0, epsilon = 1e-5);
        assert_relative_eq!(percent_change(0.0, 0.1), 0.1 / 1e-8 * 100.0, epsilon = 1e-3);
    }

    #[test]
    fn splits_on_window_start() {
        let ws = windows(&[0.8, 0.8, -0.8, -0.8]);
        let cp = base() + Duration::hours(2);
        let alerts = AlertGenerator::generate(&ws, &[cp], 0.5);

        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.change_point, cp);
        assert_eq!(alert.change_type, ChangeType::Decrease);
        assert_relative_eq!(alert.previous_sentiment, 0.8, epsilon = 1e-12);
        assert_relative_eq!(alert.current_sentiment, -0.8, epsilon = 1e-12);
        assert_relative_eq!(alert.change_rate, 200.0, epsilon = 1e-4);
    }

    #[test]
    fn skips_change_points_with_an_empty_side() {
        let ws = windows(&[0.2, 0.9]);
        let at_first = base();
        let after_last = base() + Duration::hours(5);
        assert!(AlertGenerator::generate(&ws, &[at_first, after_last], 0.0).is_empty());
    }

    #[test]
    fn small_whole_series_shift_is_not_alerted() {
        // Local jump at hour 2 is large, but the before/after means differ by just under 40%
        let ws = windows(&[0.5, 0.5, 0.9, 0.5]);
        let cp = base() + Duration::hours(2);
        assert!(AlertGenerator::generate(&ws, &[cp], 0.5).is_empty());
        assert!(AlertGenerator::generate(&ws, &[cp], 0.4).is_empty());
        assert_eq!(AlertGenerator::generate(&ws, &[cp], 0.35).len(), 1);
    }

    #[test]
    fn disabled_settings_produce_no_alerts() {
        let ws = windows(&[0.8, -0.8]);
        let cp = base() + Duration::hours(1);
        let off = AlertSettings::default().enabled(false);
        assert!(AlertGenerator::generate_with(&off, RateFormula::Padded, &ws, &[cp]).is_empty());
        assert_eq!(
            AlertGenerator::generate_with(&AlertSettings::default(), RateFormula::Padded, &ws, &[cp])
                .len(),
            1
        );
    }

    #[test]
    fn exact_rate_treats_a_zero_baseline_as_flat() {
        assert_relative_eq!(segment_change_rate(0.5, 0.25), -50.0, epsilon = 1e-12);
        assert_relative_eq!(segment_change_rate(-0.4, 0.4), 200.0, epsilon = 1e-12);
        assert_eq!(segment_change_rate(0.0, 0.9), 0.0);
    }

    #[test]
    fn zero_baseline_alerts_only_under_the_padded_formula() {
        let ws = windows(&[0.0, 0.0, 0.6, 0.6]);
        let cp = base() + Duration::hours(2);

        let padded = AlertGenerator::generate_by(RateFormula::Padded, &ws, &[cp], 0.5);
        assert_eq!(padded.len(), 1);
        assert_eq!(padded[0].change_type, ChangeType::Increase);

        assert!(AlertGenerator::generate_by(RateFormula::Exact, &ws, &[cp], 0.5).is_empty());
        // A zero rate still passes a zero threshold, as a decrease
        let flat = AlertGenerator::generate_by(RateFormula::Exact, &ws, &[cp], 0.0);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].change_type, ChangeType::Decrease);
        assert_eq!(flat[0].change_rate, 0.0);
    }

    #[test]
    fn formula_follows_detector_kind() {
        assert_eq!(RateFormula::for_detector(DetectorKind::Advanced), RateFormula::Exact);
        for kind in [
            DetectorKind::Simple,
            DetectorKind::Cusum,
            DetectorKind::ZScore,
            DetectorKind::Bayesian,
        ] {
            assert_eq!(RateFormula::for_detector(kind), RateFormula::Padded);
        }
    }

    #[test]
    fn rejects_negative_threshold() {
        assert!(AlertSettings::default().threshold(-0.5).validate().is_err());
        assert!(AlertSettings::default().threshold(0.0).validate().is_ok());
    }
}

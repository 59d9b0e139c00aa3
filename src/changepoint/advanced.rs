//! Segmentation-based detection: PELT, sliding windows or a moving average.
//!
//! Every variant proposes boundaries, measures the shift in mean level
//! across each one in units of the whole series' population standard
//! deviation, and reports the boundaries whose shift exceeds `threshold`.
//!
//! - **PELT** (Pruned Exact Linear Time) finds the optimal segmentation
//!   under an L2 cost plus `penalty` per change point, with segments of at
//!   least `min_size` points. The compared levels are the means of the two
//!   segments meeting at a boundary.
//! - **Window** compares the mean of `[i - w, i)` with that of `[i, i + w)`,
//!   where `w = max(min_size, n / 10)`.
//! - **Simple** compares consecutive values of a centered moving average of
//!   width `max(3, n / 10)`.
//!
//! Series shorter than `2 * min_size` yield nothing.
//!
//! # Example
//!
//! ```
//! use sentiment_trend::changepoint::pelt_segment;
//!
//! let mut values = vec![0.8; 10];
//! values.extend(vec![-0.8; 10]);
//!
//! let segmentation = pelt_segment(&values, 10.0, 2);
//! assert_eq!(segmentation.changepoints, vec![10]);
//! assert_eq!(segmentation.segments, vec![(0, 10), (10, 20)]);
//! ```

use super::detector::{ensure_non_negative, ChangeDetector};
use super::types::{
    relative_change, ChangePoint, ChangeType, DetectionDetail, DetectorKind, RATE_EPSILON,
};
use crate::core::ScalarPoint;
use crate::error::{Result, TrendError};
use crate::utils::stats::{mean, population_std_dev};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the advanced detector proposes boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvancedMethod {
    #[default]
    Pelt,
    Window,
    #[serde(rename = "simple", alias = "moving_average")]
    MovingAverage,
}

impl AdvancedMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvancedMethod::Pelt => "pelt",
            AdvancedMethod::Window => "window",
            AdvancedMethod::MovingAverage => "simple",
        }
    }
}

impl fmt::Display for AdvancedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Configuration for the advanced detector.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvancedConfig {
    pub method: AdvancedMethod,
    /// Minimum segment length, and the minimum sliding window width
    pub min_size: usize,
    /// Cost added per change point (PELT only)
    pub penalty: f64,
    /// Standardized mean shift a boundary must exceed
    pub threshold: f64,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            method: AdvancedMethod::Pelt,
            min_size: 2,
            penalty: 10.0,
            threshold: 0.3,
        }
    }
}

impl AdvancedConfig {
    /// Set the boundary proposal method.
    pub fn method(mut self, method: AdvancedMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the minimum segment length.
    pub fn min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set the PELT penalty.
    pub fn penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    /// Set the shift threshold.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_size == 0 {
            return Err(TrendError::InvalidParameter(
                "min_size must be at least 1".to_string(),
            ));
        }
        ensure_non_negative("penalty", self.penalty)?;
        ensure_non_negative("advanced threshold", self.threshold)
    }
}

/// Result of a PELT segmentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// Start index of every segment after the first
    pub changepoints: Vec<usize>,
    /// Half-open `(start, end)` ranges covering the series
    pub segments: Vec<(usize, usize)>,
    /// Total L2 cost, excluding penalties
    pub cost: f64,
}

impl Segmentation {
    /// The segment containing `index`.
    pub fn segment_for_index(&self, index: usize) -> Option<(usize, usize)> {
        self.segments
            .iter()
            .find(|&&(start, end)| index >= start && index < end)
            .copied()
    }

    /// Mean of each segment of `values`, NaN for an empty one.
    pub fn segment_means(&self, values: &[f64]) -> Vec<f64> {
        self.segments
            .iter()
            .map(|&(start, end)| mean(&values[start..end]))
            .collect()
    }
}

/// Running sums for constant-time L2 segment costs.
struct PrefixSums {
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl PrefixSums {
    fn new(values: &[f64]) -> Self {
        let mut sum = Vec::with_capacity(values.len() + 1);
        let mut sum_sq = Vec::with_capacity(values.len() + 1);
        sum.push(0.0);
        sum_sq.push(0.0);
        for &x in values {
            sum.push(sum[sum.len() - 1] + x);
            sum_sq.push(sum_sq[sum_sq.len() - 1] + x * x);
        }
        Self { sum, sum_sq }
    }

    /// `sum((x - mean)^2)` over `values[start..end]`.
    fn l2_cost(&self, start: usize, end: usize) -> f64 {
        let n = end - start;
        if n == 0 {
            return 0.0;
        }
        let s = self.sum[end] - self.sum[start];
        let s2 = self.sum_sq[end] - self.sum_sq[start];
        (s2 - s * s / n as f64).max(0.0)
    }
}

/// Optimal L2 segmentation of `values` with `penalty` per change point and
/// segments of at least `min_size` points.
///
/// A series shorter than `2 * min_size` is a single segment.
pub fn pelt_segment(values: &[f64], penalty: f64, min_size: usize) -> Segmentation {
    let n = values.len();
    let min_size = min_size.max(1);
    let sums = PrefixSums::new(values);

    if n < min_size.saturating_mul(2) {
        return Segmentation {
            changepoints: Vec::new(),
            segments: vec![(0, n)],
            cost: sums.l2_cost(0, n),
        };
    }

    // best[t]: minimum penalized cost of values[0..t]; the first segment is unpenalized
    let mut best = vec![f64::INFINITY; n + 1];
    best[0] = -penalty;
    let mut last = vec![0usize; n + 1];
    let mut candidates: Vec<usize> = vec![0];

    for t in min_size..=n {
        let mut best_cost = f64::INFINITY;
        let mut best_start = 0;

        for &s in &candidates {
            if t - s >= min_size {
                let total = best[s] + sums.l2_cost(s, t) + penalty;
                if total < best_cost {
                    best_cost = total;
                    best_start = s;
                }
            }
        }

        best[t] = best_cost;
        last[t] = best_start;

        // A start that cannot beat best[t] now never will
        candidates.retain(|&s| t - s < min_size || best[s] + sums.l2_cost(s, t) <= best[t]);
        candidates.push(t);
    }

    let mut changepoints = Vec::new();
    let mut t = n;
    while t > 0 {
        let start = last[t];
        if start > 0 {
            changepoints.push(start);
        }
        t = start;
    }
    changepoints.reverse();

    let mut segments = Vec::with_capacity(changepoints.len() + 1);
    let mut start = 0;
    for &cp in &changepoints {
        segments.push((start, cp));
        start = cp;
    }
    segments.push((start, n));

    let cost = segments.iter().map(|&(s, e)| sums.l2_cost(s, e)).sum();

    Segmentation {
        changepoints,
        segments,
        cost,
    }
}

/// Centered rolling mean of width `width`. Positions without a full window
/// keep their own value.
pub fn centered_moving_average(values: &[f64], width: usize) -> Vec<f64> {
    let n = values.len();
    let width = width.max(1);
    let offset = (width - 1) / 2;
    (0..n)
        .map(|i| {
            let end = i + 1 + offset;
            if end < width || end > n {
                values[i]
            } else {
                mean(&values[end - width..end])
            }
        })
        .collect()
}

/// Change point detector built on segmentation methods.
#[derive(Debug, Clone, Default)]
pub struct AdvancedDetector {
    config: AdvancedConfig,
}

impl AdvancedDetector {
    pub fn new(config: AdvancedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AdvancedConfig {
        &self.config
    }

    /// Candidate boundaries as `(index, level before, level after)`.
    fn boundaries(&self, values: &[f64]) -> Vec<(usize, f64, f64)> {
        let n = values.len();
        match self.config.method {
            AdvancedMethod::Pelt => {
                let segmentation = pelt_segment(values, self.config.penalty, self.config.min_size);
                let means = segmentation.segment_means(values);
                segmentation
                    .changepoints
                    .iter()
                    .enumerate()
                    .map(|(k, &i)| (i, means[k], means[k + 1]))
                    .collect()
            }
            AdvancedMethod::Window => {
                let w = self.config.min_size.max(n / 10);
                (w..n.saturating_sub(w))
                    .map(|i| (i, mean(&values[i - w..i]), mean(&values[i..i + w])))
                    .collect()
            }
            AdvancedMethod::MovingAverage => {
                if n < 3 {
                    return Vec::new();
                }
                let smoothed = centered_moving_average(values, (n / 10).max(3));
                (1..n - 1)
                    .map(|i| (i, smoothed[i - 1], smoothed[i]))
                    .collect()
            }
        }
    }
}

impl ChangeDetector for AdvancedDetector {
    fn detect_changes(&self, series: &[ScalarPoint]) -> Vec<ChangePoint> {
        let n = series.len();
        if n < self.config.min_size.saturating_mul(2) {
            log::trace!(
                "advanced: series of {} shorter than 2 x {}",
                n,
                self.config.min_size
            );
            return Vec::new();
        }

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let scale = population_std_dev(&values) + RATE_EPSILON;

        self.boundaries(&values)
            .into_iter()
            .filter_map(|(i, before, after)| {
                let shift_score = (after - before).abs() / scale;
                (shift_score > self.config.threshold).then(|| ChangePoint {
                    timestamp: series[i].timestamp,
                    previous_score: before,
                    current_score: after,
                    change_rate: relative_change(before, after),
                    change_type: ChangeType::from_scores(before, after),
                    method: DetectorKind::Advanced,
                    detail: DetectionDetail::Advanced {
                        segmentation: self.config.method,
                        shift_score,
                    },
                })
            })
            .collect()
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Advanced
    }
}

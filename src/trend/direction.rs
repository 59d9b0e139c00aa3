//! Overall trend direction from a least-squares fit against sample index.

use serde::Serialize;
use std::fmt;

/// Slopes within `[-SLOPE_TOLERANCE, SLOPE_TOLERANCE]` count as stable.
pub const SLOPE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// Classify a per-step slope.
    pub fn from_slope(slope: f64) -> Self {
        if slope > SLOPE_TOLERANCE {
            TrendDirection::Increasing
        } else if slope < -SLOPE_TOLERANCE {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }

    /// Direction of `values` treated as equally spaced; fewer than two
    /// values are stable.
    pub fn of_series(values: &[f64]) -> Self {
        linear_trend(values).map_or(TrendDirection::Stable, Self::from_slope)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Ordinary least-squares slope of `values` against `0, 1, 2, ...`.
///
/// Returns `None` for fewer than two values.
pub fn linear_trend(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;

    let (ss_xy, ss_xx) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sxy, sxx), (i, &y)| {
            let dx = i as f64 - mean_x;
            (sxy + dx * (y - mean_y), sxx + dx * dx)
        });

    Some(ss_xy / ss_xx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn slope_of_a_line() {
        let values: Vec<f64> = (0..10).map(|i| 0.5 - 0.05 * i as f64).collect();
        assert_relative_eq!(linear_trend(&values).unwrap(), -0.05, epsilon = 1e-12);
    }

    #[test]
    fn slope_ignores_symmetric_noise() {
        // y = 2x with +1, -1, -1, +1 residuals
        let values = [1.0, 1.0, 3.0, 7.0];
        assert_relative_eq!(linear_trend(&values).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn too_short_is_stable() {
        assert!(linear_trend(&[]).is_none());
        assert!(linear_trend(&[0.7]).is_none());
        assert_eq!(TrendDirection::of_series(&[0.7]), TrendDirection::Stable);
    }

    #[test]
    fn classifies_direction() {
        assert_eq!(
            TrendDirection::of_series(&[-0.5, -0.2, 0.0, 0.3, 0.6]),
            TrendDirection::Increasing
        );
        assert_eq!(
            TrendDirection::of_series(&[0.6, 0.3, 0.0, -0.2, -0.5]),
            TrendDirection::Decreasing
        );
        assert_eq!(TrendDirection::of_series(&[0.4; 8]), TrendDirection::Stable);
    }

    #[test]
    fn tolerance_is_exclusive() {
        assert_eq!(TrendDirection::from_slope(0.01), TrendDirection::Stable);
        assert_eq!(TrendDirection::from_slope(-0.01), TrendDirection::Stable);
        assert_eq!(TrendDirection::from_slope(0.0101), TrendDirection::Increasing);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&TrendDirection::Decreasing).unwrap();
        assert_eq!(json, "\"decreasing\"");
    }
}

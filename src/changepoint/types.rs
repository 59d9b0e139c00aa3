//! Change point records shared by every detector.

use super::advanced::AdvancedMethod;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Guard added to denominators when computing relative change.
pub const RATE_EPSILON: f64 = 1e-8;

/// Direction of a detected shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Increase,
    Decrease,
}

impl ChangeType {
    /// `Increase` iff `current > previous`.
    pub fn from_scores(previous: f64, current: f64) -> Self {
        if current > previous {
            ChangeType::Increase
        } else {
            ChangeType::Decrease
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Increase => "increase",
            ChangeType::Decrease => "decrease",
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            ChangeType::Increase => ChangeType::Decrease,
            ChangeType::Decrease => ChangeType::Increase,
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Which algorithm produced a change point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DetectorKind {
    Simple,
    #[serde(rename = "CUSUM")]
    Cusum,
    #[serde(rename = "Z-score")]
    ZScore,
    Bayesian,
    Advanced,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::Simple => "Simple",
            DetectorKind::Cusum => "CUSUM",
            DetectorKind::ZScore => "Z-score",
            DetectorKind::Bayesian => "Bayesian",
            DetectorKind::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Detector-specific evidence attached to a change point.
///
/// Serialized inline with the change point, one extra field per variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetectionDetail {
    Simple {
        /// Start of the window the change is measured against.
        previous_window: DateTime<Utc>,
    },
    Cusum {
        /// Value of the CUSUM statistic that crossed the threshold.
        change_magnitude: f64,
    },
    ZScore {
        z_score: f64,
    },
    Bayesian {
        posterior_probability: f64,
    },
    Advanced {
        segmentation: AdvancedMethod,
        /// Mean shift across the boundary over the series' standard deviation.
        shift_score: f64,
    },
}

/// A dated, typed, magnitude-scored shift in the sentiment series.
///
/// `change_rate` is never negative. `change_type` is `Increase` iff
/// `current_score > previous_score`, except for CUSUM, where it names the
/// statistic that crossed the threshold and can disagree with the scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangePoint {
    #[serde(rename = "change_point")]
    pub timestamp: DateTime<Utc>,
    pub previous_score: f64,
    pub current_score: f64,
    pub change_rate: f64,
    pub change_type: ChangeType,
    pub method: DetectorKind,
    #[serde(flatten)]
    pub detail: DetectionDetail,
}

impl ChangePoint {
    pub fn z_score(&self) -> Option<f64> {
        match self.detail {
            DetectionDetail::ZScore { z_score } => Some(z_score),
            _ => None,
        }
    }

    pub fn posterior_probability(&self) -> Option<f64> {
        match self.detail {
            DetectionDetail::Bayesian {
                posterior_probability,
            } => Some(posterior_probability),
            _ => None,
        }
    }

    pub fn cusum_magnitude(&self) -> Option<f64> {
        match self.detail {
            DetectionDetail::Cusum { change_magnitude } => Some(change_magnitude),
            _ => None,
        }
    }

    pub fn shift_score(&self) -> Option<f64> {
        match self.detail {
            DetectionDetail::Advanced { shift_score, .. } => Some(shift_score),
            _ => None,
        }
    }
}

/// `|current - previous| / (|previous| + 1e-8)`.
pub fn relative_change(previous: f64, current: f64) -> f64 {
    (current - previous).abs() / (previous.abs() + RATE_EPSILON)
}

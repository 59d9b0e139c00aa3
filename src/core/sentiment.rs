//! Scored sentiment samples and their scalar projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weight applied to the positive score when scalarizing.
pub const POSITIVE_WEIGHT: f64 = 1.0;
/// Weight applied to the negative score when scalarizing.
pub const NEGATIVE_WEIGHT: f64 = -1.0;
/// Weight applied to the neutral score when scalarizing.
pub const NEUTRAL_WEIGHT: f64 = 0.0;

/// Map a `(positive, negative, neutral)` score triple to one value in [-1, 1].
///
/// The weighting is fixed: `positive - negative`, neutral contributes nothing.
/// Every component that derives a sentiment value goes through this function
/// so scores stay comparable across windows and detectors.
///
/// # Example
/// ```
/// use sentiment_trend::core::scalarize;
///
/// assert_eq!(scalarize(1.0, 0.0, 0.0), 1.0);
/// assert_eq!(scalarize(0.0, 1.0, 0.0), -1.0);
/// assert_eq!(scalarize(0.0, 0.0, 1.0), 0.0);
/// ```
pub fn scalarize(positive: f64, negative: f64, neutral: f64) -> f64 {
    positive * POSITIVE_WEIGHT + negative * NEGATIVE_WEIGHT + neutral * NEUTRAL_WEIGHT
}

/// One classified item: the three class scores from a single scoring call.
///
/// Scores are each in [0, 1] and approximately sum to 1; classifier noise is
/// tolerated. Callers filter out NaN or missing scores before analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScoreTriple {
    pub timestamp: DateTime<Utc>,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl SentimentScoreTriple {
    pub fn new(timestamp: DateTime<Utc>, positive: f64, negative: f64, neutral: f64) -> Self {
        Self {
            timestamp,
            positive,
            negative,
            neutral,
        }
    }

    /// Scalar sentiment of this sample.
    pub fn score(&self) -> f64 {
        scalarize(self.positive, self.negative, self.neutral)
    }

    /// The sample projected onto the scalar series.
    pub fn to_point(&self) -> ScalarPoint {
        ScalarPoint::new(self.timestamp, self.score())
    }
}

/// A timestamped scalar sentiment value, the input unit of every detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalarPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl ScalarPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Scalarize samples and order them by timestamp.
///
/// The sort is stable, so samples sharing a timestamp keep their input order.
pub fn scalar_series(samples: &[SentimentScoreTriple]) -> Vec<ScalarPoint> {
    let mut points: Vec<ScalarPoint> = samples.iter().map(SentimentScoreTriple::to_point).collect();
    points.sort_by_key(|p| p.timestamp);
    points
}

/// Extract the values of a scalar series.
pub fn values_of(points: &[ScalarPoint]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}

//! The detector interface and its configuration-driven construction.

use super::advanced::{AdvancedConfig, AdvancedDetector};
use super::bayesian::{BayesianConfig, BayesianDetector};
use super::cusum::{CusumConfig, CusumDetector};
use super::simple::{SimpleConfig, SimpleDetector};
use super::types::{ChangePoint, DetectorKind};
use super::zscore::{ZScoreConfig, ZScoreDetector};
use crate::core::{scalar_series, ScalarPoint, SentimentScoreTriple};
use crate::error::Result;

/// The series granularity a detector expects from the trend analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesInput {
    /// The per-sample scalar series; the detector does its own windowing.
    Samples,
    /// The analyzer's aggregated window means.
    Windows,
}

/// Common interface for all change detectors.
///
/// A detector holds only its configuration, so one instance can be shared
/// across threads and reused for any number of series. The series passed to
/// [`detect_changes`](ChangeDetector::detect_changes) is treated as a plain
/// ordered sequence: elapsed time between points only matters where a
/// detector reports window boundaries.
///
/// This trait is object-safe and can be used with `Box<dyn ChangeDetector>`.
pub trait ChangeDetector: Send + Sync {
    /// Detect change points in a time-ordered scalar series.
    fn detect_changes(&self, series: &[ScalarPoint]) -> Vec<ChangePoint>;

    /// The algorithm this detector implements.
    fn kind(&self) -> DetectorKind;

    /// Which series the trend analyzer should feed this detector.
    fn input(&self) -> SeriesInput {
        SeriesInput::Windows
    }

    /// Get the detector name.
    fn name(&self) -> &str {
        self.kind().as_str()
    }

    /// Scalarize raw score triples, order them by time and detect changes.
    fn detect_triples(&self, samples: &[SentimentScoreTriple]) -> Vec<ChangePoint> {
        self.detect_changes(&scalar_series(samples))
    }
}

/// Type alias for boxed detector trait objects.
pub type BoxedDetector = Box<dyn ChangeDetector>;

/// Selects and configures one of the five detectors.
///
/// # Example
///
/// ```
/// use sentiment_trend::changepoint::{CusumConfig, DetectorConfig, DetectorKind};
///
/// let detector = DetectorConfig::Cusum(CusumConfig::default().threshold(4.0))
///     .build()
///     .unwrap();
/// assert_eq!(detector.kind(), DetectorKind::Cusum);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorConfig {
    Simple(SimpleConfig),
    Cusum(CusumConfig),
    ZScore(ZScoreConfig),
    Bayesian(BayesianConfig),
    Advanced(AdvancedConfig),
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig::Simple(SimpleConfig::default())
    }
}

impl DetectorConfig {
    pub fn kind(&self) -> DetectorKind {
        match self {
            DetectorConfig::Simple(_) => DetectorKind::Simple,
            DetectorConfig::Cusum(_) => DetectorKind::Cusum,
            DetectorConfig::ZScore(_) => DetectorKind::ZScore,
            DetectorConfig::Bayesian(_) => DetectorKind::Bayesian,
            DetectorConfig::Advanced(_) => DetectorKind::Advanced,
        }
    }

    /// Validate the parameters and construct the detector.
    pub fn build(&self) -> Result<BoxedDetector> {
        Ok(match self {
            DetectorConfig::Simple(c) => Box::new(SimpleDetector::new(c.clone())?),
            DetectorConfig::Cusum(c) => Box::new(CusumDetector::new(c.clone())?),
            DetectorConfig::ZScore(c) => Box::new(ZScoreDetector::new(c.clone())?),
            DetectorConfig::Bayesian(c) => Box::new(BayesianDetector::new(c.clone())?),
            DetectorConfig::Advanced(c) => Box::new(AdvancedDetector::new(c.clone())?),
        })
    }
}

/// Reject negative, NaN or infinite values for a named parameter.
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(crate::error::TrendError::InvalidParameter(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

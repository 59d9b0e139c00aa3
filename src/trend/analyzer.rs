//! The analysis pipeline: aggregate, classify the trend, detect, alert.

use super::alert::{Alert, AlertGenerator, AlertSettings, RateFormula};
use super::direction::TrendDirection;
use crate::aggregation::{window_series, AggregatedWindow, TimeWindowAggregator};
use crate::changepoint::{BoxedDetector, ChangePoint, DetectorConfig, SeriesInput};
use crate::config::TrendConfig;
use crate::core::{scalar_series, values_of, SentimentScoreTriple, WindowWidth};
use crate::error::Result;
use crate::utils::stats::mean;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Outcome of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub trend_direction: TrendDirection,
    /// Timestamps of `detections`, in the same order.
    pub change_points: Vec<DateTime<Utc>>,
    pub detections: Vec<ChangePoint>,
    pub alerts: Vec<Alert>,
    pub aggregated_data: Vec<AggregatedWindow>,
}

impl TrendResult {
    fn empty() -> Self {
        Self {
            trend_direction: TrendDirection::Stable,
            change_points: Vec::new(),
            detections: Vec::new(),
            alerts: Vec::new(),
            aggregated_data: Vec::new(),
        }
    }

    /// Serialize to JSON with ISO-8601 timestamps.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Sample-level overview of a series, without windowing by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub total_count: usize,
    pub avg_sentiment: f64,
    pub trend_direction: TrendDirection,
    pub change_points: Vec<ChangePoint>,
}

impl TrendSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Runs the configured detector over a batch of scored samples.
///
/// The analyzer holds only configuration; `analyze` can be called any number
/// of times, from any number of threads.
///
/// # Example
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use sentiment_trend::prelude::*;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let samples: Vec<_> = (0..40)
///     .map(|i| {
///         let (pos, neg) = if i < 20 { (0.85, 0.05) } else { (0.05, 0.85) };
///         SentimentScoreTriple::new(start + Duration::minutes(i), pos, neg, 0.1)
///     })
///     .collect();
///
/// let analyzer = TrendAnalyzer::new(
///     WindowWidth::minutes(10).unwrap(),
///     &DetectorConfig::default(),
///     AlertSettings::default(),
/// )
/// .unwrap();
/// let result = analyzer.analyze(&samples);
///
/// assert_eq!(result.trend_direction, TrendDirection::Decreasing);
/// assert_eq!(result.change_points.len(), 1);
/// assert_eq!(result.alerts.len(), 1);
/// ```
pub struct TrendAnalyzer {
    aggregator: TimeWindowAggregator,
    detector: BoxedDetector,
    alerts: AlertSettings,
}

impl TrendAnalyzer {
    pub fn new(window: WindowWidth, detector: &DetectorConfig, alerts: AlertSettings) -> Result<Self> {
        Self::with_detector(window, detector.build()?, alerts)
    }

    /// Use an already constructed detector.
    pub fn with_detector(
        window: WindowWidth,
        detector: BoxedDetector,
        alerts: AlertSettings,
    ) -> Result<Self> {
        alerts.validate()?;
        Ok(Self {
            aggregator: TimeWindowAggregator::new(window),
            detector,
            alerts,
        })
    }

    pub fn from_config(config: &TrendConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.time_series.aggregation_window,
            &config.detector_config()?,
            config.alert_settings(),
        )
    }

    pub fn window(&self) -> WindowWidth {
        self.aggregator.width()
    }

    pub fn detector(&self) -> &BoxedDetector {
        &self.detector
    }

    pub fn alert_settings(&self) -> &AlertSettings {
        &self.alerts
    }

    /// Aggregate `samples`, classify the trend over the window means, detect
    /// change points and derive alerts from them.
    pub fn analyze(&self, samples: &[SentimentScoreTriple]) -> TrendResult {
        let windows = self.aggregator.aggregate(samples);
        if windows.is_empty() {
            log::debug!("analyze: no samples");
            return TrendResult::empty();
        }

        let means: Vec<f64> = windows.iter().map(|w| w.mean_sentiment).collect();
        let trend_direction = TrendDirection::of_series(&means);

        let series = match self.detector.input() {
            SeriesInput::Samples => scalar_series(samples),
            SeriesInput::Windows => window_series(&windows),
        };
        let detections = self.detector.detect_changes(&series);
        let change_points: Vec<DateTime<Utc>> = detections.iter().map(|cp| cp.timestamp).collect();
        let alerts = AlertGenerator::generate_with(
            &self.alerts,
            RateFormula::for_detector(self.detector.kind()),
            &windows,
            &change_points,
        );

        log::debug!(
            "analyze: {} samples, {} windows of {}, {} change points ({}), {} alerts, trend {}",
            samples.len(),
            windows.len(),
            self.aggregator.width(),
            change_points.len(),
            self.detector.name(),
            alerts.len(),
            trend_direction
        );

        TrendResult {
            trend_direction,
            change_points,
            detections,
            alerts,
            aggregated_data: windows,
        }
    }

    /// Summarize `samples` per sample: average, direction, and the detector
    /// run over the time-ordered scalar series.
    pub fn summarize(&self, samples: &[SentimentScoreTriple]) -> TrendSummary {
        if samples.is_empty() {
            return TrendSummary {
                total_count: 0,
                avg_sentiment: 0.0,
                trend_direction: TrendDirection::Stable,
                change_points: Vec::new(),
            };
        }

        let series = scalar_series(samples);
        let values = values_of(&series);

        TrendSummary {
            total_count: samples.len(),
            avg_sentiment: mean(&values),
            trend_direction: TrendDirection::of_series(&values),
            change_points: self.detector.detect_changes(&series),
        }
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self {
            aggregator: TimeWindowAggregator::new(WindowWidth::ONE_HOUR),
            detector: Box::<crate::changepoint::SimpleDetector>::default(),
            alerts: AlertSettings::default(),
        }
    }
}

impl fmt::Debug for TrendAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrendAnalyzer")
            .field("window", &self.aggregator.width())
            .field("detector", &self.detector.name())
            .field("alerts", &self.alerts)
            .finish()
    }
}

//! Bucketing of scored samples into fixed-width time windows.

use crate::core::{ScalarPoint, SentimentScoreTriple, WindowWidth};
use crate::utils::stats::{mean, population_std_dev};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Mean class scores of the samples in one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentMeans {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

/// Aggregate of every sample whose timestamp floors to `window_start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedWindow {
    pub window_start: DateTime<Utc>,
    /// Mean scalar sentiment of the window's samples.
    pub mean_sentiment: f64,
    /// Population standard deviation (0 for a single sample).
    pub stdev_sentiment: f64,
    pub count: usize,
    /// Per-class means, present when the window was built from score triples.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<ComponentMeans>,
}

impl AggregatedWindow {
    /// The window as a point on the scalar series.
    pub fn to_point(&self) -> ScalarPoint {
        ScalarPoint::new(self.window_start, self.mean_sentiment)
    }
}

/// Groups samples into epoch-aligned windows of a fixed width.
///
/// Empty windows are omitted rather than zero-filled, so the output series
/// may have irregular gaps in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindowAggregator {
    width: WindowWidth,
}

impl TimeWindowAggregator {
    pub fn new(width: WindowWidth) -> Self {
        Self { width }
    }

    pub fn width(&self) -> WindowWidth {
        self.width
    }

    /// Aggregate score triples, one window per non-empty bucket, ascending.
    pub fn aggregate(&self, samples: &[SentimentScoreTriple]) -> Vec<AggregatedWindow> {
        let mut buckets: BTreeMap<DateTime<Utc>, Bucket> = BTreeMap::new();
        for sample in samples {
            let bucket = buckets.entry(self.width.floor(sample.timestamp)).or_default();
            bucket.values.push(sample.score());
            bucket.positive += sample.positive;
            bucket.negative += sample.negative;
            bucket.neutral += sample.neutral;
        }

        buckets
            .into_iter()
            .map(|(start, bucket)| {
                let n = bucket.values.len() as f64;
                let components = ComponentMeans {
                    positive: bucket.positive / n,
                    negative: bucket.negative / n,
                    neutral: bucket.neutral / n,
                };
                bucket.into_window(start, Some(components))
            })
            .collect()
    }

    /// Aggregate an already-scalarized series.
    ///
    /// Produces the same windows as [`aggregate`](Self::aggregate) would for
    /// the source triples, without per-class means.
    pub fn aggregate_points(&self, points: &[ScalarPoint]) -> Vec<AggregatedWindow> {
        let mut buckets: BTreeMap<DateTime<Utc>, Bucket> = BTreeMap::new();
        for point in points {
            buckets
                .entry(self.width.floor(point.timestamp))
                .or_default()
                .values
                .push(point.value);
        }

        buckets
            .into_iter()
            .map(|(start, bucket)| bucket.into_window(start, None))
            .collect()
    }
}

/// Aggregate `samples` with a window of `width`.
pub fn aggregate_windows(
    samples: &[SentimentScoreTriple],
    width: WindowWidth,
) -> Vec<AggregatedWindow> {
    TimeWindowAggregator::new(width).aggregate(samples)
}

/// Means of the windows as a scalar series keyed by window start.
pub fn window_series(windows: &[AggregatedWindow]) -> Vec<ScalarPoint> {
    windows.iter().map(AggregatedWindow::to_point).collect()
}

#[derive(Debug, Default)]
struct Bucket {
    values: Vec<f64>,
    positive: f64,
    negative: f64,
    neutral: f64,
}

impl Bucket {
    fn into_window(
        self,
        window_start: DateTime<Utc>,
        components: Option<ComponentMeans>,
    ) -> AggregatedWindow {
        let stdev_sentiment = if self.values.len() > 1 {
            population_std_dev(&self.values)
        } else {
            0.0
        };
        AggregatedWindow {
            window_start,
            mean_sentiment: mean(&self.values),
            stdev_sentiment,
            count: self.values.len(),
            components,
        }
    }
}

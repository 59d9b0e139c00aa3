//! End-to-end trend analysis of a day of scored mentions.
//!
//! Run with: RUST_LOG=debug cargo run --example trend_analysis

use chrono::{Duration, TimeZone, Timelike, Utc};
use sentiment_trend::prelude::*;

const CONFIG: &str = r#"
[time_series]
aggregation_window = "1h"

[change_detection]
method = "cusum"
cusum_threshold = 3.0
drift = 0.5

[alerts]
enabled = true
threshold_change_rate = 0.5
"#;

/// Mentions every five minutes: upbeat in the morning, souring after 14:00.
fn mentions() -> Vec<SentimentScoreTriple> {
    let start = Utc.with_ymd_and_hms(2024, 6, 3, 6, 0, 0).unwrap();
    (0..16 * 12)
        .map(|i| {
            let ts = start + Duration::minutes(5 * i);
            let wobble = 0.05 * (i as f64 * 0.9).sin();
            let (positive, negative) = if ts.hour() < 14 {
                (0.65 + wobble, 0.15)
            } else {
                (0.2, 0.6 + wobble)
            };
            SentimentScoreTriple::new(ts, positive, negative, 1.0 - positive - negative)
        })
        .collect()
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = TrendConfig::from_toml_str(CONFIG)?;
    let analyzer = TrendAnalyzer::from_config(&config)?;
    println!("=== Trend Analysis Example ===\n");
    println!("{:?}\n", analyzer);

    let samples = mentions();
    let result = analyzer.analyze(&samples);

    println!("Samples: {}", samples.len());
    println!("Windows: {}", result.aggregated_data.len());
    println!("Trend:   {}\n", result.trend_direction);

    println!("{:<8} {:>8} {:>8} {:>6}", "Window", "Mean", "Stdev", "Count");
    println!("{:-<33}", "");
    for w in &result.aggregated_data {
        println!(
            "{:<8} {:>8.3} {:>8.3} {:>6}",
            w.window_start.format("%H:%M").to_string(),
            w.mean_sentiment,
            w.stdev_sentiment,
            w.count
        );
    }

    println!("\nChange points:");
    for cp in &result.detections {
        println!(
            "    {}  {}  statistic {:.2}",
            cp.timestamp.format("%H:%M"),
            cp.change_type,
            cp.cusum_magnitude().unwrap_or_default()
        );
    }

    println!("\nAlerts:");
    for alert in &result.alerts {
        println!(
            "    {}  {}  {:.0}%  ({:.3} -> {:.3})",
            alert.change_point.format("%H:%M"),
            alert.change_type,
            alert.change_rate,
            alert.previous_sentiment,
            alert.current_sentiment
        );
    }

    let summary = analyzer.summarize(&samples);
    println!(
        "\nSummary: {} samples, average {:.3}, trend {}, {} per-sample change points",
        summary.total_count,
        summary.avg_sentiment,
        summary.trend_direction,
        summary.change_points.len()
    );

    println!("\nJSON: {}", result.to_json()?);
    Ok(())
}

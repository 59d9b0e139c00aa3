//! Change point detection example comparing the five detectors.
//!
//! Run with: cargo run --example changepoint

use chrono::{Duration, TimeZone, Utc};
use sentiment_trend::changepoint::{
    pelt_segment, AdvancedConfig, AdvancedDetector, AdvancedMethod, BayesianConfig,
    BayesianDetector, ChangeDetector, CusumConfig, CusumDetector, SimpleConfig, SimpleDetector,
    ZScoreDetector,
};
use sentiment_trend::core::{ScalarPoint, WindowWidth};

fn series(values: &[f64], step: Duration) -> Vec<ScalarPoint> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| ScalarPoint::new(base + step * i as i32, v))
        .collect()
}

fn report(detector: &dyn ChangeDetector, points: &[ScalarPoint]) {
    let cps = detector.detect_changes(points);
    println!("{:<10} {} change point(s)", detector.name(), cps.len());
    for cp in cps.iter().take(5) {
        println!(
            "    {}  {:<8} {:>7.3} -> {:>7.3}  rate {:.3}",
            cp.timestamp.format("%H:%M"),
            cp.change_type,
            cp.previous_score,
            cp.current_score,
            cp.change_rate
        );
    }
    if cps.len() > 5 {
        println!("    ... {} more", cps.len() - 5);
    }
}

fn main() {
    pretty_env_logger::init();

    println!("=== Change Point Detection Example ===\n");

    // 1. Level shift in a noisy series
    println!("--- Noisy Level Shift ---");

    let mut values: Vec<f64> = (0..40).map(|i| 0.4 + 0.05 * (i as f64 * 1.3).sin()).collect();
    values.extend((0..20).map(|i| -0.3 + 0.05 * (i as f64 * 1.3).sin()));
    let points = series(&values, Duration::minutes(10));

    println!("Data: [0.4 ± 0.05 × 40] + [-0.3 ± 0.05 × 20], one point per 10 minutes\n");

    report(&SimpleDetector::default(), &points);
    report(&CusumDetector::default(), &points);
    report(&ZScoreDetector::default(), &points);
    report(&BayesianDetector::default(), &points);
    report(&AdvancedDetector::default(), &points);

    // 2. Effect of the CUSUM threshold
    println!("\n--- Effect of CUSUM Threshold ---\n");

    println!("{:<12} {:>15} {:>15}", "Threshold", "First change", "Count");
    println!("{:-<44}", "");

    for threshold in [1.0, 2.0, 5.0, 10.0, 20.0] {
        let detector = CusumDetector::new(CusumConfig::default().threshold(threshold))
            .expect("valid threshold");
        let cps = detector.detect_changes(&points);
        let first = cps
            .first()
            .map(|cp| cp.timestamp.format("%H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<12.1} {:>15} {:>15}", threshold, first, cps.len());
    }

    // 3. A ramp: the simple detector reports every crossing
    println!("\n--- Ramp ---");

    let ramp: Vec<f64> = (0..6).map(|i| 0.1 * 1.5_f64.powi(i)).collect();
    println!("Data: {:?}\n", ramp);

    let hourly = SimpleDetector::new(
        SimpleConfig::default().window(WindowWidth::hours(1).expect("valid width")),
    )
    .expect("valid config");
    report(&hourly, &series(&ramp, Duration::hours(1)));

    // 4. Segmentation methods and the PELT penalty
    println!("\n--- Advanced Segmentation ---\n");

    for method in [AdvancedMethod::Pelt, AdvancedMethod::Window, AdvancedMethod::MovingAverage] {
        let detector = AdvancedDetector::new(AdvancedConfig::default().method(method))
            .expect("valid config");
        println!("{:<8} {:>3} boundaries", method, detector.detect_changes(&points).len());
    }

    println!("\n{:<10} {:>10} {:>10}", "Penalty", "Segments", "Cost");
    println!("{:-<32}", "");
    for penalty in [0.01, 0.1, 1.0, 10.0] {
        let seg = pelt_segment(&values, penalty, 2);
        println!("{:<10} {:>10} {:>10.4}", penalty, seg.segments.len(), seg.cost);
    }

    // 5. Ranking by posterior probability
    println!("\n--- Bayesian Posterior Ranking ---\n");

    let detector = BayesianDetector::new(BayesianConfig::default().min_segment_length(8))
        .expect("valid config");
    let probs = detector.posterior_probabilities(&values);
    let mut ranked: Vec<(usize, f64)> = probs.into_iter().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (idx, p) in ranked.iter().take(3) {
        println!("    index {:>3}  posterior {:.4}", idx, p);
    }
}

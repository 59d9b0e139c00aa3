//! Heuristic Bayesian change point scoring.
//!
//! Not a full online Bayesian changepoint model: for every candidate index
//! the gap between the means of the neighbouring segments, in units of the
//! series' global standard deviation, is squashed through a sigmoid into a
//! likelihood and combined with the prior by Bayes' rule. The resulting
//! posterior is best read as a confidence ranking.
//!
//! Candidates whose posterior exceeds twice the prior are kept, then thinned
//! greedily so that kept indices are at least `min_segment_length` apart
//! (earliest wins).

use super::detector::ChangeDetector;
use super::types::{relative_change, ChangePoint, ChangeType, DetectionDetail, DetectorKind};
use crate::core::ScalarPoint;
use crate::error::{Result, TrendError};
use crate::utils::stats::{mean, population_variance, sigmoid};

/// Configuration for the Bayesian detector.
#[derive(Debug, Clone, PartialEq)]
pub struct BayesianConfig {
    /// Prior probability that any index is a change point, in (0, 1)
    pub prior_probability: f64,
    /// Length of the compared segments and minimum spacing of results
    pub min_segment_length: usize,
}

impl Default for BayesianConfig {
    fn default() -> Self {
        Self {
            prior_probability: 0.01,
            min_segment_length: 5,
        }
    }
}

impl BayesianConfig {
    /// Set the prior probability.
    pub fn prior_probability(mut self, prior: f64) -> Self {
        self.prior_probability = prior;
        self
    }

    /// Set the minimum segment length.
    pub fn min_segment_length(mut self, len: usize) -> Self {
        self.min_segment_length = len;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let p = self.prior_probability;
        if !(p > 0.0 && p < 1.0) {
            return Err(TrendError::InvalidParameter(format!(
                "prior_probability must be in (0, 1), got {}",
                p
            )));
        }
        if self.min_segment_length == 0 {
            return Err(TrendError::InvalidParameter(
                "min_segment_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Posterior level a candidate must exceed.
    pub fn decision_threshold(&self) -> f64 {
        2.0 * self.prior_probability
    }
}

#[derive(Debug, Clone, Default)]
pub struct BayesianDetector {
    config: BayesianConfig,
}

impl BayesianDetector {
    pub fn new(config: BayesianConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BayesianConfig {
        &self.config
    }

    /// Posterior change probability for every index of `values`.
    ///
    /// Indices closer than `min_segment_length` to either end, and every
    /// index of a series without variance, score 0.
    pub fn posterior_probabilities(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let m = self.config.min_segment_length;
        let mut probs = vec![0.0; n];
        if n < 2 * m {
            return probs;
        }

        let overall_var = population_variance(values);
        if overall_var < 1e-8 {
            return probs;
        }
        let overall_sd = overall_var.sqrt();
        let prior = self.config.prior_probability;

        for i in m..(n - m) {
            let prev_mean = mean(&values[i - m..i]);
            let next_mean = mean(&values[i..i + m]);
            let normalized_gap = (next_mean - prev_mean).abs() / (overall_sd + 1e-8);

            let likelihood = sigmoid(normalized_gap);
            probs[i] =
                prior * likelihood / (prior * likelihood + (1.0 - prior) * (1.0 - likelihood));
        }

        probs
    }

    /// Indices whose posterior exceeds the decision threshold, thinned so
    /// that no two are closer than `min_segment_length`.
    pub fn select_indices(&self, probs: &[f64]) -> Vec<usize> {
        let threshold = self.config.decision_threshold();
        let spacing = self.config.min_segment_length;
        let mut selected: Vec<usize> = Vec::new();

        for (idx, &p) in probs.iter().enumerate() {
            if p <= threshold {
                continue;
            }
            match selected.last() {
                Some(&last) if idx - last < spacing => {}
                _ => selected.push(idx),
            }
        }

        selected
    }
}

impl ChangeDetector for BayesianDetector {
    fn detect_changes(&self, series: &[ScalarPoint]) -> Vec<ChangePoint> {
        let n = series.len();
        let m = self.config.min_segment_length;
        if n < 2 * m {
            log::trace!("bayesian: series of {} shorter than 2 x {}", n, m);
            return Vec::new();
        }

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let probs = self.posterior_probabilities(&values);

        self.select_indices(&probs)
            .into_iter()
            .filter(|&idx| idx >= m && idx + m <= n)
            .map(|idx| {
                let previous_score = mean(&values[idx - m..idx]);
                let current_score = mean(&values[idx..idx + m]);
                ChangePoint {
                    timestamp: series[idx].timestamp,
                    previous_score,
                    current_score,
                    change_rate: relative_change(previous_score, current_score),
                    change_type: ChangeType::from_scores(previous_score, current_score),
                    method: DetectorKind::Bayesian,
                    detail: DetectionDetail::Bayesian {
                        posterior_probability: probs[idx],
                    },
                }
            })
            .collect()
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Bayesian
    }
}

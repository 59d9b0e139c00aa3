//! Trend analysis configuration, loaded from TOML.
//!
//! Every key is optional:
//!
//! ```toml
//! [time_series]
//! aggregation_window = "1h"
//!
//! [change_detection]
//! method = "simple"          # simple | cusum | zscore | bayesian | advanced
//! window = "10min"
//! threshold = 0.3             # also the advanced detector's shift threshold
//! cusum_threshold = 5.0
//! drift = 0.5
//! z_threshold = 2.5
//! window_size = 10
//! prior_probability = 0.01
//! min_segment_length = 5
//! advanced_method = "pelt"    # pelt | window | simple
//! min_size = 2
//! penalty = 10.0
//!
//! [alerts]
//! enabled = true
//! threshold_change_rate = 0.5
//! ```

use crate::changepoint::{
    AdvancedConfig, AdvancedMethod, BayesianConfig, CusumConfig, DetectorConfig, SimpleConfig,
    ZScoreConfig,
};
use crate::core::WindowWidth;
use crate::error::{Result, TrendError};
use crate::trend::AlertSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete trend configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub time_series: TimeSeriesSettings,
    pub change_detection: ChangeDetectionSettings,
    pub alerts: AlertSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSeriesSettings {
    /// Analyzer window width
    pub aggregation_window: WindowWidth,
}

impl Default for TimeSeriesSettings {
    fn default() -> Self {
        Self {
            aggregation_window: WindowWidth::ONE_HOUR,
        }
    }
}

/// Which detector the analyzer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    #[default]
    Simple,
    Cusum,
    #[serde(alias = "z-score", alias = "z_score")]
    Zscore,
    Bayesian,
    Advanced,
}

/// Parameters of every detector; only those of `method` are used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeDetectionSettings {
    pub method: DetectionMethod,
    /// Simple: internal window width
    pub window: WindowWidth,
    /// Simple: internal window width in whole minutes, overrides `window`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_minutes: Option<i64>,
    /// Simple: fractional change rate. Advanced: standardized shift
    pub threshold: f64,
    /// CUSUM: decision threshold
    pub cusum_threshold: f64,
    /// CUSUM: drift allowance
    pub drift: f64,
    pub z_threshold: f64,
    pub window_size: usize,
    pub prior_probability: f64,
    pub min_segment_length: usize,
    /// Advanced: boundary proposal method
    pub advanced_method: AdvancedMethod,
    /// Advanced: minimum segment length
    pub min_size: usize,
    /// Advanced: PELT penalty per change point
    pub penalty: f64,
}

impl Default for ChangeDetectionSettings {
    fn default() -> Self {
        let simple = SimpleConfig::default();
        let cusum = CusumConfig::default();
        let zscore = ZScoreConfig::default();
        let bayesian = BayesianConfig::default();
        let advanced = AdvancedConfig::default();
        Self {
            method: DetectionMethod::default(),
            window: simple.window,
            window_minutes: None,
            threshold: simple.threshold,
            cusum_threshold: cusum.threshold,
            drift: cusum.drift,
            z_threshold: zscore.z_threshold,
            window_size: zscore.window_size,
            prior_probability: bayesian.prior_probability,
            min_segment_length: bayesian.min_segment_length,
            advanced_method: advanced.method,
            min_size: advanced.min_size,
            penalty: advanced.penalty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSection {
    pub enabled: bool,
    /// Fractional change that triggers an alert
    pub threshold_change_rate: f64,
}

impl Default for AlertSection {
    fn default() -> Self {
        let settings = AlertSettings::default();
        Self {
            enabled: settings.enabled,
            threshold_change_rate: settings.threshold,
        }
    }
}

impl TrendConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| TrendError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&text)?;
        log::debug!(
            "loaded trend config from {} (method {:?}, window {})",
            path.display(),
            config.change_detection.method,
            config.time_series.aggregation_window
        );
        Ok(config)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| TrendError::Serialization(e.to_string()))
    }

    /// Check the selected detector's parameters and the alert settings.
    pub fn validate(&self) -> Result<()> {
        self.alert_settings().validate()?;
        match self.detector_config()? {
            DetectorConfig::Simple(c) => c.validate(),
            DetectorConfig::Cusum(c) => c.validate(),
            DetectorConfig::ZScore(c) => c.validate(),
            DetectorConfig::Bayesian(c) => c.validate(),
            DetectorConfig::Advanced(c) => c.validate(),
        }
    }

    /// The detector configuration selected by `change_detection.method`.
    pub fn detector_config(&self) -> Result<DetectorConfig> {
        let cd = &self.change_detection;
        Ok(match cd.method {
            DetectionMethod::Simple => {
                let window = match cd.window_minutes {
                    Some(minutes) => WindowWidth::minutes(minutes)?,
                    None => cd.window,
                };
                DetectorConfig::Simple(SimpleConfig::default().window(window).threshold(cd.threshold))
            }
            DetectionMethod::Cusum => DetectorConfig::Cusum(
                CusumConfig::default()
                    .threshold(cd.cusum_threshold)
                    .drift(cd.drift),
            ),
            DetectionMethod::Zscore => DetectorConfig::ZScore(
                ZScoreConfig::default()
                    .z_threshold(cd.z_threshold)
                    .window_size(cd.window_size),
            ),
            DetectionMethod::Bayesian => DetectorConfig::Bayesian(
                BayesianConfig::default()
                    .prior_probability(cd.prior_probability)
                    .min_segment_length(cd.min_segment_length),
            ),
            DetectionMethod::Advanced => DetectorConfig::Advanced(
                AdvancedConfig::default()
                    .method(cd.advanced_method)
                    .min_size(cd.min_size)
                    .penalty(cd.penalty)
                    .threshold(cd.threshold),
            ),
        })
    }

    pub fn alert_settings(&self) -> AlertSettings {
        AlertSettings::default()
            .enabled(self.alerts.enabled)
            .threshold(self.alerts.threshold_change_rate)
    }
}

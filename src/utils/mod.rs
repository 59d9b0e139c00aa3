//! Utility functions shared by the detectors and the trend analyzer.

pub mod stats;

pub use stats::{mean, population_std_dev, population_variance, sigmoid};

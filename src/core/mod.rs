//! Core data structures: scored samples, scalar points and window widths.

mod sentiment;
mod window;

pub use sentiment::{
    scalar_series, scalarize, values_of, ScalarPoint, SentimentScoreTriple, NEGATIVE_WEIGHT,
    NEUTRAL_WEIGHT, POSITIVE_WEIGHT,
};
pub use window::WindowWidth;

/// Scoring configuration: weights, thresholds, bounds and file defaults

pub mod scoring;

pub use scoring::*;

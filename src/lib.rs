// Core domain types
pub mod core;

// Configuration
pub mod config;

// Scoring stages
pub mod features;
pub mod scoring;
pub mod simulator;

// Batch orchestration and reporting
pub mod pipeline;
pub mod report;

// Re-export commonly used types for convenience
pub use crate::config::ScoringConfig;
pub use crate::core::types::{ScoreRow, WalletActivity};
pub use crate::pipeline::{PipelineError, ScoringPipeline};
pub use crate::report::ScoringSummary;

/// Runs the simulate-extract-score loop over a wallet list CSV
///
/// Per-wallet failures never abort the batch: the failed wallet gets a
/// neutral fallback row and processing continues. Only file-level problems
/// (missing input, missing column, unwritable output) are fatal.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info};

use crate::config::ScoringConfig;
use crate::core::types::ScoreRow;
use crate::features;
use crate::scoring::RiskScorer;
use crate::simulator::{ActivitySimulator, SimulationError};

const WALLET_ID_COLUMN: &str = "wallet_id";
const DETAILED_SUFFIX: &str = "_detailed";
const FALLBACK_EXPLANATION: &str = "Error in processing";

/// Column order of the detailed table, mirroring `ScoreRow` field order.
const DETAILED_HEADERS: [&str; 8] = [
    "wallet_id",
    "score",
    "explanation",
    "liquidation_count",
    "repayment_ratio",
    "current_utilization",
    "activity_frequency",
    "asset_diversity",
];

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("input file not found: {0}")]
    InputMissing(PathBuf),
    #[error("input file has no '{0}' column")]
    MissingColumn(&'static str),
    #[error("CSV processing failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ScoringPipeline {
    config: ScoringConfig,
    simulator: ActivitySimulator,
    scorer: RiskScorer,
    anchor: DateTime<Utc>,
}

impl ScoringPipeline {
    /// Builds a pipeline anchored at the given instant. Every wallet in the
    /// batch is simulated and aged against the same anchor.
    pub fn new(config: ScoringConfig, anchor: DateTime<Utc>) -> Self {
        let simulator = ActivitySimulator::new(anchor);
        let scorer = RiskScorer::new(config.clone());
        Self {
            config,
            simulator,
            scorer,
            anchor,
        }
    }

    /// Scores every wallet listed in the input CSV, writes the detailed and
    /// simple score tables, and returns the rows in input order.
    pub async fn process_wallet_list(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<Vec<ScoreRow>, PipelineError> {
        if !input.exists() {
            return Err(PipelineError::InputMissing(input.to_path_buf()));
        }

        let wallets = read_wallet_ids(input)?;
        info!("📋 Loaded {} wallet ids from {}", wallets.len(), input.display());

        let mut rows = Vec::with_capacity(wallets.len());
        for (index, wallet_id) in wallets.iter().enumerate() {
            info!("Processing wallet {}/{}: {}", index + 1, wallets.len(), wallet_id);
            match self.score_wallet(wallet_id) {
                Ok(row) => {
                    rows.push(row);
                    // Pace the loop the way a live data source would demand
                    tokio::time::sleep(Duration::from_millis(
                        self.config.processing.rate_limit_delay_ms,
                    ))
                    .await;
                }
                Err(e) => {
                    error!("❌ Error processing wallet {}: {}", wallet_id, e);
                    rows.push(self.fallback_row(wallet_id));
                }
            }
        }

        write_detailed(&detailed_output_path(output), &rows)?;
        write_simple(output, &rows)?;
        info!("💾 Results saved to {}", output.display());

        Ok(rows)
    }

    /// Runs the full scoring chain for a single wallet identifier.
    pub fn score_wallet(&self, wallet_id: &str) -> Result<ScoreRow, SimulationError> {
        let activity = self.simulator.generate(wallet_id)?;
        let features = features::extract(&activity, self.anchor, &self.config);
        let score = self.scorer.score(&features);
        let explanation = self.scorer.explain(&features, score);

        Ok(ScoreRow {
            wallet_id: wallet_id.to_string(),
            score,
            explanation,
            liquidation_count: features.liquidation_count as u32,
            repayment_ratio: round3(features.repayment_ratio),
            current_utilization: round3(features.current_utilization),
            activity_frequency: round2(features.activity_frequency),
            asset_diversity: features.asset_diversity as u32,
        })
    }

    fn fallback_row(&self, wallet_id: &str) -> ScoreRow {
        ScoreRow {
            wallet_id: wallet_id.to_string(),
            score: self.config.bounds.base_score as u32,
            explanation: FALLBACK_EXPLANATION.to_string(),
            liquidation_count: 0,
            repayment_ratio: 0.0,
            current_utilization: 0.0,
            activity_frequency: 0.0,
            asset_diversity: 0,
        }
    }
}

fn read_wallet_ids(path: &Path) -> Result<Vec<String>, PipelineError> {
    let mut reader = csv::Reader::from_path(path)?;
    let column = reader
        .headers()?
        .iter()
        .position(|header| header == WALLET_ID_COLUMN)
        .ok_or(PipelineError::MissingColumn(WALLET_ID_COLUMN))?;

    let mut wallets = Vec::new();
    for record in reader.records() {
        let record = record?;
        wallets.push(record.get(column).unwrap_or_default().to_string());
    }
    Ok(wallets)
}

/// `scores.csv` becomes `scores_detailed.csv`, next to the simple table.
pub(crate) fn detailed_output_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("scores");
    match output.extension().and_then(|e| e.to_str()) {
        Some(ext) => output.with_file_name(format!("{}{}.{}", stem, DETAILED_SUFFIX, ext)),
        None => output.with_file_name(format!("{}{}", stem, DETAILED_SUFFIX)),
    }
}

fn write_detailed(path: &Path, rows: &[ScoreRow]) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        // Serialization only emits headers alongside the first row
        writer.write_record(DETAILED_HEADERS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_simple(path: &Path, rows: &[ScoreRow]) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([WALLET_ID_COLUMN, "score"])?;
    for row in rows {
        writer.write_record([row.wallet_id.as_str(), row.score.to_string().as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn quiet_config() -> ScoringConfig {
        let mut config = ScoringConfig::default();
        config.processing.rate_limit_delay_ms = 0;
        config
    }

    #[test]
    fn detailed_path_inserts_suffix_before_extension() {
        assert_eq!(
            detailed_output_path(Path::new("output/wallet_scores.csv")),
            PathBuf::from("output/wallet_scores_detailed.csv")
        );
        assert_eq!(
            detailed_output_path(Path::new("scores")),
            PathBuf::from("scores_detailed")
        );
    }

    #[test]
    fn rounding_helpers_match_output_precision() {
        assert_eq!(round3(0.123456), 0.123);
        assert_eq!(round3(1.23467), 1.235);
        assert_eq!(round3(0.0004), 0.0);
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(0.996), 1.0);
    }

    #[test]
    fn fallback_row_is_neutral() {
        let pipeline = ScoringPipeline::new(quiet_config(), anchor());
        let row = pipeline.fallback_row("not-a-wallet");
        assert_eq!(row.wallet_id, "not-a-wallet");
        assert_eq!(row.score, 500);
        assert_eq!(row.explanation, "Error in processing");
        assert_eq!(row.liquidation_count, 0);
        assert_eq!(row.repayment_ratio, 0.0);
        assert_eq!(row.current_utilization, 0.0);
        assert_eq!(row.activity_frequency, 0.0);
        assert_eq!(row.asset_diversity, 0);
    }

    #[test]
    fn score_wallet_rejects_malformed_identifiers() {
        let pipeline = ScoringPipeline::new(quiet_config(), anchor());
        assert!(pipeline.score_wallet("0xabc").is_err());
        assert!(pipeline.score_wallet("no-hex-tail-here!").is_err());
    }

    #[test]
    fn score_wallet_is_deterministic_and_bounded() {
        let pipeline = ScoringPipeline::new(quiet_config(), anchor());
        let wallet = "0x742d35cc6634c0532925a3b844bc9e7595f8b2c1";
        let a = pipeline.score_wallet(wallet).unwrap();
        let b = pipeline.score_wallet(wallet).unwrap();
        assert_eq!(a, b);
        assert!(a.score <= 1000);
    }

    #[test]
    fn read_wallet_ids_requires_wallet_id_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "address,label").unwrap();
        writeln!(file, "0xabc,test").unwrap();
        drop(file);

        assert!(matches!(
            read_wallet_ids(&path),
            Err(PipelineError::MissingColumn(_))
        ));
    }

    #[test]
    fn read_wallet_ids_picks_column_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "label,wallet_id").unwrap();
        writeln!(file, "alpha,0x1111").unwrap();
        writeln!(file, "beta,0x2222").unwrap();
        drop(file);

        let wallets = read_wallet_ids(&path).unwrap();
        assert_eq!(wallets, vec!["0x1111".to_string(), "0x2222".to_string()]);
    }

    #[tokio::test]
    async fn missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ScoringPipeline::new(quiet_config(), anchor());
        let result = pipeline
            .process_wallet_list(&dir.path().join("absent.csv"), &dir.path().join("out.csv"))
            .await;
        assert!(matches!(result, Err(PipelineError::InputMissing(_))));
    }
}

/// Scoring configuration structures
///
/// Every weight and threshold of the additive risk model lives here so the
/// model can be retuned from a TOML file without touching scorer code.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid score bounds: {0}")]
    InvalidBounds(String),
    #[error("invalid threshold ordering: {0}")]
    InvalidThresholds(String),
    #[error("weight '{0}' must be non-negative")]
    NegativeWeight(&'static str),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: RiskWeights,
    pub thresholds: RiskThresholds,
    pub bounds: ScoreBounds,
    pub assets: AssetClasses,
    pub processing: ProcessingConfig,
    pub files: FileConfig,
}

/// Additive point adjustments. Penalties are stored as positive magnitudes
/// and subtracted by the scorer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RiskWeights {
    pub liquidation_penalty: i64,
    pub recent_liquidation_penalty: i64,
    pub dated_liquidation_penalty: i64,
    pub repayment_bonus: i64,
    pub high_utilization_penalty: i64,
    pub medium_utilization_penalty: i64,
    pub frequency_bonus: i64,
    pub low_activity_penalty: i64,
    pub diversification_bonus: i64,
    pub concentration_penalty: i64,
    pub volatility_penalty: i64,
    pub account_age_bonus: i64,
    pub young_account_penalty: i64,
    pub recent_activity_bonus: i64,
    pub stale_activity_penalty: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub high_utilization: f64,
    pub medium_utilization: f64,
    pub good_repayment_ratio: f64,
    pub poor_repayment_ratio: f64,
    pub high_activity_frequency: f64,
    pub low_activity_frequency: f64,
    pub min_diversification: usize,
    pub high_volatile_ratio: f64,
    pub mature_account_days: i64,
    pub young_account_days: i64,
    pub recent_activity_days: i64,
    pub stale_activity_days: i64,
    pub recent_liquidation_days: i64,
    pub dated_liquidation_days: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoreBounds {
    pub min_score: i64,
    pub max_score: i64,
    pub base_score: i64,
}

/// Asset classification used by the volatility exposure factor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetClasses {
    pub volatile: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub rate_limit_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FileConfig {
    pub input: String,
    pub output: String,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            liquidation_penalty: 200,       // per liquidation event
            recent_liquidation_penalty: 100,
            dated_liquidation_penalty: 50,
            repayment_bonus: 100,           // also the poor-repayment penalty
            high_utilization_penalty: 150,
            medium_utilization_penalty: 75,
            frequency_bonus: 50,
            low_activity_penalty: 50,
            diversification_bonus: 75,
            concentration_penalty: 25,
            volatility_penalty: 100,
            account_age_bonus: 50,
            young_account_penalty: 50,
            recent_activity_bonus: 25,
            stale_activity_penalty: 75,
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high_utilization: 0.8,
            medium_utilization: 0.6,
            good_repayment_ratio: 0.9,
            poor_repayment_ratio: 0.5,
            high_activity_frequency: 2.0,   // tx per 30 days
            low_activity_frequency: 0.5,
            min_diversification: 3,
            high_volatile_ratio: 0.7,
            mature_account_days: 365,
            young_account_days: 30,
            recent_activity_days: 7,
            stale_activity_days: 90,
            recent_liquidation_days: 30,
            dated_liquidation_days: 90,
        }
    }
}

impl Default for ScoreBounds {
    fn default() -> Self {
        Self {
            min_score: 0,
            max_score: 1000,
            base_score: 500,
        }
    }
}

impl Default for AssetClasses {
    fn default() -> Self {
        Self {
            volatile: vec![
                "ETH".to_string(),
                "WBTC".to_string(),
                "COMP".to_string(),
                "UNI".to_string(),
            ],
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay_ms: 100,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            input: "data/wallets.csv".to_string(),
            output: "output/wallet_scores.csv".to_string(),
        }
    }
}

impl AssetClasses {
    pub fn is_volatile(&self, symbol: &str) -> bool {
        self.volatile.iter().any(|s| s == symbol)
    }
}

impl ScoringConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config file if it exists, otherwise falls back to the
    /// built-in defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("No config file at {}, using built-in defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.bounds;
        if b.min_score > b.max_score {
            return Err(ConfigError::InvalidBounds(format!(
                "min_score {} exceeds max_score {}",
                b.min_score, b.max_score
            )));
        }
        if b.min_score < 0 {
            return Err(ConfigError::InvalidBounds(format!(
                "min_score {} must be non-negative",
                b.min_score
            )));
        }
        if b.base_score < b.min_score || b.base_score > b.max_score {
            return Err(ConfigError::InvalidBounds(format!(
                "base_score {} outside [{}, {}]",
                b.base_score, b.min_score, b.max_score
            )));
        }

        let t = &self.thresholds;
        let orderings: [(&str, bool); 6] = [
            (
                "poor_repayment_ratio < good_repayment_ratio",
                t.poor_repayment_ratio < t.good_repayment_ratio,
            ),
            (
                "medium_utilization < high_utilization",
                t.medium_utilization < t.high_utilization,
            ),
            (
                "low_activity_frequency < high_activity_frequency",
                t.low_activity_frequency < t.high_activity_frequency,
            ),
            (
                "young_account_days <= mature_account_days",
                t.young_account_days <= t.mature_account_days,
            ),
            (
                "recent_activity_days <= stale_activity_days",
                t.recent_activity_days <= t.stale_activity_days,
            ),
            (
                "recent_liquidation_days <= dated_liquidation_days",
                t.recent_liquidation_days <= t.dated_liquidation_days,
            ),
        ];
        for (rule, holds) in orderings {
            if !holds {
                return Err(ConfigError::InvalidThresholds(rule.to_string()));
            }
        }

        let w = &self.weights;
        let named: [(&'static str, i64); 15] = [
            ("liquidation_penalty", w.liquidation_penalty),
            ("recent_liquidation_penalty", w.recent_liquidation_penalty),
            ("dated_liquidation_penalty", w.dated_liquidation_penalty),
            ("repayment_bonus", w.repayment_bonus),
            ("high_utilization_penalty", w.high_utilization_penalty),
            ("medium_utilization_penalty", w.medium_utilization_penalty),
            ("frequency_bonus", w.frequency_bonus),
            ("low_activity_penalty", w.low_activity_penalty),
            ("diversification_bonus", w.diversification_bonus),
            ("concentration_penalty", w.concentration_penalty),
            ("volatility_penalty", w.volatility_penalty),
            ("account_age_bonus", w.account_age_bonus),
            ("young_account_penalty", w.young_account_penalty),
            ("recent_activity_bonus", w.recent_activity_bonus),
            ("stale_activity_penalty", w.stale_activity_penalty),
        ];
        for (name, value) in named {
            if value < 0 {
                return Err(ConfigError::NegativeWeight(name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn defaults_match_documented_model() {
        let config = ScoringConfig::default();
        assert_eq!(config.weights.liquidation_penalty, 200);
        assert_eq!(config.weights.repayment_bonus, 100);
        assert_eq!(config.bounds.base_score, 500);
        assert_eq!(config.bounds.max_score, 1000);
        assert_eq!(config.thresholds.min_diversification, 3);
        assert!(config.assets.is_volatile("ETH"));
        assert!(config.assets.is_volatile("COMP"));
        assert!(!config.assets.is_volatile("USDC"));
    }

    #[test]
    fn partial_toml_fills_missing_tables() {
        let raw = r#"
            [weights]
            liquidation_penalty = 300

            [processing]
            rate_limit_delay_ms = 0
        "#;
        let config: ScoringConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.weights.liquidation_penalty, 300);
        assert_eq!(config.weights.repayment_bonus, 100);
        assert_eq!(config.processing.rate_limit_delay_ms, 0);
        assert_eq!(config.thresholds.high_utilization, 0.8);
        assert_eq!(config.files.input, "data/wallets.csv");
    }

    #[test]
    fn toml_round_trip_preserves_config() {
        let config = ScoringConfig::default();
        let raw = toml::to_string(&config).unwrap();
        let parsed: ScoringConfig = toml::from_str(&raw).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn validate_rejects_inverted_utilization_bands() {
        let mut config = ScoringConfig::default();
        config.thresholds.medium_utilization = 0.9;
        config.thresholds.high_utilization = 0.6;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThresholds(_))
        ));
    }

    #[test]
    fn validate_rejects_negative_weight() {
        let mut config = ScoringConfig::default();
        config.weights.volatility_penalty = -10;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeWeight("volatility_penalty"))
        ));
    }

    #[test]
    fn validate_rejects_base_score_outside_bounds() {
        let mut config = ScoringConfig::default();
        config.bounds.base_score = 1200;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBounds(_))));
    }

    #[test]
    fn load_or_default_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let config = ScoringConfig::load_or_default(&path).unwrap();
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn load_from_file_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lendscore.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[bounds]\nmin_score = 500\nmax_score = 100").unwrap();
        drop(file);
        assert!(ScoringConfig::load_from_file(&path).is_err());
    }
}

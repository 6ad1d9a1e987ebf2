/// Rule-based additive credit scorer
///
/// Starts every wallet at the configured base score, then walks a fixed set
/// of factors, adding or subtracting the configured weight whenever the
/// feature crosses its threshold. Higher scores mean lower risk. The result
/// is clamped to the configured bounds.

use crate::config::ScoringConfig;
use crate::features::FeatureSet;
use crate::scoring::explain::build_explanation;

pub struct RiskScorer {
    config: ScoringConfig,
}

impl RiskScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Computes the credit score for one feature set.
    pub fn score(&self, features: &FeatureSet) -> u32 {
        let w = &self.config.weights;
        let t = &self.config.thresholds;
        let b = &self.config.bounds;

        let mut score = b.base_score;

        // Liquidation history weighs heaviest
        score -= features.liquidation_count as i64 * w.liquidation_penalty;
        if features.days_since_last_liquidation < t.recent_liquidation_days {
            score -= w.recent_liquidation_penalty;
        } else if features.days_since_last_liquidation < t.dated_liquidation_days {
            score -= w.dated_liquidation_penalty;
        }

        // Repayment behavior
        if features.repayment_ratio > t.good_repayment_ratio {
            score += w.repayment_bonus;
        } else if features.repayment_ratio < t.poor_repayment_ratio {
            score -= w.repayment_bonus;
        }

        // Current utilization
        if features.current_utilization > t.high_utilization {
            score -= w.high_utilization_penalty;
        } else if features.current_utilization > t.medium_utilization {
            score -= w.medium_utilization_penalty;
        }

        // Activity frequency
        if features.activity_frequency > t.high_activity_frequency {
            score += w.frequency_bonus;
        } else if features.activity_frequency < t.low_activity_frequency {
            score -= w.low_activity_penalty;
        }

        // Diversification bonus, concentration penalty only for single-asset use
        if features.asset_diversity >= t.min_diversification {
            score += w.diversification_bonus;
        } else if features.asset_diversity == 1 {
            score -= w.concentration_penalty;
        }

        // Volatile asset exposure
        if features.volatile_asset_ratio > t.high_volatile_ratio {
            score -= w.volatility_penalty;
        }

        // Account age
        if features.account_age_days > t.mature_account_days {
            score += w.account_age_bonus;
        } else if features.account_age_days < t.young_account_days {
            score -= w.young_account_penalty;
        }

        // Activity recency
        if features.days_since_last_activity < t.recent_activity_days {
            score += w.recent_activity_bonus;
        } else if features.days_since_last_activity > t.stale_activity_days {
            score -= w.stale_activity_penalty;
        }

        score.clamp(b.min_score, b.max_score) as u32
    }

    /// Builds the human-readable explanation for a scored feature set.
    pub fn explain(&self, features: &FeatureSet, score: u32) -> String {
        build_explanation(features, &self.config.thresholds, score)
    }
}

/// Explanation strings for scored wallets
///
/// Clause wording and ordering are stable so downstream consumers can parse
/// the explanation column.

use crate::config::RiskThresholds;
use crate::features::FeatureSet;

pub(crate) fn build_explanation(
    features: &FeatureSet,
    thresholds: &RiskThresholds,
    _score: u32,
) -> String {
    let mut clauses: Vec<String> = Vec::new();

    if features.liquidation_count > 0 {
        clauses.push(format!("Liquidated {} time(s)", features.liquidation_count));
    }

    if features.repayment_ratio > thresholds.good_repayment_ratio {
        clauses.push("Excellent repayment history".to_string());
    } else if features.repayment_ratio < thresholds.poor_repayment_ratio {
        clauses.push("Poor repayment history".to_string());
    }

    if features.current_utilization > thresholds.high_utilization {
        clauses.push("High current utilization".to_string());
    }

    if features.activity_frequency > thresholds.high_activity_frequency {
        clauses.push("Active user".to_string());
    } else if features.activity_frequency < thresholds.low_activity_frequency {
        clauses.push("Inactive user".to_string());
    }

    if features.asset_diversity >= thresholds.min_diversification {
        clauses.push("Well-diversified portfolio".to_string());
    }

    if clauses.is_empty() {
        "Standard risk profile".to_string()
    } else {
        clauses.join("; ")
    }
}

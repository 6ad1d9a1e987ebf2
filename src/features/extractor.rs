/// Derives the behavioral feature set that drives scoring
///
/// All ratios are floored against a denominator of at least 1 so that empty
/// histories produce zeros instead of dividing by zero.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::core::types::{TxKind, WalletActivity};

/// Sentinel for "never happened" day counts.
pub const NO_ACTIVITY_DAYS: i64 = 999;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    // Basic activity metrics
    pub total_transactions: usize,
    pub account_age_days: i64,
    pub days_since_last_activity: i64,
    pub activity_frequency: f64,

    // Transaction mix
    pub supply_ratio: f64,
    pub borrow_ratio: f64,
    pub repay_ratio: f64,
    pub total_supply_volume: f64,
    pub total_borrow_volume: f64,
    pub total_repay_volume: f64,
    pub repayment_ratio: f64,

    // Asset usage
    pub asset_diversity: usize,
    pub volatile_asset_ratio: f64,

    // Current positions
    pub active_positions: usize,
    pub current_utilization: f64,

    // Liquidation history
    pub liquidation_count: usize,
    pub avg_liquidation_amount: f64,
    pub total_liquidated_value: f64,
    pub days_since_last_liquidation: i64,
}

/// Extracts the full feature set from one wallet activity record. The anchor
/// is the reference instant for all day counts.
pub fn extract(activity: &WalletActivity, anchor: DateTime<Utc>, config: &ScoringConfig) -> FeatureSet {
    let transactions = &activity.transactions;
    let liquidations = &activity.liquidations;
    let positions = &activity.current_positions;

    let total_transactions = transactions.len();
    let liquidation_count = liquidations.len();

    // Time-based metrics
    let first = transactions.iter().map(|tx| tx.timestamp).min();
    let last = transactions.iter().map(|tx| tx.timestamp).max();
    let (account_age_days, days_since_last_activity, activity_frequency) = match (first, last) {
        (Some(first), Some(last)) => {
            let age = (anchor - first).num_days();
            let idle = (anchor - last).num_days();
            let frequency = total_transactions as f64 / age.max(1) as f64 * 30.0;
            (age, idle, frequency)
        }
        _ => (0, NO_ACTIVITY_DAYS, 0.0),
    };

    // Transaction mix
    let mut supply_count = 0usize;
    let mut borrow_count = 0usize;
    let mut repay_count = 0usize;
    let mut total_supply_volume = 0.0;
    let mut total_borrow_volume = 0.0;
    let mut total_repay_volume = 0.0;
    let mut volatile_tx_count = 0usize;
    let mut unique_assets = HashSet::new();
    for tx in transactions {
        match tx.kind {
            TxKind::Supply => {
                supply_count += 1;
                total_supply_volume += tx.amount;
            }
            TxKind::Borrow => {
                borrow_count += 1;
                total_borrow_volume += tx.amount;
            }
            TxKind::Repay => {
                repay_count += 1;
                total_repay_volume += tx.amount;
            }
            TxKind::Withdraw => {}
        }
        unique_assets.insert(tx.asset);
        if config.assets.is_volatile(tx.asset.symbol()) {
            volatile_tx_count += 1;
        }
    }
    let tx_denom = total_transactions.max(1) as f64;

    // Current position analysis
    let active_positions = positions
        .values()
        .filter(|p| p.supplied > 0.0 || p.borrowed > 0.0)
        .count();
    let total_supplied: f64 = positions.values().map(|p| p.supplied).sum();
    let total_borrowed: f64 = positions.values().map(|p| p.borrowed).sum();

    // Liquidation analysis
    let (avg_liquidation_amount, total_liquidated_value, days_since_last_liquidation) =
        if liquidations.is_empty() {
            (0.0, 0.0, NO_ACTIVITY_DAYS)
        } else {
            let total: f64 = liquidations.iter().map(|l| l.liquidated_amount).sum();
            let days = liquidations
                .iter()
                .map(|l| (anchor - l.timestamp).num_days())
                .min()
                .unwrap_or(NO_ACTIVITY_DAYS);
            (total / liquidation_count as f64, total, days)
        };

    FeatureSet {
        total_transactions,
        account_age_days,
        days_since_last_activity,
        activity_frequency,
        supply_ratio: supply_count as f64 / tx_denom,
        borrow_ratio: borrow_count as f64 / tx_denom,
        repay_ratio: repay_count as f64 / tx_denom,
        total_supply_volume,
        total_borrow_volume,
        total_repay_volume,
        repayment_ratio: total_repay_volume / total_borrow_volume.max(1.0),
        asset_diversity: unique_assets.len(),
        volatile_asset_ratio: volatile_tx_count as f64 / tx_denom,
        active_positions,
        current_utilization: total_borrowed / total_supplied.max(1.0),
        liquidation_count,
        avg_liquidation_amount,
        total_liquidated_value,
        days_since_last_liquidation,
    }
}

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Assets tracked by the simulated lending protocol, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "DAI")]
    Dai,
    #[serde(rename = "USDC")]
    Usdc,
    #[serde(rename = "USDT")]
    Usdt,
    #[serde(rename = "WBTC")]
    Wbtc,
}

impl Asset {
    pub const ALL: [Asset; 5] = [Asset::Eth, Asset::Dai, Asset::Usdc, Asset::Usdt, Asset::Wbtc];

    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::Eth => "ETH",
            Asset::Dai => "DAI",
            Asset::Usdc => "USDC",
            Asset::Usdt => "USDT",
            Asset::Wbtc => "WBTC",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Lending protocol transaction types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Supply,
    Borrow,
    Repay,
    Withdraw,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub timestamp: DateTime<Utc>,
    pub kind: TxKind,
    pub asset: Asset,
    pub amount: f64,
    pub tx_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liquidation {
    pub timestamp: DateTime<Utc>,
    pub liquidated_amount: f64,
    pub collateral_seized: f64,
    pub asset: Asset,
}

/// Open position in a single asset. Zero amounts mean the slot is dormant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub supplied: f64,
    pub borrowed: f64,
}

/// Complete simulated history for one wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletActivity {
    pub wallet_address: String,
    pub transactions: Vec<Transaction>,
    pub liquidations: Vec<Liquidation>,
    pub current_positions: HashMap<Asset, Position>,
    pub first_interaction: Option<DateTime<Utc>>,
    pub last_interaction: Option<DateTime<Utc>>,
}

/// One output row of the batch scorer. Field order matches the detailed
/// CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub wallet_id: String,
    pub score: u32,
    pub explanation: String,
    pub liquidation_count: u32,
    pub repayment_ratio: f64,
    pub current_utilization: f64,
    pub activity_frequency: f64,
    pub asset_diversity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_symbols_match_serde_names() {
        for asset in Asset::ALL {
            let json = serde_json::to_string(&asset).unwrap();
            assert_eq!(json, format!("\"{}\"", asset.symbol()));
        }
    }

    #[test]
    fn tx_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TxKind::Supply).unwrap(), "\"supply\"");
        assert_eq!(serde_json::to_string(&TxKind::Withdraw).unwrap(), "\"withdraw\"");
        let kind: TxKind = serde_json::from_str("\"repay\"").unwrap();
        assert_eq!(kind, TxKind::Repay);
    }

    #[test]
    fn score_row_csv_headers_follow_field_order() {
        let row = ScoreRow {
            wallet_id: "0xabc".to_string(),
            score: 500,
            explanation: "Standard risk profile".to_string(),
            liquidation_count: 0,
            repayment_ratio: 0.0,
            current_utilization: 0.0,
            activity_frequency: 0.0,
            asset_diversity: 0,
        };
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(&row).unwrap();
        let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let header = data.lines().next().unwrap();
        assert_eq!(
            header,
            "wallet_id,score,explanation,liquidation_count,repayment_ratio,\
             current_utilization,activity_frequency,asset_diversity"
        );
    }
}

/// Aggregates a finished batch into headline statistics and prints the
/// terminal report.

use std::path::Path;

use colored::Colorize;

use crate::core::types::ScoreRow;
use crate::pipeline::runner::detailed_output_path;

/// Score below which a wallet counts as high risk.
const HIGH_RISK_CEILING: u32 = 300;
/// Score at which a wallet counts as low risk.
const LOW_RISK_FLOOR: u32 = 700;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringSummary {
    pub total_wallets: usize,
    pub mean_score: f64,
    pub std_dev: f64,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    pub liquidated_wallets: usize,
    pub mean_repayment_ratio: f64,
    pub mean_utilization: f64,
    pub mean_asset_diversity: f64,
}

impl ScoringSummary {
    pub fn from_rows(rows: &[ScoreRow]) -> Self {
        let total_wallets = rows.len();
        let mean_score = mean(rows.iter().map(|r| f64::from(r.score)));
        let std_dev = sample_std_dev(rows.iter().map(|r| f64::from(r.score)));

        let high_risk = rows.iter().filter(|r| r.score < HIGH_RISK_CEILING).count();
        let low_risk = rows.iter().filter(|r| r.score >= LOW_RISK_FLOOR).count();
        let medium_risk = total_wallets - high_risk - low_risk;

        Self {
            total_wallets,
            mean_score,
            std_dev,
            high_risk,
            medium_risk,
            low_risk,
            liquidated_wallets: rows.iter().filter(|r| r.liquidation_count > 0).count(),
            mean_repayment_ratio: mean(rows.iter().map(|r| r.repayment_ratio)),
            mean_utilization: mean(rows.iter().map(|r| r.current_utilization)),
            mean_asset_diversity: mean(rows.iter().map(|r| f64::from(r.asset_diversity))),
        }
    }

    /// Prints the end-of-run report to the terminal.
    pub fn print(&self, output: &Path) {
        println!();
        println!("{}", "=".repeat(50));
        println!("{}", "RISK SCORING COMPLETED SUCCESSFULLY".bold());
        println!("{}", "=".repeat(50));
        println!("Total wallets processed: {}", self.total_wallets);
        println!("Average risk score: {:.1}", self.mean_score);
        println!("Standard deviation: {:.1}", self.std_dev);

        println!();
        println!("Risk Distribution:");
        println!(
            "  {} {:3} wallets ({:.1}%)",
            "🔴 High Risk (0-299):   ".red(),
            self.high_risk,
            self.percentage(self.high_risk)
        );
        println!(
            "  {} {:3} wallets ({:.1}%)",
            "🟡 Medium Risk (300-699):".yellow(),
            self.medium_risk,
            self.percentage(self.medium_risk)
        );
        println!(
            "  {} {:3} wallets ({:.1}%)",
            "🟢 Low Risk (700-1000):  ".green(),
            self.low_risk,
            self.percentage(self.low_risk)
        );

        println!();
        println!("Key Risk Indicators:");
        println!("  Wallets with liquidations: {}", self.liquidated_wallets);
        println!("  Average repayment ratio: {:.3}", self.mean_repayment_ratio);
        println!("  Average utilization: {:.3}", self.mean_utilization);
        println!("  Average asset diversity: {:.1}", self.mean_asset_diversity);

        println!();
        println!("Output Files:");
        println!("  📄 Simple scores: {}", output.display());
        println!(
            "  📊 Detailed analysis: {}",
            detailed_output_path(output).display()
        );
        println!("  📖 Methodology: METHODOLOGY.md");
    }

    fn percentage(&self, count: usize) -> f64 {
        count as f64 / self.total_wallets.max(1) as f64 * 100.0
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Sample standard deviation (n - 1 denominator). Zero for fewer than two
/// values.
fn sample_std_dev(values: impl Iterator<Item = f64>) -> f64 {
    let collected: Vec<f64> = values.collect();
    if collected.len() < 2 {
        return 0.0;
    }
    let mean = collected.iter().sum::<f64>() / collected.len() as f64;
    let variance = collected
        .iter()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / (collected.len() - 1) as f64;
    variance.sqrt()
}

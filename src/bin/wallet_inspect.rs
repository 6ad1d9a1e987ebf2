/// Dumps the simulated activity, extracted features and score for one wallet

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};

use lendscore::config::ScoringConfig;
use lendscore::features;
use lendscore::scoring::RiskScorer;
use lendscore::simulator::ActivitySimulator;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let Some(wallet_id) = args.get(1) else {
        bail!("usage: wallet_inspect <wallet-id> [anchor-rfc3339]");
    };
    let anchor: DateTime<Utc> = match args.get(2) {
        Some(raw) => raw.parse()?,
        None => Utc::now(),
    };

    eprintln!("🔍 Inspecting {}", wallet_id);

    let config = ScoringConfig::load_or_default("config/lendscore.toml")?;

    let simulator = ActivitySimulator::new(anchor);
    let activity = simulator.generate(wallet_id)?;
    let features = features::extract(&activity, anchor, &config);
    let scorer = RiskScorer::new(config);
    let score = scorer.score(&features);
    let explanation = scorer.explain(&features, score);

    let report = serde_json::json!({
        "wallet_id": wallet_id,
        "anchor": anchor,
        "score": score,
        "explanation": explanation,
        "features": features,
        "activity": activity,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

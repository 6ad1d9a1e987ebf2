use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lendscore::config::ScoringConfig;
use lendscore::pipeline::ScoringPipeline;
use lendscore::report::ScoringSummary;

const DEFAULT_CONFIG_PATH: &str = "config/lendscore.toml";

fn init_tracing() -> Result<()> {
    std::fs::create_dir_all("logs")?;

    // Daily-rolling JSON log file alongside the console output
    let file_appender = tracing_appender::rolling::daily("logs", "lendscore.log");
    let (non_blocking_file, _guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .compact();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .json()
        .with_current_span(false)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Leak the guard so the file appender stays alive for the whole run
    std::mem::forget(_guard);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("🏦 Lendscore - Wallet Risk Scoring");
    info!("==================================");

    let config = ScoringConfig::load_or_default(DEFAULT_CONFIG_PATH)?;

    // Positional overrides: lendscore [input.csv] [output.csv]
    let args: Vec<String> = std::env::args().collect();
    let input = PathBuf::from(
        args.get(1)
            .cloned()
            .unwrap_or_else(|| config.files.input.clone()),
    );
    let output = PathBuf::from(
        args.get(2)
            .cloned()
            .unwrap_or_else(|| config.files.output.clone()),
    );

    if !input.exists() {
        error!("Input file not found: {}", input.display());
        error!("Place the wallet list CSV at that path or pass one as the first argument");
        anyhow::bail!("input file not found: {}", input.display());
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pipeline = ScoringPipeline::new(config, Utc::now());

    info!("🚀 Scoring wallets from {}", input.display());
    let rows = match pipeline.process_wallet_list(&input, &output).await {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to process wallet list: {}", e);
            return Err(e.into());
        }
    };

    ScoringSummary::from_rows(&rows).print(&output);

    Ok(())
}
